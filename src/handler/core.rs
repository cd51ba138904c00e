use std::fmt;
use std::sync::Arc;

use http::header::HeaderValue;
use http::StatusCode;
use serde::Serialize;
use tracing::{debug, error};

use super::callable::{Callable, HandlerResult, IntoCallable};
use crate::error_converter::{self, ErrorConverter};
use crate::header::{HeaderProvider, CONTENT_TYPE_JSON, HEADER_CONTENT_TYPE};
use crate::response::{ResponseError, ResponseWriter};
use crate::signature::{classify, ClassificationError, Shape};
use crate::Request;

/// What a single handler call produced, before encoding.
#[derive(Debug)]
pub enum Outcome<T> {
    /// Nothing to encode: an error-free handler returned `None`
    Empty,
    /// Encode this value (`None` encodes as `null`)
    Success(Option<T>),
    /// Encode the converter's payload for this error
    Failure(anyhow::Error),
}

/// Status and outcome of one handler call.
#[derive(Debug)]
pub struct Invocation<T> {
    pub status: StatusCode,
    pub outcome: Outcome<T>,
}

impl<T> Invocation<T> {
    fn plain(status: Option<StatusCode>, body: Option<T>) -> Self {
        let outcome = match body {
            Some(value) => Outcome::Success(Some(value)),
            None => Outcome::Empty,
        };
        Self {
            status: status.unwrap_or(StatusCode::OK),
            outcome,
        }
    }

    fn fallible(status: Option<StatusCode>, result: HandlerResult<T>) -> Self {
        match result {
            Ok(body) => Self {
                status: status.unwrap_or(StatusCode::OK),
                outcome: Outcome::Success(body),
            },
            Err(err) => Self {
                status: status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                outcome: Outcome::Failure(err),
            },
        }
    }
}

/// A handler function wrapped into a JSON responder.
///
/// Construction classifies the function once; serving never re-inspects it.
///
/// ```rust
/// use autojson::{Callable, JsonHandler, ResponseRecorder};
/// use http::StatusCode;
///
/// let handler = JsonHandler::new(Callable::body(|| Some("foo"))).unwrap();
/// let req = http::Request::builder().uri("/").body(Vec::new()).unwrap();
/// let mut rec = ResponseRecorder::new();
/// handler.serve(&mut rec, &req).unwrap();
///
/// assert_eq!(rec.status(), StatusCode::OK);
/// assert_eq!(rec.body_str(), r#""foo""#);
/// ```
pub struct JsonHandler<T> {
    shape: Shape,
    callable: Callable<T>,
    error_converter: Option<Arc<ErrorConverter>>,
}

impl<T: Serialize + 'static> JsonHandler<T> {
    /// Wrap `handler` after checking its shape.
    ///
    /// # Errors
    ///
    /// Returns a [`ClassificationError`] when `handler` is not one of the accepted
    /// shapes. This is a programming error; callers are expected to abort startup.
    pub fn new<C>(handler: C) -> Result<Self, ClassificationError>
    where
        C: IntoCallable<T>,
    {
        let candidate = handler.candidate();
        let shape = classify(&candidate)?;
        let callable = handler
            .into_callable()
            .ok_or(ClassificationError::NotAFunction {
                kind: candidate.kind(),
            })?;

        debug!(
            shape = ?shape,
            signature = %candidate,
            "Handler wrapped"
        );

        Ok(Self {
            shape,
            callable,
            error_converter: None,
        })
    }

    /// Use `converter` for this handler's errors instead of the process-wide one.
    #[must_use]
    pub fn with_error_converter(mut self, converter: Arc<ErrorConverter>) -> Self {
        self.error_converter = Some(converter);
        self
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Call the handler and interpret its outputs.
    pub fn invoke(&self, headers: &mut dyn HeaderProvider, req: &Request) -> Invocation<T> {
        match &self.callable {
            Callable::Body(f) => Invocation::plain(None, f()),
            Callable::BodyOrError(f) => Invocation::fallible(None, f()),
            Callable::StatusBody(f) => {
                let (status, body) = f();
                Invocation::plain(Some(status), body)
            }
            Callable::StatusBodyOrError(f) => {
                let (status, result) = f();
                Invocation::fallible(Some(status), result)
            }
            Callable::ContextBody(f) => Invocation::plain(None, f(headers, req)),
            Callable::ContextBodyOrError(f) => Invocation::fallible(None, f(headers, req)),
            Callable::ContextStatusBody(f) => {
                let (status, body) = f(headers, req);
                Invocation::plain(Some(status), body)
            }
            Callable::ContextStatusBodyOrError(f) => {
                let (status, result) = f(headers, req);
                Invocation::fallible(Some(status), result)
            }
        }
    }

    /// Call the handler and write its JSON response to `w`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResponseError`] if the body cannot be encoded or written. The
    /// response is then incomplete and the request must be aborted.
    pub fn serve<W: ResponseWriter>(&self, w: &mut W, req: &Request) -> Result<(), ResponseError> {
        let Invocation { status, outcome } = self.invoke(w, req);
        w.headers_mut()
            .insert(HEADER_CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));

        let result = self.write_outcome(w, req, status, outcome);
        if let Err(err) = &result {
            error!(
                status = status.as_u16(),
                path = %req.uri().path(),
                error = %err,
                "Failed to write JSON response"
            );
        }
        result
    }

    fn write_outcome<W: ResponseWriter>(
        &self,
        w: &mut W,
        req: &Request,
        status: StatusCode,
        outcome: Outcome<T>,
    ) -> Result<(), ResponseError> {
        match outcome {
            Outcome::Empty => w.write_status(status),
            Outcome::Success(body) => {
                w.write_status(status);
                serde_json::to_writer(&mut *w, &body)?;
            }
            Outcome::Failure(err) => {
                debug!(
                    status = status.as_u16(),
                    path = %req.uri().path(),
                    error = %err,
                    "Handler returned an error"
                );
                let payload = match &self.error_converter {
                    Some(converter) => converter.convert(status, req, &err),
                    None => error_converter::convert_global(status, req, &err),
                };
                w.write_status(status);
                serde_json::to_writer(&mut *w, &payload)?;
            }
        }
        w.flush()?;
        Ok(())
    }
}

impl<T: 'static> fmt::Debug for JsonHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonHandler")
            .field("shape", &self.shape)
            .field("callable", &self.callable)
            .field("error_converter", &self.error_converter)
            .finish()
    }
}
