use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use http::header::HeaderValue;
use http::{HeaderMap, StatusCode};
use may_minihttp::{HttpService, Request as RawRequest, Response};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::request::parse_request;
use crate::handler::JsonHandler;
use crate::header::{HeaderProvider, CONTENT_TYPE_JSON, HEADER_CONTENT_TYPE};
use crate::response::{ResponseError, ResponseRecorder, ResponseWriter};
use crate::Request;

/// A routable responder, type-erased over the handler's body type.
pub trait Endpoint: Send + Sync {
    /// Serve `req` into `w`.
    ///
    /// # Errors
    ///
    /// Propagates the [`ResponseError`] of the underlying handler.
    fn serve_recorded(&self, w: &mut ResponseRecorder, req: &Request) -> Result<(), ResponseError>;
}

impl<T: Serialize + 'static> Endpoint for JsonHandler<T> {
    fn serve_recorded(&self, w: &mut ResponseRecorder, req: &Request) -> Result<(), ResponseError> {
        self.serve(w, req)
    }
}

/// Exact-path router over wrapped handlers, served by `may_minihttp`.
///
/// The server clones the service once per connection; routes are shared, the
/// header buffer is per connection.
pub struct JsonService {
    routes: Arc<HashMap<String, Arc<dyn Endpoint>>>,
    head: HeaderBlock,
}

impl Clone for JsonService {
    fn clone(&self) -> Self {
        Self {
            routes: Arc::clone(&self.routes),
            head: HeaderBlock::default(),
        }
    }
}

/// Collects routes for a [`JsonService`].
#[derive(Default)]
pub struct JsonServiceBuilder {
    routes: HashMap<String, Arc<dyn Endpoint>>,
}

impl JsonServiceBuilder {
    /// Serve `endpoint` at `path`. Registering the same path twice replaces the first
    /// endpoint.
    #[must_use]
    pub fn route<E>(mut self, path: &str, endpoint: E) -> Self
    where
        E: Endpoint + 'static,
    {
        if self
            .routes
            .insert(path.to_string(), Arc::new(endpoint))
            .is_some()
        {
            warn!(path = %path, "Replaced existing route");
        } else {
            info!(
                path = %path,
                total_routes = self.routes.len(),
                "Route registered"
            );
        }
        self
    }

    #[must_use]
    pub fn build(self) -> JsonService {
        JsonService {
            routes: Arc::new(self.routes),
            head: HeaderBlock::default(),
        }
    }
}

impl JsonService {
    #[must_use]
    pub fn builder() -> JsonServiceBuilder {
        JsonServiceBuilder::default()
    }

    /// Number of registered paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route and serve `req` into a fresh recorder.
    ///
    /// Unknown paths get a `404` JSON body.
    ///
    /// # Errors
    ///
    /// Returns the handler's [`ResponseError`] when its response could not be
    /// encoded.
    pub fn handle(&self, req: &Request) -> Result<ResponseRecorder, ResponseError> {
        let mut rec = ResponseRecorder::new();
        match self.routes.get(req.uri().path()) {
            Some(endpoint) => endpoint.serve_recorded(&mut rec, req)?,
            None => write_not_found(&mut rec, req)?,
        }
        Ok(rec)
    }
}

fn write_not_found(rec: &mut ResponseRecorder, req: &Request) -> Result<(), ResponseError> {
    rec.headers_mut()
        .insert(HEADER_CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    rec.write_status(StatusCode::NOT_FOUND);
    serde_json::to_writer(
        &mut *rec,
        &json!({
            "error": "Not Found",
            "method": req.method().as_str(),
            "path": req.uri().path(),
        }),
    )?;
    Ok(())
}

impl HttpService for JsonService {
    fn call(&mut self, req: RawRequest, res: &mut Response) -> io::Result<()> {
        let request = parse_request(req)?;
        match self.handle(&request) {
            Ok(rec) => {
                write_response(res, rec, &mut self.head);
                Ok(())
            }
            Err(err) => {
                error!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    error = %err,
                    "Aborting request after response failure"
                );
                // An Err here would be answered by may_minihttp with its own plain-text
                // 500. Unwinding the connection coroutine closes the socket unanswered.
                std::panic::resume_unwind(Box::new(err.to_string()))
            }
        }
    }
}

/// Rendered header lines of the response currently being sent on one connection.
///
/// `may_minihttp` takes `&'static str` header lines into a fixed table of 16 slots.
/// All lines are rendered here, joined by CRLF, and handed over as a single line; the
/// buffer is reused for every response on the connection.
#[derive(Debug, Default)]
struct HeaderBlock {
    buf: String,
}

impl HeaderBlock {
    fn render(&mut self, headers: &HeaderMap) -> &str {
        self.buf.clear();
        for (name, value) in headers {
            let Ok(value) = value.to_str() else {
                warn!(header = %name, "Dropping non-ASCII response header");
                continue;
            };
            if !self.buf.is_empty() {
                self.buf.push_str("\r\n");
            }
            self.buf.push_str(name.as_str());
            self.buf.push_str(": ");
            self.buf.push_str(value);
        }
        &self.buf
    }
}

#[allow(unsafe_code)]
fn write_response(res: &mut Response, rec: ResponseRecorder, head: &mut HeaderBlock) {
    let (status, headers, body) = rec.into_parts();
    res.status_code(
        usize::from(status.as_u16()),
        status.canonical_reason().unwrap_or("Unknown"),
    );
    let block = head.render(&headers);
    if !block.is_empty() {
        // SAFETY: may_minihttp copies header lines into its output buffer in
        // `encode`, which runs right after `call` returns and before the next `call`
        // on this connection. `head` belongs to the connection's service clone and is
        // only rewritten by that next `call`, so the line outlives every read of it.
        let block: &'static str = unsafe { &*(block as *const str) };
        res.header(block);
    }
    res.body_vec(body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Callable;

    fn request(method: &str, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Vec::new())
            .unwrap()
    }

    #[test]
    fn test_header_block_joins_lines() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.append("x-tag", HeaderValue::from_static("a"));
        headers.append("x-tag", HeaderValue::from_static("b"));
        let mut head = HeaderBlock::default();
        assert_eq!(
            head.render(&headers),
            "content-type: application/json\r\nx-tag: a\r\nx-tag: b"
        );
        assert_eq!(head.render(&HeaderMap::new()), "");
    }

    #[test]
    fn test_header_block_skips_non_ascii() {
        let mut headers = HeaderMap::new();
        headers.insert("x-bin", HeaderValue::from_bytes(b"caf\xc3\xa9").unwrap());
        headers.insert("x-ok", HeaderValue::from_static("1"));
        let mut head = HeaderBlock::default();
        assert_eq!(head.render(&headers), "x-ok: 1");
    }

    #[test]
    fn test_header_block_reuses_buffer_for_unique_values() {
        let mut head = HeaderBlock::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("seed"));
        head.render(&headers);
        let capacity = head.buf.capacity();

        for i in 0..1000 {
            let mut headers = HeaderMap::new();
            headers.insert(
                "x-request-id",
                HeaderValue::from_str(&format!("{i:04}")).unwrap(),
            );
            assert_eq!(head.render(&headers), format!("x-request-id: {i:04}"));
        }
        assert_eq!(head.buf.capacity(), capacity);
    }

    #[test]
    fn test_clone_starts_with_empty_header_block() {
        let mut service = JsonService::builder()
            .route("/a", JsonHandler::new(Callable::body(|| Some(1))).unwrap())
            .build();
        let mut headers = HeaderMap::new();
        headers.insert("x-a", HeaderValue::from_static("1"));
        service.head.render(&headers);

        let clone = service.clone();
        assert!(clone.head.buf.is_empty());
        assert_eq!(clone.len(), 1);
    }

    #[test]
    fn test_handle_routes_by_path() {
        let service = JsonService::builder()
            .route("/a", JsonHandler::new(Callable::body(|| Some("a"))).unwrap())
            .route("/b", JsonHandler::new(Callable::body(|| Some(2))).unwrap())
            .build();
        assert_eq!(service.len(), 2);

        let rec = service.handle(&request("GET", "/a?x=1")).unwrap();
        assert_eq!(rec.body_str(), r#""a""#);
        let rec = service.handle(&request("GET", "/b")).unwrap();
        assert_eq!(rec.body_str(), "2");
    }

    #[test]
    fn test_handle_unknown_path() {
        let service = JsonService::builder().build();
        assert!(service.is_empty());
        let rec = service.handle(&request("POST", "/missing")).unwrap();
        assert_eq!(rec.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(rec.body()).unwrap();
        assert_eq!(
            body,
            json!({"error": "Not Found", "method": "POST", "path": "/missing"})
        );
    }

    #[test]
    fn test_route_replacement_keeps_last() {
        let service = JsonService::builder()
            .route("/a", JsonHandler::new(Callable::body(|| Some(1))).unwrap())
            .route("/a", JsonHandler::new(Callable::body(|| Some(2))).unwrap())
            .build();
        assert_eq!(service.len(), 1);
        let rec = service.handle(&request("GET", "/a")).unwrap();
        assert_eq!(rec.body_str(), "2");
    }
}
