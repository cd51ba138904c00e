//! # Error Converter
//!
//! Turns a handler error into the JSON payload sent to the client.
//!
//! The default payload is:
//!
//! ```json
//! {"code": <response code>, "error": "<error message>"}
//! ```
//!
//! A process-wide converter is kept behind an [`ArcSwap`]: every error response loads
//! it atomically, and [`use_error_converter`] / [`use_default_error_converter`] swap it
//! with last-writer-wins semantics. A handler can also be given its own converter with
//! [`JsonHandler::with_error_converter`](crate::JsonHandler::with_error_converter),
//! which takes precedence over the global one.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use http::StatusCode;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::Request;

type ConvertFn = dyn Fn(StatusCode, &Request, &anyhow::Error) -> Value + Send + Sync;

/// Builds the response payload for a handler error.
pub struct ErrorConverter {
    convert: Box<ConvertFn>,
}

impl ErrorConverter {
    /// Wrap a conversion function.
    pub fn new<F>(convert: F) -> Self
    where
        F: Fn(StatusCode, &Request, &anyhow::Error) -> Value + Send + Sync + 'static,
    {
        Self {
            convert: Box::new(convert),
        }
    }

    /// Produce the payload for `err`, answered with `status`.
    #[must_use]
    pub fn convert(&self, status: StatusCode, req: &Request, err: &anyhow::Error) -> Value {
        (self.convert)(status, req, err)
    }
}

impl Default for ErrorConverter {
    fn default() -> Self {
        Self::new(default_payload)
    }
}

impl fmt::Debug for ErrorConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorConverter").finish_non_exhaustive()
    }
}

fn default_payload(status: StatusCode, _req: &Request, err: &anyhow::Error) -> Value {
    json!({
        "code": status.as_u16(),
        "error": err.to_string(),
    })
}

static ERROR_CONVERTER: Lazy<ArcSwap<ErrorConverter>> =
    Lazy::new(|| ArcSwap::from_pointee(ErrorConverter::default()));

/// Replace the process-wide converter for every subsequent error response.
pub fn use_error_converter(converter: ErrorConverter) {
    ERROR_CONVERTER.store(Arc::new(converter));
}

/// Restore the default `{"code", "error"}` converter.
pub fn use_default_error_converter() {
    ERROR_CONVERTER.store(Arc::new(ErrorConverter::default()));
}

/// The converter currently installed process-wide.
#[must_use]
pub fn current_error_converter() -> Arc<ErrorConverter> {
    ERROR_CONVERTER.load_full()
}

/// Convert with the process-wide converter without cloning the `Arc`.
pub(crate) fn convert_global(status: StatusCode, req: &Request, err: &anyhow::Error) -> Value {
    ERROR_CONVERTER.load().convert(status, req, err)
}
