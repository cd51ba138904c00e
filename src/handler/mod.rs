//! # Handler Module
//!
//! Wraps plain functions into JSON responders.
//!
//! ## Overview
//!
//! A [`JsonHandler`] owns a [`Callable`] (the function, stored under its concrete
//! signature) and the [`Shape`](crate::Shape) it was classified as. Each request goes
//! through the same steps:
//!
//! 1. call the function, with `(headers, request)` if it takes context
//! 2. take the status from the first output, or `200 OK`
//! 3. set `Content-Type: application/json`
//! 4. pick the body:
//!    - an `Err` becomes the error converter's payload, with status `500` unless the
//!      function returned its own status
//!    - an `Ok(value)` is encoded as-is, `Ok(None)` included (`null`)
//!    - for functions without an error output, `Some(value)` is encoded and `None`
//!      sends no body at all
//! 5. write the status, then encode the body
//!
//! ## Example
//!
//! ```rust
//! use anyhow::anyhow;
//! use autojson::{Callable, JsonHandler, ResponseRecorder};
//! use http::StatusCode;
//!
//! let handler = JsonHandler::new(Callable::<String>::context_status_body_or_error(|_, _| {
//!     (StatusCode::BAD_REQUEST, Err(anyhow!("baz")))
//! }))
//! .unwrap();
//!
//! let req = http::Request::builder().uri("/").body(Vec::new()).unwrap();
//! let mut rec = ResponseRecorder::new();
//! handler.serve(&mut rec, &req).unwrap();
//!
//! assert_eq!(rec.status(), StatusCode::BAD_REQUEST);
//! assert_eq!(rec.body_str(), r#"{"code":400,"error":"baz"}"#);
//! ```
//!
//! ## Failure Tiers
//!
//! - Wrong shape: [`JsonHandler::new`] returns a
//!   [`ClassificationError`](crate::ClassificationError) before any request is served.
//! - Handler error: converted into a normal JSON response.
//! - Encoding or write failure: [`JsonHandler::serve`] returns a
//!   [`ResponseError`](crate::ResponseError); the request must be aborted.

mod callable;
mod core;

pub use self::core::{Invocation, JsonHandler, Outcome};
pub use callable::{Callable, HandlerResult, IntoCallable};
