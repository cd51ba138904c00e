//! # autojson
//!
//! **autojson** turns plain functions into JSON HTTP handlers.
//!
//! ## Overview
//!
//! A handler is written as an ordinary closure in one of eight accepted shapes: it
//! optionally takes the response headers and the request, and returns a body, optionally
//! paired with a status code, optionally fallible. [`JsonHandler`] checks the shape once
//! when it is built and then, for every request, picks the status code, encodes the body
//! with `serde_json` and formats errors through a pluggable [`ErrorConverter`].
//!
//! ## Architecture
//!
//! - **[`signature`]** - Reflection metadata for callables and the shape classifier
//! - **[`handler`]** - Typed callables and the dispatch adapter
//! - **[`error_converter`]** - Global and per-handler error payload formatting
//! - **[`response`]** - The `ResponseWriter` seam and an in-memory recorder
//! - **[`header`]** - Header access for handlers that take context
//! - **[`server`]** - HTTP binding on `may_minihttp`
//! - **[`otel`]**, **[`runtime_config`]**, **[`cli`]** - Logging, environment
//!   configuration and the sample server's command line
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as server::JsonService
//!     participant Handler as JsonHandler
//!     participant Fn as Callable
//!     participant Conv as ErrorConverter
//!
//!     Client->>Service: GET /path
//!     Service->>Handler: serve(recorder, request)
//!     Handler->>Fn: invoke (headers, request)?
//!     Fn-->>Handler: status?, body | error
//!     alt error
//!         Handler->>Conv: convert(status, request, error)
//!         Conv-->>Handler: JSON payload
//!     end
//!     Handler-->>Service: status + JSON body
//!     Service-->>Client: HTTP response
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use autojson::{Callable, JsonHandler, ResponseRecorder};
//! use http::StatusCode;
//!
//! let handler = JsonHandler::new(Callable::status_body(|| {
//!     (StatusCode::CREATED, Some(vec![1, 2, 3]))
//! }))
//! .unwrap();
//!
//! let req = http::Request::builder().uri("/items").body(Vec::new()).unwrap();
//! let mut rec = ResponseRecorder::new();
//! handler.serve(&mut rec, &req).unwrap();
//!
//! assert_eq!(rec.status(), StatusCode::CREATED);
//! assert_eq!(rec.body_str(), "[1,2,3]");
//! ```
//!
//! Serving over HTTP:
//!
//! ```rust,no_run
//! use autojson::server::{HttpServer, JsonService};
//! use autojson::{Callable, JsonHandler};
//!
//! # fn main() -> anyhow::Result<()> {
//! let service = JsonService::builder()
//!     .route("/hello", JsonHandler::new(Callable::body(|| Some("hello")))?)
//!     .build();
//! let handle = HttpServer(service).start("127.0.0.1:8080")?;
//! handle.wait_ready()?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error_converter;
pub mod handler;
pub mod header;
pub mod otel;
pub mod response;
pub mod runtime_config;
pub mod server;
pub mod signature;

/// The request type handlers receive: an `http` request with a buffered body.
pub type Request = http::Request<Vec<u8>>;

pub use error_converter::{
    current_error_converter, use_default_error_converter, use_error_converter, ErrorConverter,
};
pub use handler::{Callable, HandlerResult, IntoCallable, Invocation, JsonHandler, Outcome};
pub use header::{HeaderProvider, CONTENT_TYPE_JSON, HEADER_CONTENT_TYPE};
pub use response::{ResponseError, ResponseRecorder, ResponseWriter};
pub use signature::{
    classify, Candidate, ClassificationError, Kind, Shape, Signature, TypeRef,
};
