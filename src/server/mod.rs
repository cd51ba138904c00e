//! HTTP transport for wrapped handlers, built on `may_minihttp`.

pub mod http_server;
pub mod request;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::parse_request;
pub use service::{Endpoint, JsonService, JsonServiceBuilder};
