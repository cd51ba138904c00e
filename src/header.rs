use http::header::{HeaderName, CONTENT_TYPE};
use http::HeaderMap;

/// Header that carries the response content type.
pub const HEADER_CONTENT_TYPE: HeaderName = CONTENT_TYPE;

/// Content type of every response written by a [`JsonHandler`](crate::JsonHandler).
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Header-only view of a response.
///
/// Handlers that take context receive a `&mut dyn HeaderProvider` so they can add
/// response headers without being able to write the status or the body.
///
/// ```rust
/// use autojson::HeaderProvider;
/// use http::{HeaderMap, HeaderValue};
///
/// fn tag(headers: &mut dyn HeaderProvider) {
///     headers
///         .headers_mut()
///         .insert("x-my-custom-header", HeaderValue::from_static("autojson/sample"));
/// }
///
/// let mut map = HeaderMap::new();
/// tag(&mut map);
/// assert_eq!(map["x-my-custom-header"], "autojson/sample");
/// ```
pub trait HeaderProvider {
    /// Mutable access to the headers that will be sent with the response.
    fn headers_mut(&mut self) -> &mut HeaderMap;
}

impl HeaderProvider for HeaderMap {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self
    }
}
