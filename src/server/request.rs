use std::io::{self, Read};

use may_minihttp::Request as RawRequest;
use tracing::debug;

use crate::Request;

/// Convert a `may_minihttp` request into an owned [`Request`].
///
/// Headers that `http` rejects are an `InvalidInput` error; the connection is then
/// dropped by the server.
pub fn parse_request(req: RawRequest) -> io::Result<Request> {
    let mut builder = http::Request::builder()
        .method(req.method())
        .uri(req.path());
    for header in req.headers() {
        builder = builder.header(header.name, header.value);
    }

    let mut body = Vec::new();
    req.body().read_to_end(&mut body)?;

    let request = builder
        .body(body)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    debug!(
        method = %request.method(),
        path = %request.uri().path(),
        header_count = request.headers().len(),
        body_len = request.body().len(),
        "Parsed request"
    );

    Ok(request)
}
