use std::borrow::Cow;
use std::io;

use http::{HeaderMap, StatusCode};
use thiserror::Error;

use crate::header::HeaderProvider;

/// Destination of a wrapped handler's response.
///
/// Mirrors the shape of an HTTP response writer: headers first, then the status line,
/// then the body bytes.
pub trait ResponseWriter: HeaderProvider + io::Write {
    /// Send the status. Headers changed after this call are not guaranteed to be sent.
    fn write_status(&mut self, status: StatusCode);
}

/// Fatal failure while writing a response.
///
/// Once this is returned the output stream is in an unknown state; the request must
/// be aborted rather than answered a second time.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to encode JSON response: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write response: {0}")]
    Io(#[from] io::Error),
}

/// In-memory [`ResponseWriter`].
///
/// The first status written wins; writing body bytes without a status implies
/// `200 OK`.
#[derive(Debug, Default, Clone)]
pub struct ResponseRecorder {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded status, `200 OK` if none was written.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, lossily.
    #[must_use]
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Vec<u8>) {
        (self.status(), self.headers, self.body)
    }
}

impl HeaderProvider for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

impl ResponseWriter for ResponseRecorder {
    fn write_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }
}

impl io::Write for ResponseRecorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_status(StatusCode::OK);
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_first_status_wins() {
        let mut rec = ResponseRecorder::new();
        rec.write_status(StatusCode::CREATED);
        rec.write_status(StatusCode::BAD_REQUEST);
        assert_eq!(rec.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_body_write_implies_ok() {
        let mut rec = ResponseRecorder::new();
        rec.write_all(b"{}").unwrap();
        rec.write_status(StatusCode::NOT_FOUND);
        assert_eq!(rec.status(), StatusCode::OK);
        assert_eq!(rec.body_str(), "{}");
    }

    #[test]
    fn test_into_parts() {
        let mut rec = ResponseRecorder::new();
        rec.headers_mut()
            .insert("x-test", http::HeaderValue::from_static("1"));
        rec.write_status(StatusCode::IM_A_TEAPOT);
        let (status, headers, body) = rec.into_parts();
        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(headers["x-test"], "1");
        assert!(body.is_empty());
    }
}
