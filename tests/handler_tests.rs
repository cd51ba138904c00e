use std::io;

use anyhow::anyhow;
use autojson::{
    Callable, ClassificationError, HeaderProvider, JsonHandler, Kind, ResponseError,
    ResponseRecorder, ResponseWriter, Shape,
};
use http::header::HeaderValue;
use http::{HeaderMap, StatusCode};
use serde::Serialize;

mod common;
use common::requests::get;

fn foo() -> Option<String> {
    Some("foo".to_string())
}

fn uri(req: &autojson::Request) -> Option<String> {
    Some(req.uri().path().to_string())
}

#[test]
fn test_handler_table() {
    let tests: Vec<(&str, Callable<String>, StatusCode, &str)> = vec![
        ("struct", Callable::body(foo), StatusCode::OK, r#""foo""#),
        (
            "struct_with_status",
            Callable::status_body(|| (StatusCode::IM_A_TEAPOT, foo())),
            StatusCode::IM_A_TEAPOT,
            r#""foo""#,
        ),
        (
            "struct_with_error",
            Callable::body_or_error(|| Ok(foo())),
            StatusCode::OK,
            r#""foo""#,
        ),
        (
            "struct_with_status_and_error",
            Callable::status_body_or_error(|| (StatusCode::CREATED, Ok(foo()))),
            StatusCode::CREATED,
            r#""foo""#,
        ),
        (
            "error",
            Callable::body_or_error(|| Err(anyhow!("bar"))),
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"code":500,"error":"bar"}"#,
        ),
        (
            "error_with_status",
            Callable::status_body_or_error(|| (StatusCode::BAD_REQUEST, Err(anyhow!("baz")))),
            StatusCode::BAD_REQUEST,
            r#"{"code":400,"error":"baz"}"#,
        ),
        (
            "in_struct",
            Callable::context_body(|_, r| uri(r)),
            StatusCode::OK,
            r#""/""#,
        ),
        (
            "in_struct_with_status",
            Callable::context_status_body(|_, r| (StatusCode::IM_A_TEAPOT, uri(r))),
            StatusCode::IM_A_TEAPOT,
            r#""/""#,
        ),
        (
            "in_struct_with_error",
            Callable::context_body_or_error(|_, r| Ok(uri(r))),
            StatusCode::OK,
            r#""/""#,
        ),
        (
            "in_struct_with_status_and_error",
            Callable::context_status_body_or_error(|_, r| (StatusCode::CREATED, Ok(uri(r)))),
            StatusCode::CREATED,
            r#""/""#,
        ),
        (
            "in_error",
            Callable::context_body_or_error(|_, r| Err(anyhow!("{}bar", r.uri().path()))),
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"code":500,"error":"/bar"}"#,
        ),
        (
            "in_error_with_status",
            Callable::context_status_body_or_error(|_, r| {
                (
                    StatusCode::BAD_REQUEST,
                    Err(anyhow!("{}baz", r.uri().path())),
                )
            }),
            StatusCode::BAD_REQUEST,
            r#"{"code":400,"error":"/baz"}"#,
        ),
    ];

    for (name, callable, status, body) in tests {
        let handler = JsonHandler::new(callable).unwrap();
        let mut rec = ResponseRecorder::new();
        handler.serve(&mut rec, &get("/")).unwrap();

        assert_eq!(rec.status(), status, "{name}: status");
        assert_eq!(rec.body_str(), body, "{name}: body");
        assert_eq!(
            rec.headers()[http::header::CONTENT_TYPE],
            "application/json",
            "{name}: content type"
        );
    }
}

#[test]
fn test_wrapped_shapes() {
    let shape = |c: Callable<String>| JsonHandler::new(c).unwrap().shape();
    assert_eq!(shape(Callable::body(foo)), Shape::Body);
    assert_eq!(
        shape(Callable::context_status_body_or_error(|_, _| {
            (StatusCode::OK, Ok(None))
        })),
        Shape::ContextStatusBodyOrError
    );
}

#[test]
fn test_rejects_non_function() {
    let err = JsonHandler::<String>::new("foo").unwrap_err();
    assert_eq!(err, ClassificationError::NotAFunction { kind: Kind::Str });
    assert_eq!(err.to_string(), "handler kind str is not a func");

    let err = JsonHandler::<String>::new("foo".to_string()).unwrap_err();
    assert_eq!(err.to_string(), "handler kind string is not a func");

    let err = JsonHandler::<String>::new(vec![1, 2, 3]).unwrap_err();
    assert_eq!(err.to_string(), "handler kind slice is not a func");
}

#[test]
fn test_struct_body() {
    #[derive(Serialize)]
    struct Pet {
        name: &'static str,
        age: u8,
    }

    let handler = JsonHandler::new(Callable::body(|| {
        Some(Pet {
            name: "Rex",
            age: 3,
        })
    }))
    .unwrap();
    let mut rec = ResponseRecorder::new();
    handler.serve(&mut rec, &get("/pets/1")).unwrap();

    let body: serde_json::Value = serde_json::from_slice(rec.body()).unwrap();
    assert_eq!(body, serde_json::json!({"name": "Rex", "age": 3}));
}

#[test]
fn test_handler_sets_response_headers() {
    let handler = JsonHandler::new(Callable::context_body(|w, _| {
        w.headers_mut()
            .insert("x-my-custom-header", HeaderValue::from_static("autojson"));
        Some(true)
    }))
    .unwrap();
    let mut rec = ResponseRecorder::new();
    handler.serve(&mut rec, &get("/")).unwrap();

    assert_eq!(rec.headers()["x-my-custom-header"], "autojson");
    assert_eq!(rec.body_str(), "true");
}

#[test]
fn test_handler_sees_request_headers() {
    let handler = JsonHandler::new(Callable::context_body(|_, r| {
        r.headers()
            .get("x-token")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }))
    .unwrap();
    let req = http::Request::builder()
        .uri("/")
        .header("x-token", "abc")
        .body(Vec::new())
        .unwrap();
    let mut rec = ResponseRecorder::new();
    handler.serve(&mut rec, &req).unwrap();
    assert_eq!(rec.body_str(), r#""abc""#);
}

/// Accepts headers and status, fails every body write.
#[derive(Default)]
struct DeadWriter {
    headers: HeaderMap,
}

impl HeaderProvider for DeadWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

impl ResponseWriter for DeadWriter {
    fn write_status(&mut self, _status: StatusCode) {}
}

impl io::Write for DeadWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("dummy error"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_serve_fails_if_write_fails() {
    let handler = JsonHandler::new(Callable::body(|| Some(String::new()))).unwrap();
    let err = handler
        .serve(&mut DeadWriter::default(), &get("/"))
        .unwrap_err();
    assert!(matches!(err, ResponseError::Encode(_) | ResponseError::Io(_)));
    assert!(err.to_string().contains("dummy error"));
}

#[test]
fn test_serve_fails_if_encoding_fails() {
    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    let handler = JsonHandler::new(Callable::body(|| Some(Unencodable))).unwrap();
    let mut rec = ResponseRecorder::new();
    let err = handler.serve(&mut rec, &get("/")).unwrap_err();
    assert!(matches!(err, ResponseError::Encode(_)));
}
