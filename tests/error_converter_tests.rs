//! Swaps the process-wide converter, so it lives alone in its own test binary.

use anyhow::anyhow;
use autojson::{
    current_error_converter, use_default_error_converter, use_error_converter, Callable,
    ErrorConverter, JsonHandler, ResponseRecorder,
};
use http::StatusCode;
use serde_json::json;

mod common;
use common::requests::get;

#[test]
fn test_global_converter_swap_and_reset() {
    let handler =
        JsonHandler::new(Callable::<String>::body_or_error(|| Err(anyhow!("asdf")))).unwrap();
    let serve = || {
        let mut rec = ResponseRecorder::new();
        handler.serve(&mut rec, &get("/")).unwrap();
        rec
    };

    let rec = serve();
    assert_eq!(rec.body_str(), r#"{"code":500,"error":"asdf"}"#);

    use_error_converter(ErrorConverter::new(|_, _, _| json!({"foo": "bar"})));
    let rec = serve();
    assert_eq!(rec.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(rec.body_str(), r#"{"foo":"bar"}"#);
    assert_eq!(
        current_error_converter().convert(StatusCode::OK, &get("/"), &anyhow!("x")),
        json!({"foo": "bar"})
    );

    // the converter sees the final status and the request
    use_error_converter(ErrorConverter::new(|status, req, err| {
        json!({
            "status": status.as_u16(),
            "path": req.uri().path(),
            "message": format!("{err:#}"),
        })
    }));
    let handler = JsonHandler::new(Callable::<String>::context_status_body_or_error(|_, _| {
        (
            StatusCode::CONFLICT,
            Err(anyhow!("inner").context("outer")),
        )
    }))
    .unwrap();
    let mut rec = ResponseRecorder::new();
    handler.serve(&mut rec, &get("/items/7")).unwrap();
    assert_eq!(rec.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = serde_json::from_slice(rec.body()).unwrap();
    assert_eq!(
        body,
        json!({"status": 409, "path": "/items/7", "message": "outer: inner"})
    );

    use_default_error_converter();
    let rec = serve();
    assert_eq!(rec.body_str(), r#"{"code":500,"error":"asdf"}"#);
}
