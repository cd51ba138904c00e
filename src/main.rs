use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Context};
use autojson::cli::Cli;
use autojson::otel::{init_logging_with_config, LogConfig};
use autojson::runtime_config::RuntimeConfig;
use autojson::server::{HttpServer, JsonService};
use autojson::{Callable, HeaderProvider, JsonHandler, Request};
use clap::Parser;
use http::header::HeaderValue;
use http::StatusCode;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct ExampleResponse {
    foo: String,
    bar: u64,
    headers: HashMap<String, Vec<String>>,
}

static HITS: AtomicU64 = AtomicU64::new(0);

fn example_struct(w: &mut dyn HeaderProvider, r: &Request) -> Option<ExampleResponse> {
    w.headers_mut().append(
        "x-my-custom-header",
        HeaderValue::from_static("autojson/sample"),
    );

    let mut headers: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in r.headers() {
        headers
            .entry(name.to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    Some(ExampleResponse {
        foo: "Hello, world!".to_string(),
        bar: HITS.fetch_add(1, Ordering::Relaxed),
        headers,
    })
}

fn example_custom_response(
    w: &mut dyn HeaderProvider,
    r: &Request,
) -> (StatusCode, Option<ExampleResponse>) {
    (StatusCode::IM_A_TEAPOT, example_struct(w, r))
}

fn build_service() -> anyhow::Result<JsonService> {
    Ok(JsonService::builder()
        .route("/struct", JsonHandler::new(Callable::context_body(example_struct))?)
        .route(
            "/structcode",
            JsonHandler::new(Callable::context_status_body(example_custom_response))?,
        )
        .route(
            "/error",
            JsonHandler::new(Callable::<ExampleResponse>::body_or_error(|| {
                Err(anyhow!("something went wrong"))
            }))?,
        )
        .route(
            "/errorcode",
            JsonHandler::new(Callable::<ExampleResponse>::status_body_or_error(|| {
                (
                    StatusCode::BAD_REQUEST,
                    Err(anyhow!("something went wrong (with a custom response code)")),
                )
            }))?,
        )
        .build())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if let Some(level) = cli.log_level {
        log_config.log_level = level;
    }
    let _log_guard = init_logging_with_config(&log_config)?;

    RuntimeConfig::from_env().apply();

    let service = build_service()?;
    info!(routes = service.len(), addr = %cli.addr, "Starting up");

    let handle = HttpServer(service)
        .start(cli.addr.as_str())
        .with_context(|| format!("Failed to start server on {}", cli.addr))?;
    handle.wait_ready().context("Server did not become ready")?;

    wait_for_shutdown(handle)
}

#[cfg(unix)]
fn wait_for_shutdown(handle: autojson::server::ServerHandle) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Shutting down");
    }
    handle.stop();
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown(handle: autojson::server::ServerHandle) -> anyhow::Result<()> {
    handle
        .join()
        .map_err(|_| anyhow!("Server coroutine panicked"))
}
