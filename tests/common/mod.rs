#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, Bytes},
    extract::connect_info::MockConnectInfo,
    http::{Request, Response},
    middleware,
    routing::get,
};
use futures_util::StreamExt;
use ltsv_access_log::logger::LoggerFactory;
use ltsv_access_log::middleware::access_log::{self, AccessLog};
use ltsv_access_log::sink::MemorySink;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

pub const PEER: &str = "10.0.0.5:1234";

async fn kib() -> String {
    "x".repeat(1024)
}

async fn empty() {}

async fn boom() -> &'static str {
    panic!("boom")
}

async fn multiline_panic() -> &'static str {
    panic!("first line\nsecond\tline")
}

async fn stream() -> Body {
    let chunks = futures_util::stream::iter(vec![
        Ok::<_, std::io::Error>(Bytes::from_static(b"hello ")),
        Ok(Bytes::from_static(b"streamed ")),
        Ok(Bytes::from_static(b"world")),
    ]);
    Body::from_stream(chunks)
}

async fn broken_stream() -> Body {
    let chunks = futures_util::stream::iter(0..3).map(|i| {
        if i == 1 {
            panic!("stream broke");
        }
        Ok::<_, std::io::Error>(Bytes::from_static(b"hello"))
    });
    Body::from_stream(chunks)
}

/// Unwinds without running the panic hook, so no stack is recorded.
async fn resumed_panic() -> &'static str {
    std::panic::resume_unwind(Box::new("resumed"))
}

/// Routes used by the middleware tests, wrapped in the access log.
pub fn logged_router(access_log: AccessLog) -> Router {
    Router::new()
        .route("/foo", get(kib))
        .route("/empty", get(empty))
        .route("/panic", get(boom))
        .route("/panic/multiline", get(multiline_panic))
        .route("/stream", get(stream))
        .route("/panic/stream", get(broken_stream))
        .route("/panic/resumed", get(resumed_panic))
        .layer(middleware::from_fn_with_state(access_log, access_log::layer))
}

/// Logged router with a fixed peer address and an in-memory sink.
pub fn test_app() -> (Router, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let factory = LoggerFactory::new(sink.clone());
    (with_peer(logged_router(AccessLog::new(factory))), sink)
}

pub fn with_peer(router: Router) -> Router {
    let peer: SocketAddr = PEER.parse().unwrap();
    router.layer(MockConnectInfo(peer))
}

/// Sends `req` and reads the whole body, which finalizes the log entry.
pub async fn send(app: &Router, req: Request<Body>) -> (Response<Body>, Bytes) {
    let response = app.clone().oneshot(req).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    (Response::from_parts(parts, Body::empty()), bytes)
}

pub fn get_request(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

/// Splits an LTSV line into `(label, value)` pairs.
pub fn fields(line: &str) -> Vec<(&str, &str)> {
    line.split('\t')
        .map(|f| f.split_once(':').expect("label:value"))
        .collect()
}

pub fn field<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    fields(line)
        .into_iter()
        .find(|(l, _)| *l == label)
        .map(|(_, v)| v)
}
