mod common;

use axum::{
    Router,
    body::Body,
    http::{HeaderName, StatusCode},
};
use common::{PEER, field, fields, get_request, send, test_app};
use futures_util::FutureExt;
use ltsv_access_log::logger::LoggerFactory;
use ltsv_access_log::middleware::access_log::{AccessLog, Tls};
use ltsv_access_log::sink::MemorySink;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn test_completed_request_line() {
    let (app, sink) = test_app();

    let req = get_request("/foo?x=1")
        .header("host", "example.com")
        .header("x-request-id", "abc123")
        .body(Body::empty())
        .unwrap();
    let (response, body) = send(&app, req).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body.len(), 1024);

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);

    let line = &lines[0];
    let prefix = format!(
        "request-id:abc123\tmethod:GET\turi:http://example.com/foo?x=1\tprotocol:HTTP/1.1\tremote-host:{PEER}\tstatus:200\tbytes:1024\ttime-taken:"
    );
    assert!(line.starts_with(&prefix), "unexpected line: {line:?}");

    let seconds: f64 = field(line, "time-taken").unwrap().parse().unwrap();
    assert!(seconds >= 0.0);
}

#[tokio::test]
async fn test_request_without_id_has_no_request_id_field() {
    let (app, sink) = test_app();

    let req = get_request("/foo")
        .header("host", "example.com")
        .body(Body::empty())
        .unwrap();
    send(&app, req).await;

    let line = &sink.lines()[0];
    assert!(line.starts_with("method:GET\t"));
    assert!(field(line, "request-id").is_none());
}

#[tokio::test]
async fn test_field_order() {
    let (app, sink) = test_app();

    let req = get_request("/empty")
        .header("host", "example.com")
        .header("x-request-id", "r-1")
        .body(Body::empty())
        .unwrap();
    send(&app, req).await;

    let line = &sink.lines()[0];
    let labels: Vec<&str> = fields(line).into_iter().map(|(l, _)| l).collect();
    assert_eq!(
        labels,
        vec![
            "request-id",
            "method",
            "uri",
            "protocol",
            "remote-host",
            "status",
            "bytes",
            "time-taken"
        ]
    );
    assert_eq!(field(line, "bytes"), Some("0"));
}

#[tokio::test]
async fn test_tls_request_logged_as_https() {
    let (app, sink) = test_app();

    let mut req = get_request("/empty")
        .header("host", "secure.example.com")
        .body(Body::empty())
        .unwrap();
    req.extensions_mut().insert(Tls);
    send(&app, req).await;

    assert_eq!(
        field(&sink.lines()[0], "uri"),
        Some("https://secure.example.com/empty")
    );
}

#[tokio::test]
async fn test_unmatched_route_is_logged() {
    let (app, sink) = test_app();

    let req = get_request("/missing")
        .header("host", "example.com")
        .body(Body::empty())
        .unwrap();
    let (response, _) = send(&app, req).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(field(&sink.lines()[0], "status"), Some("404"));
}

#[tokio::test]
async fn test_streamed_body_bytes_are_counted() {
    let (app, sink) = test_app();

    let req = get_request("/stream")
        .header("host", "example.com")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(&app, req).await;

    assert_eq!(&body[..], b"hello streamed world");
    assert_eq!(field(&sink.lines()[0], "bytes"), Some("20"));
}

#[tokio::test]
async fn test_panic_is_logged_and_answered_with_500() {
    let (app, sink) = test_app();

    let req = get_request("/panic")
        .header("host", "example.com")
        .header("x-request-id", "p-1")
        .body(Body::empty())
        .unwrap();
    let (response, _) = send(&app, req).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let lines = sink.lines();
    assert_eq!(lines.len(), 1, "panic must not also emit a completion line");

    let line = &lines[0];
    assert!(line.starts_with(&format!(
        "request-id:p-1\tmethod:GET\turi:http://example.com/panic\tprotocol:HTTP/1.1\tremote-host:{PEER}\t"
    )));
    assert!(line.contains("\tlevel:ERROR\tmessage:boom\tstack:"));
    assert!(field(line, "status").is_none());

    let stack = field(line, "stack").unwrap();
    assert!(stack.starts_with("panicked at "));
    assert!(stack.contains("\\n"));
    assert!(!line.contains('\n'));
}

#[tokio::test]
async fn test_panic_message_is_escaped() {
    let (app, sink) = test_app();

    let req = get_request("/panic/multiline")
        .header("host", "example.com")
        .body(Body::empty())
        .unwrap();
    send(&app, req).await;

    let line = &sink.lines()[0];
    assert_eq!(field(line, "message"), Some("first line\\nsecond\\tline"));
}

#[tokio::test]
async fn test_panic_without_request_context() {
    let sink = Arc::new(MemorySink::new());
    let factory = LoggerFactory::new(sink.clone()).with_panic_context(false);
    let app = common::with_peer(common::logged_router(AccessLog::new(factory)));

    let req = get_request("/panic")
        .header("host", "example.com")
        .body(Body::empty())
        .unwrap();
    send(&app, req).await;

    let line = &sink.lines()[0];
    assert!(line.starts_with("level:ERROR\tmessage:boom\tstack:"));
}

#[tokio::test]
async fn test_custom_request_id_header() {
    let sink = Arc::new(MemorySink::new());
    let access_log = AccessLog::new(LoggerFactory::new(sink.clone()))
        .with_request_id_header(HeaderName::from_static("x-correlation-id"));
    let app = common::with_peer(common::logged_router(access_log));

    let req = get_request("/empty")
        .header("host", "example.com")
        .header("x-correlation-id", "corr-7")
        .body(Body::empty())
        .unwrap();
    send(&app, req).await;

    assert_eq!(field(&sink.lines()[0], "request-id"), Some("corr-7"));
}

#[tokio::test]
async fn test_missing_peer_address_logged_as_dash() {
    let sink = Arc::new(MemorySink::new());
    let app = common::logged_router(AccessLog::new(LoggerFactory::new(sink.clone())));

    let req = get_request("/empty")
        .header("host", "example.com")
        .body(Body::empty())
        .unwrap();
    send(&app, req).await;

    assert_eq!(field(&sink.lines()[0], "remote-host"), Some("-"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_produce_distinct_lines() {
    let (app, sink) = test_app();

    let mut handles = Vec::new();
    for i in 0..100 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let req = get_request(&format!("/foo?n={i}"))
                .header("host", "example.com")
                .header("x-request-id", format!("req-{i}"))
                .body(Body::empty())
                .unwrap();
            send(&app, req).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let lines = sink.lines();
    assert_eq!(lines.len(), 100);

    let mut seen: Vec<u32> = lines
        .iter()
        .map(|line| {
            assert_eq!(fields(line).len(), 8, "malformed line: {line:?}");
            let id: u32 = field(line, "request-id")
                .unwrap()
                .strip_prefix("req-")
                .unwrap()
                .parse()
                .unwrap();
            assert_eq!(
                field(line, "uri").unwrap(),
                format!("http://example.com/foo?n={id}")
            );
            id
        })
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..100).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_panic_while_streaming_body_is_logged_as_error() {
    let (app, sink) = test_app();

    let req = get_request("/panic/stream")
        .header("host", "example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let read = AssertUnwindSafe(axum::body::to_bytes(response.into_body(), usize::MAX))
        .catch_unwind()
        .await;
    assert!(read.is_err());

    let lines = sink.lines();
    assert_eq!(lines.len(), 1, "streaming panic must not also emit a completion line");

    let line = &lines[0];
    assert!(line.starts_with(&format!(
        "method:GET\turi:http://example.com/panic/stream\tprotocol:HTTP/1.1\tremote-host:{PEER}\t"
    )));
    assert_eq!(field(line, "level"), Some("ERROR"));
    assert_eq!(field(line, "message"), Some("stream broke"));
    assert!(field(line, "stack").unwrap().starts_with("panicked at "));
    assert!(field(line, "status").is_none());
}

#[tokio::test]
async fn test_stale_stack_is_not_reported() {
    let (app, sink) = test_app();

    // Recorded by the hook on this thread, then handled elsewhere.
    let _ = std::panic::catch_unwind(|| panic!("unrelated"));

    let req = get_request("/panic/resumed")
        .header("host", "example.com")
        .body(Body::empty())
        .unwrap();
    let (response, _) = send(&app, req).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let line = &sink.lines()[0];
    assert_eq!(field(line, "message"), Some("resumed"));
    assert_eq!(field(line, "stack"), Some(""));
}

#[tokio::test]
async fn test_nested_router_logs_original_uri() {
    let sink = Arc::new(MemorySink::new());
    let inner = common::logged_router(AccessLog::new(LoggerFactory::new(sink.clone())));
    let app = common::with_peer(Router::new().nest("/api", inner));

    let req = get_request("/api/empty?x=1")
        .header("host", "example.com")
        .body(Body::empty())
        .unwrap();
    send(&app, req).await;

    assert_eq!(
        field(&sink.lines()[0], "uri"),
        Some("http://example.com/api/empty?x=1")
    );
}
