//! LTSV access log middleware.

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts, OriginalUri, Request, State},
    http::{HeaderName, StatusCode, header, uri::Scheme},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use std::{net::SocketAddr, panic::AssertUnwindSafe, time::Instant};
use tower_http::request_id::RequestId;

use super::counting_body::CountingBody;
use super::panic::{install_hook, panic_message, take_stack};
use super::request_id::X_REQUEST_ID;
use crate::logger::{LoggerFactory, RequestMeta};

/// Request extension marking a connection that arrived over TLS.
///
/// TLS acceptors insert it so requests are logged with an `https` URI even
/// when the request target carries no scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tls;

/// Middleware state: the shared factory plus the request id header to read
/// when no [`RequestId`] extension is present.
#[derive(Clone)]
pub struct AccessLog {
    factory: LoggerFactory,
    request_id_header: HeaderName,
}

impl AccessLog {
    /// Wraps `factory` and installs the stack-capturing panic hook.
    pub fn new(factory: LoggerFactory) -> Self {
        install_hook();
        Self {
            factory,
            request_id_header: X_REQUEST_ID.clone(),
        }
    }

    pub fn with_request_id_header(mut self, header: HeaderName) -> Self {
        self.request_id_header = header;
        self
    }
}

/// Writes one LTSV line per request.
///
/// # Logging Behavior
///
/// **On Response:** the line is written once the response body has been
/// fully sent (or dropped), with the status code, the number of body bytes
/// and the time since the request entered this middleware.
///
/// **On Panic:** a panic escaping the inner service is caught, a
/// `level:ERROR` line with the panic message and stack is written instead,
/// and the client receives `500 Internal Server Error`.
///
/// # Example Logs
///
/// ```text
/// request-id:3f1c…	method:GET	uri:http://localhost:3000/health	protocol:HTTP/1.1	remote-host:127.0.0.1:51234	status:200	bytes:38	time-taken:0.000152
/// ```
///
/// # Integration
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/", get(index))
///     .layer(middleware::from_fn_with_state(access_log, access_log::layer))
///     .layer(request_id::set_layer(X_REQUEST_ID.clone()));
/// ```
pub async fn layer(State(log): State<AccessLog>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    // Only a stack recorded while this request runs may be reported.
    let _ = take_stack();

    let (mut parts, body) = req.into_parts();
    let remote_addr = ConnectInfo::<SocketAddr>::from_request_parts(&mut parts, &())
        .await
        .ok()
        .map(|ConnectInfo(addr)| addr.to_string());
    let req = Request::from_parts(parts, body);

    let meta = request_meta(&req, remote_addr, &log.request_id_header);
    let entry = log.factory.new_entry(&meta);

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => {
            let status = response.status().as_u16();
            response.map(|body| Body::new(CountingBody::new(body, entry, status, start)))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            let stack = take_stack().unwrap_or_default();
            entry.panic(message, stack.as_bytes());

            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Extracts the logged request fields.
///
/// # Sources
///
/// - **uri**: [`OriginalUri`] when set by a parent router, else the request URI
/// - **secure**: [`Tls`] extension, or an `https` URI scheme
/// - **host**: URI authority, else the `Host` header, else empty
/// - **remote**: `remote_addr`, else `-`
/// - **request id**: tower-http [`RequestId`] extension, else `request_id_header`
pub fn request_meta(
    req: &Request,
    remote_addr: Option<String>,
    request_id_header: &HeaderName,
) -> RequestMeta {
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri)
        .unwrap_or_else(|| req.uri());

    let secure = req.extensions().get::<Tls>().is_some() || uri.scheme() == Some(&Scheme::HTTPS);

    let host = uri
        .authority()
        .map(|authority| authority.as_str())
        .or_else(|| {
            req.headers()
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
        })
        .unwrap_or_default()
        .to_string();

    let raw_target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .or_else(|| {
            req.headers()
                .get(request_id_header)
                .and_then(|v| v.to_str().ok())
        })
        .map(str::to_string);

    RequestMeta {
        method: req.method().to_string(),
        secure,
        host,
        raw_target,
        protocol: format!("{:?}", req.version()),
        remote_addr: remote_addr.unwrap_or_else(|| "-".to_string()),
        request_id,
    }
}
