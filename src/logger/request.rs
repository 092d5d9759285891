//! Request metadata read by the access logger.

/// The request fields a [`LoggerFactory`](super::LoggerFactory) records.
///
/// Any host framework can implement this; values are treated as opaque
/// strings and copied verbatim into the log line.
pub trait RequestInfo {
    /// HTTP method, e.g. `GET`.
    fn method(&self) -> &str;

    /// Whether the request arrived over a secure transport.
    fn is_secure(&self) -> bool;

    /// Host the request was addressed to, including any port.
    fn host(&self) -> &str;

    /// Unmodified request target: path plus query string.
    fn raw_target(&self) -> &str;

    /// Protocol version, e.g. `HTTP/1.1`.
    fn protocol(&self) -> &str;

    /// Address of the connected peer.
    fn remote_addr(&self) -> &str;

    /// Correlation id assigned upstream, if any.
    fn request_id(&self) -> Option<&str>;
}

/// Owned request metadata.
///
/// Built from an Axum request by the access log middleware, or directly by
/// other hosts and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub method: String,
    pub secure: bool,
    pub host: String,
    pub raw_target: String,
    pub protocol: String,
    pub remote_addr: String,
    pub request_id: Option<String>,
}

impl RequestInfo for RequestMeta {
    fn method(&self) -> &str {
        &self.method
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn raw_target(&self) -> &str {
        &self.raw_target
    }

    fn protocol(&self) -> &str {
        &self.protocol
    }

    fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}
