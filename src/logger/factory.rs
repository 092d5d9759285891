use std::sync::Arc;

use chrono::{SecondsFormat, Utc};

use super::entry::LogEntry;
use super::request::RequestInfo;
use crate::sink::LineSink;

/// Produces a [`LogEntry`] for every incoming request.
///
/// Constructed once at startup and shared by cloning; all clones write to
/// the same sink.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use ltsv_access_log::logger::{LoggerFactory, RequestMeta};
/// use ltsv_access_log::sink::MemorySink;
///
/// let sink = Arc::new(MemorySink::new());
/// let factory = LoggerFactory::new(sink.clone());
///
/// let request = RequestMeta {
///     method: "GET".into(),
///     host: "example.com".into(),
///     raw_target: "/".into(),
///     protocol: "HTTP/1.1".into(),
///     remote_addr: "127.0.0.1:4000".into(),
///     ..Default::default()
/// };
/// factory.new_entry(&request).complete(204, 0, Duration::ZERO);
///
/// assert_eq!(
///     sink.lines()[0],
///     "method:GET\turi:http://example.com/\tprotocol:HTTP/1.1\tremote-host:127.0.0.1:4000\tstatus:204\tbytes:0\ttime-taken:0"
/// );
/// ```
#[derive(Clone)]
pub struct LoggerFactory {
    sink: Arc<dyn LineSink>,
    panic_context: bool,
    timestamps: bool,
}

impl LoggerFactory {
    /// Creates a factory writing to `sink`.
    ///
    /// Panic lines carry the request fields and no timestamp is added;
    /// see [`with_panic_context`](Self::with_panic_context) and
    /// [`with_timestamps`](Self::with_timestamps).
    pub fn new(sink: Arc<dyn LineSink>) -> Self {
        Self {
            sink,
            panic_context: true,
            timestamps: false,
        }
    }

    /// Controls whether panic lines start with the request fields.
    ///
    /// Disable to emit the bare `level:ERROR\tmessage:…\tstack:…` form.
    pub fn with_panic_context(mut self, enabled: bool) -> Self {
        self.panic_context = enabled;
        self
    }

    /// Controls whether every line starts with a `time:<rfc3339>` field
    /// recording when the request arrived.
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Starts an entry, capturing the request-time fields.
    ///
    /// # Fields
    ///
    /// Each field is followed by a tab:
    ///
    /// 1. `request-id:<id>` - only when the request carries a non-empty id
    /// 2. `method:<METHOD>`
    /// 3. `uri:<scheme>://<host><target>` - scheme is `https` for secure requests
    /// 4. `protocol:<proto>`
    /// 5. `remote-host:<addr>`
    pub fn new_entry<R>(&self, request: &R) -> LogEntry
    where
        R: RequestInfo + ?Sized,
    {
        let timestamp = self
            .timestamps
            .then(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

        let mut fields = String::with_capacity(128);

        if let Some(id) = request.request_id().filter(|id| !id.is_empty()) {
            push_field(&mut fields, "request-id", id);
        }

        push_field(&mut fields, "method", request.method());

        let scheme = if request.is_secure() { "https" } else { "http" };
        let uri = format!("{}://{}{}", scheme, request.host(), request.raw_target());
        push_field(&mut fields, "uri", &uri);

        push_field(&mut fields, "protocol", request.protocol());
        push_field(&mut fields, "remote-host", request.remote_addr());

        LogEntry::new(self.sink.clone(), timestamp, fields, self.panic_context)
    }
}

/// Appends `key:value` and a trailing tab.
pub(crate) fn push_field(buf: &mut String, key: &str, value: &str) {
    buf.push_str(key);
    buf.push(':');
    buf.push_str(value);
    buf.push('\t');
}
