use crate::sink::ChannelSink;

/// Shared state for the demo handlers.
#[derive(Clone, Default)]
pub struct AppState {
    /// Present when access lines go through the background file writer.
    pub access_log_queue: Option<ChannelSink>,
}

impl AppState {
    pub fn new(access_log_queue: Option<ChannelSink>) -> Self {
        Self { access_log_queue }
    }
}
