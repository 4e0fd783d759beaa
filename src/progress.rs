use std::time::Duration;

/// A single progress notification from a long-running pass.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

impl ProgressEvent {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            elapsed: None,
        }
    }

    pub fn with_elapsed(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            message: message.into(),
            elapsed: Some(elapsed),
        }
    }
}

/// Receiver for scan and crawl progress. Long passes emit per-item events;
/// implementations decide whether to surface or swallow them.
pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Forwards progress to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => tracing::info!("{} ({:.1?})", event.message, elapsed),
            None => tracing::info!("{}", event.message),
        }
    }
}
