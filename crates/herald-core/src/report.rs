//! Fire-and-forget error reporting.

/// An observability sink for errors the caller is not interrupted with:
/// swallowed delivery failures and the aggregate error absorbed by
/// [`DispatchEngine::dispatch_lenient`](crate::dispatch::DispatchEngine::dispatch_lenient).
pub trait ErrorReporter: Send + Sync {
  fn capture(&self, error: &(dyn std::error::Error + 'static));
}

/// Reports errors as `tracing` events at `ERROR` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
  fn capture(&self, error: &(dyn std::error::Error + 'static)) {
    match error.source() {
      Some(source) => {
        tracing::error!(error = %error, source = %source, "notification error captured")
      }
      None => tracing::error!(error = %error, "notification error captured"),
    }
  }
}
