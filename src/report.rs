use std::sync::Arc;

/// Sink for internal failures that an operation recovers from or hides from
/// its caller.
pub trait ErrorReporter {
    fn error(&self, context: &str, message: &str);
}

/// Reports through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn error(&self, context: &str, message: &str) {
        tracing::error!(context, "{message}");
    }
}

impl<R: ErrorReporter + ?Sized> ErrorReporter for &R {
    fn error(&self, context: &str, message: &str) {
        (**self).error(context, message);
    }
}

impl<R: ErrorReporter + ?Sized> ErrorReporter for Arc<R> {
    fn error(&self, context: &str, message: &str) {
        (**self).error(context, message);
    }
}
