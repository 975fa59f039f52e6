use std::future::Future;

use crate::error::Result;

/// State of one asynchronous fetch: in flight, settled with a value, or
/// settled with an error message. A refetch replaces the whole state; a
/// settled value is never patched in place.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, FetchState::Ready(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Awaits a fetch and folds its result into a settled state. Failures keep
/// only the message; the caller decides how to render it.
pub(crate) async fn settle<T, F>(operation: &str, fut: F) -> FetchState<T>
where
    F: Future<Output = Result<T>>,
{
    match fut.await {
        Ok(value) => FetchState::Ready(value),
        Err(err) => {
            tracing::warn!("{} failed: {}", operation, err);
            FetchState::Failed(err.to_string())
        }
    }
}
