use thiserror::Error;

/// Ошибка определения контекста исполнения.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("no tokio runtime on the current thread")]
    NoRuntime,
}
