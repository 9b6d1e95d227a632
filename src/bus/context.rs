use std::sync::Arc;

use tokio::runtime::Handle;

use super::Envelope;
use crate::ContextError;

/// Контекст исполнения, на котором вызывается обработчик наблюдателя.
///
/// `Inline` — вызов синхронно на потоке, из которого выполняется `post`
/// (контекст вызывающего, значение по умолчанию).
///
/// `Runtime` — вызов откладывается задачей на указанный Tokio-runtime;
/// `post` возвращается сразу после постановки задачи.
#[derive(Clone, Debug, Default)]
pub enum Context {
    /// Синхронная доставка на потоке публикации.
    #[default]
    Inline,
    /// Отложенная доставка задачей на runtime.
    Runtime(Handle),
}

impl Context {
    /// Контекст текущего Tokio-runtime.
    ///
    /// # Возвращает
    /// - `Ok(Context::Runtime)` внутри работающего runtime
    /// - `Err(ContextError::NoRuntime)` вне runtime
    pub fn current_runtime() -> Result<Self, ContextError> {
        Handle::try_current()
            .map(Context::Runtime)
            .map_err(|_| ContextError::NoRuntime)
    }

    /// Планирует вызов обработчика с конвертом согласно контексту.
    pub(crate) fn deliver(&self, handler: Arc<dyn Fn(Envelope) + Send + Sync>, envelope: Envelope) {
        match self {
            Context::Inline => handler(envelope),
            Context::Runtime(handle) => {
                drop(handle.spawn(async move { handler(envelope) }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Проверяет, что контекст по умолчанию — `Inline`.
    #[test]
    fn default_is_inline() {
        assert!(matches!(Context::default(), Context::Inline));
    }

    /// Проверяет, что вне Tokio-runtime возвращается ошибка.
    #[test]
    fn current_runtime_outside_runtime_fails() {
        assert_eq!(Context::current_runtime().unwrap_err(), ContextError::NoRuntime);
    }

    /// Проверяет, что внутри runtime контекст определяется успешно.
    #[tokio::test]
    async fn current_runtime_inside_runtime_succeeds() {
        assert!(matches!(
            Context::current_runtime(),
            Ok(Context::Runtime(_))
        ));
    }

    /// Проверяет, что `Inline` вызывает обработчик синхронно,
    /// до возврата из `deliver`.
    #[test]
    fn inline_delivery_is_synchronous() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let handler: Arc<dyn Fn(Envelope) + Send + Sync> = Arc::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        Context::Inline.deliver(handler, Envelope::empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Проверяет, что `Runtime` доставляет конверт задачей на runtime.
    #[tokio::test]
    async fn runtime_delivery_reaches_handler() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let handler: Arc<dyn Fn(Envelope) + Send + Sync> = Arc::new(move |env: Envelope| {
            let _ = tx.send(env.value::<u32>("data").copied());
        });
        let ctx = Context::current_runtime().unwrap();
        ctx.deliver(handler, Envelope::keyed("data", 7u32));
        let got = tokio::time::timeout(std::time::Duration::from_millis(100), rx.recv())
            .await
            .expect("timed out")
            .expect("no delivery");
        assert_eq!(got, Some(7));
    }
}
