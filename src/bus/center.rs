use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use dashmap::DashMap;
use once_cell::sync::Lazy;

use super::{intern_topic, Context, Envelope};

type TopicKey = Arc<str>;
type Handler = Arc<dyn Fn(Envelope) + Send + Sync>;

/// Непрозрачный токен одной регистрации наблюдателя.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(pub(crate) u64);

/// Одна регистрация: обработчик и контекст его исполнения.
struct Observer {
    handler: Handler,
    context: Context,
}

/// Центр рассылки уведомлений.
///
/// Поддерживает:
/// - Много наблюдателей на одно имя топика
/// - Доставку каждой публикации всем текущим наблюдателям,
///   каждому на его собственном контексте исполнения
/// - Автоматическое удаление топиков без наблюдателей
/// - Статистику публикаций
pub struct Center {
    /// Имя топика → (токен → наблюдатель).
    topics: DashMap<TopicKey, DashMap<u64, Observer>>,
    /// Источник уникальных токенов.
    next_token: AtomicU64,
    /// Общее количество вызовов `post`.
    pub post_count: AtomicUsize,
    /// Количество публикаций, не нашедших ни одного наблюдателя.
    pub silent_post_count: AtomicUsize,
}

static DEFAULT_CENTER: Lazy<Arc<Center>> = Lazy::new(|| Arc::new(Center::new()));

/// Общий для процесса центр по умолчанию.
///
/// Им пользуются операции `Topic::post` / `Topic::observe`; явный
/// экземпляр `Center` нужен только для изоляции (например, в тестах).
pub fn default_center() -> &'static Arc<Center> {
    &DEFAULT_CENTER
}

impl Center {
    /// Создаёт пустой `Center`.
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
            next_token: AtomicU64::new(1),
            post_count: AtomicUsize::new(0),
            silent_post_count: AtomicUsize::new(0),
        }
    }

    /// Регистрирует наблюдателя на имя топика.
    ///
    /// Обработчик будет вызываться с конвертом каждой публикации этого
    /// топика на указанном контексте, пока регистрация не снята через
    /// [`Center::remove_observer`].
    pub fn observe(
        &self,
        name: &str,
        context: Context,
        handler: impl Fn(Envelope) + Send + Sync + 'static,
    ) -> ObserverToken {
        let key = intern_topic(name);
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.topics.entry(key.clone()).or_default().insert(
            token,
            Observer {
                handler: Arc::new(handler),
                context,
            },
        );
        tracing::debug!(topic = %key, token, "observer registered");
        ObserverToken(token)
    }

    /// Публикует конверт всем текущим наблюдателям топика.
    ///
    /// Fire-and-forget: наличие наблюдателей не гарантируется, возврата
    /// нет. Если наблюдателей не осталось, запись топика удаляется и
    /// инкрементируется `silent_post_count`.
    pub fn post(&self, name: &str, envelope: Envelope) {
        self.post_count.fetch_add(1, Ordering::Relaxed);

        // Снимаем снапшот наблюдателей, не держа шард во время вызова
        // обработчиков: обработчик может повторно входить в центр.
        let observers: Vec<(Handler, Context)> = match self.topics.get(name) {
            Some(entry) => entry
                .value()
                .iter()
                .map(|o| (o.handler.clone(), o.context.clone()))
                .collect(),
            None => Vec::new(),
        };

        if observers.is_empty() {
            self.silent_post_count.fetch_add(1, Ordering::Relaxed);
            self.topics.remove_if(name, |_, map| map.is_empty());
            tracing::debug!(topic = name, "post with no observers");
            return;
        }

        tracing::trace!(topic = name, observers = observers.len(), "post");
        for (handler, context) in observers {
            context.deliver(handler, envelope.clone());
        }
    }

    /// Снимает регистрацию наблюдателя. Идемпотентно: повторный вызов
    /// для того же токена ничего не находит.
    pub fn remove_observer(&self, token: ObserverToken, name: &str) {
        let mut now_empty = false;
        if let Some(entry) = self.topics.get(name) {
            if entry.value().remove(&token.0).is_some() {
                tracing::debug!(topic = name, token = token.0, "observer removed");
            }
            now_empty = entry.value().is_empty();
        }
        if now_empty {
            self.topics.remove_if(name, |_, map| map.is_empty());
        }
    }

    /// Возвращает число текущих наблюдателей топика.
    pub fn observer_count(&self, name: &str) -> usize {
        self.topics.get(name).map(|e| e.value().len()).unwrap_or(0)
    }
}

impl Default for Center {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;

    /// Проверяет, что публикация доходит до наблюдателя и что счётчики
    /// обновляются правильно.
    #[test]
    fn post_reaches_observer() {
        let center = Center::new();
        let got = Arc::new(AtomicU32::new(0));
        let seen = got.clone();
        let _token = center.observe("chan", Context::Inline, move |env| {
            if let Some(v) = env.value::<u32>("data") {
                seen.store(*v, Ordering::SeqCst);
            }
        });

        center.post("chan", Envelope::keyed("data", 5u32));

        assert_eq!(got.load(Ordering::SeqCst), 5);
        assert_eq!(center.post_count.load(Ordering::Relaxed), 1);
        assert_eq!(center.silent_post_count.load(Ordering::Relaxed), 0);
    }

    /// Проверяет, что публикация без наблюдателей не создаёт топик
    /// и инкрементирует `silent_post_count`.
    #[test]
    fn post_without_observers_is_silent() {
        let center = Center::new();
        center.post("nochan", Envelope::empty());
        assert_eq!(center.post_count.load(Ordering::Relaxed), 1);
        assert_eq!(center.silent_post_count.load(Ordering::Relaxed), 1);
        assert_eq!(center.observer_count("nochan"), 0);
    }

    /// Проверяет, что все наблюдатели топика получают публикацию.
    #[test]
    fn all_observers_receive() {
        let center = Center::new();
        let calls = Arc::new(AtomicU32::new(0));
        let tokens: Vec<_> = (0..3)
            .map(|_| {
                let seen = calls.clone();
                center.observe("multi", Context::Inline, move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        center.post("multi", Envelope::empty());

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(center.observer_count("multi"), 3);
        for token in tokens {
            center.remove_observer(token, "multi");
        }
        assert_eq!(center.observer_count("multi"), 0);
    }

    /// Проверяет, что после снятия регистрации наблюдатель больше не
    /// вызывается, а запись пустого топика удаляется при публикации.
    #[test]
    fn removed_observer_stays_silent() {
        let center = Center::new();
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let token = center.observe("temp", Context::Inline, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        center.remove_observer(token, "temp");

        center.post("temp", Envelope::empty());

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(center.silent_post_count.load(Ordering::Relaxed), 1);
    }

    /// Проверяет, что повторное снятие той же регистрации — no-op.
    #[test]
    fn remove_observer_is_idempotent() {
        let center = Center::new();
        let token = center.observe("dup", Context::Inline, |_| {});
        center.remove_observer(token, "dup");
        center.remove_observer(token, "dup");
        assert_eq!(center.observer_count("dup"), 0);
    }

    /// Проверяет, что наблюдатели разных топиков не пересекаются.
    #[test]
    fn topics_are_isolated() {
        let center = Center::new();
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let _a = center.observe("topic.a", Context::Inline, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        center.post("topic.b", Envelope::empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    /// Проверяет, что обработчик может повторно входить в центр
    /// (публиковать из обработчика) без взаимоблокировки.
    #[test]
    fn handler_may_reenter_center() {
        let center = Arc::new(Center::new());
        let got = Arc::new(AtomicU32::new(0));

        let seen = got.clone();
        let _second = center.observe("second", Context::Inline, move |env| {
            if let Some(v) = env.value::<u32>("data") {
                seen.store(*v, Ordering::SeqCst);
            }
        });

        let inner = center.clone();
        let _first = center.observe("first", Context::Inline, move |_| {
            inner.post("second", Envelope::keyed("data", 9u32));
        });

        center.post("first", Envelope::empty());
        assert_eq!(got.load(Ordering::SeqCst), 9);
    }

    /// Проверяет отложенную доставку на контексте Tokio-runtime.
    #[tokio::test]
    async fn runtime_context_delivery() {
        let center = Center::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let ctx = Context::current_runtime().unwrap();
        let _token = center.observe("deferred", ctx, move |env| {
            let _ = tx.send(env.value::<String>("data").cloned());
        });

        center.post("deferred", Envelope::keyed("data", String::from("hi")));

        let got = tokio::time::timeout(std::time::Duration::from_millis(100), rx.recv())
            .await
            .expect("timed out")
            .expect("no delivery");
        assert_eq!(got.as_deref(), Some("hi"));
    }
}
