use std::{
    any::{Any, TypeId},
    sync::Arc,
};

use super::Subscription;
use crate::bus::{default_center, intern_topic, Center, Context, Envelope};

/// Типизированный дескриптор категории событий.
///
/// Топик — это статическое описание: стабильное имя, тип полезной
/// нагрузки и ключ, под которым нагрузка лежит в конверте. Сам по себе
/// он не существует в рантайме; публикация и подписка — операции над
/// центром рассылки от имени топика.
///
/// Имя обязано быть явной стабильной строкой: автоматический вывод из
/// идентичности типа (`std::any::type_name`) нестабилен между версиями
/// компилятора и потому не используется.
///
/// ```
/// use notibus::Topic;
///
/// struct UserLoggedIn;
///
/// impl Topic for UserLoggedIn {
///     type Payload = u64;
///     const NAME: &'static str = "user.login";
/// }
/// ```
pub trait Topic: 'static {
    /// Тип полезной нагрузки события; `()` для событий без данных.
    type Payload: Clone + Send + Sync + 'static;

    /// Стабильное имя топика.
    const NAME: &'static str;

    /// Ключ полезной нагрузки в конверте. `None` означает публикацию
    /// пустых конвертов независимо от значения.
    const PAYLOAD_KEY: Option<&'static str> = Some("data");

    /// Публикует событие в центр по умолчанию. Fire-and-forget:
    /// наличие подписчиков не гарантируется.
    fn post(value: Self::Payload) {
        Self::post_on(default_center(), value);
    }

    /// Публикует событие в указанный центр.
    fn post_on(center: &Center, value: Self::Payload) {
        center.post(Self::NAME, encode::<Self::Payload>(value, Self::PAYLOAD_KEY));
    }

    /// Публикация без данных. Сахар для `post(())` у топиков-сигналов.
    fn post_empty()
    where
        Self: Topic<Payload = ()>,
    {
        Self::post(());
    }

    /// Подписка в центре по умолчанию с синхронной доставкой.
    fn observe(on_event: impl Fn(Self::Payload) + Send + Sync + 'static) -> Subscription {
        Self::observe_on(default_center(), Context::Inline, on_event)
    }

    /// Подписка в центре по умолчанию на заданном контексте исполнения.
    fn observe_in(
        context: Context,
        on_event: impl Fn(Self::Payload) + Send + Sync + 'static,
    ) -> Subscription {
        Self::observe_on(default_center(), context, on_event)
    }

    /// Подписка в указанном центре на заданном контексте исполнения.
    ///
    /// Адаптер принимает только конверты с нагрузкой под
    /// [`Topic::PAYLOAD_KEY`] нужного типа; всё остальное молча
    /// отбрасывается — коллизия имён топиков не должна ронять живого
    /// подписчика. Для `Payload = ()` обработчик вызывается без
    /// декодирования.
    fn observe_on(
        center: &Arc<Center>,
        context: Context,
        on_event: impl Fn(Self::Payload) + Send + Sync + 'static,
    ) -> Subscription {
        let token = center.observe(Self::NAME, context, move |envelope| {
            if let Some(value) = decode::<Self::Payload>(&envelope, Self::PAYLOAD_KEY) {
                on_event(value);
            }
        });
        Subscription::new(token, Arc::clone(center), intern_topic(Self::NAME))
    }
}

/// Собирает конверт публикации: пустой для событий без данных (или без
/// ключа), иначе — значение под ключом топика.
fn encode<P: Clone + Send + Sync + 'static>(value: P, key: Option<&'static str>) -> Envelope {
    if TypeId::of::<P>() == TypeId::of::<()>() {
        return Envelope::empty();
    }
    match key {
        Some(key) => Envelope::keyed(key, value),
        None => Envelope::empty(),
    }
}

/// Декодирует нагрузку конверта как `P`; `None` — молчаливый отброс.
fn decode<P: Clone + Send + Sync + 'static>(envelope: &Envelope, key: Option<&str>) -> Option<P> {
    // Топик-сигнал: обработчик вызывается без декодирования.
    if let Some(unit) = (&() as &dyn Any).downcast_ref::<P>() {
        return Some(unit.clone());
    }
    envelope.value::<P>(key?).cloned()
}
