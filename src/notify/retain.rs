use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use super::subscription::SubscriptionInner;

/// Таблица удержания привязанных подписок.
///
/// Запись в таблице — это «сильная ссылка подписки на саму себя»:
/// пока запись существует, привязанная подписка живёт независимо от
/// ссылок вызывающего. Удаление записи (по разрушению владельца или
/// явному `cancel`) возвращает подписку под обычный подсчёт ссылок.
static RETAINED: Lazy<DashMap<u64, Arc<SubscriptionInner>>> = Lazy::new(DashMap::new);

/// Ставит подписку на удержание под её уникальным идентификатором.
/// Ключ — именно идентификатор подписки, а не токен наблюдателя:
/// токены уникальны только внутри своего `Center`, таблица же общая.
pub(crate) fn hold(id: u64, inner: Arc<SubscriptionInner>) {
    RETAINED.insert(id, inner);
}

/// Снимает удержание. Идемпотентно: повторное снятие ничего не находит.
pub(crate) fn release(id: u64) -> bool {
    RETAINED.remove(&id).is_some()
}

#[cfg(test)]
pub(crate) fn is_held(id: u64) -> bool {
    RETAINED.contains_key(&id)
}
