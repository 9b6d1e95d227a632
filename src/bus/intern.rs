use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

/// Пул переиспользуемых `Arc<str>` для одинаковых имён топиков.
/// Crate-private: все регистрации и публикации одного топика разделяют
/// одну аллокацию имени.
static TOPIC_INTERN: Lazy<DashMap<String, Arc<str>>> = Lazy::new(DashMap::new);

/// Возвращает interned `Arc<str>` для данного имени топика.
/// При первом обращении к новому имени создаёт `Arc<str>` и кладёт его в пул.
#[inline(always)]
pub(crate) fn intern_topic<S: AsRef<str>>(name: S) -> Arc<str> {
    let key = name.as_ref();
    if let Some(existing) = TOPIC_INTERN.get(key) {
        return existing.clone();
    }
    let arc: Arc<str> = Arc::from(key);
    TOPIC_INTERN.insert(key.to_string(), arc.clone());
    arc
}
