use std::{any::Any, fmt, sync::Arc};

/// Конверт публикуемого события: опциональная пара «ключ — значение»
/// со стёртым типом.
///
/// Клонирование дешёвое (два `Arc`), поэтому один конверт раздаётся
/// всем наблюдателям топика без копирования полезной нагрузки.
///
/// Извлечение значения — проверяемый downcast: несовпадение ключа или
/// типа возвращает `None`, никогда не паникует. Это сохраняет
/// best-effort семантику рассылки при случайной коллизии имён топиков.
#[derive(Clone)]
pub struct Envelope {
    slot: Option<(Arc<str>, Arc<dyn Any + Send + Sync>)>,
}

impl Envelope {
    /// Конверт без полезной нагрузки (события-сигналы).
    pub fn empty() -> Self {
        Self { slot: None }
    }

    /// Конверт с одним значением под указанным ключом.
    pub fn keyed<T: Any + Send + Sync>(key: &str, value: T) -> Self {
        Self {
            slot: Some((Arc::from(key), Arc::new(value))),
        }
    }

    /// Возвращает значение под ключом `key`, если ключ совпадает
    /// и значение имеет тип `T`. Любое несовпадение — `None`.
    pub fn value<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        let (stored_key, value) = self.slot.as_ref()?;
        if &**stored_key != key {
            return None;
        }
        value.downcast_ref::<T>()
    }

    /// Ключ полезной нагрузки, если она есть.
    pub fn key(&self) -> Option<&str> {
        self.slot.as_ref().map(|(k, _)| &**k)
    }

    /// Проверяет, что конверт без полезной нагрузки.
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope").field("key", &self.key()).finish()
    }
}
