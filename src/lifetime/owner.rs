use std::sync::atomic::{AtomicU64, Ordering};

use super::signal::{self, DropCallback};

/// Идентичность владельца в реестре сигналов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

static NEXT_OWNER_ID: AtomicU64 = AtomicU64::new(1);

/// Страж времени жизни владельца.
///
/// Rust не даёт финализаторов на произвольных значениях, поэтому
/// «объект-владелец» представлен явным стражем: пользователь кладёт
/// `Owner` в свою структуру (или держит его в нужной области
/// видимости), и разрушение стража и есть разрушение владельца.
///
/// При `Drop` синхронно срабатывает сигнал разрушения — ровно один раз.
/// `Owner` сознательно не `Clone`: один страж — одно событие разрушения.
#[derive(Debug)]
pub struct Owner {
    id: OwnerId,
}

impl Owner {
    /// Создаёт владельца со свежей идентичностью.
    pub fn new() -> Self {
        Self {
            id: OwnerId(NEXT_OWNER_ID.fetch_add(1, Ordering::Relaxed)),
        }
    }

    /// Идентичность владельца.
    pub fn id(&self) -> OwnerId {
        self.id
    }

    /// Устанавливает колбэк разрушения.
    ///
    /// Слот единственный: повторная установка заменяет предыдущий
    /// колбэк, а не добавляет второй.
    pub fn set_on_drop(&self, f: impl Fn() + Send + Sync + 'static) {
        signal::set_callback(self.id, f);
    }

    /// Возвращает установленный колбэк разрушения, если он есть.
    pub fn on_drop(&self) -> Option<DropCallback> {
        signal::callback(self.id)
    }
}

impl Default for Owner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Owner {
    fn drop(&mut self) {
        signal::fire(self.id);
    }
}
