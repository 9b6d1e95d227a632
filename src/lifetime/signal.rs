use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::OwnerId;

/// Колбэк сигнала разрушения.
pub type DropCallback = Arc<dyn Fn() + Send + Sync>;

/// Одноразовый сигнал разрушения владельца: единственный слот колбэка.
struct DropSignal {
    callback: Mutex<Option<DropCallback>>,
}

/// Реестр сигналов по идентичности владельца. Это и есть хранилище
/// «прикреплённых атрибутов»: запись создаётся при первой установке
/// колбэка и снимается вместе с разрушением владельца.
static SIGNALS: Lazy<DashMap<OwnerId, DropSignal>> = Lazy::new(DashMap::new);

/// Возвращает установленный колбэк владельца, либо `None`.
/// Отсутствие сигнала — не ошибка.
pub fn callback(id: OwnerId) -> Option<DropCallback> {
    SIGNALS.get(&id).and_then(|sig| sig.callback.lock().clone())
}

/// Устанавливает колбэк разрушения владельца.
///
/// Слот единственный: если сигнал уже существует, колбэк заменяется
/// (последняя запись побеждает), а не накапливается.
pub fn set_callback(id: OwnerId, f: impl Fn() + Send + Sync + 'static) {
    let entry = SIGNALS.entry(id).or_insert_with(|| DropSignal {
        callback: Mutex::new(None),
    });
    *entry.callback.lock() = Some(Arc::new(f));
}

/// Снимает сигнал с реестра и вызывает его колбэк синхронно.
///
/// Вызывается ровно один раз из `Drop` владельца; «ровно один раз»
/// обеспечивается самим удалением записи: повторный вызов для того же
/// идентификатора ничего не находит.
pub(crate) fn fire(id: OwnerId) {
    if let Some((_, signal)) = SIGNALS.remove(&id) {
        if let Some(cb) = signal.callback.lock().take() {
            cb();
        }
    }
}
