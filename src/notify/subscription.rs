use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use super::retain;
use crate::{
    bus::{Center, ObserverToken},
    lifetime::Owner,
};

/// Подписка на топик: хэндл одной регистрации наблюдателя.
///
/// Пока подписка не привязана, она живёт ровно столько, сколько её
/// держит вызывающий: дроп последнего хэндла снимает регистрацию в
/// центре. После [`Subscription::bind`] подписка удерживает себя сама
/// и живёт до разрушения владельца, даже если вызывающий свой хэндл
/// уже отбросил.
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

/// Источник уникальных в рамках процесса идентификаторов подписок.
/// Токены наблюдателей уникальны только внутри своего `Center`, а
/// таблица удержания общая, поэтому ключ у неё свой.
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Состояние регистрации, разделяемое хэндлом и таблицей удержания.
pub(crate) struct SubscriptionInner {
    /// Уникальный в рамках процесса идентификатор подписки.
    pub(crate) id: u64,
    pub(crate) token: ObserverToken,
    pub(crate) center: Arc<Center>,
    pub(crate) topic_name: Arc<str>,
    bound: AtomicBool,
}

impl Drop for SubscriptionInner {
    fn drop(&mut self) {
        // Drop выполняется один раз на экземпляр, поэтому снятие
        // регистрации происходит не более одного раза.
        self.center.remove_observer(self.token, &self.topic_name);
    }
}

impl Subscription {
    pub(crate) fn new(token: ObserverToken, center: Arc<Center>, topic_name: Arc<str>) -> Self {
        Self {
            inner: Arc::new(SubscriptionInner {
                id: NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed),
                token,
                center,
                topic_name,
                bound: AtomicBool::new(false),
            }),
        }
    }

    /// Имя топика подписки.
    pub fn topic_name(&self) -> &str {
        &self.inner.topic_name
    }

    /// Привязана ли подписка к владельцу.
    pub fn is_bound(&self) -> bool {
        self.inner.bound.load(Ordering::Acquire)
    }

    /// Привязывает время жизни подписки к владельцу.
    ///
    /// Первая успешная привязка побеждает; повторные вызовы — no-op.
    /// Привязанная подписка ставится на удержание, а на владельца
    /// устанавливается сигнал разрушения, который это удержание снимает.
    /// Сигнал захватывает подписку слабо: живой её держит только запись
    /// в таблице удержания, и только до срабатывания сигнала.
    pub fn bind(&self, owner: &Owner) {
        if self
            .inner
            .bound
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        retain::hold(self.inner.id, Arc::clone(&self.inner));

        let weak = Arc::downgrade(&self.inner);
        owner.set_on_drop(move || {
            if let Some(inner) = weak.upgrade() {
                retain::release(inner.id);
            }
        });
    }

    /// Явно снимает удержание привязанной подписки.
    ///
    /// Идемпотентно: повторный вызов (или последующий сигнал владельца)
    /// ничего не находит. Для непривязанной подписки — no-op: её
    /// регистрация и так снимается дропом последнего хэндла.
    pub fn cancel(&self) {
        if self.is_bound() {
            retain::release(self.inner.id);
        }
    }

    #[cfg(test)]
    pub(crate) fn retain_id(&self) -> u64 {
        self.inner.id
    }
}
