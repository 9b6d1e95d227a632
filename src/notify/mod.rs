//! Типизированные уведомления и привязка подписок к владельцам.
//!
//! - `topic`: трейт [`Topic`] — имя, тип нагрузки и операции
//!   `post`/`observe` поверх центра рассылки.
//! - `subscription`: хэндл [`Subscription`] с `bind`/`cancel` и снятием
//!   регистрации при разрушении.
//! - `retain` (приватный): таблица удержания привязанных подписок.

pub mod subscription;
pub mod topic;

mod retain;

pub use subscription::Subscription;
pub use topic::Topic;
