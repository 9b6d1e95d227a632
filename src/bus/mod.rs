//! Широковещательная машинерия (Notification Center).
//!
//! Модуль реализует общий для процесса механизм рассылки событий по
//! имени топика:
//!
//! - `center`: реестр наблюдателей, `post`/`observe`/`remove_observer`.
//! - `context`: контекст исполнения обработчиков (синхронный или
//!   Tokio-runtime).
//! - `envelope`: конверт полезной нагрузки со стёртым типом и
//!   проверяемым downcast.
//! - `intern` (приватный): пул `Arc<str>` для имён топиков.
//!
//! Публичный API переэкспортирует:
//! - `center::*`
//! - `context::*`
//! - `envelope::*`

pub mod center;
pub mod context;
pub mod envelope;
mod intern;

pub use center::*;
pub use context::*;
pub use envelope::*;
pub(crate) use intern::intern_topic;
