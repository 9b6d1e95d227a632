//! Машинерия разрушения «по владельцу».
//!
//! - `owner`: страж [`Owner`] с уникальной идентичностью; его `Drop` —
//!   момент разрушения владельца.
//! - `signal`: реестр одноразовых сигналов разрушения, по одному слоту
//!   колбэка на владельца.

pub mod owner;
pub mod signal;

pub use owner::{Owner, OwnerId};
pub use signal::DropCallback;
