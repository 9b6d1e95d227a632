/// Broadcast machinery: Center registry, Envelope, execution Context.
pub mod bus;
/// Common error types.
pub mod error;
/// Per-object destruction machinery: Owner guard and drop signals.
pub mod lifetime;
/// Typed veneer: Topic trait and lifetime-bound Subscription.
pub mod notify;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Broadcast collaborator API.
pub use bus::{default_center, Center, Context, Envelope, ObserverToken};
/// Operation errors.
pub use error::ContextError;
/// Owner guard, identity, and destruction callbacks.
pub use lifetime::{DropCallback, Owner, OwnerId};
/// Typed notification API.
pub use notify::{Subscription, Topic};
