pub mod bus;

pub use bus::ContextError;
