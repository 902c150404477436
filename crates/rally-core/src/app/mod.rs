//! Application layer: the engine and its factory.

pub mod factory;
pub mod wait_group;

pub use self::factory::WaitGroupFactory;
pub use self::wait_group::{DEFAULT_POLL_INTERVAL, WaitGroup};
