pub mod data;
pub mod retry;
pub mod wait;

pub use data::{timestamp, Address, CustomerInfo, DataGenerator, FullName};
pub use retry::{backoff_delay, RetryHelper};
pub use wait::WaitHelper;
