pub mod error;
pub mod progress;
pub mod timezone;

pub use error::{AppError, Result};
pub use progress::{NoopProgress, ProgressObserver, TracingProgress};
