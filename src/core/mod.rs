pub mod config;
pub mod diagnostics;
pub mod error;
pub mod types;

pub use config::LifecycleConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Result, ThingError};
