mod types;
mod validation;

pub use types::{Config, RecorderConfig, ReporterConfig};
