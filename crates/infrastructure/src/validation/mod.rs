//! Startup validation of the loaded configuration

mod config_check;

pub use config_check::{ConfigValidator, ConfigWarning, WarningSeverity};
