//! Application layer - Use cases and orchestration
//!
//! Holds the stop spatial index, the nearby-stop and nearby-station
//! workflows, and the port definitions the infrastructure layer implements.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
