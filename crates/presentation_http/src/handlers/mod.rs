//! HTTP request handlers

pub mod health;
pub mod hko;
pub mod kmb;
