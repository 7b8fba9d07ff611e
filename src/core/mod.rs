//! Core configuration and error handling

pub mod config;
pub mod error;
