pub mod cli;
pub mod config;
pub mod contract;
pub mod database;
pub mod error;
pub mod logger;
pub mod services;
pub mod tables;

pub use self::error::{Error, Result};
