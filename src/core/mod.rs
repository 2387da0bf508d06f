// src/core/mod.rs
//! Configuration, time source and storage backends

pub mod clock;
pub mod config_manager;
pub mod database;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config_manager::ConfigManager;
pub use database::Database;
