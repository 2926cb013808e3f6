//! Concrete adapter implementations for ports.

pub mod binance_adapter;
pub mod file_config_adapter;
pub mod flat_file_store;
pub mod log_notifier;
pub mod replay_adapter;
#[cfg(feature = "telegram")]
pub mod telegram_adapter;
