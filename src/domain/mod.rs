//! Core domain types and logic.

pub mod config;
pub mod config_validation;
pub mod error;
pub mod improvement;
pub mod price_record;
pub mod ranking;
pub mod report;
pub mod retention;
pub mod statistics;
pub mod symbol_strength;
pub mod universe;
