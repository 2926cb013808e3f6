//! Configuration access port trait.
//!
//! Lookups are by INI-style `[section] key`. Typed getters fall back to the
//! supplied default when the key is absent or does not parse; use
//! [`ConfigPort::get_string`] when absence must be distinguished.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
