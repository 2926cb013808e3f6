//! Port traits: the seams between the RS engine and its collaborators.

pub mod config_port;
pub mod notification_port;
pub mod price_port;
pub mod result_store_port;
