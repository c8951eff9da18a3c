//! Interfaces layer: inbound adapters

pub mod http;
