//! Inbound adapters: protocol-facing surfaces that translate requests into
//! domain service calls.

pub mod http;
