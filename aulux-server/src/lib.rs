// Types shared across the server modules
pub mod common;

pub mod server;

pub use common::TokenPair;
