//! Wallet module - credential loading

pub mod credentials;

pub use credentials::{keypair_from_base58, load_keypair};
