//! `bazaar-kernel`: contracts shared by the Bazaar gateway runtime.
//!
//! Nothing in this crate performs network I/O. It defines the vocabulary the
//! runtime crate (`bazaar-gateway`) is built from: routes, gates, upstream
//! descriptors, the per-request context, and definition-time validation.

// gateway contract module
pub mod gateway;

// configuration file loading
#[cfg(feature = "config")]
pub mod config;
