/// Adapters - concrete implementations of the port traits
///
/// These modules implement the port traits for specific platforms and services.
pub mod document;
pub mod services;
pub mod storage;
