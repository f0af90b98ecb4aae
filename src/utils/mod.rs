//! Cross-cutting helpers

pub mod keychain;
pub mod paths;
