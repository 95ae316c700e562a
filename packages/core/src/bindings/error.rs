//! Binding dispatch errors

use thiserror::Error;

/// Failure to dispatch a generated behavior by name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The name is neither generated nor covered by a declared relationship
    #[error("Undefined method '{name}' for {host}")]
    Undefined { host: String, name: String },

    /// A names accessor could not read the registry
    #[error("Names accessor '{name}' failed: {message}")]
    NamesUnavailable { name: String, message: String },
}

impl DispatchError {
    pub fn undefined(host: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Undefined {
            host: host.into(),
            name: name.into(),
        }
    }

    pub fn names_unavailable(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NamesUnavailable {
            name: name.into(),
            message: message.into(),
        }
    }
}
