//! Kernel errors

use thiserror::Error;

use crate::money::MoneyError;
use crate::temporal::TemporalError;

/// Errors raised while constructing kernel values
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// An identifier was rejected before it reached the domain
    #[error("Invalid {ident}: {grunn}")]
    UgyldigIdent { ident: &'static str, grunn: String },
}

impl CoreError {
    pub fn ugyldig_ident(ident: &'static str, grunn: impl Into<String>) -> Self {
        CoreError::UgyldigIdent {
            ident,
            grunn: grunn.into(),
        }
    }

    /// Name of the rejected identifier type, if that is what failed
    pub fn ident(&self) -> Option<&'static str> {
        match self {
            CoreError::UgyldigIdent { ident, .. } => Some(ident),
            _ => None,
        }
    }
}
