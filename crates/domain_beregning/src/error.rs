//! Beregning errors

use thiserror::Error;

use core_kernel::{Maned, MoneyError, TemporalError};

/// Errors that can occur while calculating a beregning
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BeregningError {
    /// No sats is registered for the month
    #[error("No sats registered for {0}")]
    SatsMangler(Maned),

    /// An uføre month must have exactly one forventet inntekt for the bruker
    #[error("Month {0} must have exactly one forventet inntekt for the bruker")]
    ManglerForventetInntekt(Maned),

    /// The beregningsperiode is not made up of whole months
    #[error("Invalid beregningsperiode: {0}")]
    UgyldigPeriode(#[from] TemporalError),

    /// A fradrag could not be converted or summed
    #[error("Invalid fradrag amount: {0}")]
    UgyldigBelop(#[from] MoneyError),
}

impl BeregningError {
    /// Stable machine-readable code
    pub fn kode(&self) -> &'static str {
        match self {
            BeregningError::SatsMangler(_) => "sats_mangler",
            BeregningError::ManglerForventetInntekt(_) => "mangler_forventet_inntekt",
            BeregningError::UgyldigPeriode(_) => "ugyldig_beregningsperiode",
            BeregningError::UgyldigBelop(_) => "ugyldig_fradragsbelop",
        }
    }
}
