//! Beregning Domain
//!
//! Calculates the monthly supplerende stønad amount for a stønadsperiode.
//!
//! ```text
//! fradrag + uføregrunnlag
//!         │ periodiser (pro-rata per month)
//!         ▼
//!   FradragStrategy (by bosituasjon, uføre/alder)
//!         │
//!         ▼
//!   satsbeløp - fradrag ─► 2%-rules ─► Maanedsberegning
//!         │
//!         ▼
//!   Beregning ─► beregningsperioder
//! ```

pub mod beregning;
pub mod error;
pub mod fradrag;
pub mod grunnlag;
pub mod satser;
pub mod strategy;

pub use beregning::{Beregning, BeregningFactory, BeregningInput, Beregningsperiode, Maanedsberegning, Merknad};
pub use error::BeregningError;
pub use fradrag::FradragForManed;
pub use grunnlag::{Bosituasjon, Fradrag, FradragTilhorer, Fradragstype, Uforegrunnlag, UtenlandskInntekt};
pub use satser::{Sakstype, Satser, Satskategori};
pub use strategy::FradragStrategy;
