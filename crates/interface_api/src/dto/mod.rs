//! Request and response bodies

pub mod behandling;
pub mod drift;
