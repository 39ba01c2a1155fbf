//! Request handlers

pub mod behandling;
pub mod drift;
pub mod health;
