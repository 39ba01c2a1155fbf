//! Case status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Utfall {
    Innvilget,
    Avslag,
}

/// Where a case is in its lifecycle
///
/// ```text
/// Uavklart → Vilkarsvurdert → Beregnet → Simulert → TilAttestering → Iverksatt
///                  ▲                                      │
///                  └──────────── Underkjent ◄─────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "utfall", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SoknadsbehandlingStatus {
    /// Vilkår assessed, but not all of them decided
    Uavklart,
    Vilkarsvurdert(Utfall),
    Beregnet(Utfall),
    /// Always innvilget
    Simulert,
    TilAttestering(Utfall),
    Underkjent(Utfall),
    Iverksatt(Utfall),
}

impl SoknadsbehandlingStatus {
    /// Every status, used by property tests and the DB status check
    pub const ALLE: [SoknadsbehandlingStatus; 12] = [
        SoknadsbehandlingStatus::Uavklart,
        SoknadsbehandlingStatus::Vilkarsvurdert(Utfall::Innvilget),
        SoknadsbehandlingStatus::Vilkarsvurdert(Utfall::Avslag),
        SoknadsbehandlingStatus::Beregnet(Utfall::Innvilget),
        SoknadsbehandlingStatus::Beregnet(Utfall::Avslag),
        SoknadsbehandlingStatus::Simulert,
        SoknadsbehandlingStatus::TilAttestering(Utfall::Innvilget),
        SoknadsbehandlingStatus::TilAttestering(Utfall::Avslag),
        SoknadsbehandlingStatus::Underkjent(Utfall::Innvilget),
        SoknadsbehandlingStatus::Underkjent(Utfall::Avslag),
        SoknadsbehandlingStatus::Iverksatt(Utfall::Innvilget),
        SoknadsbehandlingStatus::Iverksatt(Utfall::Avslag),
    ];

    /// The outcome so far, if one has been reached
    pub fn utfall(&self) -> Option<Utfall> {
        match self {
            SoknadsbehandlingStatus::Uavklart => None,
            SoknadsbehandlingStatus::Simulert => Some(Utfall::Innvilget),
            SoknadsbehandlingStatus::Vilkarsvurdert(u)
            | SoknadsbehandlingStatus::Beregnet(u)
            | SoknadsbehandlingStatus::TilAttestering(u)
            | SoknadsbehandlingStatus::Underkjent(u)
            | SoknadsbehandlingStatus::Iverksatt(u) => Some(*u),
        }
    }

    pub fn er_iverksatt(&self) -> bool {
        matches!(self, SoknadsbehandlingStatus::Iverksatt(_))
    }

    pub fn er_til_attestering(&self) -> bool {
        matches!(self, SoknadsbehandlingStatus::TilAttestering(_))
    }

    /// True while the saksbehandler may still change grunnlag
    pub fn kan_endres_av_saksbehandler(&self) -> bool {
        !matches!(
            self,
            SoknadsbehandlingStatus::TilAttestering(_) | SoknadsbehandlingStatus::Iverksatt(_)
        )
    }

    /// Stable name used in logs and as the database status column
    pub fn navn(&self) -> &'static str {
        match self {
            SoknadsbehandlingStatus::Uavklart => "UAVKLART",
            SoknadsbehandlingStatus::Vilkarsvurdert(Utfall::Innvilget) => "VILKARSVURDERT_INNVILGET",
            SoknadsbehandlingStatus::Vilkarsvurdert(Utfall::Avslag) => "VILKARSVURDERT_AVSLAG",
            SoknadsbehandlingStatus::Beregnet(Utfall::Innvilget) => "BEREGNET_INNVILGET",
            SoknadsbehandlingStatus::Beregnet(Utfall::Avslag) => "BEREGNET_AVSLAG",
            SoknadsbehandlingStatus::Simulert => "SIMULERT",
            SoknadsbehandlingStatus::TilAttestering(Utfall::Innvilget) => "TIL_ATTESTERING_INNVILGET",
            SoknadsbehandlingStatus::TilAttestering(Utfall::Avslag) => "TIL_ATTESTERING_AVSLAG",
            SoknadsbehandlingStatus::Underkjent(Utfall::Innvilget) => "UNDERKJENT_INNVILGET",
            SoknadsbehandlingStatus::Underkjent(Utfall::Avslag) => "UNDERKJENT_AVSLAG",
            SoknadsbehandlingStatus::Iverksatt(Utfall::Innvilget) => "IVERKSATT_INNVILGET",
            SoknadsbehandlingStatus::Iverksatt(Utfall::Avslag) => "IVERKSATT_AVSLAG",
        }
    }
}

impl fmt::Display for SoknadsbehandlingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.navn())
    }
}
