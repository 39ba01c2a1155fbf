//! Strongly-typed identifiers for domain entities
//!
//! Internal entities use newtype wrappers around UUIDs. Identifiers issued by
//! external systems (oppgave, joark, dokdist) are opaque strings and get their
//! own string newtypes so they cannot be mixed up either.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

macro_rules! define_external_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

// Case processing identifiers
define_id!(SakId, "SAK");
define_id!(SoknadId, "SOK");
define_id!(BehandlingId, "BEH");
define_id!(BeregningId, "BER");
define_id!(UtbetalingId, "UTB");

// Generic identifiers
define_id!(AuditEventId, "AUD");

// Identifiers owned by external systems
define_external_id!(OppgaveId);
define_external_id!(JournalpostId);
define_external_id!(BrevbestillingId);
define_external_id!(AktorId);

/// Human-readable case number, unique per sak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Saksnummer(i64);

impl Saksnummer {
    /// Lowest saksnummer ever issued
    pub const FORSTE: i64 = 2021;

    pub fn new(value: i64) -> Result<Self, CoreError> {
        if value < Self::FORSTE {
            return Err(CoreError::ugyldig_ident(
                "saksnummer",
                format!("must be at least {}, got {}", Self::FORSTE, value),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Saksnummer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Norwegian national identity number (fødselsnummer)
///
/// Only the shape is validated: exactly eleven ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fnr(String);

impl Fnr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Fnr {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 11 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(CoreError::ugyldig_ident("fnr", "must be exactly 11 digits"))
        }
    }
}

impl TryFrom<String> for Fnr {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fnr> for String {
    fn from(fnr: Fnr) -> String {
        fnr.0
    }
}

impl fmt::Display for Fnr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Employee identifier in the user directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NavIdent(String);

impl NavIdent {
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CoreError::ugyldig_ident("nav_ident", "cannot be blank"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NavIdent {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NavIdent> for String {
    fn from(ident: NavIdent) -> String {
        ident.0
    }
}

impl fmt::Display for NavIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The caseworker preparing a case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Saksbehandler(pub NavIdent);

/// The second caseworker approving or rejecting a case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attestant(pub NavIdent);

impl Saksbehandler {
    pub fn nav_ident(&self) -> &NavIdent {
        &self.0
    }
}

impl Attestant {
    pub fn nav_ident(&self) -> &NavIdent {
        &self.0
    }

    /// Returns true if this attestant is the same person as the saksbehandler
    pub fn er_samme_person_som(&self, saksbehandler: &Saksbehandler) -> bool {
        self.0 == saksbehandler.0
    }
}

impl fmt::Display for Saksbehandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Attestant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behandling_id_display() {
        let id = BehandlingId::new();
        let display = id.to_string();
        assert!(display.starts_with("BEH-"));
    }

    #[test]
    fn test_id_parsing() {
        let original = SakId::new();
        let parsed: SakId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let behandling_id = BehandlingId::from(uuid);
        let back: Uuid = behandling_id.into();
        assert_eq!(uuid, back);
    }

    #[test]
    fn test_fnr_requires_eleven_digits() {
        assert!("12345678901".parse::<Fnr>().is_ok());
        assert!("1234567890".parse::<Fnr>().is_err());
        assert!("1234567890a".parse::<Fnr>().is_err());
    }

    #[test]
    fn test_same_person_check() {
        let ident = NavIdent::new("Z990000").unwrap();
        let attestant = Attestant(ident.clone());
        assert!(attestant.er_samme_person_som(&Saksbehandler(ident)));
        assert!(!attestant.er_samme_person_som(&Saksbehandler(NavIdent::new("Z990001").unwrap())));
    }
}
