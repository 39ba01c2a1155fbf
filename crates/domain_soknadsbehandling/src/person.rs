//! Person data from the person registry

use serde::{Deserialize, Serialize};

use core_kernel::Fnr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navn {
    pub fornavn: String,
    pub mellomnavn: Option<String>,
    pub etternavn: String,
}

impl Navn {
    pub fn fullt_navn(&self) -> String {
        match &self.mellomnavn {
            Some(mellomnavn) => format!("{} {} {}", self.fornavn, mellomnavn, self.etternavn),
            None => format!("{} {}", self.fornavn, self.etternavn),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub fnr: Fnr,
    pub navn: Navn,
}
