//! Payment simulation returned by the oppdrag system

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Fnr, Maned, Money};
use domain_beregning::Beregning;

/// Simulated payout for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulertPeriode {
    pub maned: Maned,
    pub belop: Money,
}

/// Preview of what the payment system will pay out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulering {
    pub gjelder_id: Fnr,
    pub gjelder_navn: String,
    pub dato_beregnet: NaiveDate,
    pub netto_belop: Money,
    pub perioder: Vec<SimulertPeriode>,
}

impl Simulering {
    fn belop_for(&self, maned: Maned) -> Option<Money> {
        self.perioder.iter().find(|p| p.maned == maned).map(|p| p.belop)
    }

    /// True if every month pays exactly what the beregning says
    ///
    /// A month missing from the simulation counts as zero.
    pub fn stemmer_med(&self, beregning: &Beregning) -> bool {
        let maneder_stemmer = beregning.maanedsberegninger.iter().all(|m| {
            let simulert = self.belop_for(m.maned).map(|b| b.amount()).unwrap_or_default();
            simulert == m.belop.amount()
        });
        let ingen_ekstra = self
            .perioder
            .iter()
            .all(|p| p.belop.is_zero() || beregning.maanedsberegning(p.maned).is_some());
        maneder_stemmer && ingen_ekstra
    }
}
