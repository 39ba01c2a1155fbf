//! Vedtaksbrev requests
//!
//! The letter itself is rendered by the brev service; this module only
//! assembles what goes into it.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, Saksnummer, Timezone};
use domain_beregning::{Beregningsperiode, Satskategori};

use crate::behandling::Soknadsbehandling;
use crate::person::Person;
use crate::status::Utfall;
use crate::vilkar::Vilkar;

/// Why a søknad was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Avslagsgrunn {
    Vilkar(Vilkar),
    /// Income leaves nothing to pay in any month
    ForHoyInntekt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrevInnhold {
    InnvilgetVedtak {
        sats: Satskategori,
        beregningsperioder: Vec<Beregningsperiode>,
        sum_ytelse: Money,
    },
    AvslagsVedtak {
        avslagsgrunner: Vec<Avslagsgrunn>,
        beregningsperioder: Vec<Beregningsperiode>,
    },
}

/// Everything the brev service needs to render a vedtaksbrev
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrevRequest {
    pub person: Person,
    pub saksbehandler_navn: String,
    pub attestant_navn: Option<String>,
    pub fritekst: String,
    /// Letter date in Norwegian time
    pub dato: NaiveDate,
    pub saksnummer: Saksnummer,
    pub innhold: BrevInnhold,
}

impl BrevRequest {
    /// Builds the vedtaksbrev for the given outcome
    pub fn vedtak(
        behandling: &Soknadsbehandling,
        utfall: Utfall,
        person: Person,
        saksbehandler_navn: String,
        attestant_navn: Option<String>,
    ) -> Self {
        let beregningsperioder = behandling
            .beregning()
            .map(|b| b.beregningsperioder())
            .unwrap_or_default();

        let innhold = match utfall {
            Utfall::Innvilget => BrevInnhold::InnvilgetVedtak {
                sats: behandling
                    .beregning()
                    .map(|b| b.sats)
                    .unwrap_or(Satskategori::Hoy),
                sum_ytelse: behandling
                    .beregning()
                    .map(|b| b.sum_ytelse())
                    .unwrap_or_else(|| Money::zero(core_kernel::Currency::NOK)),
                beregningsperioder,
            },
            Utfall::Avslag => BrevInnhold::AvslagsVedtak {
                avslagsgrunner: avslagsgrunner(behandling),
                beregningsperioder,
            },
        };

        Self {
            person,
            saksbehandler_navn,
            attestant_navn,
            fritekst: behandling.fritekst_til_brev().to_string(),
            dato: Timezone::oslo().local_date(Utc::now()),
            saksnummer: behandling.saksnummer(),
            innhold,
        }
    }
}

fn avslagsgrunner(behandling: &Soknadsbehandling) -> Vec<Avslagsgrunn> {
    let mut grunner: Vec<Avslagsgrunn> = behandling
        .vilkarsvurderinger()
        .avslagsgrunner()
        .into_iter()
        .map(Avslagsgrunn::Vilkar)
        .collect();
    if behandling.beregning().is_some_and(|b| b.alle_maneder_er_null()) {
        grunner.push(Avslagsgrunn::ForHoyInntekt);
    }
    grunner
}
