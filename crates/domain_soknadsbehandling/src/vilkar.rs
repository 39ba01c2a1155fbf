//! Vilkårsvurdering (eligibility assessment)

use serde::{Deserialize, Serialize};

use core_kernel::Money;
use domain_beregning::Uforegrunnlag;

/// Outcome of assessing a single vilkår
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vurdering {
    Innvilget,
    Avslag,
    Uavklart,
}

/// The vilkår every søknad is assessed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vilkar {
    Uforhet,
    Flyktning,
    LovligOpphold,
    FastOppholdINorge,
    Institusjonsopphold,
    Utenlandsopphold,
    Formue,
    PersonligOppmote,
}

/// Overall result of the vilkårsvurdering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vilkarsresultat {
    Innvilget,
    Avslag,
    Uavklart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uforevilkar {
    pub vurdering: Vurdering,
    /// Present when the vilkår is innvilget
    pub grunnlag: Option<Uforegrunnlag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formuevilkar {
    pub vurdering: Vurdering,
    pub formue_bruker: Money,
    /// Only allowed when the bruker has an EPS
    pub formue_eps: Option<Money>,
}

/// One vurdering per vilkår
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vilkarsvurderinger {
    pub uforhet: Uforevilkar,
    pub flyktning: Vurdering,
    pub lovlig_opphold: Vurdering,
    pub fast_opphold_i_norge: Vurdering,
    pub institusjonsopphold: Vurdering,
    pub utenlandsopphold: Vurdering,
    pub formue: Formuevilkar,
    pub personlig_oppmote: Vurdering,
}

impl Vilkarsvurderinger {
    /// Nothing assessed yet
    pub fn ikke_vurdert() -> Self {
        Self {
            uforhet: Uforevilkar {
                vurdering: Vurdering::Uavklart,
                grunnlag: None,
            },
            flyktning: Vurdering::Uavklart,
            lovlig_opphold: Vurdering::Uavklart,
            fast_opphold_i_norge: Vurdering::Uavklart,
            institusjonsopphold: Vurdering::Uavklart,
            utenlandsopphold: Vurdering::Uavklart,
            formue: Formuevilkar {
                vurdering: Vurdering::Uavklart,
                formue_bruker: Money::zero(core_kernel::Currency::NOK),
                formue_eps: None,
            },
            personlig_oppmote: Vurdering::Uavklart,
        }
    }

    /// Every vilkår with its vurdering, in a fixed order
    pub fn vurderinger(&self) -> [(Vilkar, Vurdering); 8] {
        [
            (Vilkar::Uforhet, self.uforhet.vurdering),
            (Vilkar::Flyktning, self.flyktning),
            (Vilkar::LovligOpphold, self.lovlig_opphold),
            (Vilkar::FastOppholdINorge, self.fast_opphold_i_norge),
            (Vilkar::Institusjonsopphold, self.institusjonsopphold),
            (Vilkar::Utenlandsopphold, self.utenlandsopphold),
            (Vilkar::Formue, self.formue.vurdering),
            (Vilkar::PersonligOppmote, self.personlig_oppmote),
        ]
    }

    /// Avslag if any vilkår is avslag, innvilget if all are innvilget
    pub fn resultat(&self) -> Vilkarsresultat {
        let vurderinger = self.vurderinger();
        if vurderinger.iter().any(|(_, v)| *v == Vurdering::Avslag) {
            Vilkarsresultat::Avslag
        } else if vurderinger.iter().all(|(_, v)| *v == Vurdering::Innvilget) {
            Vilkarsresultat::Innvilget
        } else {
            Vilkarsresultat::Uavklart
        }
    }

    pub fn avslagsgrunner(&self) -> Vec<Vilkar> {
        self.vurderinger()
            .into_iter()
            .filter(|(_, v)| *v == Vurdering::Avslag)
            .map(|(vilkar, _)| vilkar)
            .collect()
    }

    pub fn uforegrunnlag(&self) -> Option<&Uforegrunnlag> {
        self.uforhet.grunnlag.as_ref()
    }

    pub fn har_eps_data(&self) -> bool {
        self.formue.formue_eps.is_some()
    }
}

impl Default for Vilkarsvurderinger {
    fn default() -> Self {
        Self::ikke_vurdert()
    }
}
