//! Pre-built Test Fixtures
//!
//! Ready-to-use identities, periods, søknader and vilkårsvurderinger.
//! Values are fixed so that expected amounts in tests stay predictable.

use chrono::{TimeZone, Utc};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal_macros::dec;

use core_kernel::{
    Attestant, Fnr, Maned, Money, NavIdent, OppgaveId, Periode, Rate, SakId, Saksbehandler, Saksnummer,
    SoknadId,
};
use domain_beregning::{Sakstype, Uforegrunnlag};
use domain_soknadsbehandling::{
    Formuevilkar, Navn, Person, Soknad, Uforevilkar, Vilkarsvurderinger, Vurdering,
};

/// Fixture for people and caseworkers
pub struct IdentFixtures;

impl IdentFixtures {
    pub const FNR: &'static str = "12345678901";
    pub const SAKSBEHANDLER: &'static str = "Z990001";
    pub const ATTESTANT: &'static str = "Z990002";

    pub fn fnr() -> Fnr {
        Self::FNR.parse().expect("valid fnr")
    }

    pub fn saksnummer() -> Saksnummer {
        Saksnummer::new(2021).expect("valid saksnummer")
    }

    pub fn nav_ident(ident: &str) -> NavIdent {
        NavIdent::new(ident).expect("valid nav ident")
    }

    pub fn saksbehandler() -> Saksbehandler {
        Saksbehandler(Self::nav_ident(Self::SAKSBEHANDLER))
    }

    pub fn attestant() -> Attestant {
        Attestant(Self::nav_ident(Self::ATTESTANT))
    }

    /// An attestant with the saksbehandler's ident
    pub fn attestant_som_saksbehandler() -> Attestant {
        Attestant(Self::nav_ident(Self::SAKSBEHANDLER))
    }

    /// A person with a generated name
    pub fn person(fnr: &Fnr) -> Person {
        Person {
            fnr: fnr.clone(),
            navn: Navn {
                fornavn: FirstName().fake(),
                mellomnavn: None,
                etternavn: LastName().fake(),
            },
        }
    }
}

/// Fixture for stønadsperioder
pub struct PeriodeFixtures;

impl PeriodeFixtures {
    pub fn maned(year: i32, month: u32) -> Maned {
        Maned::new(year, month).expect("valid month")
    }

    pub fn januar_2021() -> Periode {
        Self::maned(2021, 1).periode()
    }

    pub fn ar_2021() -> Periode {
        Periode::for_maneder(Self::maned(2021, 1), Self::maned(2021, 12)).expect("valid periode")
    }
}

/// Fixture for incoming søknader
pub struct SoknadFixtures;

impl SoknadFixtures {
    /// An open uføre søknad with an oppgave, for fnr 12345678901
    pub fn soknad() -> Soknad {
        Soknad {
            id: SoknadId::new_v7(),
            sak_id: SakId::new_v7(),
            saksnummer: IdentFixtures::saksnummer(),
            fnr: IdentFixtures::fnr(),
            sakstype: Sakstype::Ufore,
            opprettet: Utc.with_ymd_and_hms(2021, 1, 4, 9, 0, 0).unwrap(),
            oppgave_id: Some(OppgaveId::new("oppgave-soknad")),
            journalpost_id: None,
            lukket: None,
        }
    }

    pub fn soknad_uten_oppgave() -> Soknad {
        Soknad {
            oppgave_id: None,
            ..Self::soknad()
        }
    }
}

/// Fixture for vilkårsvurderinger
pub struct VilkarFixtures;

impl VilkarFixtures {
    /// Every vilkår innvilget, full uførhet with no expected income
    pub fn alle_innvilget(periode: Periode) -> Vilkarsvurderinger {
        Vilkarsvurderinger {
            uforhet: Uforevilkar {
                vurdering: Vurdering::Innvilget,
                grunnlag: Some(Uforegrunnlag {
                    periode,
                    uforegrad: Rate::from_percentage(dec!(100)),
                    forventet_inntekt: Money::nok(dec!(0)),
                }),
            },
            flyktning: Vurdering::Innvilget,
            lovlig_opphold: Vurdering::Innvilget,
            fast_opphold_i_norge: Vurdering::Innvilget,
            institusjonsopphold: Vurdering::Innvilget,
            utenlandsopphold: Vurdering::Innvilget,
            formue: Formuevilkar {
                vurdering: Vurdering::Innvilget,
                formue_bruker: Money::nok(dec!(0)),
                formue_eps: None,
            },
            personlig_oppmote: Vurdering::Innvilget,
        }
    }

    /// Innvilget except for formue
    pub fn formue_avslag(periode: Periode) -> Vilkarsvurderinger {
        let mut vurderinger = Self::alle_innvilget(periode);
        vurderinger.formue.vurdering = Vurdering::Avslag;
        vurderinger.formue.formue_bruker = Money::nok(dec!(500000));
        vurderinger
    }
}
