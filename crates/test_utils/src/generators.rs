//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating domain values that respect
//! their invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Fnr, Maned, Money, NavIdent, Periode};
use domain_beregning::Bosituasjon;
use domain_soknadsbehandling::{SoknadsbehandlingStatus, Utfall};

/// Strategy for any of the twelve statuses
pub fn status_strategy() -> impl Strategy<Value = SoknadsbehandlingStatus> {
    proptest::sample::select(SoknadsbehandlingStatus::ALLE.to_vec())
}

/// Strategy for statuses other than TilAttestering
pub fn ikke_til_attestering_strategy() -> impl Strategy<Value = SoknadsbehandlingStatus> {
    status_strategy().prop_filter("not til attestering", |s| !s.er_til_attestering())
}

pub fn utfall_strategy() -> impl Strategy<Value = Utfall> {
    prop_oneof![Just(Utfall::Innvilget), Just(Utfall::Avslag)]
}

pub fn bosituasjon_strategy() -> impl Strategy<Value = Bosituasjon> {
    prop_oneof![
        Just(Bosituasjon::Enslig),
        Just(Bosituasjon::DelerBoligMedVoksne),
        Just(Bosituasjon::EpsOver67),
        Just(Bosituasjon::EpsUnder67UforFlyktning),
        Just(Bosituasjon::EpsUnder67),
    ]
}

pub fn fnr_strategy() -> impl Strategy<Value = Fnr> {
    "[0-9]{11}".prop_map(|s| s.parse().expect("eleven digits"))
}

pub fn nav_ident_strategy() -> impl Strategy<Value = NavIdent> {
    "[A-Z][0-9]{6}".prop_map(|s| NavIdent::new(s).expect("non-blank ident"))
}

/// Strategy for months from January 2021 through December 2024
pub fn maned_strategy() -> impl Strategy<Value = Maned> {
    (2021i32..=2024, 1u32..=12).prop_map(|(y, m)| Maned::new(y, m).expect("valid month"))
}

/// Strategy for whole-month periods of one to twelve months
pub fn stonadsperiode_strategy() -> impl Strategy<Value = Periode> {
    (maned_strategy(), 0u32..12).prop_map(|(fra, ekstra)| {
        let mut til = fra;
        for _ in 0..ekstra {
            til = til.neste().expect("month within range");
        }
        Periode::for_maneder(fra, til).expect("fra before til")
    })
}

/// Strategy for non-negative monthly amounts in whole kroner
pub fn manedsbelop_strategy() -> impl Strategy<Value = Money> {
    (0i64..100_000).prop_map(|kr| Money::nok(Decimal::from(kr)))
}
