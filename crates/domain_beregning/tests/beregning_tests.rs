//! Integration tests for the beregning engine
//!
//! Tests cover monthly amounts against known sats values, the fradrag
//! strategies per bosituasjon, the 2% rules, pro-rata fradrag, grouping
//! into beregningsperioder and property tests for the amount invariants.

use chrono::NaiveDate;
use core_kernel::{Maned, Money, Periode, Rate};
use domain_beregning::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn maned(y: i32, m: u32) -> Maned {
    Maned::new(y, m).unwrap()
}

fn ar_2021() -> Periode {
    Periode::for_maneder(maned(2021, 1), maned(2021, 12)).unwrap()
}

fn januar_2021() -> Periode {
    maned(2021, 1).periode()
}

/// Uføregrunnlag covering the periode with the given yearly forventet inntekt
fn uforegrunnlag(periode: Periode, forventet_inntekt: Decimal) -> Uforegrunnlag {
    Uforegrunnlag {
        periode,
        uforegrad: Rate::from_percentage(dec!(100)),
        forventet_inntekt: Money::nok(forventet_inntekt),
    }
}

fn ufore_input(periode: Periode, bosituasjon: Bosituasjon, forventet: Decimal, fradrag: Vec<Fradrag>) -> BeregningInput {
    BeregningInput {
        periode,
        sakstype: Sakstype::Ufore,
        bosituasjon,
        fradrag,
        uforegrunnlag: vec![uforegrunnlag(periode, forventet)],
        begrunnelse: None,
    }
}

fn fradrag(fradragstype: Fradragstype, belop: Decimal, periode: Periode, tilhorer: FradragTilhorer) -> Fradrag {
    Fradrag::new(fradragstype, Money::nok(belop), periode, tilhorer)
}

fn belop_januar(input: BeregningInput) -> Maanedsberegning {
    let beregning = BeregningFactory::new().beregn(input).unwrap();
    beregning.maanedsberegning(maned(2021, 1)).cloned().unwrap()
}

// ============================================================================
// SATS
// ============================================================================

mod sats_tests {
    use super::*;

    #[test]
    fn test_enslig_without_income_gets_hoy_sats() {
        let januar = belop_januar(ufore_input(januar_2021(), Bosituasjon::Enslig, dec!(0), vec![]));
        assert_eq!(januar.belop, Money::nok(dec!(20946)));
        assert_eq!(januar.sats, Satskategori::Hoy);
        assert_eq!(januar.grunnbelop, Money::nok(dec!(101351)));
        assert!(januar.merknader.is_empty());
    }

    #[test]
    fn test_deler_bolig_gets_ordinar_sats() {
        let januar = belop_januar(ufore_input(januar_2021(), Bosituasjon::DelerBoligMedVoksne, dec!(0), vec![]));
        assert_eq!(januar.belop, Money::nok(dec!(19257)));
        assert_eq!(januar.sats, Satskategori::Ordinar);
    }

    #[test]
    fn test_month_before_sats_table_fails() {
        let periode = Periode::for_maneder(maned(2019, 1), maned(2019, 6)).unwrap();
        let result = BeregningFactory::new().beregn(ufore_input(periode, Bosituasjon::Enslig, dec!(0), vec![]));
        assert_eq!(result, Err(BeregningError::SatsMangler(maned(2019, 1))));
    }

    #[test]
    fn test_partial_month_periode_is_rejected() {
        let periode = Periode::new(
            NaiveDate::from_ymd_opt(2021, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 31).unwrap(),
        )
        .unwrap();
        let result = BeregningFactory::new().beregn(ufore_input(periode, Bosituasjon::Enslig, dec!(0), vec![]));
        assert!(matches!(result, Err(BeregningError::UgyldigPeriode(_))));
    }
}

// ============================================================================
// FRADRAG
// ============================================================================

mod fradrag_tests {
    use super::*;

    #[test]
    fn test_forventet_inntekt_is_deducted() {
        let januar = belop_januar(ufore_input(januar_2021(), Bosituasjon::Enslig, dec!(120000), vec![]));
        assert_eq!(januar.belop, Money::nok(dec!(10946)));
    }

    #[test]
    fn test_higher_arbeidsinntekt_replaces_forventet() {
        let januar = belop_januar(ufore_input(
            januar_2021(),
            Bosituasjon::Enslig,
            dec!(120000),
            vec![fradrag(Fradragstype::Arbeidsinntekt, dec!(12000), januar_2021(), FradragTilhorer::Bruker)],
        ));
        assert_eq!(januar.belop, Money::nok(dec!(8946)));
        assert_eq!(januar.fradrag.len(), 1);
    }

    #[test]
    fn test_partial_month_fradrag_is_pro_rata() {
        let forste_halvdel = Periode::new(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 15).unwrap(),
        )
        .unwrap();
        let januar = belop_januar(ufore_input(
            januar_2021(),
            Bosituasjon::Enslig,
            dec!(0),
            vec![fradrag(Fradragstype::Kapitalinntekt, dec!(3100), forste_halvdel, FradragTilhorer::Bruker)],
        ));
        assert_eq!(januar.sum_fradrag(), Money::nok(dec!(1500)));
        assert_eq!(januar.belop, Money::nok(dec!(19446)));
    }

    #[test]
    fn test_eps_over_67() {
        let januar = belop_januar(ufore_input(
            januar_2021(),
            Bosituasjon::EpsOver67,
            dec!(0),
            vec![fradrag(Fradragstype::OffentligPensjon, dec!(20000), januar_2021(), FradragTilhorer::Eps)],
        ));
        assert_eq!(januar.fribelop_eps.round_to_currency(), Money::nok(dec!(14810.33)));
        assert_eq!(januar.belop, Money::nok(dec!(14067)));
    }

    #[test]
    fn test_eps_under_67_ufor_flyktning() {
        let januar = belop_januar(ufore_input(
            januar_2021(),
            Bosituasjon::EpsUnder67UforFlyktning,
            dec!(0),
            vec![fradrag(Fradragstype::Arbeidsinntekt, dec!(20000), januar_2021(), FradragTilhorer::Eps)],
        ));
        assert_eq!(januar.belop, Money::nok(dec!(18513)));
    }

    #[test]
    fn test_eps_under_67() {
        let januar = belop_januar(ufore_input(
            januar_2021(),
            Bosituasjon::EpsUnder67,
            dec!(0),
            vec![fradrag(Fradragstype::Arbeidsinntekt, dec!(5000), januar_2021(), FradragTilhorer::Eps)],
        ));
        assert_eq!(januar.belop, Money::nok(dec!(14257)));
    }

    #[test]
    fn test_missing_uforegrunnlag_is_an_error() {
        let mut input = ufore_input(januar_2021(), Bosituasjon::Enslig, dec!(0), vec![]);
        input.uforegrunnlag.clear();
        let result = BeregningFactory::new().beregn(input);
        assert_eq!(result, Err(BeregningError::ManglerForventetInntekt(maned(2021, 1))));
    }
}

// ============================================================================
// MINSTENIVÅ
// ============================================================================

mod minsteniva_tests {
    use super::*;

    #[test]
    fn test_amount_below_two_percent_becomes_zero() {
        let januar = belop_januar(ufore_input(januar_2021(), Bosituasjon::Enslig, dec!(248400), vec![]));
        assert!(januar.belop.is_zero());
        assert!(januar.har_merknad(Merknad::BelopMellomNullOgToProsentAvHoySats));
        assert!(januar.har_merknad(Merknad::BelopErNull));
    }

    #[test]
    fn test_sosialstonad_raises_amount_to_two_percent() {
        let januar = belop_januar(ufore_input(
            januar_2021(),
            Bosituasjon::Enslig,
            dec!(240000),
            vec![fradrag(Fradragstype::Sosialstonad, dec!(800), januar_2021(), FradragTilhorer::Bruker)],
        ));
        assert_eq!(januar.belop, Money::nok(dec!(419)));
        assert!(januar.har_merknad(Merknad::SosialstonadForerTilBelopLavereEnnToProsentAvHoySats));
    }

    #[test]
    fn test_income_above_sats_gives_zero() {
        let beregning = BeregningFactory::new()
            .beregn(ufore_input(januar_2021(), Bosituasjon::Enslig, dec!(600000), vec![]))
            .unwrap();
        assert!(beregning.alle_maneder_er_null());
        assert!(beregning.maanedsberegninger[0].har_merknad(Merknad::BelopErNull));
        assert!(beregning.sum_ytelse().is_zero());
    }
}

// ============================================================================
// BEREGNINGSPERIODER
// ============================================================================

mod beregningsperiode_tests {
    use super::*;

    #[test]
    fn test_g_regulation_splits_the_year() {
        let beregning = BeregningFactory::new()
            .beregn(ufore_input(ar_2021(), Bosituasjon::Enslig, dec!(0), vec![]))
            .unwrap();
        let perioder = beregning.beregningsperioder();

        assert_eq!(perioder.len(), 2);
        assert_eq!(perioder[0].periode, Periode::for_maneder(maned(2021, 1), maned(2021, 4)).unwrap());
        assert_eq!(perioder[1].periode, Periode::for_maneder(maned(2021, 5), maned(2021, 12)).unwrap());
        assert_eq!(perioder[0].belop, Money::nok(dec!(20946)));
    }

    #[test]
    fn test_fradrag_change_starts_new_periode() {
        let host = Periode::for_maneder(maned(2021, 9), maned(2021, 12)).unwrap();
        let beregning = BeregningFactory::new()
            .beregn(ufore_input(
                ar_2021(),
                Bosituasjon::Enslig,
                dec!(0),
                vec![fradrag(Fradragstype::Kapitalinntekt, dec!(1000), host, FradragTilhorer::Bruker)],
            ))
            .unwrap();

        let perioder = beregning.beregningsperioder();
        assert_eq!(perioder.len(), 3);
        assert_eq!(perioder[2].periode, host);
        assert_eq!(beregning.sum_fradrag(), Money::nok(dec!(4000)));
    }

    #[test]
    fn test_same_input_gives_same_months() {
        let factory = BeregningFactory::new();
        let a = factory.beregn(ufore_input(ar_2021(), Bosituasjon::EpsUnder67, dec!(50000), vec![])).unwrap();
        let b = factory.beregn(ufore_input(ar_2021(), Bosituasjon::EpsUnder67, dec!(50000), vec![])).unwrap();
        assert_eq!(a.maanedsberegninger, b.maanedsberegninger);
        assert_ne!(a.id, b.id);
    }
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

fn bosituasjon_strategy() -> impl Strategy<Value = Bosituasjon> {
    prop_oneof![
        Just(Bosituasjon::Enslig),
        Just(Bosituasjon::DelerBoligMedVoksne),
        Just(Bosituasjon::EpsOver67),
        Just(Bosituasjon::EpsUnder67UforFlyktning),
        Just(Bosituasjon::EpsUnder67),
    ]
}

proptest! {
    #[test]
    fn belop_is_never_negative_or_below_minsteniva(
        bosituasjon in bosituasjon_strategy(),
        forventet in 0i64..400_000,
        eps_inntekt in 0i64..40_000,
        sosialstonad in 0i64..3_000,
    ) {
        let fradrag = vec![
            fradrag(Fradragstype::Arbeidsinntekt, Decimal::from(eps_inntekt), ar_2021(), FradragTilhorer::Eps),
            fradrag(Fradragstype::Sosialstonad, Decimal::from(sosialstonad), ar_2021(), FradragTilhorer::Bruker),
        ];
        let beregning = BeregningFactory::new()
            .beregn(ufore_input(ar_2021(), bosituasjon, Decimal::from(forventet), fradrag))
            .unwrap();

        let satser = Satser::new();
        for m in &beregning.maanedsberegninger {
            let to_prosent = satser.to_prosent_av_hoy_sats(Sakstype::Ufore, m.maned).unwrap();
            prop_assert!(!m.belop.is_negative());
            prop_assert!(m.belop.is_zero() || m.belop.amount() >= to_prosent.amount());
            prop_assert_eq!(m.belop.amount().fract(), Decimal::ZERO);
        }
    }
}
