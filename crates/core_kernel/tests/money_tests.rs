//! Unit tests for the Money module
//!
//! Tests cover NOK creation, whole-krone rounding, checked arithmetic,
//! currency conversion for foreign income and serialization.

use core_kernel::{Currency, Money, MoneyError, Rate};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_nok_shorthand() {
        let m = Money::nok(dec!(20946));
        assert_eq!(m.currency(), Currency::NOK);
        assert_eq!(m.amount(), dec!(20946));
    }

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::nok(dec!(8445.833333333));
        assert_eq!(m.amount(), dec!(8445.8333));
    }
}

mod rounding {
    use super::*;

    #[test]
    fn test_round_to_whole_half_up() {
        assert_eq!(Money::nok(dec!(19256.69)).round_to_whole().amount(), dec!(19257));
        assert_eq!(Money::nok(dec!(418.92)).round_to_whole().amount(), dec!(419));
        assert_eq!(Money::nok(dec!(0.5)).round_to_whole().amount(), dec!(1));
        assert_eq!(Money::nok(dec!(0.4999)).round_to_whole().amount(), dec!(0));
    }

    #[test]
    fn test_round_to_currency() {
        assert_eq!(Money::nok(dec!(10.005)).round_to_currency().amount(), dec!(10.00));
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_and_sub() {
        let a = Money::nok(dec!(20946));
        let b = Money::nok(dec!(5000));
        assert_eq!(a.checked_sub(&b).unwrap(), Money::nok(dec!(15946)));
        assert_eq!(a.checked_add(&b).unwrap(), Money::nok(dec!(25946)));
    }

    #[test]
    fn test_mismatch_is_an_error() {
        let nok = Money::nok(dec!(1));
        let eur = Money::new(dec!(1), Currency::EUR);
        assert!(matches!(nok.checked_sub(&eur), Err(MoneyError::CurrencyMismatch(Currency::NOK, Currency::EUR))));
    }

    #[test]
    fn test_sum_of_amounts() {
        let items = vec![Money::nok(dec!(100)), Money::nok(dec!(250.50)), Money::nok(dec!(-50))];
        assert_eq!(Money::sum(Currency::NOK, &items).unwrap(), Money::nok(dec!(300.50)));
        assert!(Money::sum(Currency::NOK, &[]).unwrap().is_zero());
    }

    #[test]
    fn test_yearly_to_monthly() {
        assert_eq!(Money::nok(dec!(120000)).per_maned(), Money::nok(dec!(10000)));
    }
}

mod conversion {
    use super::*;

    #[test]
    fn test_convert_foreign_income_to_nok() {
        let eur = Money::new(dec!(100), Currency::EUR);
        let nok = eur.convert(dec!(10.5), Currency::NOK).unwrap();
        assert_eq!(nok, Money::nok(dec!(1050)));
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let eur = Money::new(dec!(100), Currency::EUR);
        assert!(matches!(eur.convert(dec!(-1), Currency::NOK), Err(MoneyError::InvalidRate(_))));
    }
}

mod rate {
    use super::*;

    #[test]
    fn test_rate_from_percentage() {
        let uforegrad = Rate::from_percentage(dec!(60));
        assert_eq!(uforegrad.as_percentage(), dec!(60));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_money_json_shape() {
        let json = serde_json::to_value(Money::nok(dec!(20946))).unwrap();
        assert_eq!(json["currency"], "NOK");
        let back: Money = serde_json::from_value(json).unwrap();
        assert_eq!(back, Money::nok(dec!(20946)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::nok(dec!(20946)).to_string(), "20946.00 NOK");
    }
}
