//! Money types with precise decimal arithmetic
//!
//! Benefit amounts are paid in NOK, but fradrag for foreign income are
//! registered in the currency they were earned in and converted with a
//! recorded exchange rate, so `Currency` carries the handful of currencies
//! that show up there.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use thiserror::Error;

/// Decimal places kept on every stored amount
const INTERNAL_SCALE: u32 = 4;

/// Decimal places of the minor unit (øre, cents) for all supported currencies
const MINOR_SCALE: u32 = 2;

const MANEDER_I_AR: Decimal = dec!(12);

/// ISO 4217 currency codes seen on fradrag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    NOK,
    SEK,
    DKK,
    EUR,
    USD,
    GBP,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::NOK => "NOK",
            Currency::SEK => "SEK",
            Currency::DKK => "DKK",
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot combine {0} and {1}")]
    CurrencyMismatch(Currency, Currency),

    #[error("Exchange rate must be positive, got {0}")]
    InvalidRate(Decimal),
}

/// A monetary amount with associated currency
///
/// Amounts keep four decimal places so that pro-rata and exchange rate
/// calculations do not lose precision before the final rounding to whole
/// kroner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(INTERNAL_SCALE),
            currency,
        }
    }

    pub fn nok(amount: Decimal) -> Self {
        Self::new(amount, Currency::NOK)
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Negative amounts clamp to zero
    pub fn positive_or_zero(&self) -> Self {
        if self.is_negative() {
            Self::zero(self.currency)
        } else {
            *self
        }
    }

    /// Rounds to whole øre
    pub fn round_to_currency(&self) -> Self {
        Self::new(self.amount.round_dp(MINOR_SCALE), self.currency)
    }

    /// Rounds to whole kroner, half away from zero
    pub fn round_to_whole(&self) -> Self {
        Self::new(
            self.amount
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
            self.currency,
        )
    }

    /// The monthly share of a yearly amount
    pub fn per_maned(&self) -> Self {
        Self::new(self.amount / MANEDER_I_AR, self.currency)
    }

    fn same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch(self.currency, other.currency))
        }
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.same_currency(other)?;
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.same_currency(other)?;
        Ok(Self::new(self.amount - other.amount, self.currency))
    }

    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }

    /// Converts with `rate` units of `target` per unit of this currency
    pub fn convert(&self, rate: Decimal, target: Currency) -> Result<Self, MoneyError> {
        if rate <= Decimal::ZERO {
            return Err(MoneyError::InvalidRate(rate));
        }
        Ok(Self::new(self.amount * rate, target))
    }

    /// Sums amounts that must all be in `currency`
    pub fn sum<'a>(currency: Currency, items: impl IntoIterator<Item = &'a Money>) -> Result<Money, MoneyError> {
        items
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in Money::sub")
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

/// A fraction stored as a decimal, used for uføregrad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    value: Decimal,
}

impl Rate {
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self { value: percentage / dec!(100) }
    }

    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_whole_is_half_up() {
        assert_eq!(Money::nok(dec!(20945.87)).round_to_whole().amount(), dec!(20946));
        assert_eq!(Money::nok(dec!(10.5)).round_to_whole().amount(), dec!(11));
        assert_eq!(Money::nok(dec!(10.49)).round_to_whole().amount(), dec!(10));
    }

    #[test]
    fn test_per_maned() {
        assert_eq!(Money::nok(dec!(120000)).per_maned(), Money::nok(dec!(10000)));
        assert_eq!(Money::nok(dec!(187252)).per_maned().amount(), dec!(15604.3333));
    }

    #[test]
    fn test_convert_to_nok() {
        let sek = Money::new(dec!(1000), Currency::SEK);
        let nok = sek.convert(dec!(0.98), Currency::NOK).unwrap();
        assert_eq!(nok, Money::nok(dec!(980)));
        assert_eq!(sek.convert(dec!(0), Currency::NOK), Err(MoneyError::InvalidRate(dec!(0))));
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(Rate::from_percentage(dec!(60)).to_string(), "60%");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn money_arithmetic_is_associative(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64,
            c in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::nok(Decimal::new(a, 2));
            let mb = Money::nok(Decimal::new(b, 2));
            let mc = Money::nok(Decimal::new(c, 2));

            prop_assert_eq!((ma + mb) + mc, ma + (mb + mc));
        }

        #[test]
        fn positive_or_zero_is_never_negative(a in -1_000_000i64..1_000_000i64) {
            prop_assert!(!Money::nok(Decimal::new(a, 2)).positive_or_zero().is_negative());
        }
    }
}
