//! Month-based period handling
//!
//! Benefits are granted and calculated per calendar month, so the two core
//! types here are:
//! - `Maned`: a single calendar month
//! - `Periode`: an inclusive date range, usually spanning whole months
//!
//! Letters are dated in Norwegian local time, which `Timezone` provides.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Timezone wrapper with serialization support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Europe/Oslo
    pub fn oslo() -> Self {
        Self(chrono_tz::Europe::Oslo)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// The local calendar date for a UTC instant
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        self.to_local(utc).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::oslo()
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Invalid month: {year}-{month}")]
    UgyldigManed {
        year: i32,
        month: u32,
    },

    #[error("Period {fra_og_med} - {til_og_med} does not consist of whole months")]
    IkkeHeleManeder {
        fra_og_med: NaiveDate,
        til_og_med: NaiveDate,
    },

    #[error("Periods neither overlap nor are adjacent")]
    IkkeSammenhengende,
}

fn er_skuddar(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// A calendar month
///
/// Serialized as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Maned(NaiveDate);

impl Maned {
    pub fn new(year: i32, month: u32) -> Result<Self, TemporalError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or(TemporalError::UgyldigManed { year, month })
    }

    /// The month containing the given date
    pub fn fra_dato(dato: NaiveDate) -> Self {
        Self(dato - Duration::days(i64::from(dato.day0())))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn dager_i_maned(&self) -> u32 {
        match self.month() {
            4 | 6 | 9 | 11 => 30,
            2 if er_skuddar(self.year()) => 29,
            2 => 28,
            _ => 31,
        }
    }

    /// First day of the month
    pub fn fra_og_med(&self) -> NaiveDate {
        self.0
    }

    /// Last day of the month
    pub fn til_og_med(&self) -> NaiveDate {
        self.0 + Duration::days(i64::from(self.dager_i_maned()) - 1)
    }

    /// The following month, `None` past the last representable date
    pub fn neste(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    /// The whole month as a period
    pub fn periode(&self) -> Periode {
        Periode {
            fra_og_med: self.fra_og_med(),
            til_og_med: self.til_og_med(),
        }
    }

    /// Number of months from `self` to `other`, negative if `other` is earlier
    pub fn maneder_til(&self, other: &Maned) -> i32 {
        (other.year() - self.year()) * 12 + other.month() as i32 - self.month() as i32
    }
}

impl fmt::Display for Maned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Maned {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TemporalError::UgyldigManed { year: 0, month: 0 };
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for Maned {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Maned {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriode")]
pub struct Periode {
    fra_og_med: NaiveDate,
    til_og_med: NaiveDate,
}

#[derive(Deserialize)]
struct RawPeriode {
    fra_og_med: NaiveDate,
    til_og_med: NaiveDate,
}

impl TryFrom<RawPeriode> for Periode {
    type Error = TemporalError;

    fn try_from(raw: RawPeriode) -> Result<Self, Self::Error> {
        Periode::new(raw.fra_og_med, raw.til_og_med)
    }
}

impl Periode {
    /// Creates a period, rejecting ranges where start is after end
    pub fn new(fra_og_med: NaiveDate, til_og_med: NaiveDate) -> Result<Self, TemporalError> {
        if fra_og_med > til_og_med {
            return Err(TemporalError::InvalidPeriod {
                start: fra_og_med.to_string(),
                end: til_og_med.to_string(),
            });
        }
        Ok(Self { fra_og_med, til_og_med })
    }

    /// The whole months from `fra` through `til`
    pub fn for_maneder(fra: Maned, til: Maned) -> Result<Self, TemporalError> {
        Self::new(fra.fra_og_med(), til.til_og_med())
    }

    pub fn fra_og_med(&self) -> NaiveDate {
        self.fra_og_med
    }

    pub fn til_og_med(&self) -> NaiveDate {
        self.til_og_med
    }

    /// True if the period starts on the first and ends on the last day of a month
    pub fn er_hele_maneder(&self) -> bool {
        self.fra_og_med.day() == 1
            && Maned::fra_dato(self.til_og_med).til_og_med() == self.til_og_med
    }

    /// Every month the period touches, in order
    pub fn maneder(&self) -> Vec<Maned> {
        let siste = Maned::fra_dato(self.til_og_med);
        let mut maned = Maned::fra_dato(self.fra_og_med);
        let mut maneder = Vec::new();
        while maned <= siste {
            maneder.push(maned);
            match maned.neste() {
                Some(neste) => maned = neste,
                None => break,
            }
        }
        maneder
    }

    /// The months of a whole-month period
    ///
    /// # Errors
    ///
    /// Returns `TemporalError::IkkeHeleManeder` if the period starts or ends mid-month.
    pub fn hele_maneder(&self) -> Result<Vec<Maned>, TemporalError> {
        if !self.er_hele_maneder() {
            return Err(TemporalError::IkkeHeleManeder {
                fra_og_med: self.fra_og_med,
                til_og_med: self.til_og_med,
            });
        }
        Ok(self.maneder())
    }

    /// Number of months the period touches, without walking them
    pub fn antall_maneder(&self) -> usize {
        let fra = Maned::fra_dato(self.fra_og_med);
        let til = Maned::fra_dato(self.til_og_med);
        usize::try_from(fra.maneder_til(&til) + 1).unwrap_or(0)
    }

    /// Inclusive day count
    pub fn dager(&self) -> i64 {
        (self.til_og_med - self.fra_og_med).num_days() + 1
    }

    pub fn inneholder_dato(&self, dato: NaiveDate) -> bool {
        dato >= self.fra_og_med && dato <= self.til_og_med
    }

    pub fn inneholder(&self, other: &Periode) -> bool {
        self.inneholder_dato(other.fra_og_med) && self.inneholder_dato(other.til_og_med)
    }

    pub fn overlapper(&self, other: &Periode) -> bool {
        self.fra_og_med <= other.til_og_med && other.fra_og_med <= self.til_og_med
    }

    /// The intersection of two periods
    pub fn snitt(&self, other: &Periode) -> Option<Periode> {
        if !self.overlapper(other) {
            return None;
        }
        Some(Periode {
            fra_og_med: self.fra_og_med.max(other.fra_og_med),
            til_og_med: self.til_og_med.min(other.til_og_med),
        })
    }

    /// True if one period ends the day before the other starts
    pub fn tilstoter(&self, other: &Periode) -> bool {
        self.til_og_med.succ_opt() == Some(other.fra_og_med)
            || other.til_og_med.succ_opt() == Some(self.fra_og_med)
    }

    /// Merges two overlapping or adjacent periods
    pub fn slaa_sammen(&self, other: &Periode) -> Result<Periode, TemporalError> {
        if !self.overlapper(other) && !self.tilstoter(other) {
            return Err(TemporalError::IkkeSammenhengende);
        }
        Ok(Periode {
            fra_og_med: self.fra_og_med.min(other.fra_og_med),
            til_og_med: self.til_og_med.max(other.til_og_med),
        })
    }
}

impl fmt::Display for Periode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.fra_og_med, self.til_og_med)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dato(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_maned_bounds() {
        let feb = Maned::new(2024, 2).unwrap();
        assert_eq!(feb.til_og_med(), dato(2024, 2, 29));
        assert_eq!(feb.neste(), Maned::new(2024, 3).ok());
        assert!(Maned::new(2021, 13).is_err());
    }

    #[test]
    fn test_maned_serializes_as_year_month() {
        let maned = Maned::new(2021, 1).unwrap();
        let json = serde_json::to_string(&maned).unwrap();
        assert_eq!(json, "\"2021-01\"");
        let back: Maned = serde_json::from_str(&json).unwrap();
        assert_eq!(back, maned);
    }

    #[test]
    fn test_periode_rejects_reversed_range() {
        assert!(Periode::new(dato(2021, 2, 1), dato(2021, 1, 31)).is_err());
    }

    #[test]
    fn test_last_representable_month_has_no_successor() {
        let siste = Maned::fra_dato(NaiveDate::MAX);
        assert_eq!(siste.neste(), None);
        assert_eq!(siste.til_og_med(), NaiveDate::MAX);
    }

    #[test]
    fn test_period_ending_at_max_date() {
        let periode = Periode::new(dato(2021, 1, 1), NaiveDate::MAX).unwrap();
        assert!(periode.er_hele_maneder());
        assert!(periode.antall_maneder() > 3_000_000);

        let slutt = Periode::new(Maned::fra_dato(NaiveDate::MAX).fra_og_med(), NaiveDate::MAX).unwrap();
        assert_eq!(slutt.maneder(), vec![Maned::fra_dato(NaiveDate::MAX)]);
    }

    #[test]
    fn test_maneder_touched() {
        let periode = Periode::new(dato(2021, 1, 15), dato(2021, 3, 2)).unwrap();
        let maneder: Vec<String> = periode.maneder().iter().map(|m| m.to_string()).collect();
        assert_eq!(maneder, vec!["2021-01", "2021-02", "2021-03"]);
        assert!(periode.hele_maneder().is_err());
    }

    #[test]
    fn test_snitt_and_merge() {
        let a = Periode::new(dato(2021, 1, 1), dato(2021, 6, 30)).unwrap();
        let b = Periode::new(dato(2021, 4, 1), dato(2021, 12, 31)).unwrap();
        let c = Periode::new(dato(2022, 1, 1), dato(2022, 3, 31)).unwrap();

        assert_eq!(a.snitt(&b), Some(Periode::new(dato(2021, 4, 1), dato(2021, 6, 30)).unwrap()));
        assert_eq!(a.snitt(&c), None);
        assert_eq!(b.slaa_sammen(&c).unwrap().til_og_med(), dato(2022, 3, 31));
        assert_eq!(a.slaa_sammen(&c), Err(TemporalError::IkkeSammenhengende));
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"fra_og_med":"2021-05-01","til_og_med":"2021-01-31"}"#;
        assert!(serde_json::from_str::<Periode>(json).is_err());
    }
}
