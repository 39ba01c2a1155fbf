//! Regulated rates (satser)
//!
//! Uføre amounts are a factor of the grunnbeløp (G). Alder amounts follow
//! the garantipensjon level. Both are regulated every May and stored here as
//! static tables.
//!
//! The 2020 regulation took effect (ikrafttredelse) on 2020-09-04 while its
//! virkningstidspunkt was 2020-05-01. A beregning made before that date
//! therefore still uses the 2019 G for May to August 2020. Every other entry
//! is looked up by virkningstidspunkt alone.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Maned, Money};
use crate::error::BeregningError;

/// Uføre factor for the ordinær sats, in G per year
pub const UFORE_FAKTOR_ORDINAR: Decimal = dec!(2.28);
/// Uføre factor for the høy sats, in G per year
pub const UFORE_FAKTOR_HOY: Decimal = dec!(2.48);

/// The sats level that applies to a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Satskategori {
    Ordinar,
    Hoy,
}

/// Which benefit the case belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sakstype {
    Ufore,
    Alder,
}

type Ymd = (i32, u32, u32);

fn ymd(dato: NaiveDate) -> Ymd {
    (dato.year(), dato.month(), dato.day())
}

struct Grunnbelop {
    virkningstidspunkt: Ymd,
    ikrafttredelse: Ymd,
    belop: Decimal,
}

struct Garantipensjon {
    virkningstidspunkt: Ymd,
    ordinar: Decimal,
    hoy: Decimal,
}

/// Newest first
static GRUNNBELOP: Lazy<Vec<Grunnbelop>> = Lazy::new(|| {
    let mut tabell = vec![
        Grunnbelop { virkningstidspunkt: (2019, 5, 1), ikrafttredelse: (2019, 5, 1), belop: dec!(99858) },
        Grunnbelop { virkningstidspunkt: (2020, 5, 1), ikrafttredelse: (2020, 9, 4), belop: dec!(101351) },
        Grunnbelop { virkningstidspunkt: (2021, 5, 1), ikrafttredelse: (2021, 5, 1), belop: dec!(106399) },
        Grunnbelop { virkningstidspunkt: (2022, 5, 1), ikrafttredelse: (2022, 5, 1), belop: dec!(111477) },
        Grunnbelop { virkningstidspunkt: (2023, 5, 1), ikrafttredelse: (2023, 5, 1), belop: dec!(118620) },
    ];
    tabell.sort_by(|a, b| b.virkningstidspunkt.cmp(&a.virkningstidspunkt));
    tabell
});

/// Newest first
static GARANTIPENSJON: Lazy<Vec<Garantipensjon>> = Lazy::new(|| {
    let mut tabell = vec![
        Garantipensjon { virkningstidspunkt: (2019, 5, 1), ordinar: dec!(176099), hoy: dec!(190368) },
        Garantipensjon { virkningstidspunkt: (2020, 5, 1), ordinar: dec!(177724), hoy: dec!(192125) },
        Garantipensjon { virkningstidspunkt: (2021, 5, 1), ordinar: dec!(187252), hoy: dec!(202425) },
        Garantipensjon { virkningstidspunkt: (2022, 5, 1), ordinar: dec!(193862), hoy: dec!(209571) },
        Garantipensjon { virkningstidspunkt: (2023, 5, 1), ordinar: dec!(210418), hoy: dec!(227468) },
    ];
    tabell.sort_by(|a, b| b.virkningstidspunkt.cmp(&a.virkningstidspunkt));
    tabell
});

/// Sats lookups as known on a given date
///
/// # Example
///
/// ```rust,ignore
/// let satser = Satser::new();
/// let januar = Maned::new(2021, 1)?;
/// let hoy = satser.satsbelop(Sakstype::Ufore, Satskategori::Hoy, januar)?;
/// assert_eq!(hoy.round_to_whole().amount(), dec!(20946));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Satser {
    kunnskapsdato: Option<NaiveDate>,
}

impl Satser {
    /// Lookups as known today
    pub fn new() -> Self {
        Self { kunnskapsdato: None }
    }

    /// Lookups as they would have been made on `dato`
    pub fn with_kunnskapsdato(mut self, dato: NaiveDate) -> Self {
        self.kunnskapsdato = Some(dato);
        self
    }

    fn kunnskapsdato(&self) -> Ymd {
        ymd(self.kunnskapsdato.unwrap_or_else(|| Utc::now().date_naive()))
    }

    /// Yearly grunnbeløp in effect for the month
    pub fn grunnbelop(&self, maned: Maned) -> Result<Money, BeregningError> {
        let start = ymd(maned.fra_og_med());
        let kjent = self.kunnskapsdato();
        GRUNNBELOP
            .iter()
            .find(|g| g.virkningstidspunkt <= start && g.ikrafttredelse <= kjent)
            .map(|g| Money::nok(g.belop))
            .ok_or(BeregningError::SatsMangler(maned))
    }

    /// Yearly garantipensjon level for the month
    pub fn garantipensjon(&self, kategori: Satskategori, maned: Maned) -> Result<Money, BeregningError> {
        let start = ymd(maned.fra_og_med());
        GARANTIPENSJON
            .iter()
            .find(|g| g.virkningstidspunkt <= start)
            .map(|g| match kategori {
                Satskategori::Ordinar => Money::nok(g.ordinar),
                Satskategori::Hoy => Money::nok(g.hoy),
            })
            .ok_or(BeregningError::SatsMangler(maned))
    }

    /// Unrounded monthly sats
    pub fn satsbelop(
        &self,
        sakstype: Sakstype,
        kategori: Satskategori,
        maned: Maned,
    ) -> Result<Money, BeregningError> {
        match sakstype {
            Sakstype::Ufore => {
                let faktor = match kategori {
                    Satskategori::Ordinar => UFORE_FAKTOR_ORDINAR,
                    Satskategori::Hoy => UFORE_FAKTOR_HOY,
                };
                let g = self.grunnbelop(maned)?;
                Ok(Money::nok(g.amount() * faktor / dec!(12)))
            }
            Sakstype::Alder => {
                Ok(self.garantipensjon(kategori, maned)?.per_maned())
            }
        }
    }

    /// Two percent of the høy monthly sats, the lowest amount that is paid out
    pub fn to_prosent_av_hoy_sats(&self, sakstype: Sakstype, maned: Maned) -> Result<Money, BeregningError> {
        Ok(self.satsbelop(sakstype, Satskategori::Hoy, maned)?.multiply(dec!(0.02)))
    }

    /// Monthly EPS income exempt from fradrag when the EPS is over 67
    pub fn fribelop_eps_over_67(&self, maned: Maned) -> Result<Money, BeregningError> {
        Ok(self.garantipensjon(Satskategori::Ordinar, maned)?.per_maned())
    }

    /// Monthly EPS income exempt from fradrag when the EPS is under 67 and ufør flyktning
    pub fn fribelop_eps_under_67_ufor_flyktning(&self, maned: Maned) -> Result<Money, BeregningError> {
        self.satsbelop(Sakstype::Ufore, Satskategori::Ordinar, maned)
    }
}
