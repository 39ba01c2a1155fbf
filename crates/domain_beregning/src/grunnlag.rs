//! Inputs to the beregning: bosituasjon, fradrag and uføregrunnlag

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError, Periode, Rate};
use crate::satser::Satskategori;

/// Who the bruker lives with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bosituasjon {
    /// Lives alone
    Enslig,
    /// Shares a home with other adults who are not a spouse or partner
    DelerBoligMedVoksne,
    /// Spouse or partner (EPS) is 67 or older
    EpsOver67,
    /// EPS is under 67 and receives uføre flyktning
    EpsUnder67UforFlyktning,
    /// EPS is under 67
    EpsUnder67,
}

impl Bosituasjon {
    pub fn har_eps(&self) -> bool {
        matches!(
            self,
            Bosituasjon::EpsOver67 | Bosituasjon::EpsUnder67UforFlyktning | Bosituasjon::EpsUnder67
        )
    }

    pub fn satskategori(&self) -> Satskategori {
        match self {
            Bosituasjon::Enslig => Satskategori::Hoy,
            _ => Satskategori::Ordinar,
        }
    }
}

/// Kind of income deducted from the sats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Fradragstype {
    Arbeidsinntekt,
    ForventetInntekt,
    Kapitalinntekt,
    PrivatPensjon,
    OffentligPensjon,
    Sosialstonad,
    Kontantstotte,
    Introduksjonsstonad,
    Kvalifiseringsstonad,
    NAVytelserTilLivsopphold,
    Annet,
    BeregnetFradragEps,
    UnderMinstenivaa,
}

impl Fradragstype {
    /// False for types the beregning derives itself
    pub fn kan_registreres(&self) -> bool {
        !matches!(
            self,
            Fradragstype::ForventetInntekt
                | Fradragstype::BeregnetFradragEps
                | Fradragstype::UnderMinstenivaa
        )
    }
}

/// Whose income the fradrag is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FradragTilhorer {
    Bruker,
    Eps,
}

/// Income earned abroad, registered in its own currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtenlandskInntekt {
    pub belop_i_utenlandsk_valuta: Money,
    /// NOK per unit of the foreign currency
    pub kurs: Decimal,
}

impl UtenlandskInntekt {
    pub fn valuta(&self) -> Currency {
        self.belop_i_utenlandsk_valuta.currency()
    }

    pub fn i_nok(&self) -> Result<Money, MoneyError> {
        self.belop_i_utenlandsk_valuta.convert(self.kurs, Currency::NOK)
    }
}

/// A registered income deduction
///
/// `manedsbelop` is always in NOK. Foreign income keeps the original amount
/// and exchange rate next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fradrag {
    pub fradragstype: Fradragstype,
    pub manedsbelop: Money,
    pub periode: Periode,
    pub tilhorer: FradragTilhorer,
    pub utenlandsk_inntekt: Option<UtenlandskInntekt>,
}

impl Fradrag {
    pub fn new(
        fradragstype: Fradragstype,
        manedsbelop: Money,
        periode: Periode,
        tilhorer: FradragTilhorer,
    ) -> Self {
        Self {
            fradragstype,
            manedsbelop,
            periode,
            tilhorer,
            utenlandsk_inntekt: None,
        }
    }

    /// A fradrag for income in a foreign currency, converted to NOK
    pub fn utenlandsk(
        fradragstype: Fradragstype,
        inntekt: UtenlandskInntekt,
        periode: Periode,
        tilhorer: FradragTilhorer,
    ) -> Result<Self, MoneyError> {
        Ok(Self {
            fradragstype,
            manedsbelop: inntekt.i_nok()?,
            periode,
            tilhorer,
            utenlandsk_inntekt: Some(inntekt),
        })
    }

    pub fn er_utenlandsk(&self) -> bool {
        self.utenlandsk_inntekt.is_some()
    }
}

/// Uføregrad and expected yearly income for a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uforegrunnlag {
    pub periode: Periode,
    pub uforegrad: Rate,
    /// Expected income per year
    pub forventet_inntekt: Money,
}
