//! Spreading fradrag over the months of a beregning

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Maned, Money, Periode};
use crate::grunnlag::{Fradrag, FradragTilhorer, Fradragstype, Uforegrunnlag};

/// One fradrag as it applies to one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FradragForManed {
    pub fradragstype: Fradragstype,
    pub manedsbelop: Money,
    pub maned: Maned,
    pub tilhorer: FradragTilhorer,
    pub utenlandsk: bool,
}

impl FradragForManed {
    pub fn tilhorer_bruker(&self) -> bool {
        self.tilhorer == FradragTilhorer::Bruker
    }

    pub fn tilhorer_eps(&self) -> bool {
        self.tilhorer == FradragTilhorer::Eps
    }
}

/// Fradrag grouped per month, months in order
pub type FradragPerManed = BTreeMap<Maned, Vec<FradragForManed>>;

/// The amount of `manedsbelop` attributable to the part of `maned` covered by `periode`
///
/// A partly covered month gets `manedsbelop * dager_dekket / dager_i_maned`,
/// rounded to two decimals.
pub fn pro_rata(manedsbelop: Money, periode: &Periode, maned: Maned) -> Option<Money> {
    let dekket = periode.snitt(&maned.periode())?;
    let dager_dekket = dekket.dager();
    let dager_i_maned = i64::from(maned.dager_i_maned());
    if dager_dekket == dager_i_maned {
        return Some(manedsbelop);
    }
    let andel = Decimal::from(dager_dekket) / Decimal::from(dager_i_maned);
    Some(manedsbelop.multiply(andel).round_to_currency())
}

/// Spreads registered fradrag and derived forventet inntekt over the beregningsperiode
///
/// Every month of `beregningsperiode` gets an entry, empty if nothing applies.
pub fn periodiser(
    beregningsperiode: &Periode,
    fradrag: &[Fradrag],
    uforegrunnlag: &[Uforegrunnlag],
) -> FradragPerManed {
    let mut per_maned: FradragPerManed = beregningsperiode
        .maneder()
        .into_iter()
        .map(|maned| (maned, Vec::new()))
        .collect();

    for f in fradrag {
        let Some(innenfor) = f.periode.snitt(beregningsperiode) else {
            continue;
        };
        for maned in innenfor.maneder() {
            let Some(liste) = per_maned.get_mut(&maned) else {
                continue;
            };
            if let Some(belop) = pro_rata(f.manedsbelop, &f.periode, maned) {
                liste.push(FradragForManed {
                    fradragstype: f.fradragstype,
                    manedsbelop: belop,
                    maned,
                    tilhorer: f.tilhorer,
                    utenlandsk: f.er_utenlandsk(),
                });
            }
        }
    }

    for grunnlag in uforegrunnlag {
        let Some(innenfor) = grunnlag.periode.snitt(beregningsperiode) else {
            continue;
        };
        let manedlig = grunnlag.forventet_inntekt.per_maned();
        for maned in innenfor.maneder() {
            if let Some(liste) = per_maned.get_mut(&maned) {
                liste.push(FradragForManed {
                    fradragstype: Fradragstype::ForventetInntekt,
                    manedsbelop: manedlig,
                    maned,
                    tilhorer: FradragTilhorer::Bruker,
                    utenlandsk: false,
                });
            }
        }
    }

    per_maned
}
