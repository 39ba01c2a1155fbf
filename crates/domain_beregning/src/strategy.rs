//! Fradrag strategies
//!
//! Which fradrag count, and how EPS income is netted, depends on the
//! bosituasjon and on whether the case is uføre or alder. Uføre strategies
//! also require exactly one forventet inntekt per month and keep only the
//! higher of that and the bruker's arbeidsinntekt.

use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{Currency, Maned, Money};
use crate::error::BeregningError;
use crate::fradrag::{FradragForManed, FradragPerManed};
use crate::grunnlag::{Bosituasjon, FradragTilhorer, Fradragstype};
use crate::satser::{Sakstype, Satser};

/// How fradrag are combined for a given bosituasjon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FradragStrategy {
    Enslig,
    EpsOver67,
    EpsUnder67UforFlyktning,
    EpsUnder67,
}

impl FradragStrategy {
    pub fn for_bosituasjon(bosituasjon: Bosituasjon) -> Self {
        match bosituasjon {
            Bosituasjon::Enslig | Bosituasjon::DelerBoligMedVoksne => FradragStrategy::Enslig,
            Bosituasjon::EpsOver67 => FradragStrategy::EpsOver67,
            Bosituasjon::EpsUnder67UforFlyktning => FradragStrategy::EpsUnder67UforFlyktning,
            Bosituasjon::EpsUnder67 => FradragStrategy::EpsUnder67,
        }
    }

    /// Monthly EPS income that is not deducted
    pub fn fribelop_eps(&self, satser: &Satser, maned: Maned) -> Result<Money, BeregningError> {
        match self {
            FradragStrategy::EpsOver67 => satser.fribelop_eps_over_67(maned),
            FradragStrategy::EpsUnder67UforFlyktning => satser.fribelop_eps_under_67_ufor_flyktning(maned),
            FradragStrategy::Enslig | FradragStrategy::EpsUnder67 => Ok(Money::zero(Currency::NOK)),
        }
    }

    /// Applies the strategy to every month
    pub fn beregn(
        &self,
        sakstype: Sakstype,
        satser: &Satser,
        per_maned: FradragPerManed,
    ) -> Result<FradragPerManed, BeregningError> {
        per_maned
            .into_iter()
            .map(|(maned, fradrag)| {
                let fradrag = match sakstype {
                    Sakstype::Ufore => {
                        valider_forventet_inntekt(maned, &fradrag)?;
                        hoyeste_av_arbeidsinntekt_og_forventet(fradrag)
                    }
                    Sakstype::Alder => fradrag,
                };
                Ok((maned, self.for_maned(satser, maned, fradrag)?))
            })
            .collect()
    }

    fn for_maned(
        &self,
        satser: &Satser,
        maned: Maned,
        fradrag: Vec<FradragForManed>,
    ) -> Result<Vec<FradragForManed>, BeregningError> {
        let (bruker, eps): (Vec<_>, Vec<_>) = fradrag.into_iter().partition(|f| f.tilhorer_bruker());

        let beregnet_eps = match self {
            FradragStrategy::Enslig => None,
            FradragStrategy::EpsUnder67 => {
                if eps.is_empty() {
                    None
                } else {
                    let sum = Money::sum(Currency::NOK, eps.iter().map(|f| &f.manedsbelop))?;
                    Some(sum)
                }
            }
            FradragStrategy::EpsOver67 | FradragStrategy::EpsUnder67UforFlyktning => {
                let fribelop = self.fribelop_eps(satser, maned)?;
                let beregnet = beregn_fradrag_over_fribelop(&eps, fribelop)?;
                if beregnet.is_zero() {
                    None
                } else {
                    Some(beregnet)
                }
            }
        };

        let mut resultat = bruker;
        if let Some(belop) = beregnet_eps {
            debug!(%maned, belop = %belop, "Beregnet fradrag for EPS");
            resultat.push(FradragForManed {
                fradragstype: Fradragstype::BeregnetFradragEps,
                manedsbelop: belop,
                maned,
                tilhorer: FradragTilhorer::Eps,
                utenlandsk: false,
            });
        }
        Ok(resultat)
    }
}

/// EPS income above the fribeløp, with sosialstønad always counted in full
fn beregn_fradrag_over_fribelop(eps: &[FradragForManed], fribelop: Money) -> Result<Money, BeregningError> {
    let (sosialstonad, ovrige): (Vec<&FradragForManed>, Vec<&FradragForManed>) = eps
        .iter()
        .partition(|f| f.fradragstype == Fradragstype::Sosialstonad);

    let sum_sosialstonad = Money::sum(Currency::NOK, sosialstonad.iter().map(|f| &f.manedsbelop))?;
    let sum_ovrige = Money::sum(Currency::NOK, ovrige.iter().map(|f| &f.manedsbelop))?;
    let over_fribelop = sum_ovrige.checked_sub(&fribelop)?.positive_or_zero();

    Ok(over_fribelop.checked_add(&sum_sosialstonad)?)
}

fn valider_forventet_inntekt(maned: Maned, fradrag: &[FradragForManed]) -> Result<(), BeregningError> {
    let antall = fradrag
        .iter()
        .filter(|f| f.tilhorer_bruker() && f.fradragstype == Fradragstype::ForventetInntekt)
        .count();
    if antall != 1 {
        return Err(BeregningError::ManglerForventetInntekt(maned));
    }
    Ok(())
}

/// Keeps either the bruker's arbeidsinntekt or the forventet inntekt, whichever is higher
fn hoyeste_av_arbeidsinntekt_og_forventet(fradrag: Vec<FradragForManed>) -> Vec<FradragForManed> {
    let er_arbeidsinntekt =
        |f: &FradragForManed| f.tilhorer_bruker() && f.fradragstype == Fradragstype::Arbeidsinntekt;
    let er_forventet =
        |f: &FradragForManed| f.tilhorer_bruker() && f.fradragstype == Fradragstype::ForventetInntekt;

    let arbeidsinntekt: rust_decimal::Decimal = fradrag
        .iter()
        .filter(|f| er_arbeidsinntekt(f))
        .map(|f| f.manedsbelop.amount())
        .sum();
    let forventet: rust_decimal::Decimal = fradrag
        .iter()
        .filter(|f| er_forventet(f))
        .map(|f| f.manedsbelop.amount())
        .sum();

    if arbeidsinntekt > forventet {
        fradrag.into_iter().filter(|f| !er_forventet(f)).collect()
    } else {
        fradrag.into_iter().filter(|f| !er_arbeidsinntekt(f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn maned() -> Maned {
        Maned::new(2021, 1).unwrap()
    }

    fn fradrag(fradragstype: Fradragstype, belop: rust_decimal::Decimal, tilhorer: FradragTilhorer) -> FradragForManed {
        FradragForManed {
            fradragstype,
            manedsbelop: Money::nok(belop),
            maned: maned(),
            tilhorer,
            utenlandsk: false,
        }
    }

    fn beregn(strategy: FradragStrategy, sakstype: Sakstype, fradrag: Vec<FradragForManed>) -> Result<Vec<FradragForManed>, BeregningError> {
        let mut per_maned = FradragPerManed::new();
        per_maned.insert(maned(), fradrag);
        let mut resultat = strategy.beregn(sakstype, &Satser::new(), per_maned)?;
        Ok(resultat.remove(&maned()).unwrap_or_default())
    }

    #[test]
    fn test_ufore_requires_forventet_inntekt() {
        let result = beregn(
            FradragStrategy::Enslig,
            Sakstype::Ufore,
            vec![fradrag(Fradragstype::Arbeidsinntekt, dec!(1000), FradragTilhorer::Bruker)],
        );
        assert_eq!(result, Err(BeregningError::ManglerForventetInntekt(maned())));
    }

    #[test]
    fn test_ufore_keeps_higher_arbeidsinntekt() {
        let result = beregn(
            FradragStrategy::Enslig,
            Sakstype::Ufore,
            vec![
                fradrag(Fradragstype::ForventetInntekt, dec!(10000), FradragTilhorer::Bruker),
                fradrag(Fradragstype::Arbeidsinntekt, dec!(12000), FradragTilhorer::Bruker),
            ],
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].fradragstype, Fradragstype::Arbeidsinntekt);
    }

    #[test]
    fn test_enslig_drops_eps_fradrag() {
        let result = beregn(
            FradragStrategy::Enslig,
            Sakstype::Alder,
            vec![
                fradrag(Fradragstype::Kapitalinntekt, dec!(500), FradragTilhorer::Bruker),
                fradrag(Fradragstype::Arbeidsinntekt, dec!(9000), FradragTilhorer::Eps),
            ],
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].tilhorer_bruker());
    }

    #[test]
    fn test_eps_over_67_deducts_income_above_garantipensjon() {
        let result = beregn(
            FradragStrategy::EpsOver67,
            Sakstype::Alder,
            vec![
                fradrag(Fradragstype::OffentligPensjon, dec!(20000), FradragTilhorer::Eps),
                fradrag(Fradragstype::Sosialstonad, dec!(100), FradragTilhorer::Eps),
            ],
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].fradragstype, Fradragstype::BeregnetFradragEps);
        // 20000 - 177724 / 12 + 100
        assert_eq!(result[0].manedsbelop, Money::nok(dec!(5289.6667)));
    }

    #[test]
    fn test_eps_income_below_fribelop_gives_no_fradrag() {
        let result = beregn(
            FradragStrategy::EpsUnder67UforFlyktning,
            Sakstype::Alder,
            vec![fradrag(Fradragstype::Arbeidsinntekt, dec!(5000), FradragTilhorer::Eps)],
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_eps_under_67_sums_everything() {
        let result = beregn(
            FradragStrategy::EpsUnder67,
            Sakstype::Alder,
            vec![
                fradrag(Fradragstype::Arbeidsinntekt, dec!(3000), FradragTilhorer::Eps),
                fradrag(Fradragstype::Kapitalinntekt, dec!(2000), FradragTilhorer::Eps),
            ],
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].manedsbelop, Money::nok(dec!(5000)));
    }
}
