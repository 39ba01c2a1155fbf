//! The beregning aggregate and the factory that computes it

use chrono::{DateTime, Utc};
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{BeregningId, Currency, Maned, Money, Periode};
use crate::error::BeregningError;
use crate::fradrag::{periodiser, FradragForManed};
use crate::grunnlag::{Bosituasjon, Fradrag, FradragTilhorer, Fradragstype, Uforegrunnlag};
use crate::satser::{Sakstype, Satser, Satskategori};
use crate::strategy::FradragStrategy;

/// Remarks attached to a month when the amount was adjusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Merknad {
    BelopErNull,
    BelopMellomNullOgToProsentAvHoySats,
    SosialstonadForerTilBelopLavereEnnToProsentAvHoySats,
}

/// The calculation for a single month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maanedsberegning {
    pub maned: Maned,
    pub sakstype: Sakstype,
    pub sats: Satskategori,
    /// Yearly grunnbeløp in effect for the month
    pub grunnbelop: Money,
    /// Unrounded monthly sats
    pub satsbelop: Money,
    pub fradrag: Vec<FradragForManed>,
    /// Amount paid for the month, in whole kroner
    pub belop: Money,
    pub fribelop_eps: Money,
    pub merknader: Vec<Merknad>,
}

impl Maanedsberegning {
    pub fn sum_fradrag(&self) -> Money {
        let sum = self.fradrag.iter().map(|f| f.manedsbelop.amount()).sum();
        Money::nok(sum)
    }

    pub fn har_merknad(&self, merknad: Merknad) -> bool {
        self.merknader.contains(&merknad)
    }

    /// Shape of the fradrag, used when grouping months
    fn fradrag_signatur(&self) -> Vec<(Fradragstype, FradragTilhorer, Money)> {
        let mut signatur: Vec<_> = self
            .fradrag
            .iter()
            .map(|f| (f.fradragstype, f.tilhorer, f.manedsbelop))
            .collect();
        signatur.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)).then(a.2.amount().cmp(&b.2.amount())));
        signatur
    }
}

/// A run of consecutive months with identical results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beregningsperiode {
    pub periode: Periode,
    pub sats: Satskategori,
    pub satsbelop: Money,
    pub belop: Money,
    pub fradrag: Vec<(Fradragstype, FradragTilhorer, Money)>,
}

/// Result of calculating a stønadsperiode
///
/// Derived from the grunnlag, never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beregning {
    pub id: BeregningId,
    pub opprettet: DateTime<Utc>,
    pub periode: Periode,
    pub sakstype: Sakstype,
    pub sats: Satskategori,
    /// The fradrag the beregning was made from
    pub fradrag: Vec<Fradrag>,
    pub maanedsberegninger: Vec<Maanedsberegning>,
    pub begrunnelse: Option<String>,
}

impl Beregning {
    /// Total amount paid over the periode
    pub fn sum_ytelse(&self) -> Money {
        let sum = self.maanedsberegninger.iter().map(|m| m.belop.amount()).sum();
        Money::nok(sum)
    }

    /// Total fradrag applied over the periode
    pub fn sum_fradrag(&self) -> Money {
        let sum = self
            .maanedsberegninger
            .iter()
            .map(|m| m.sum_fradrag().amount())
            .sum();
        Money::nok(sum)
    }

    pub fn maanedsberegning(&self, maned: Maned) -> Option<&Maanedsberegning> {
        self.maanedsberegninger.iter().find(|m| m.maned == maned)
    }

    /// True if no month pays anything
    pub fn alle_maneder_er_null(&self) -> bool {
        self.maanedsberegninger.iter().all(|m| m.belop.is_zero())
    }

    /// Groups consecutive months whose sats, satsbeløp, beløp and fradrag match
    pub fn beregningsperioder(&self) -> Vec<Beregningsperiode> {
        let mut perioder: Vec<Beregningsperiode> = Vec::new();
        for m in &self.maanedsberegninger {
            let fradrag = m.fradrag_signatur();
            if let Some(siste) = perioder.last_mut() {
                let sammenhengende = siste.periode.tilstoter(&m.maned.periode());
                if sammenhengende
                    && siste.sats == m.sats
                    && siste.satsbelop == m.satsbelop
                    && siste.belop == m.belop
                    && siste.fradrag == fradrag
                {
                    if let Ok(utvidet) = siste.periode.slaa_sammen(&m.maned.periode()) {
                        siste.periode = utvidet;
                        continue;
                    }
                }
            }
            perioder.push(Beregningsperiode {
                periode: m.maned.periode(),
                sats: m.sats,
                satsbelop: m.satsbelop,
                belop: m.belop,
                fradrag,
            });
        }
        perioder
    }
}

/// Everything a beregning is calculated from
#[derive(Debug, Clone)]
pub struct BeregningInput {
    pub periode: Periode,
    pub sakstype: Sakstype,
    pub bosituasjon: Bosituasjon,
    pub fradrag: Vec<Fradrag>,
    pub uforegrunnlag: Vec<Uforegrunnlag>,
    pub begrunnelse: Option<String>,
}

/// Computes beregninger
///
/// The result depends only on the input and the sats tables. `id` and
/// `opprettet` are the only fields that differ between two runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeregningFactory {
    satser: Satser,
}

impl BeregningFactory {
    pub fn new() -> Self {
        Self {
            satser: Satser::new(),
        }
    }

    /// Uses the given sats lookups instead of today's
    pub fn with_satser(mut self, satser: Satser) -> Self {
        self.satser = satser;
        self
    }

    /// Calculates every month of the input periode
    ///
    /// # Errors
    ///
    /// * `UgyldigPeriode` - the periode does not consist of whole months
    /// * `SatsMangler` - a month predates the sats tables
    /// * `ManglerForventetInntekt` - an uføre month lacks exactly one forventet inntekt
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let beregning = BeregningFactory::new().beregn(BeregningInput {
    ///     periode: Periode::for_maneder(januar, desember)?,
    ///     sakstype: Sakstype::Ufore,
    ///     bosituasjon: Bosituasjon::Enslig,
    ///     fradrag: vec![],
    ///     uforegrunnlag: vec![uforegrunnlag],
    ///     begrunnelse: None,
    /// })?;
    /// ```
    pub fn beregn(&self, input: BeregningInput) -> Result<Beregning, BeregningError> {
        input.periode.hele_maneder()?;

        let sats = input.bosituasjon.satskategori();
        let strategy = FradragStrategy::for_bosituasjon(input.bosituasjon);
        let uforegrunnlag: &[Uforegrunnlag] = match input.sakstype {
            Sakstype::Ufore => &input.uforegrunnlag,
            Sakstype::Alder => &[],
        };

        let per_maned = periodiser(&input.periode, &input.fradrag, uforegrunnlag);
        let per_maned = strategy.beregn(input.sakstype, &self.satser, per_maned)?;

        let maanedsberegninger = per_maned
            .into_iter()
            .map(|(maned, fradrag)| {
                self.beregn_maned(input.sakstype, sats, strategy, maned, fradrag)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let beregning = Beregning {
            id: BeregningId::new_v7(),
            opprettet: Utc::now(),
            periode: input.periode,
            sakstype: input.sakstype,
            sats,
            fradrag: input.fradrag,
            maanedsberegninger,
            begrunnelse: input.begrunnelse,
        };

        info!(
            beregning_id = %beregning.id,
            periode = %beregning.periode,
            sum_ytelse = %beregning.sum_ytelse(),
            "Beregning completed"
        );

        Ok(beregning)
    }

    fn beregn_maned(
        &self,
        sakstype: Sakstype,
        sats: Satskategori,
        strategy: FradragStrategy,
        maned: Maned,
        fradrag: Vec<FradragForManed>,
    ) -> Result<Maanedsberegning, BeregningError> {
        let satsbelop = self.satser.satsbelop(sakstype, sats, maned)?;
        let grunnbelop = self.satser.grunnbelop(maned)?;
        let to_prosent = self.satser.to_prosent_av_hoy_sats(sakstype, maned)?;
        let fribelop_eps = strategy.fribelop_eps(&self.satser, maned)?;

        let sum_fradrag = Money::sum(Currency::NOK, fradrag.iter().map(|f| &f.manedsbelop))?;
        let sum_sosialstonad = Money::sum(
            Currency::NOK,
            fradrag
                .iter()
                .filter(|f| f.tilhorer_bruker() && f.fradragstype == Fradragstype::Sosialstonad)
                .map(|f| &f.manedsbelop),
        )?;

        let belop = satsbelop.checked_sub(&sum_fradrag)?.positive_or_zero().round_to_whole();
        let belop_uten_sosialstonad = satsbelop
            .checked_sub(&sum_fradrag.checked_sub(&sum_sosialstonad)?)?
            .positive_or_zero()
            .round_to_whole();

        let mut merknader = Vec::new();
        let belop = if !sum_sosialstonad.is_zero()
            && belop_uten_sosialstonad.amount() >= to_prosent.amount()
            && belop.amount() < to_prosent.amount()
        {
            merknader.push(Merknad::SosialstonadForerTilBelopLavereEnnToProsentAvHoySats);
            // Rounded up so the result never lands below the limit
            Money::nok(to_prosent.amount().round_dp_with_strategy(0, RoundingStrategy::AwayFromZero))
        } else if belop.is_positive() && belop.amount() < to_prosent.amount() {
            merknader.push(Merknad::BelopMellomNullOgToProsentAvHoySats);
            Money::zero(Currency::NOK)
        } else {
            belop
        };

        if belop.is_zero() {
            merknader.push(Merknad::BelopErNull);
        }

        debug!(%maned, belop = %belop, satsbelop = %satsbelop, "Maanedsberegning");

        Ok(Maanedsberegning {
            maned,
            sakstype,
            sats,
            grunnbelop,
            satsbelop,
            fradrag,
            belop,
            fribelop_eps,
            merknader,
        })
    }
}
