//! Grunnlagsdata registered by the saksbehandler

use serde::{Deserialize, Serialize};

use core_kernel::Periode;
use domain_beregning::{Bosituasjon, Fradrag};

use crate::error::SoknadsbehandlingError;

/// Bosituasjon and fradrag for one case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grunnlagsdata {
    pub bosituasjon: Option<Bosituasjon>,
    pub fradrag: Vec<Fradrag>,
}

impl Grunnlagsdata {
    pub fn har_eps(&self) -> bool {
        self.bosituasjon.map(|b| b.har_eps()).unwrap_or(false)
    }

    /// Checks that registered fradrag are of a registrable type and lie within the stønadsperiode
    pub fn valider_fradrag(fradrag: &[Fradrag], stonadsperiode: &Periode) -> Result<(), SoknadsbehandlingError> {
        for f in fradrag {
            if !f.fradragstype.kan_registreres() {
                return Err(SoknadsbehandlingError::UgyldigFradragstype(f.fradragstype));
            }
            if !stonadsperiode.inneholder(&f.periode) {
                return Err(SoknadsbehandlingError::FradragUtenforStonadsperiode);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Maned, Money};
    use domain_beregning::{FradragTilhorer, Fradragstype};
    use rust_decimal_macros::dec;

    fn periode(fra: (i32, u32), til: (i32, u32)) -> Periode {
        Periode::for_maneder(Maned::new(fra.0, fra.1).unwrap(), Maned::new(til.0, til.1).unwrap()).unwrap()
    }

    #[test]
    fn test_fradrag_outside_stonadsperiode_is_rejected() {
        let stonadsperiode = periode((2021, 1), (2021, 12));
        let innenfor = Fradrag::new(
            Fradragstype::Arbeidsinntekt,
            Money::nok(dec!(1000)),
            periode((2021, 3), (2021, 4)),
            FradragTilhorer::Bruker,
        );
        let utenfor = Fradrag::new(
            Fradragstype::Arbeidsinntekt,
            Money::nok(dec!(1000)),
            periode((2021, 12), (2022, 1)),
            FradragTilhorer::Bruker,
        );

        assert!(Grunnlagsdata::valider_fradrag(&[innenfor], &stonadsperiode).is_ok());
        assert_eq!(
            Grunnlagsdata::valider_fradrag(&[utenfor], &stonadsperiode),
            Err(SoknadsbehandlingError::FradragUtenforStonadsperiode)
        );
    }

    #[test]
    fn test_derived_fradragstype_is_rejected() {
        let stonadsperiode = periode((2021, 1), (2021, 12));
        let eps = Fradrag::new(
            Fradragstype::BeregnetFradragEps,
            Money::nok(dec!(1000)),
            stonadsperiode,
            FradragTilhorer::Eps,
        );
        assert_eq!(
            Grunnlagsdata::valider_fradrag(&[eps], &stonadsperiode),
            Err(SoknadsbehandlingError::UgyldigFradragstype(Fradragstype::BeregnetFradragEps))
        );
    }
}
