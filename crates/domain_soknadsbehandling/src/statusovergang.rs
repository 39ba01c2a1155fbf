//! Legal status transitions
//!
//! Every status change on the aggregate goes through [`valider`]. The table
//! below is the complete list of allowed edges; anything else is an
//! `UgyldigStatusovergang`.
//!
//! | til | allowed fra |
//! |---|---|
//! | Uavklart, Vilkarsvurdert(_) | Uavklart, Vilkarsvurdert, Beregnet, Simulert, Underkjent |
//! | Beregnet(_) | Vilkarsvurdert(Innvilget), Beregnet, Simulert, Underkjent |
//! | Simulert | Beregnet(Innvilget), Simulert, Underkjent(Innvilget) |
//! | TilAttestering(Innvilget) | Simulert, Underkjent(Innvilget) |
//! | TilAttestering(Avslag) | Vilkarsvurdert(Avslag), Beregnet(Avslag), Underkjent(Avslag) |
//! | Underkjent(u), Iverksatt(u) | TilAttestering(u) |

use crate::error::SoknadsbehandlingError;
use crate::status::{SoknadsbehandlingStatus as Status, Utfall};

/// True if `fra → til` is a legal edge
pub fn er_lovlig(fra: Status, til: Status) -> bool {
    use Utfall::{Avslag, Innvilget};

    let kan_revurderes = matches!(
        fra,
        Status::Uavklart
            | Status::Vilkarsvurdert(_)
            | Status::Beregnet(_)
            | Status::Simulert
            | Status::Underkjent(_)
    );

    match til {
        Status::Uavklart | Status::Vilkarsvurdert(_) => kan_revurderes,
        Status::Beregnet(_) => matches!(
            fra,
            Status::Vilkarsvurdert(Innvilget)
                | Status::Beregnet(_)
                | Status::Simulert
                | Status::Underkjent(_)
        ),
        Status::Simulert => matches!(
            fra,
            Status::Beregnet(Innvilget) | Status::Simulert | Status::Underkjent(Innvilget)
        ),
        Status::TilAttestering(Innvilget) => {
            matches!(fra, Status::Simulert | Status::Underkjent(Innvilget))
        }
        Status::TilAttestering(Avslag) => matches!(
            fra,
            Status::Vilkarsvurdert(Avslag) | Status::Beregnet(Avslag) | Status::Underkjent(Avslag)
        ),
        Status::Underkjent(u) | Status::Iverksatt(u) => fra == Status::TilAttestering(u),
    }
}

/// Validates a transition, returning the typed error for illegal edges
pub fn valider(fra: Status, til: Status) -> Result<(), SoknadsbehandlingError> {
    if er_lovlig(fra, til) {
        Ok(())
    } else {
        Err(SoknadsbehandlingError::ugyldig_overgang(fra, til))
    }
}
