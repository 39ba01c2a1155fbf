//! Custom Test Assertions
//!
//! Assertion helpers for cases and call logs that give more meaningful
//! failure messages than bare `assert_eq!`.

use domain_soknadsbehandling::ports::mock::KallLogg;
use domain_soknadsbehandling::{
    EksterneIverksettingssteg, Soknadsbehandling, SoknadsbehandlingError, SoknadsbehandlingStatus,
};

/// Asserts the case is in `expected`
pub fn assert_status(behandling: &Soknadsbehandling, expected: SoknadsbehandlingStatus) {
    assert_eq!(
        behandling.status(),
        expected,
        "behandling {} is {}, expected {}",
        behandling.id(),
        behandling.status(),
        expected
    );
}

/// Asserts the error is an illegal transition out of `fra`
pub fn assert_ugyldig_overgang_fra(error: &SoknadsbehandlingError, fra: SoknadsbehandlingStatus) {
    match error {
        SoknadsbehandlingError::UgyldigStatusovergang { fra: faktisk, .. } => assert_eq!(
            *faktisk, fra,
            "illegal transition reported from {}, expected from {}",
            faktisk, fra
        ),
        other => panic!("expected illegal transition from {}, got {:?}", fra, other),
    }
}

/// Asserts where the case is in the journal/distribute sequence
pub fn assert_steg(behandling: &Soknadsbehandling, expected: Option<&EksterneIverksettingssteg>) {
    assert_eq!(
        behandling.eksterne_iverksettingssteg(),
        expected,
        "behandling {} has unexpected iverksettingssteg",
        behandling.id()
    );
}

/// Asserts that calls starting with the given prefixes happened in this order
///
/// Other calls may be interleaved.
pub async fn assert_kall_i_rekkefolge(logg: &KallLogg, prefixes: &[&str]) {
    let kall = logg.kall().await;
    let mut neste = 0;
    for k in &kall {
        if neste < prefixes.len() && k.starts_with(prefixes[neste]) {
            neste += 1;
        }
    }
    assert_eq!(
        neste,
        prefixes.len(),
        "expected calls {:?} in order, got {:?}",
        prefixes,
        kall
    );
}

/// Asserts no call starting with `prefix` was made
pub async fn assert_ingen_kall(logg: &KallLogg, prefix: &str) {
    let antall = logg.antall(prefix).await;
    assert_eq!(
        antall,
        0,
        "expected no {} calls, got {:?}",
        prefix,
        logg.kall().await
    );
}
