//! Mock Port Wiring
//!
//! Assembles the in-memory ports from `domain_soknadsbehandling::ports::mock`
//! around one shared [`KallLogg`]. Tweak a mock by replacing its field before
//! calling [`TestPorts::ports`]; the clones handed to the services share state
//! with the fields kept here.

use std::sync::Arc;

use domain_soknadsbehandling::ports::mock::{
    InMemorySoknadRepo, InMemorySoknadsbehandlingRepo, KallLogg, MockBrevPort, MockDirectoryPort,
    MockOppgavePort, MockPersonPort, MockUtbetalingPort, RecordingStatistikkObserver,
};
use domain_soknadsbehandling::{
    Ports, Soknad, SoknadRepo, Soknadsbehandling, SoknadsbehandlingRepo, SoknadsbehandlingService,
};

/// Every mock port plus the call log they write to
#[derive(Clone)]
pub struct TestPorts {
    pub logg: KallLogg,
    pub behandlinger: InMemorySoknadsbehandlingRepo,
    pub soknader: InMemorySoknadRepo,
    pub person: MockPersonPort,
    pub directory: MockDirectoryPort,
    pub brev: MockBrevPort,
    pub oppgave: MockOppgavePort,
    pub utbetaling: MockUtbetalingPort,
}

impl Default for TestPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPorts {
    pub fn new() -> Self {
        let logg = KallLogg::new();
        Self {
            behandlinger: InMemorySoknadsbehandlingRepo::new(),
            soknader: InMemorySoknadRepo::new(),
            person: MockPersonPort::new(logg.clone()),
            directory: MockDirectoryPort::new(logg.clone()),
            brev: MockBrevPort::new(logg.clone()),
            oppgave: MockOppgavePort::new(logg.clone()),
            utbetaling: MockUtbetalingPort::new(logg.clone()),
            logg,
        }
    }

    pub fn ports(&self) -> Ports {
        Ports {
            behandlinger: Arc::new(self.behandlinger.clone()),
            soknader: Arc::new(self.soknader.clone()),
            person: Arc::new(self.person.clone()),
            directory: Arc::new(self.directory.clone()),
            brev: Arc::new(self.brev.clone()),
            oppgave: Arc::new(self.oppgave.clone()),
            utbetaling: Arc::new(self.utbetaling.clone()),
        }
    }

    /// A service over these ports with a recording observer attached
    pub fn service(&self) -> (SoknadsbehandlingService, Arc<RecordingStatistikkObserver>) {
        let observer = Arc::new(RecordingStatistikkObserver::new());
        let service = SoknadsbehandlingService::new(self.ports()).with_observer(observer.clone());
        (service, observer)
    }

    pub async fn lagre_soknad(&self, soknad: &Soknad) {
        self.soknader
            .lagre_soknad(soknad)
            .await
            .expect("in-memory søknad write");
    }

    /// Stores a built case the way the services would, bumping its version
    pub async fn lagre(&self, behandling: &mut Soknadsbehandling) {
        behandling.oppdater_versjon();
        self.behandlinger
            .lagre(behandling)
            .await
            .expect("in-memory behandling write");
    }

    pub async fn hent(&self, behandling: &Soknadsbehandling) -> Soknadsbehandling {
        self.behandlinger
            .hent(behandling.id())
            .await
            .expect("in-memory read")
            .expect("stored behandling")
    }
}
