//! Common test utilities for integration tests.

use auth_client::AuthClient;
use reset_flow::{
    FileStorage, FlowCallbacks, FlowSettings, ManualClock, OtpStore, ResetFlow,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

/// A flow wired to a mock backend and on-disk storage in a temp dir.
pub struct TestFlow {
    pub flow: ResetFlow,
    pub store: OtpStore,
    pub clock: Arc<ManualClock>,
    pub closed: Arc<AtomicUsize>,
    pub succeeded: Arc<AtomicUsize>,
    pub dir: TempDir,
}

impl TestFlow {
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }
}

/// Create a reset flow configured for a mock server.
pub fn test_flow(mock_server: &MockServer) -> TestFlow {
    let dir = tempfile::tempdir().unwrap();
    test_flow_in(mock_server, dir)
}

/// Same as [`test_flow`] but reusing an existing storage directory.
pub fn test_flow_in(mock_server: &MockServer, dir: TempDir) -> TestFlow {
    flow_for(&mock_server.uri(), dir)
}

/// A flow whose backend lives at `base_url`, which need not be listening.
pub fn test_flow_at(base_url: &str) -> TestFlow {
    flow_for(base_url, tempfile::tempdir().unwrap())
}

fn flow_for(base_url: &str, dir: TempDir) -> TestFlow {
    let client = AuthClient::new(base_url, Duration::from_secs(5)).unwrap();
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let store = OtpStore::new(Arc::new(FileStorage::new(dir.path())), clock.clone());

    let closed = Arc::new(AtomicUsize::new(0));
    let succeeded = Arc::new(AtomicUsize::new(0));
    let callbacks = {
        let closed = closed.clone();
        let succeeded = succeeded.clone();
        FlowCallbacks::new(move || {
            closed.fetch_add(1, Ordering::SeqCst);
        })
        .on_success(move || {
            succeeded.fetch_add(1, Ordering::SeqCst);
        })
    };
    let settings = FlowSettings {
        success_delay: Duration::from_millis(10),
        unauthorized_close_delay: Duration::from_millis(10),
    };

    TestFlow {
        flow: ResetFlow::new(Arc::new(client), store.clone(), callbacks, settings),
        store,
        clock,
        closed,
        succeeded,
        dir,
    }
}
