//! Per-test state cache and the record/replay lifecycle around a test.
//!
//! A [`Harness`] owns two independently locked maps keyed by test identity:
//! configured clients and randomness sources. The first lookup for a test
//! builds its client (with the mode's interceptor installed), later lookups
//! share it, and [`Harness::teardown`] persists recordings and forgets both
//! entries so the identity can be reused.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::adapters::recording::RecordingTransport;
use crate::adapters::replaying::ReplayingTransport;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::store::{CassetteStore, OpenCassette};
use crate::client::{Client, RetryPolicy};
use crate::config::VcrConfig;
use crate::error::{BoxError, Result, VcrError};
use crate::mode::Mode;
use crate::ports::env::{EnvProvider, RealEnv};
use crate::ports::session::SessionProvider;
use crate::ports::transport::HttpTransport;
use crate::random::{RandomSource, RandomnessManager};

/// Everything one test's HTTP traffic flows through.
pub struct TestState {
    mode: Mode,
    client: Client,
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl TestState {
    /// Mode the state was built in.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The client bound to this test's cassette.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Number of interactions captured so far (recording only).
    #[must_use]
    pub fn recorded(&self) -> usize {
        self.recorder.as_ref().map_or(0, |recorder| recorder.lock().interactions().len())
    }
}

/// Handle passed to a unit of work run by [`Harness::run`].
#[derive(Clone)]
pub struct TestContext {
    test: String,
    client: Client,
    randomness: Arc<RandomnessManager>,
}

impl TestContext {
    /// Test identity.
    #[must_use]
    pub fn test(&self) -> &str {
        &self.test
    }

    /// The test's configured client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The test's randomness source.
    ///
    /// # Errors
    ///
    /// Returns an error when replaying without a usable seed file.
    pub fn random(&self) -> Result<Arc<RandomSource>> {
        self.randomness.source_for(&self.test)
    }
}

/// Record/replay harness context. Several may coexist in one process.
pub struct Harness {
    mode: Mode,
    store: Option<CassetteStore>,
    session: Arc<dyn SessionProvider>,
    retry: RetryPolicy,
    states: RwLock<HashMap<String, Arc<TestState>>>,
    randomness: Arc<RandomnessManager>,
}

impl Harness {
    /// Creates a harness in an explicit mode.
    ///
    /// Without a storage directory the harness is disabled whatever `mode` says.
    pub fn new(mode: Mode, dir: Option<PathBuf>, session: Arc<dyn SessionProvider>) -> Self {
        let store = dir.map(CassetteStore::new);
        let mode = if store.is_some() { mode } else { Mode::Disabled };
        Self {
            mode,
            randomness: Arc::new(RandomnessManager::new(mode, store.clone())),
            store,
            session,
            retry: RetryPolicy::default(),
            states: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a harness from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for an unrecognized mode selector.
    pub fn from_config(config: &VcrConfig, session: Arc<dyn SessionProvider>) -> Result<Self> {
        let mode = config.resolve()?;
        tracing::info!(%mode, path = ?config.path, "record/replay harness configured");
        Ok(Self::new(mode, config.path.clone(), session))
    }

    /// Creates a harness from `VCR_MODE` / `VCR_PATH` in the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error for an unrecognized mode selector.
    pub fn from_env(session: Arc<dyn SessionProvider>) -> Result<Self> {
        Self::from_env_provider(&RealEnv, session)
    }

    /// Creates a harness from configuration read through `env`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unrecognized mode selector.
    pub fn from_env_provider(
        env: &dyn EnvProvider,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self> {
        Self::from_config(&VcrConfig::from_env(env), session)
    }

    /// Replaces the retry policy given to every client built afterwards.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Resolved mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Cassette store, unless disabled for lack of a directory.
    #[must_use]
    pub fn store(&self) -> Option<&CassetteStore> {
        self.store.as_ref()
    }

    /// Returns the state for `test`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot supply a transport or, when
    /// replaying, the cassette cannot be loaded.
    pub fn state_for(&self, test: &str) -> Result<Arc<TestState>> {
        if let Some(state) = self.states.read().get(test) {
            return Ok(Arc::clone(state));
        }

        // Built outside the lock: loading a cassette does file I/O.
        let built = Arc::new(self.build_state(test)?);
        let mut states = self.states.write();
        let state = states.entry(test.to_string()).or_insert(built);
        Ok(Arc::clone(state))
    }

    /// The configured client for `test`.
    ///
    /// # Errors
    ///
    /// See [`state_for`](Self::state_for).
    pub fn client(&self, test: &str) -> Result<Client> {
        Ok(self.state_for(test)?.client().clone())
    }

    /// The randomness source for `test`.
    ///
    /// # Errors
    ///
    /// Returns an error when replaying without a usable seed file.
    pub fn random(&self, test: &str) -> Result<Arc<RandomSource>> {
        self.randomness.source_for(test)
    }

    /// Returns `true` if either cache holds an entry for `test`.
    #[must_use]
    pub fn contains(&self, test: &str) -> bool {
        self.states.read().contains_key(test) || self.randomness.contains(test)
    }

    /// Ends a test.
    ///
    /// A passing recorded test has its cassette and seed written. Both cache
    /// entries are removed whatever the outcome. A failed test writes
    /// nothing, so a partial recording never replaces a good one.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette or seed file cannot be written.
    pub fn teardown(&self, test: &str, failed: bool) -> Result<()> {
        let state = self.states.write().remove(test);
        let result = match state {
            Some(state) if !failed => self.persist(test, &state),
            Some(state) => {
                if state.recorder.is_some() {
                    tracing::warn!(test, "test failed; recording discarded");
                }
                Ok(())
            }
            None => Ok(()),
        };
        self.randomness.remove(test);
        result
    }

    /// Runs `work` as test `test`: installs state, awaits it, tears down.
    ///
    /// # Errors
    ///
    /// Returns [`VcrError::Test`] when `work` fails, otherwise any setup or
    /// teardown error.
    pub async fn run<F, Fut, T>(&self, test: &str, work: F) -> Result<T>
    where
        F: FnOnce(TestContext) -> Fut,
        Fut: Future<Output = std::result::Result<T, BoxError>>,
    {
        let state = match self.state_for(test) {
            Ok(state) => state,
            Err(err) => {
                self.teardown(test, true)?;
                return Err(err);
            }
        };
        let ctx = TestContext {
            test: test.to_string(),
            client: state.client().clone(),
            randomness: Arc::clone(&self.randomness),
        };
        drop(state);

        let outcome = work(ctx).await;
        let teardown = self.teardown(test, outcome.is_err());
        match (outcome, teardown) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), teardown) => {
                if let Err(teardown_err) = teardown {
                    tracing::warn!(test, error = %teardown_err, "teardown failed");
                }
                Err(VcrError::Test(err))
            }
        }
    }

    fn build_state(&self, test: &str) -> Result<TestState> {
        let opened = match &self.store {
            Some(store) => store.open(test, self.mode)?,
            None => None,
        };

        let (transport, recorder): (Arc<dyn HttpTransport>, _) = match opened {
            None => (self.session.base_transport()?, None),
            Some(OpenCassette::Recording(recorder)) => {
                let recorder = Arc::new(Mutex::new(recorder));
                let base = self.session.base_transport()?;
                let transport: Arc<dyn HttpTransport> =
                    Arc::new(RecordingTransport::new(base, Arc::clone(&recorder)));
                (transport, Some(recorder))
            }
            Some(OpenCassette::Replaying(replayer)) => {
                let transport: Arc<dyn HttpTransport> = Arc::new(ReplayingTransport::new(replayer));
                (transport, None)
            }
        };

        // Replayed responses are already final; backing off only slows the run.
        let retry = match self.mode {
            Mode::Replaying => self.retry.without_delay(),
            Mode::Disabled | Mode::Recording => self.retry,
        };
        tracing::debug!(test, mode = %self.mode, "built test state");
        let client = Client::new(transport).with_retry(retry);
        Ok(TestState { mode: self.mode, client, recorder })
    }

    fn persist(&self, test: &str, state: &TestState) -> Result<()> {
        let Some(recorder) = &state.recorder else {
            return Ok(());
        };
        recorder.lock().flush()?;
        self.randomness.persist_seed(test)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ports::transport::{HttpRequest, HttpResponse, TransportFuture};

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl HttpTransport for Counting {
        fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(HttpResponse::new(200, format!("{} #{n}", request.url))) })
        }
    }

    fn session(transport: &Arc<Counting>) -> Arc<dyn SessionProvider> {
        let transport = Arc::clone(transport);
        Arc::new(move || -> Result<Arc<dyn HttpTransport>> {
            let transport: Arc<dyn HttpTransport> = transport.clone();
            Ok(transport)
        })
    }

    #[test]
    fn missing_dir_forces_disabled() {
        let net = Arc::new(Counting::default());
        let harness = Harness::new(Mode::Recording, None, session(&net));
        assert_eq!(harness.mode(), Mode::Disabled);
    }

    #[test]
    fn state_is_shared_until_teardown() {
        let dir = tempfile::tempdir().unwrap();
        let net = Arc::new(Counting::default());
        let harness = Harness::new(Mode::Recording, Some(dir.path().into()), session(&net));

        let a = harness.state_for("Suite/A").unwrap();
        let again = harness.state_for("Suite/A").unwrap();
        let b = harness.state_for("Suite/B").unwrap();
        assert!(Arc::ptr_eq(&a, &again));
        assert!(!Arc::ptr_eq(&a, &b));
        harness.random("Suite/A").unwrap();
        assert!(harness.contains("Suite/A"));

        harness.teardown("Suite/A", false).unwrap();
        assert!(!harness.contains("Suite/A"));
        let fresh = harness.state_for("Suite/A").unwrap();
        assert!(!Arc::ptr_eq(&a, &fresh));
        assert!(harness.contains("Suite/B"));
    }

    #[tokio::test]
    async fn failed_test_persists_nothing_but_is_forgotten() {
        let dir = tempfile::tempdir().unwrap();
        let net = Arc::new(Counting::default());
        let harness = Harness::new(Mode::Recording, Some(dir.path().into()), session(&net))
            .with_retry(RetryPolicy::none());

        let result: Result<()> = harness
            .run("Suite/Fails", |ctx| async move {
                ctx.random()?.rand_int();
                ctx.client().get("https://api/x").await?;
                Err::<(), BoxError>("assertion failed".into())
            })
            .await;

        assert!(matches!(result, Err(VcrError::Test(_))));
        assert_eq!(net.calls.load(Ordering::SeqCst), 1);
        assert!(!harness.contains("Suite/Fails"));
        assert!(!dir.path().join("Suite_Fails.cassette").exists());
        assert!(!dir.path().join("Suite_Fails.seed").exists());
    }

    #[tokio::test]
    async fn recorder_counts_exchanges_until_teardown() {
        let dir = tempfile::tempdir().unwrap();
        let net = Arc::new(Counting::default());
        let harness = Harness::new(Mode::Recording, Some(dir.path().into()), session(&net));

        let state = harness.state_for("Suite/Count").unwrap();
        assert_eq!(state.mode(), Mode::Recording);
        assert_eq!(state.recorded(), 0);
        state.client().get("https://api/a").await.unwrap();
        state.client().get("https://api/b").await.unwrap();
        assert_eq!(state.recorded(), 2);

        harness.teardown("Suite/Count", false).unwrap();
        assert_eq!(harness.store().unwrap().load("Suite/Count").unwrap().interactions.len(), 2);
    }

    #[tokio::test]
    async fn unwritable_store_fails_teardown_and_forgets_test() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let net = Arc::new(Counting::default());
        let harness = Harness::new(Mode::Recording, Some(blocker), session(&net));

        let result = harness
            .run("Suite/Blocked", |ctx| async move {
                ctx.random()?.rand_int();
                ctx.client().get("https://api/x").await?;
                Ok::<_, BoxError>(())
            })
            .await;

        assert!(matches!(result, Err(VcrError::Io { .. })), "{result:?}");
        assert!(!harness.contains("Suite/Blocked"));
    }

    #[test]
    fn replay_clients_retry_without_backoff() {
        let dir = tempfile::tempdir().unwrap();
        CassetteRecorder::new(dir.path().join("Suite_Retry.cassette"), "Suite_Retry")
            .flush()
            .unwrap();
        let net = Arc::new(Counting::default());
        let retry = RetryPolicy { max_attempts: 4, base_delay: std::time::Duration::from_secs(1) };

        let replaying = Harness::new(Mode::Replaying, Some(dir.path().into()), session(&net))
            .with_retry(retry);
        let policy = replaying.client("Suite/Retry").unwrap().retry_policy();
        assert_eq!(policy.max_attempts, 4);
        assert!(policy.base_delay.is_zero());

        let recording = Harness::new(Mode::Recording, Some(dir.path().into()), session(&net))
            .with_retry(retry);
        assert_eq!(recording.client("Suite/Retry").unwrap().retry_policy(), retry);
    }

    #[tokio::test]
    async fn replay_setup_error_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let net = Arc::new(Counting::default());
        let harness = Harness::new(Mode::Replaying, Some(dir.path().into()), session(&net));

        let result: Result<()> = harness.run("Never/Recorded", |_ctx| async { Ok(()) }).await;
        assert!(matches!(result, Err(VcrError::CassetteNotFound { .. })));
        assert!(!harness.contains("Never/Recorded"));
        assert_eq!(net.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn disabled_mode_passes_through_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let net = Arc::new(Counting::default());
        let harness = Harness::new(Mode::Disabled, Some(dir.path().into()), session(&net));

        let body = harness
            .run("Suite/Live", |ctx| async move {
                assert_eq!(ctx.random()?.seed(), None);
                Ok::<_, BoxError>(ctx.client().get("https://api/live").await?.text())
            })
            .await
            .unwrap();

        assert_eq!(body, "https://api/live #0");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn parallel_tests_record_independent_cassettes() {
        let dir = tempfile::tempdir().unwrap();
        let net = Arc::new(Counting::default());
        let harness =
            Arc::new(Harness::new(Mode::Recording, Some(dir.path().into()), session(&net)));

        let mut handles = Vec::new();
        for i in 0..8 {
            let harness = Arc::clone(&harness);
            handles.push(tokio::spawn(async move {
                let test = format!("Parallel/Case{i}");
                harness
                    .run(&test, |ctx| async move {
                        for _ in 0..=i {
                            ctx.client().get(format!("https://api/{i}")).await?;
                        }
                        Ok::<_, BoxError>(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let store = harness.store().unwrap();
        for i in 0..8 {
            let cassette = store.load(&format!("Parallel/Case{i}")).unwrap();
            assert_eq!(cassette.interactions.len(), i + 1);
            assert!(cassette
                .interactions
                .iter()
                .all(|interaction| interaction.request.url == format!("https://api/{i}")));
        }
    }
}
