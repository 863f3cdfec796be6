//! In-process test harness.
//!
//! Each test gets its own mock backend and a `ServerDeps` wired the way the
//! binary wires the real one. Role cache expiry follows tokio's clock, so
//! tests that need it call `tokio::time::pause()` and `advance`.

use axum::Router;
use elverra_core::domains::auth::{AuthSettings, SessionResolver};
use elverra_core::domains::i18n::{Catalog, Language};
use elverra_core::domains::membership::MembershipApiClient;
use elverra_core::kernel::{MockAuthBackend, ServerDeps};
use elverra_core::server::build_app;
use std::sync::Arc;
use test_context::AsyncTestContext;

use super::{fixtures, HttpClient};

/// Nothing listens here; membership calls fail fast unless a test overrides it
pub const UNUSED_API_BASE: &str = "http://127.0.0.1:9";

/// Test harness holding the dependencies of one in-process server.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let response = ctx.http().get("/health", None).await;
/// }
/// ```
pub struct TestHarness {
    /// Seeded mock backend - inspect call counters through it
    pub backend: Arc<MockAuthBackend>,
    pub deps: ServerDeps,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new(fixtures::seeded_backend(), UNUSED_API_BASE)
    }

    async fn teardown(self) {}
}

impl TestHarness {
    pub fn new(backend: MockAuthBackend, api_base_url: &str) -> Self {
        // Respect RUST_LOG; try_init because every test builds a harness
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let backend = Arc::new(backend);
        let deps = ServerDeps::new(
            backend.clone(),
            AuthSettings::default(),
            Arc::new(MockAuthBackend::token_verifier()),
            Arc::new(Catalog::embedded().expect("embedded catalogs parse")),
            Language::En,
            MembershipApiClient::new(api_base_url),
        );

        Self { backend, deps }
    }

    pub fn app(&self) -> Router {
        build_app(self.deps.clone(), &[])
    }

    pub fn http(&self) -> HttpClient {
        HttpClient::new(self.app())
    }

    /// Resolver sharing this harness's role cache
    pub fn resolver(&self) -> SessionResolver {
        self.deps.session_resolver()
    }
}
