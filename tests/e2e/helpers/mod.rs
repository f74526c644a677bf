use sprachgenerator::controllers::{catalog::CatalogController, speech::SpeechController};
use sprachgenerator::domain::catalog::Catalog;
use sprachgenerator::domain::speech::{OrchestratorSettings, SpeechOrchestrator};
use sprachgenerator::infrastructure::http::create_router;
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;

pub mod api_client;
pub mod mocks;

use api_client::TestClient;
use mocks::{MockSynthesisRepository, RecordingSink};

pub struct TestContext {
    pub client: TestClient,
    pub repository: Arc<MockSynthesisRepository>,
    pub sink: Arc<RecordingSink>,
    pub orchestrator: Arc<SpeechOrchestrator>,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let repository = Arc::new(MockSynthesisRepository::default());
            let sink = Arc::new(RecordingSink::default());
            let catalog = Arc::new(Catalog::builtin());

            let settings = OrchestratorSettings {
                synthesis_timeout: Duration::from_secs(5),
                ..Default::default() // Cache disabled to keep transport calls observable
            };
            let orchestrator = Arc::new(SpeechOrchestrator::new(
                repository.clone(),
                sink.clone(),
                settings,
            ));

            let app = create_router(
                Arc::new(SpeechController::new(orchestrator.clone(), catalog.clone())),
                Arc::new(CatalogController::new(catalog)),
            );

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                client: TestClient::new(&base_url),
                repository,
                sink,
                orchestrator,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            self.orchestrator.cancel().await;
        }
    }
}
