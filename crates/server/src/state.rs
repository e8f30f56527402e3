use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agent_core::{Config, SessionStore};
use digits::DigitClassifier;
use tokio::sync::RwLock;
use tracing::{error, warn};

use crate::errors::AppError;
use crate::rag::RagService;

/// Shared state for all request handlers. The RAG service is built
/// lazily on the first chat request so the server starts even when the
/// index has not been created yet.
pub struct AppState {
    pub config: Config,
    rag: RwLock<Option<Arc<RagService>>>,
    pub sessions: Mutex<SessionStore>,
    pub classifier: Option<Arc<DigitClassifier>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let classifier = match DigitClassifier::load(Path::new(&config.digits.model_path)) {
            Ok(classifier) => Some(Arc::new(classifier)),
            Err(e) => {
                warn!(error = %e, "digit classifier unavailable");
                None
            }
        };

        let sessions = Self::session_store(&config);
        Self {
            config,
            rag: RwLock::new(None),
            sessions,
            classifier,
        }
    }

    /// Builds state without touching the classifier model file.
    pub fn without_classifier(config: Config) -> Self {
        let sessions = Self::session_store(&config);
        Self {
            config,
            rag: RwLock::new(None),
            sessions,
            classifier: None,
        }
    }

    fn session_store(config: &Config) -> Mutex<SessionStore> {
        Mutex::new(SessionStore::new(Duration::from_secs(
            config.server.session_ttl_secs,
        )))
    }

    pub async fn is_rag_initialized(&self) -> bool {
        self.rag.read().await.is_some()
    }

    /// Returns the RAG service, initializing it on first use.
    pub async fn rag_service(&self) -> Result<Arc<RagService>, AppError> {
        if let Some(service) = self.rag.read().await.as_ref() {
            return Ok(service.clone());
        }

        let mut guard = self.rag.write().await;
        // Another request may have won the race for the write lock.
        if let Some(service) = guard.as_ref() {
            return Ok(service.clone());
        }

        match RagService::initialize(&self.config).await {
            Ok(service) => {
                let service = Arc::new(service);
                *guard = Some(service.clone());
                Ok(service)
            }
            Err(e) => {
                error!(error = %e, "chatbot initialization failed");
                Err(AppError::InitError(
                    "Failed to initialize chatbot. Please check your API key and notes directory."
                        .to_string(),
                ))
            }
        }
    }
}
