//! Provider selection and failover
//!
//! Holds every configured provider adapter in declaration order and tracks
//! which one is active. The active adapter can be switched at runtime, but
//! only after the candidate passes a liveness probe; a failed switch leaves
//! the previous active provider in place.

use crate::config::AppConfig;
use crate::error::{Result, SqlPilotError};
use crate::llm::provider::ProviderAdapter;
use crate::llm::providers::{GroqAdapter, LmStudioAdapter, OllamaAdapter};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Registry of configured providers with one active at a time
pub struct ProviderSelector {
    // declaration order drives startup fallback, so no HashMap here
    adapters: Vec<(String, Arc<dyn ProviderAdapter>)>,
    active: RwLock<Arc<dyn ProviderAdapter>>,
}

impl ProviderSelector {
    /// Build a selector from explicit adapters.
    ///
    /// The first adapter becomes the initial active one; callers that want a
    /// probed startup should follow up with [`initialize`](Self::initialize).
    pub fn new(adapters: Vec<(String, Arc<dyn ProviderAdapter>)>) -> Result<Self> {
        let first = adapters
            .first()
            .map(|(_, adapter)| Arc::clone(adapter))
            .ok_or_else(|| SqlPilotError::Config("no providers configured".to_string()))?;
        Ok(Self {
            adapters,
            active: RwLock::new(first),
        })
    }

    /// Build a selector from application configuration.
    ///
    /// The configured default provider is placed first so that startup
    /// fallback tries it before the others. Groq is skipped with a warning
    /// when no API key is present; the local providers need no credentials.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut adapters: Vec<(String, Arc<dyn ProviderAdapter>)> = Vec::new();

        match GroqAdapter::new(&config.groq, config.llm_timeout_secs) {
            Ok(adapter) => adapters.push(("groq".to_string(), Arc::new(adapter))),
            Err(e) => warn!("groq provider not configured: {}", e),
        }
        adapters.push((
            "ollama".to_string(),
            Arc::new(OllamaAdapter::new(&config.ollama, config.llm_timeout_secs)?),
        ));
        adapters.push((
            "lmstudio".to_string(),
            Arc::new(LmStudioAdapter::new(
                &config.lmstudio,
                config.llm_timeout_secs,
            )?),
        ));

        if let Some(pos) = adapters
            .iter()
            .position(|(name, _)| name == &config.default_provider)
        {
            adapters.rotate_left(pos);
        } else {
            return Err(SqlPilotError::UnknownProvider(
                config.default_provider.clone(),
            ));
        }

        Self::new(adapters)
    }

    /// Names of all configured providers, in fallback order
    pub fn provider_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Snapshot of the currently active adapter.
    ///
    /// Callers hold the returned Arc for the duration of a whole question so
    /// a concurrent switch cannot change providers mid-conversation.
    pub async fn current(&self) -> Arc<dyn ProviderAdapter> {
        Arc::clone(&*self.active.read().await)
    }

    /// Probe a provider by name without changing the active one
    pub async fn probe(&self, name: &str) -> Result<()> {
        self.get(name)?.probe().await
    }

    /// Switch the active provider to `name`.
    ///
    /// The candidate must pass its liveness probe first; on any failure the
    /// previously active provider stays active.
    pub async fn switch(&self, name: &str) -> Result<()> {
        let candidate = self.get(name)?;
        candidate.probe().await?;
        *self.active.write().await = Arc::clone(&candidate);
        info!(provider = name, "active provider switched");
        Ok(())
    }

    /// Probe providers in fallback order and activate the first live one.
    ///
    /// Errors only when every configured provider fails its probe.
    pub async fn initialize(&self) -> Result<()> {
        for (name, adapter) in &self.adapters {
            match adapter.probe().await {
                Ok(()) => {
                    *self.active.write().await = Arc::clone(adapter);
                    info!(provider = %name, "provider is live, selected as active");
                    return Ok(());
                }
                Err(e) => warn!(provider = %name, "provider probe failed: {}", e),
            }
        }
        Err(SqlPilotError::provider_unavailable(
            "all",
            "no configured provider answered its liveness probe",
        ))
    }

    fn get(&self, name: &str) -> Result<Arc<dyn ProviderAdapter>> {
        self.adapters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, adapter)| Arc::clone(adapter))
            .ok_or_else(|| SqlPilotError::UnknownProvider(name.to_string()))
    }
}
