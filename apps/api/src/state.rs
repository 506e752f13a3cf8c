use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::analysis::narrative::NarrativeGenerator;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Pluggable narrative backend. LLM when an API key is configured, template otherwise.
    pub narrative: Arc<dyn NarrativeGenerator>,
}

impl AppState {
    pub fn narrative_timeout(&self) -> Duration {
        Duration::from_secs(self.config.narrative_timeout_secs)
    }
}
