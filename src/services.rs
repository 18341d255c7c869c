use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::db_storage::LeadRepository;
use crate::errors::AppError;
use crate::models::{Lead, LeadCreate, NewLead};

/// Hard bound on the enrichment round-trip. External APIs can hang; a lead
/// submission must not hang with them.
const ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the third-party source that supplies birth dates.
///
/// Enrichment is best-effort by contract: this client never returns an error
/// to its callers. Every failure category is logged and collapsed into `None`.
#[derive(Clone)]
pub struct BirthDateService {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl BirthDateService {
    pub fn new(base_url: String) -> Self {
        Self::with_timeout(base_url, ENRICHMENT_TIMEOUT)
    }

    /// Constructor with an explicit timeout so tests can exercise the timeout
    /// path without waiting out the production bound.
    pub fn with_timeout(base_url: String, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url,
            timeout,
        }
    }

    /// Issues a single GET against the upstream and extracts the `birthDate`
    /// field from its JSON body.
    ///
    /// Returns `None` on timeout, connection failure, non-2xx status, an
    /// undecodable body, or a body without the field. The failure is logged
    /// with its category for diagnostics; the caller only ever sees absence.
    pub async fn fetch_birth_date(&self) -> Option<String> {
        let response = match self
            .client
            .get(&self.base_url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // Connection-level failure (timeout, DNS, refused connection)
                tracing::error!("Birth date API connection error: {}", e);
                return None;
            }
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Birth date API returned error status: {}", e);
                return None;
            }
        };

        match response.json::<Value>().await {
            Ok(data) => data
                .get("birthDate")
                .and_then(|v| v.as_str())
                .map(String::from),
            Err(e) => {
                tracing::error!("Failed to parse birth date API response: {}", e);
                None
            }
        }
    }
}

/// Orchestrates lead creation and retrieval: the one place where validation
/// output, the enrichment client and the record store interact.
#[derive(Clone)]
pub struct LeadService {
    repository: Arc<dyn LeadRepository>,
    birth_date_service: BirthDateService,
}

impl LeadService {
    pub fn new(repository: Arc<dyn LeadRepository>, birth_date_service: BirthDateService) -> Self {
        Self {
            repository,
            birth_date_service,
        }
    }

    /// Creates a lead from an already-validated payload.
    ///
    /// Enrichment runs strictly before persistence and cannot fail the
    /// operation; only store errors propagate to the caller. The returned
    /// document is exactly what the store persisted, identifier included.
    pub async fn create_new_lead(&self, lead_in: LeadCreate) -> Result<Lead, AppError> {
        let birth_date = self.birth_date_service.fetch_birth_date().await;

        if birth_date.is_none() {
            tracing::warn!("Lead will be stored without birth date enrichment");
        }

        let record = NewLead {
            name: lead_in.name,
            email: lead_in.email,
            phone: lead_in.phone,
            birth_date,
        };

        self.repository.create(record).await
    }

    pub async fn get_all_leads(&self) -> Result<Vec<Lead>, AppError> {
        self.repository.list().await
    }

    pub async fn get_lead_details(&self, lead_id: &str) -> Result<Option<Lead>, AppError> {
        self.repository.get_by_id(lead_id).await
    }
}
