// libs/scheduling-cell/src/provider.rs
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::models::{AppointmentRequest, ExistingAppointment, SchedulingRules, WorkingHours};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Scheduling system request failed: {0}")]
    Request(String),

    #[error("Scheduling system rejected the appointment: {0}")]
    Conflict(String),
}

/// The practice-management system as seen by the scheduling core. All reads
/// are point-in-time snapshots; two concurrent checks may observe different
/// calendars, and only the remote create call arbitrates double-booking.
#[async_trait]
pub trait SchedulingDataProvider: Send + Sync {
    /// All appointments whose day falls in [day_start, day_end). One call
    /// serves every partition of the conflict check, buffer scan included.
    async fn fetch_appointments(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<ExistingAppointment>, ProviderError>;

    async fn fetch_working_hours(
        &self,
        provider_id: i64,
        date: NaiveDate,
    ) -> Result<Option<WorkingHours>, ProviderError>;

    async fn fetch_scheduling_rules(&self) -> Result<Option<SchedulingRules>, ProviderError>;

    /// Create the appointment on the remote calendar. A double-booking race
    /// lost to another caller surfaces as `ProviderError::Conflict`.
    async fn create_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<ExistingAppointment, ProviderError>;
}

// ==============================================================================
// OPEN DENTAL CLIENT
// ==============================================================================

pub struct OpenDentalClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenDentalClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.open_dental_api_url.clone(),
            api_key: config.open_dental_api_key.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ProviderError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self.client.request(method, &url).headers(self.get_headers());
        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Open Dental API error ({}): {}", status, error_text);

            return Err(if status == StatusCode::CONFLICT {
                ProviderError::Conflict(error_text)
            } else {
                ProviderError::Request(format!("API error ({}): {}", status, error_text))
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))
    }
}

#[async_trait]
impl SchedulingDataProvider for OpenDentalClient {
    async fn fetch_appointments(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<ExistingAppointment>, ProviderError> {
        let path = format!(
            "/appointments?startDate={}&endDate={}",
            day_start.to_rfc3339(),
            day_end.to_rfc3339()
        );
        self.request(Method::GET, &path, None).await
    }

    async fn fetch_working_hours(
        &self,
        provider_id: i64,
        date: NaiveDate,
    ) -> Result<Option<WorkingHours>, ProviderError> {
        let path = format!("/providers/{}/schedule?date={}", provider_id, date);
        self.request(Method::GET, &path, None).await
    }

    async fn fetch_scheduling_rules(&self) -> Result<Option<SchedulingRules>, ProviderError> {
        self.request(Method::GET, "/scheduling/rules", None).await
    }

    async fn create_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<ExistingAppointment, ProviderError> {
        let body = serde_json::to_value(request)
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        self.request(Method::POST, "/appointments", Some(body)).await
    }
}
