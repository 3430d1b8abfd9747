// libs/scheduling-cell/src/services/working_hours.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::WorkingHours;
use crate::provider::SchedulingDataProvider;

pub struct WorkingHoursResolver {
    provider: Arc<dyn SchedulingDataProvider>,
}

impl WorkingHoursResolver {
    pub fn new(provider: Arc<dyn SchedulingDataProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the working window for a provider on a given day. Never fails:
    /// a fetch error or an absent schedule both degrade to the default 8-17
    /// window, so callers cannot distinguish the two cases.
    pub async fn resolve(&self, provider_id: i64, date: NaiveDate) -> WorkingHours {
        match self.provider.fetch_working_hours(provider_id, date).await {
            Ok(Some(hours)) => hours,
            Ok(None) => {
                debug!(
                    "No schedule data for provider {} on {}, using default working hours",
                    provider_id, date
                );
                WorkingHours::default()
            }
            Err(e) => {
                debug!(
                    "Working hours lookup failed for provider {} on {} ({}), using default",
                    provider_id, date, e
                );
                WorkingHours::default()
            }
        }
    }
}
