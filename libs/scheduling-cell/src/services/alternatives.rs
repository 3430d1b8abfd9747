// libs/scheduling-cell/src/services/alternatives.rs
use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use crate::models::{AlternativeSlot, AppointmentRequest, SchedulingError};
use crate::provider::SchedulingDataProvider;
use crate::services::conflict::ConflictDetectionService;
use crate::services::working_hours::WorkingHoursResolver;

/// How many days past the requested one the search may roam.
const MAX_SEARCH_DAYS: i64 = 7;

/// Candidate spacing within a working window.
const SLOT_INCREMENT_MINUTES: i64 = 30;

pub struct AlternativeSlotFinder {
    detector: ConflictDetectionService,
    hours_resolver: WorkingHoursResolver,
}

impl AlternativeSlotFinder {
    pub fn new(provider: Arc<dyn SchedulingDataProvider>) -> Self {
        let detector = ConflictDetectionService::new(Arc::clone(&provider));
        let hours_resolver = WorkingHoursResolver::new(provider);
        Self {
            detector,
            hours_resolver,
        }
    }

    /// Brute-force search for conflict-free slots: 30-minute steps across the
    /// working window of the requested day, then each following day up to a
    /// week out, stopping once `max_results` slots are accepted. Every
    /// accepted slot passed a full conflict check, so the returned list only
    /// ever contains bookable times. An exhausted search yields an empty
    /// list, not an error.
    pub async fn find_alternatives(
        &self,
        request: &AppointmentRequest,
        max_results: usize,
    ) -> Result<Vec<AlternativeSlot>, SchedulingError> {
        debug!(
            "Searching alternative slots for provider {} near {}",
            request.provider_id, request.start_date_time
        );

        let mut slots: Vec<AlternativeSlot> = Vec::new();
        let base_date = request.start_date_time.date_naive();

        for day_offset in 0..=MAX_SEARCH_DAYS {
            if slots.len() >= max_results {
                break;
            }

            let date = base_date + Duration::days(day_offset);
            let hours = self.hours_resolver.resolve(request.provider_id, date).await;
            if !hours.is_working {
                continue;
            }

            let window = date
                .and_hms_opt(hours.start_hour, 0, 0)
                .zip(date.and_hms_opt(hours.end_hour, 0, 0));
            let Some((window_start, window_end)) = window else {
                continue;
            };

            let mut candidate = window_start.and_utc();
            let window_end = window_end.and_utc();

            while candidate < window_end && slots.len() < max_results {
                // The requested start itself is known-conflicted.
                if candidate != request.start_date_time {
                    let mut probe = request.clone();
                    probe.start_date_time = candidate;

                    if self.detector.detect_conflicts(&probe).await?.is_empty() {
                        slots.push(AlternativeSlot {
                            start_date_time: candidate,
                            duration_minutes: request.duration_minutes,
                            provider_id: request.provider_id,
                            operatory_id: request.operatory_id,
                            available: true,
                        });
                    }
                }

                candidate += Duration::minutes(SLOT_INCREMENT_MINUTES);
            }
        }

        debug!(
            "Found {} alternative slot(s) for provider {}",
            slots.len(),
            request.provider_id
        );
        Ok(slots)
    }
}
