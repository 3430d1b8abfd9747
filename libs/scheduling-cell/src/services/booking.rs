// libs/scheduling-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{
    BookAppointmentPayload, BookingResult, Conflict, SchedulingError,
};
use crate::provider::{ProviderError, SchedulingDataProvider};
use crate::services::alternatives::AlternativeSlotFinder;
use crate::services::conflict::ConflictDetectionService;

/// How many alternative slots a rejection carries back to the caller.
const DEFAULT_MAX_ALTERNATIVES: usize = 5;

pub struct BookingService {
    provider: Arc<dyn SchedulingDataProvider>,
    conflict_service: ConflictDetectionService,
    slot_finder: AlternativeSlotFinder,
}

impl BookingService {
    pub fn new(provider: Arc<dyn SchedulingDataProvider>) -> Self {
        let conflict_service = ConflictDetectionService::new(Arc::clone(&provider));
        let slot_finder = AlternativeSlotFinder::new(Arc::clone(&provider));
        Self {
            provider,
            conflict_service,
            slot_finder,
        }
    }

    /// Validate and book an appointment. A conflicted request is rejected
    /// without touching the remote booking endpoint, and the rejection always
    /// carries both the conflicts and a best-effort list of open slots.
    ///
    /// Two concurrent calls can both pass the conflict check against the same
    /// calendar snapshot; the remote system's conflict rejection on the
    /// second create call is the only double-booking guard. No retries here.
    pub async fn book(
        &self,
        payload: BookAppointmentPayload,
    ) -> Result<BookingResult, SchedulingError> {
        let request = payload.validate()?;

        info!(
            "Booking appointment for patient {} with provider {} at {}",
            request.patient_id, request.provider_id, request.start_date_time
        );

        let conflicts = self.conflict_service.detect_conflicts(&request).await?;
        if !conflicts.is_empty() {
            let alternatives = self
                .slot_finder
                .find_alternatives(&request, DEFAULT_MAX_ALTERNATIVES)
                .await?;

            warn!(
                "Booking rejected for patient {}: {} conflict(s), {} alternative(s) offered",
                request.patient_id,
                conflicts.len(),
                alternatives.len()
            );
            return Ok(BookingResult::Rejected {
                conflicts,
                alternatives,
            });
        }

        match self.provider.create_appointment(&request).await {
            Ok(appointment) => {
                info!(
                    "Appointment {} booked for patient {} with provider {}",
                    appointment.id, request.patient_id, request.provider_id
                );
                Ok(BookingResult::Booked { appointment })
            }
            Err(e) => {
                // A lost check-then-act race lands here as a remote conflict;
                // it is an expected outcome, not an exceptional one.
                warn!("Remote booking failed for patient {}: {}", request.patient_id, e);
                let message = match e {
                    ProviderError::Conflict(detail) => format!(
                        "The slot was taken before this booking completed: {}",
                        detail
                    ),
                    ProviderError::Request(detail) => {
                        format!("Appointment creation failed: {}", detail)
                    }
                };
                Ok(BookingResult::Rejected {
                    conflicts: vec![Conflict::system(message)],
                    alternatives: Vec::new(),
                })
            }
        }
    }
}
