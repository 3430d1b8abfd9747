// libs/scheduling-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::{Duration, Timelike};
use tracing::{debug, warn};

use crate::interval::TimeInterval;
use crate::models::{
    AppointmentRequest, Conflict, ConflictKind, ExistingAppointment, SchedulingError,
    SchedulingRules,
};
use crate::provider::SchedulingDataProvider;
use crate::services::working_hours::WorkingHoursResolver;

pub struct ConflictDetectionService {
    provider: Arc<dyn SchedulingDataProvider>,
    hours_resolver: WorkingHoursResolver,
}

impl ConflictDetectionService {
    pub fn new(provider: Arc<dyn SchedulingDataProvider>) -> Self {
        let hours_resolver = WorkingHoursResolver::new(Arc::clone(&provider));
        Self {
            provider,
            hours_resolver,
        }
    }

    /// Classify every conflict between the requested appointment and the
    /// remote calendar. An empty result means the slot is bookable. Conflicts
    /// are emitted in a fixed order: provider, operatory, patient, duration,
    /// hours, buffer.
    ///
    /// A failed calendar fetch degrades to a single `system` conflict rather
    /// than an error: the caller learns the slot could not be verified and
    /// decides for itself whether to proceed.
    pub async fn detect_conflicts(
        &self,
        request: &AppointmentRequest,
    ) -> Result<Vec<Conflict>, SchedulingError> {
        let requested =
            TimeInterval::from_start(request.start_date_time, request.duration_minutes)?;

        debug!(
            "Checking conflicts for provider {} operatory {} from {} to {}",
            request.provider_id, request.operatory_id, requested.start, requested.end
        );

        // One day-scoped fetch serves every partition below, buffer scan
        // included.
        let date = request.start_date_time.date_naive();
        let day_start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let day_end = day_start + Duration::days(1);

        let appointments = match self.provider.fetch_appointments(day_start, day_end).await {
            Ok(appointments) => appointments,
            Err(e) => {
                warn!("Calendar fetch failed for {}: {}", date, e);
                return Ok(vec![Conflict::system(format!(
                    "Unable to verify the schedule for {}: {}",
                    date, e
                ))]);
            }
        };

        let mut conflicts = Vec::new();

        let provider_overlaps =
            overlapping(&appointments, &requested, |a| a.provider_id == request.provider_id);
        if !provider_overlaps.is_empty() {
            conflicts.push(Conflict::with_appointments(
                ConflictKind::Provider,
                format!(
                    "Provider already has {} overlapping appointment(s) at this time",
                    provider_overlaps.len()
                ),
                provider_overlaps,
            ));
        }

        let operatory_overlaps =
            overlapping(&appointments, &requested, |a| a.operatory_id == request.operatory_id);
        if !operatory_overlaps.is_empty() {
            conflicts.push(Conflict::with_appointments(
                ConflictKind::Operatory,
                format!(
                    "Operatory is occupied by {} overlapping appointment(s) at this time",
                    operatory_overlaps.len()
                ),
                operatory_overlaps,
            ));
        }

        let patient_overlaps =
            overlapping(&appointments, &requested, |a| a.patient_id == request.patient_id);
        if !patient_overlaps.is_empty() {
            conflicts.push(Conflict::with_appointments(
                ConflictKind::Patient,
                format!(
                    "Patient already has {} overlapping appointment(s) at this time",
                    patient_overlaps.len()
                ),
                patient_overlaps,
            ));
        }

        let rules = self.fetch_rules().await;
        let working_hours = self
            .hours_resolver
            .resolve(request.provider_id, date)
            .await;

        if request.duration_minutes > rules.max_appointment_duration_minutes {
            conflicts.push(Conflict::rule(
                ConflictKind::Duration,
                format!(
                    "Requested duration of {} minutes exceeds the {}-minute maximum",
                    request.duration_minutes, rules.max_appointment_duration_minutes
                ),
            ));
        }

        // Hour-granularity window check; minutes within the boundary hour are
        // not validated separately.
        if !working_hours.is_working {
            conflicts.push(Conflict::rule(
                ConflictKind::Hours,
                "Provider is not working on the requested day",
            ));
        } else if requested.start.hour() < working_hours.start_hour
            || requested.end.hour() > working_hours.end_hour
        {
            conflicts.push(Conflict::rule(
                ConflictKind::Hours,
                format!(
                    "Requested time falls outside working hours ({}:00 - {}:00)",
                    working_hours.start_hour, working_hours.end_hour
                ),
            ));
        }

        // Buffer scan keeps provider and operatory separation only; a patient
        // may hold back-to-back appointments with no gap.
        if rules.buffer_minutes > 0 {
            let expanded = requested.expand(rules.buffer_minutes);
            let too_close = appointments.iter().any(|a| {
                (a.provider_id == request.provider_id
                    || a.operatory_id == request.operatory_id)
                    && expanded.overlaps(&interval_of(a))
            });
            if too_close {
                conflicts.push(Conflict::rule(
                    ConflictKind::Buffer,
                    format!(
                        "An adjacent appointment violates the {}-minute buffer requirement",
                        rules.buffer_minutes
                    ),
                ));
            }
        }

        if !conflicts.is_empty() {
            warn!(
                "{} conflict(s) detected for provider {} at {}",
                conflicts.len(),
                request.provider_id,
                request.start_date_time
            );
        }

        Ok(conflicts)
    }

    async fn fetch_rules(&self) -> SchedulingRules {
        match self.provider.fetch_scheduling_rules().await {
            Ok(Some(rules)) => rules,
            Ok(None) => SchedulingRules::default(),
            Err(e) => {
                debug!("Scheduling rules lookup failed ({}), using defaults", e);
                SchedulingRules::default()
            }
        }
    }
}

fn interval_of(appointment: &ExistingAppointment) -> TimeInterval {
    TimeInterval {
        start: appointment.start_date_time,
        end: appointment.end_date_time(),
    }
}

fn overlapping(
    appointments: &[ExistingAppointment],
    requested: &TimeInterval,
    matches: impl Fn(&ExistingAppointment) -> bool,
) -> Vec<ExistingAppointment> {
    appointments
        .iter()
        .filter(|a| matches(a) && requested.overlaps(&interval_of(a)))
        .cloned()
        .collect()
}
