// Not every test binary uses every helper.
#![allow(dead_code)]

// Shared test doubles for the scheduling cell. The stub stands in for the
// practice-management system behind the SchedulingDataProvider seam; no mock
// behavior exists in production code.
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use scheduling_cell::models::{
    AppointmentRequest, BookAppointmentPayload, ExistingAppointment, SchedulingRules,
    WorkingHours,
};
use scheduling_cell::provider::{ProviderError, SchedulingDataProvider};

pub struct StubProvider {
    pub appointments: Vec<ExistingAppointment>,
    pub working_hours: Option<WorkingHours>,
    pub rules: Option<SchedulingRules>,
    pub fail_appointment_fetch: bool,
    pub fail_create_with: Option<ProviderError>,
    pub create_calls: AtomicUsize,
}

impl Default for StubProvider {
    fn default() -> Self {
        Self {
            appointments: Vec::new(),
            working_hours: None,
            rules: None,
            fail_appointment_fetch: false,
            fail_create_with: None,
            create_calls: AtomicUsize::new(0),
        }
    }
}

impl StubProvider {
    pub fn with_appointments(appointments: Vec<ExistingAppointment>) -> Self {
        Self {
            appointments,
            ..Self::default()
        }
    }

    pub fn create_call_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchedulingDataProvider for StubProvider {
    async fn fetch_appointments(
        &self,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<ExistingAppointment>, ProviderError> {
        if self.fail_appointment_fetch {
            return Err(ProviderError::Request("connection refused".to_string()));
        }
        Ok(self
            .appointments
            .iter()
            .filter(|a| a.start_date_time >= day_start && a.start_date_time < day_end)
            .cloned()
            .collect())
    }

    async fn fetch_working_hours(
        &self,
        _provider_id: i64,
        _date: NaiveDate,
    ) -> Result<Option<WorkingHours>, ProviderError> {
        Ok(self.working_hours)
    }

    async fn fetch_scheduling_rules(&self) -> Result<Option<SchedulingRules>, ProviderError> {
        Ok(self.rules)
    }

    async fn create_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<ExistingAppointment, ProviderError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.fail_create_with {
            return Err(error.clone());
        }
        Ok(ExistingAppointment {
            id: 9001,
            patient_id: request.patient_id,
            provider_id: request.provider_id,
            operatory_id: request.operatory_id,
            start_date_time: request.start_date_time,
            duration_minutes: request.duration_minutes,
            status: "Scheduled".to_string(),
        })
    }
}

// ==============================================================================
// FIXTURES
// ==============================================================================

pub const PATIENT: i64 = 101;
pub const PROVIDER: i64 = 7;
pub const OPERATORY: i64 = 3;

/// A fixed Monday so working-day assumptions stay stable.
pub fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).unwrap()
}

pub fn request_at(hour: u32, min: u32, duration_minutes: i32) -> AppointmentRequest {
    AppointmentRequest {
        patient_id: PATIENT,
        provider_id: PROVIDER,
        operatory_id: OPERATORY,
        start_date_time: at(hour, min),
        duration_minutes,
        appointment_type: "Cleaning".to_string(),
        notes: None,
    }
}

pub fn payload_at(hour: u32, min: u32, duration_minutes: i32) -> BookAppointmentPayload {
    let request = request_at(hour, min, duration_minutes);
    BookAppointmentPayload {
        patient_id: Some(request.patient_id),
        provider_id: Some(request.provider_id),
        operatory_id: Some(request.operatory_id),
        start_date_time: Some(request.start_date_time),
        duration_minutes: Some(request.duration_minutes),
        appointment_type: Some(request.appointment_type),
        notes: None,
    }
}

pub fn existing(
    id: i64,
    patient_id: i64,
    provider_id: i64,
    operatory_id: i64,
    start: DateTime<Utc>,
    duration_minutes: i32,
) -> ExistingAppointment {
    ExistingAppointment {
        id,
        patient_id,
        provider_id,
        operatory_id,
        start_date_time: start,
        duration_minutes,
        status: "Scheduled".to_string(),
    }
}
