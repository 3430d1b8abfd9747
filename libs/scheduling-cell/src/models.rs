// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// CORE SCHEDULING MODELS
// ==============================================================================

/// A validated booking request. Open Dental keys (PatNum, ProvNum, OpNum) are
/// numeric, so ids are plain integers. The start instant is treated as an
/// opaque timestamp; no timezone interpretation happens in this cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub patient_id: i64,
    pub provider_id: i64,
    pub operatory_id: i64,
    pub start_date_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub appointment_type: String,
    pub notes: Option<String>,
}

/// Untrusted wire shape for a booking. Field presence is validated here rather
/// than left to serde so the response can name every missing field, matching
/// the upstream API contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentPayload {
    pub patient_id: Option<i64>,
    pub provider_id: Option<i64>,
    pub operatory_id: Option<i64>,
    pub start_date_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub appointment_type: Option<String>,
    pub notes: Option<String>,
}

impl BookAppointmentPayload {
    pub fn validate(self) -> Result<AppointmentRequest, SchedulingError> {
        let mut missing = Vec::new();
        if self.patient_id.is_none() {
            missing.push("patientId");
        }
        if self.provider_id.is_none() {
            missing.push("providerId");
        }
        if self.operatory_id.is_none() {
            missing.push("operatoryId");
        }
        if self.start_date_time.is_none() {
            missing.push("startDateTime");
        }
        if self.duration_minutes.is_none() {
            missing.push("durationMinutes");
        }

        if !missing.is_empty() {
            return Err(SchedulingError::InvalidRequest { missing });
        }

        Ok(AppointmentRequest {
            patient_id: self.patient_id.unwrap(),
            provider_id: self.provider_id.unwrap(),
            operatory_id: self.operatory_id.unwrap(),
            start_date_time: self.start_date_time.unwrap(),
            duration_minutes: self.duration_minutes.unwrap(),
            appointment_type: self
                .appointment_type
                .unwrap_or_else(|| "General".to_string()),
            notes: self.notes,
        })
    }
}

/// Read-only snapshot of an appointment already on the remote calendar.
/// Always fetched fresh per conflict check, never cached across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingAppointment {
    pub id: i64,
    pub patient_id: i64,
    pub provider_id: i64,
    pub operatory_id: i64,
    pub start_date_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: String,
}

impl ExistingAppointment {
    pub fn end_date_time(&self) -> DateTime<Utc> {
        self.start_date_time + chrono::Duration::minutes(self.duration_minutes as i64)
    }
}

// ==============================================================================
// CONFLICT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Provider,
    Operatory,
    Patient,
    Duration,
    Hours,
    Buffer,
    System,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::Provider => write!(f, "provider"),
            ConflictKind::Operatory => write!(f, "operatory"),
            ConflictKind::Patient => write!(f, "patient"),
            ConflictKind::Duration => write!(f, "duration"),
            ConflictKind::Hours => write!(f, "hours"),
            ConflictKind::Buffer => write!(f, "buffer"),
            ConflictKind::System => write!(f, "system"),
        }
    }
}

/// One detected scheduling conflict. `appointments` carries the overlapping
/// calendar entries for provider/operatory/patient kinds and is empty for
/// rule-level kinds (duration, hours, buffer, system).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub appointments: Vec<ExistingAppointment>,
}

impl Conflict {
    pub fn rule(kind: ConflictKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            appointments: Vec::new(),
        }
    }

    pub fn with_appointments(
        kind: ConflictKind,
        message: impl Into<String>,
        appointments: Vec<ExistingAppointment>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            appointments,
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::rule(ConflictKind::System, message)
    }
}

// ==============================================================================
// SCHEDULE CONFIGURATION MODELS
// ==============================================================================

/// A provider's working window for one calendar day. When the remote system
/// has no schedule data the default window applies; callers cannot tell "no
/// schedule configured" apart from "fetch failed".
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
    pub is_working: bool,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 17,
            is_working: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingRules {
    pub max_appointment_duration_minutes: i32,
    pub buffer_minutes: i32,
    pub allow_double_booking: bool,
}

impl Default for SchedulingRules {
    fn default() -> Self {
        Self {
            max_appointment_duration_minutes: 240,
            buffer_minutes: 0,
            allow_double_booking: false,
        }
    }
}

// ==============================================================================
// ALTERNATIVE SLOT AND BOOKING RESULT MODELS
// ==============================================================================

/// A candidate slot with zero detected conflicts. `available` is always true;
/// slots that fail the conflict check are never surfaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeSlot {
    pub start_date_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub provider_id: i64,
    pub operatory_id: i64,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum BookingResult {
    Booked {
        appointment: ExistingAppointment,
    },
    Rejected {
        conflicts: Vec<Conflict>,
        alternatives: Vec<AlternativeSlot>,
    },
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulingError {
    #[error("Missing required fields: {}", missing.join(", "))]
    InvalidRequest { missing: Vec<&'static str> },

    #[error("Appointment duration must be positive, got {0} minutes")]
    InvalidDuration(i32),
}
