// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{BookAppointmentPayload, BookingResult, SchedulingError};
use crate::provider::{OpenDentalClient, SchedulingDataProvider};
use crate::services::alternatives::AlternativeSlotFinder;
use crate::services::booking::BookingService;
use crate::services::conflict::ConflictDetectionService;

const DEFAULT_MAX_RESULTS: usize = 5;

// ==============================================================================
// REQUEST SHAPES
// ==============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindSlotsPayload {
    #[serde(flatten)]
    pub appointment: BookAppointmentPayload,
    pub max_results: Option<usize>,
}

// ==============================================================================
// HANDLERS
// ==============================================================================

/// Check a proposed appointment for conflicts. Alternatives are included only
/// when the requested slot is conflicted.
#[axum::debug_handler]
pub async fn check_conflicts(
    State(state): State<Arc<AppConfig>>,
    Json(payload): Json<BookAppointmentPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let provider = live_provider(&state)?;

    let request = match payload.validate() {
        Ok(request) => request,
        Err(e) => return Ok(invalid_request_response(e)),
    };

    let detector = ConflictDetectionService::new(Arc::clone(&provider));
    let conflicts = match detector.detect_conflicts(&request).await {
        Ok(conflicts) => conflicts,
        Err(e) => return Ok(invalid_request_response(e)),
    };

    let alternatives = if conflicts.is_empty() {
        Vec::new()
    } else {
        AlternativeSlotFinder::new(provider)
            .find_alternatives(&request, DEFAULT_MAX_RESULTS)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
    };

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "hasConflicts": !conflicts.is_empty(),
            "conflicts": conflicts,
            "alternatives": alternatives,
            "requestedSlot": {
                "startDateTime": request.start_date_time,
                "durationMinutes": request.duration_minutes,
                "providerId": request.provider_id,
                "operatoryId": request.operatory_id,
            },
        })),
    ))
}

/// Standalone open-slot search, independent of any booking attempt.
#[axum::debug_handler]
pub async fn find_slots(
    State(state): State<Arc<AppConfig>>,
    Json(payload): Json<FindSlotsPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let provider = live_provider(&state)?;

    let max_results = payload.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    let request = match payload.appointment.validate() {
        Ok(request) => request,
        Err(e) => return Ok(invalid_request_response(e)),
    };

    let slots = match AlternativeSlotFinder::new(provider)
        .find_alternatives(&request, max_results)
        .await
    {
        Ok(slots) => slots,
        Err(e) => return Ok(invalid_request_response(e)),
    };

    let total_found = slots.len();
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "availableSlots": slots,
            "totalFound": total_found,
        })),
    ))
}

/// Book an appointment, or reply 409 with the conflicts and a best-effort
/// alternative list when the slot cannot be taken.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(payload): Json<BookAppointmentPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let provider = live_provider(&state)?;

    let booking_service = BookingService::new(provider);
    let result = match booking_service.book(payload).await {
        Ok(result) => result,
        Err(e) => return Ok(invalid_request_response(e)),
    };

    match result {
        BookingResult::Booked { appointment } => Ok((
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Appointment booked successfully",
                "appointment": appointment,
            })),
        )),
        BookingResult::Rejected {
            conflicts,
            alternatives,
        } => Ok((
            StatusCode::CONFLICT,
            Json(json!({
                "success": false,
                "message": "Appointment could not be booked",
                "conflicts": conflicts,
                "alternatives": alternatives,
            })),
        )),
    }
}

// ==============================================================================
// HELPERS
// ==============================================================================

/// One-time capability check at the HTTP boundary; the services past this
/// point always assume a live scheduling provider.
fn live_provider(state: &AppConfig) -> Result<Arc<dyn SchedulingDataProvider>, AppError> {
    if !state.is_configured() {
        return Err(AppError::ExternalService(
            "Open Dental integration is not configured".to_string(),
        ));
    }
    Ok(Arc::new(OpenDentalClient::new(state)))
}

fn invalid_request_response(error: SchedulingError) -> (StatusCode, Json<Value>) {
    let body = match &error {
        SchedulingError::InvalidRequest { missing } => json!({
            "success": false,
            "message": "Missing required fields",
            "missingFields": missing,
        }),
        SchedulingError::InvalidDuration(_) => json!({
            "success": false,
            "message": error.to_string(),
        }),
    };
    (StatusCode::BAD_REQUEST, Json(body))
}
