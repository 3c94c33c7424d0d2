use actix_web::{web, HttpResponse};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::database::models::{Appointment, AppointmentInput, AppointmentStatus};
use crate::database::repositories::{AppointmentFilter, AppointmentRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::access::{self, Operation};
use crate::services::auth::Claims;
use crate::services::calendar::{month_bounds, CalendarGrid};
use crate::services::validation::{validate_appointment, ValidationErrors};
use crate::services::{Notifier, NotifyAction};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateInput {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub id: i64,
    pub status: AppointmentStatus,
    pub label: &'static str,
}

/// Detail view of a record: the stored fields plus the derived past-due
/// marker.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub is_past_due: bool,
}

impl From<Appointment> for AppointmentDetail {
    fn from(appointment: Appointment) -> Self {
        let is_past_due = appointment.is_past_due();
        Self {
            appointment,
            is_past_due,
        }
    }
}

/// Status an edit should end up with: the requested one, or the record's
/// current status when the request leaves it out.
fn effective_status(
    requested: Option<AppointmentStatus>,
    current: AppointmentStatus,
) -> AppointmentStatus {
    requested.unwrap_or(current)
}

/// Turn the raw `status`/`date` query strings into typed filters. Bad values
/// are rejected with field-level errors rather than silently dropped.
fn parse_list_query(claims: &Claims, query: &ListQuery) -> Result<AppointmentFilter, AppError> {
    let mut errors = ValidationErrors::default();

    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match raw.parse::<AppointmentStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add("status", format!("Unknown status: {}", raw));
                None
            }
        },
        None => None,
    };

    let date = match query.date.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match raw.parse::<NaiveDate>() {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("date", format!("Expected a YYYY-MM-DD date, got {}", raw));
                None
            }
        },
        None => None,
    };

    errors.into_result()?;

    Ok(AppointmentFilter {
        owner: Some(claims.user_id()),
        search: query.search.clone(),
        status,
        date,
    })
}

/// List appointments visible to the caller, filtered and paginated.
pub async fn list_appointments(
    claims: Claims,
    repo: web::Data<AppointmentRepository>,
    config: web::Data<Config>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = parse_list_query(&claims, &query)?;
    let page = query.page.unwrap_or(1);

    let result = repo.list(&filter, page, config.page_size).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(result)))
}

pub async fn get_appointment(
    claims: Claims,
    repo: web::Data<AppointmentRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let appointment = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;

    if !access::is_owner(claims.user_id(), &appointment) {
        return Err(AppError::PermissionDenied(
            "You may only view your own appointments".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(AppointmentDetail::from(appointment))))
}

/// Create an appointment owned by the caller.
pub async fn create_appointment(
    claims: Claims,
    repo: web::Data<AppointmentRepository>,
    notifier: web::Data<Notifier>,
    input: web::Json<AppointmentInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    validate_appointment(&input)?;

    let appointment = repo.create(Some(claims.user_id()), input).await?;
    notifier.notify(&appointment, NotifyAction::Created);

    Ok(HttpResponse::Created().json(ApiResponse::success(appointment)))
}

pub async fn update_appointment(
    claims: Claims,
    repo: web::Data<AppointmentRepository>,
    notifier: web::Data<Notifier>,
    path: web::Path<i64>,
    input: web::Json<AppointmentInput>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
    access::authorize(claims.user_id(), &existing, Operation::Edit)?;

    let input = input.into_inner();
    validate_appointment(&input)?;

    // An edit without an explicit status keeps the current one.
    let status = effective_status(input.status, existing.status);

    let updated = repo
        .update(id, input, status)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
    notifier.notify(&updated, NotifyAction::Updated);

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

pub async fn delete_appointment(
    claims: Claims,
    repo: web::Data<AppointmentRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
    access::authorize(claims.user_id(), &existing, Operation::Delete)?;

    repo.delete(id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Status-only transition. Responds with the new status and its display
/// label for in-place UI updates.
pub async fn update_appointment_status(
    claims: Claims,
    repo: web::Data<AppointmentRepository>,
    notifier: web::Data<Notifier>,
    path: web::Path<i64>,
    input: web::Json<StatusUpdateInput>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let status = input.status.parse::<AppointmentStatus>().map_err(|_| {
        let mut errors = ValidationErrors::default();
        errors.add("status", format!("Unknown status: {}", input.status));
        AppError::Validation(errors)
    })?;

    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
    access::authorize(claims.user_id(), &existing, Operation::StatusUpdate)?;

    let updated = repo
        .update_status(id, status)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))?;
    notifier.notify(&updated, NotifyAction::StatusChanged);

    Ok(HttpResponse::Ok().json(ApiResponse::success(StatusUpdateResponse {
        id: updated.id,
        status: updated.status,
        label: updated.status.label(),
    })))
}

/// Calendar for the current month.
pub async fn calendar_current(
    claims: Claims,
    repo: web::Data<AppointmentRepository>,
) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    calendar_for(claims, repo, today.year(), today.month()).await
}

/// Calendar for an explicit (year, month).
pub async fn calendar_month(
    claims: Claims,
    repo: web::Data<AppointmentRepository>,
    path: web::Path<(i32, u32)>,
) -> Result<HttpResponse, AppError> {
    let (year, month) = path.into_inner();
    calendar_for(claims, repo, year, month).await
}

async fn calendar_for(
    claims: Claims,
    repo: web::Data<AppointmentRepository>,
    year: i32,
    month: u32,
) -> Result<HttpResponse, AppError> {
    let (first, first_of_next) = month_bounds(year, month)?;

    let candidates = repo
        .list_for_month(Some(claims.user_id()), first, first_of_next)
        .await?;
    let grid = CalendarGrid::build(year, month, candidates)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(grid)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn claims() -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            exp: 0,
        }
    }

    fn list_query(status: Option<&str>, date: Option<&str>) -> ListQuery {
        ListQuery {
            search: None,
            status: status.map(String::from),
            date: date.map(String::from),
            page: None,
        }
    }

    fn rejected(query: &ListQuery) -> ValidationErrors {
        match parse_list_query(&claims(), query) {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    fn appointment() -> Appointment {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        Appointment {
            id: 7,
            owner_id: None,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: None,
            phone: None,
            title: "Consultation".to_string(),
            description: String::new(),
            status: AppointmentStatus::Confirmed,
            scheduled_date: Some(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()),
            scheduled_time: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            notes: String::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn unknown_status_filter_is_rejected_with_field_error() {
        let errors = rejected(&list_query(Some("archived"), None));
        assert!(errors.has_field("status"));
        assert!(!errors.has_field("date"));
    }

    #[test]
    fn malformed_date_filter_is_rejected_with_field_error() {
        let errors = rejected(&list_query(None, Some("06/15/2024")));
        assert!(errors.has_field("date"));
        assert!(!errors.has_field("status"));
    }

    #[test]
    fn bad_status_and_bad_date_are_both_reported() {
        let errors = rejected(&list_query(Some("archived"), Some("not-a-date")));
        assert!(errors.has_field("status"));
        assert!(errors.has_field("date"));
    }

    #[test]
    fn valid_filters_parse_and_scope_to_the_caller() {
        let claims = claims();
        let filter = parse_list_query(&claims, &list_query(Some("confirmed"), Some("2024-06-15")))
            .expect("valid query");
        assert_eq!(filter.owner, Some(claims.user_id()));
        assert_eq!(filter.status, Some(AppointmentStatus::Confirmed));
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2024, 6, 15));
    }

    #[test]
    fn empty_filter_strings_are_treated_as_absent() {
        let filter =
            parse_list_query(&claims(), &list_query(Some(""), Some(""))).expect("empty strings");
        assert_eq!(filter.status, None);
        assert_eq!(filter.date, None);
    }

    #[test]
    fn edit_without_status_keeps_the_current_one() {
        assert_eq!(
            effective_status(None, AppointmentStatus::Confirmed),
            AppointmentStatus::Confirmed
        );
        assert_eq!(
            effective_status(
                Some(AppointmentStatus::Cancelled),
                AppointmentStatus::Confirmed
            ),
            AppointmentStatus::Cancelled
        );
    }

    #[test]
    fn detail_response_exposes_past_due_flag() {
        let detail = AppointmentDetail::from(appointment());
        assert!(detail.is_past_due);

        let json = serde_json::to_value(&detail).expect("serializes");
        assert_eq!(json["isPastDue"], serde_json::Value::Bool(true));
        assert_eq!(json["title"], "Consultation");
    }
}
