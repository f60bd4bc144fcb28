use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use database::services::seat::SeatService;
use sea_orm::prelude::Uuid;

use crate::dtos::seat::{EnrollRequest, EvaluationRequest, SeatResponse};
use crate::error::ApiErr;
use crate::security::AuthPrincipal;
use crate::state::AppState;

/// Enroll a student into a course
///
/// Students may only enroll themselves; administrators may enroll anyone.
#[utoipa::path(
    post,
    path = "/seats",
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Seat created", body = SeatResponse),
        (status = 400, description = "student_id or course_id does not exist"),
        (status = 403, description = "Student tried to enroll someone else"),
        (status = 409, description = "Already enrolled in this course")
    ),
    security(("jwt" = [])),
    tag = "Seats"
)]
pub async fn enroll(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(body): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<SeatResponse>), ApiErr> {
    let seat = SeatService::enroll(
        &state.db,
        &principal,
        body.student_id,
        body.course_id,
        body.exam_date,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(SeatResponse::from(seat))))
}

/// List the caller's own seats
///
/// Resolved through the account link; empty when the account has no
/// student profile yet.
#[utoipa::path(
    get,
    path = "/seats/mine",
    responses(
        (status = 200, description = "Caller's seats", body = Vec<SeatResponse>)
    ),
    security(("jwt" = [])),
    tag = "Seats"
)]
pub async fn my_seats(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
) -> Result<Json<Vec<SeatResponse>>, ApiErr> {
    let seats = SeatService::list_by_student_user_id(&state.db, principal.user_id).await?;
    Ok(Json(seats.into_iter().map(SeatResponse::from).collect()))
}

/// Record or revise an evaluation on a seat
///
/// Professors may only grade seats of courses they own; students cannot
/// grade at all. Omitting the mark keeps whatever mark the seat already
/// carries.
#[utoipa::path(
    put,
    path = "/seats/{id}/evaluation",
    params(("id" = Uuid, Path, description = "Seat ID")),
    request_body = EvaluationRequest,
    responses(
        (status = 200, description = "Evaluation recorded", body = SeatResponse),
        (status = 400, description = "Mark outside [0, 10]"),
        (status = 403, description = "Caller may not grade this seat"),
        (status = 404, description = "No such seat")
    ),
    security(("jwt" = [])),
    tag = "Seats"
)]
pub async fn record_evaluation(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Uuid>,
    Json(body): Json<EvaluationRequest>,
) -> Result<Json<SeatResponse>, ApiErr> {
    let seat = SeatService::record_evaluation(
        &state.db,
        &principal,
        id,
        body.evaluation_date,
        body.mark,
    )
    .await?;
    Ok(Json(SeatResponse::from(seat)))
}

/// Drop a seat
///
/// Students may only drop their own seats.
#[utoipa::path(
    delete,
    path = "/seats/{id}",
    params(("id" = Uuid, Path, description = "Seat ID")),
    responses(
        (status = 204, description = "Seat removed"),
        (status = 403, description = "Student tried to drop someone else's seat"),
        (status = 404, description = "No such seat")
    ),
    security(("jwt" = [])),
    tag = "Seats"
)]
pub async fn unenroll(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiErr> {
    SeatService::unenroll(&state.db, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
