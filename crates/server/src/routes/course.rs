use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use database::services::{course::CourseService, seat::SeatService};
use models::principal::Principal;
use sea_orm::prelude::Uuid;

use crate::dtos::course::{
    CourseQueryParams, CourseRequest, CourseResponse, CourseStatsResponse,
};
use crate::dtos::seat::SeatResponse;
use crate::error::ApiErr;
use crate::security::AuthPrincipal;
use crate::state::AppState;

fn require_admin(principal: &Principal) -> Result<(), ApiErr> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(ApiErr::forbidden("administrator role required"))
    }
}

/// List courses, optionally narrowed by name search or professor
#[utoipa::path(
    get,
    path = "/courses",
    params(CourseQueryParams),
    responses(
        (status = 200, description = "Matching courses", body = Vec<CourseResponse>)
    ),
    security(("jwt" = [])),
    tag = "Courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
    Query(params): Query<CourseQueryParams>,
) -> Result<Json<Vec<CourseResponse>>, ApiErr> {
    let courses = match params.professor_id {
        Some(professor_id) => CourseService::find_by_professor_id(&state.db, professor_id).await?,
        None => CourseService::search(&state.db, params.search.as_deref().unwrap_or("")).await?,
    };
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// Create a course (administrators only)
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Blank name or professor_id does not name a professor"),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("jwt" = [])),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(body): Json<CourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiErr> {
    require_admin(&principal)?;

    let course = CourseService::create(&state.db, &body.name, body.professor_id).await?;
    Ok((StatusCode::CREATED, Json(CourseResponse::from(course))))
}

/// Fetch one course
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = CourseResponse),
        (status = 404, description = "No such course")
    ),
    security(("jwt" = [])),
    tag = "Courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseResponse>, ApiErr> {
    let course = CourseService::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiErr::not_found("course not found"))?;
    Ok(Json(CourseResponse::from(course)))
}

/// Rename a course or hand it to another professor (administrators only)
#[utoipa::path(
    put,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Blank name or professor_id does not name a professor"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "No such course")
    ),
    security(("jwt" = [])),
    tag = "Courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Uuid>,
    Json(body): Json<CourseRequest>,
) -> Result<Json<CourseResponse>, ApiErr> {
    require_admin(&principal)?;

    let course = CourseService::save(&state.db, id, &body.name, body.professor_id).await?;
    Ok(Json(CourseResponse::from(course)))
}

/// Delete a course and every seat in it (administrators only)
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "No such course")
    ),
    security(("jwt" = [])),
    tag = "Courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiErr> {
    require_admin(&principal)?;

    CourseService::delete_by_id(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the seats of one course
#[utoipa::path(
    get,
    path = "/courses/{id}/seats",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Seats in the course", body = Vec<SeatResponse>),
        (status = 404, description = "No such course")
    ),
    security(("jwt" = [])),
    tag = "Courses"
)]
pub async fn list_course_seats(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SeatResponse>>, ApiErr> {
    CourseService::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiErr::not_found("course not found"))?;

    let seats = SeatService::list_by_course(&state.db, id).await?;
    Ok(Json(seats.into_iter().map(SeatResponse::from).collect()))
}

/// Enrollment count and mark average for one course
#[utoipa::path(
    get,
    path = "/courses/{id}/stats",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course statistics", body = CourseStatsResponse),
        (status = 404, description = "No such course")
    ),
    security(("jwt" = [])),
    tag = "Courses"
)]
pub async fn get_course_stats(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseStatsResponse>, ApiErr> {
    CourseService::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiErr::not_found("course not found"))?;

    let seat_count = SeatService::count_by_course(&state.db, id).await?;
    let average_mark = SeatService::average_mark_by_course(&state.db, id).await?;
    Ok(Json(CourseStatsResponse {
        seat_count,
        average_mark,
    }))
}
