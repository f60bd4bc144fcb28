use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use database::services::person::{NewPerson, PersonService, UpdatePerson};
use models::person::PersonKind;
use models::principal::Principal;
use sea_orm::prelude::Uuid;

use crate::dtos::person::{
    CreatePersonRequest, PersonQueryParams, PersonResponse, UpdatePersonRequest,
};
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

/// List persons, optionally narrowed by search term and kind
#[utoipa::path(
    get,
    path = "/persons",
    params(PersonQueryParams),
    responses(
        (status = 200, description = "Matching persons", body = Vec<PersonResponse>),
        (status = 400, description = "Unknown kind filter")
    ),
    security(("jwt" = [])),
    tag = "Persons"
)]
pub async fn list_persons(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
    Query(params): Query<PersonQueryParams>,
) -> Result<Json<Vec<PersonResponse>>, ApiErr> {
    let kind = params
        .kind
        .as_deref()
        .map(|raw| {
            raw.parse::<PersonKind>()
                .map_err(|_| ApiErr::bad_request(format!("unknown person kind: {raw}")))
        })
        .transpose()?;

    let persons =
        PersonService::search(&state.db, params.search.as_deref().unwrap_or(""), kind).await?;
    Ok(Json(persons.into_iter().map(PersonResponse::from).collect()))
}

/// Create a person (administrators only)
#[utoipa::path(
    post,
    path = "/persons",
    request_body = CreatePersonRequest,
    responses(
        (status = 201, description = "Person created", body = PersonResponse),
        (status = 400, description = "Invalid profile or unknown linked account"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 409, description = "Email or student number already in use")
    ),
    security(("jwt" = [])),
    tag = "Persons"
)]
pub async fn create_person(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(body): Json<CreatePersonRequest>,
) -> Result<(StatusCode, Json<PersonResponse>), ApiErr> {
    require_admin(&principal)?;

    let payload = body.payload().map_err(ApiErr::bad_request)?;
    let new = NewPerson {
        name: body.name,
        email: body.email,
        phone: body.phone,
        address: body.address.map(Into::into),
        user_id: body.user_id,
        payload,
    };
    let person = PersonService::create(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(PersonResponse::from(person))))
}

/// Fetch one person together with their address
#[utoipa::path(
    get,
    path = "/persons/{id}",
    params(("id" = Uuid, Path, description = "Person ID")),
    responses(
        (status = 200, description = "Person found", body = PersonResponse),
        (status = 404, description = "No such person")
    ),
    security(("jwt" = [])),
    tag = "Persons"
)]
pub async fn get_person(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<PersonResponse>, ApiErr> {
    let (person, address) = PersonService::find_with_address(&state.db, id)
        .await?
        .ok_or_else(|| ApiErr::not_found("person not found"))?;
    Ok(Json(PersonResponse::from_parts(person, address)))
}

/// Update a person's profile (administrators only)
#[utoipa::path(
    put,
    path = "/persons/{id}",
    params(("id" = Uuid, Path, description = "Person ID")),
    request_body = UpdatePersonRequest,
    responses(
        (status = 200, description = "Person updated", body = PersonResponse),
        (status = 400, description = "Invalid profile or student number change"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "No such person"),
        (status = 409, description = "Email already in use")
    ),
    security(("jwt" = [])),
    tag = "Persons"
)]
pub async fn update_person(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePersonRequest>,
) -> Result<Json<PersonResponse>, ApiErr> {
    require_admin(&principal)?;

    let update = UpdatePerson {
        id,
        name: body.name,
        email: body.email,
        phone: body.phone,
        address: body.address.map(Into::into),
        user_id: body.user_id,
        student_number: body.student_number,
        salary: body.salary,
    };
    let person = PersonService::save(&state.db, update).await?;
    Ok(Json(PersonResponse::from(person)))
}

/// Delete a person and their dependent records (administrators only)
#[utoipa::path(
    delete,
    path = "/persons/{id}",
    params(("id" = Uuid, Path, description = "Person ID")),
    responses(
        (status = 204, description = "Person deleted"),
        (status = 400, description = "Professor still owns courses"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "No such person")
    ),
    security(("jwt" = [])),
    tag = "Persons"
)]
pub async fn delete_person(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiErr> {
    require_admin(&principal)?;

    PersonService::delete_by_id(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
