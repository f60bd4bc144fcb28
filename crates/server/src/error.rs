use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::error::RegistrarError;
use log::error;
use serde_json::json;

/// API-level error carrying the status code and a client-safe message.
pub struct ApiErr {
    pub status: StatusCode,
    pub message: String,
}

impl ApiErr {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        error!("internal error: {err}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".to_owned(),
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<RegistrarError> for ApiErr {
    fn from(err: RegistrarError) -> Self {
        let status = match &err {
            RegistrarError::NotFound => StatusCode::NOT_FOUND,
            RegistrarError::Validation(_) | RegistrarError::ForeignKeyViolation(_) => {
                StatusCode::BAD_REQUEST
            }
            RegistrarError::DuplicateUsername
            | RegistrarError::DuplicateEmail
            | RegistrarError::DuplicateStudentNumber
            | RegistrarError::DuplicateEnrollment
            | RegistrarError::DuplicateAccountLink => StatusCode::CONFLICT,
            RegistrarError::Unauthorized(_) => StatusCode::FORBIDDEN,
            RegistrarError::Db(inner) => {
                error!("database failure: {inner}");
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "internal server error".to_owned(),
                };
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_maps_to_expected_status_codes() {
        let cases = [
            (RegistrarError::NotFound, StatusCode::NOT_FOUND),
            (
                RegistrarError::validation("bad"),
                StatusCode::BAD_REQUEST,
            ),
            (RegistrarError::DuplicateUsername, StatusCode::CONFLICT),
            (RegistrarError::DuplicateEmail, StatusCode::CONFLICT),
            (RegistrarError::DuplicateEnrollment, StatusCode::CONFLICT),
            (RegistrarError::DuplicateAccountLink, StatusCode::CONFLICT),
            (
                RegistrarError::ForeignKeyViolation("x".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (
                RegistrarError::unauthorized("nope"),
                StatusCode::FORBIDDEN,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiErr::from(err).status, expected);
        }
    }

    #[test]
    fn test_database_failures_are_opaque() {
        let err = RegistrarError::Db(sea_orm::DbErr::Custom("secret detail".to_owned()));
        let api = ApiErr::from(err);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("secret detail"));
    }
}
