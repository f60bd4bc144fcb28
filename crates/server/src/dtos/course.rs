use database::entities::courses;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    pub id: Uuid,
    pub name: String,
    pub professor_id: Uuid,
}

impl From<courses::Model> for CourseResponse {
    fn from(course: courses::Model) -> Self {
        Self {
            id: course.id,
            name: course.name,
            professor_id: course.professor_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CourseRequest {
    pub name: String,
    pub professor_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct CourseQueryParams {
    /// Case-insensitive substring over the course name
    pub search: Option<String>,
    pub professor_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseStatsResponse {
    pub seat_count: u64,
    /// Average of recorded marks; absent while nothing has been marked
    pub average_mark: Option<f64>,
}
