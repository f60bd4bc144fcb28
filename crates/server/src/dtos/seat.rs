use chrono::NaiveDate;
use database::entities::seats;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct SeatResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub exam_date: NaiveDate,
    pub evaluation_date: Option<NaiveDate>,
    pub mark: Option<f64>,
}

impl From<seats::Model> for SeatResponse {
    fn from(seat: seats::Model) -> Self {
        Self {
            id: seat.id,
            student_id: seat.student_id,
            course_id: seat.course_id,
            exam_date: seat.exam_date,
            evaluation_date: seat.evaluation_date,
            mark: seat.mark,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollRequest {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub exam_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EvaluationRequest {
    pub evaluation_date: NaiveDate,
    /// In [0, 10]; omit to keep the seat's current mark
    pub mark: Option<f64>,
}
