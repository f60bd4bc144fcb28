use database::entities::{addresses, persons};
use database::services::person::NewAddress;
use models::person::{PersonKind, PersonPayload};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressDto {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl From<addresses::Model> for AddressDto {
    fn from(address: addresses::Model) -> Self {
        Self {
            street: address.street,
            city: address.city,
            state: address.state,
            country: address.country,
        }
    }
}

impl From<AddressDto> for NewAddress {
    fn from(dto: AddressDto) -> Self {
        Self {
            street: dto.street,
            city: dto.city,
            state: dto.state,
            country: dto.country,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePersonRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<AddressDto>,
    /// Existing account to link; accounts are never created here
    pub user_id: Option<Uuid>,
    /// STUDENT, PROFESSOR or ADMINISTRATOR
    pub kind: String,
    /// Students only; assigned automatically when omitted
    pub student_number: Option<Uuid>,
    /// Professors only; required for them
    pub salary: Option<f64>,
}

impl CreatePersonRequest {
    /// Folds the flat request fields into the variant payload.
    pub fn payload(&self) -> Result<PersonPayload, String> {
        match self.kind.parse::<PersonKind>() {
            Ok(PersonKind::Student) => Ok(PersonPayload::Student {
                student_number: self.student_number,
            }),
            Ok(PersonKind::Professor) => match self.salary {
                Some(salary) => Ok(PersonPayload::Professor { salary }),
                None => Err("professor salary is required".to_owned()),
            },
            Ok(PersonKind::Administrator) => Ok(PersonPayload::Administrator),
            Err(_) => Err(format!("unknown person kind: {}", self.kind)),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePersonRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<AddressDto>,
    pub user_id: Option<Uuid>,
    pub student_number: Option<Uuid>,
    pub salary: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PersonResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub kind: String,
    pub student_number: Option<Uuid>,
    pub salary: Option<f64>,
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressDto>,
}

impl PersonResponse {
    pub fn from_parts(person: persons::Model, address: Option<addresses::Model>) -> Self {
        Self {
            id: person.id,
            name: person.name,
            email: person.email,
            phone: person.phone,
            kind: person.kind.to_string(),
            student_number: person.student_number,
            salary: person.salary,
            user_id: person.user_id,
            address: address.map(AddressDto::from),
        }
    }
}

impl From<persons::Model> for PersonResponse {
    fn from(person: persons::Model) -> Self {
        Self::from_parts(person, None)
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct PersonQueryParams {
    /// Case-insensitive substring over name or email; blank matches all
    pub search: Option<String>,
    /// Restrict to one variant: STUDENT, PROFESSOR or ADMINISTRATOR
    pub kind: Option<String>,
}
