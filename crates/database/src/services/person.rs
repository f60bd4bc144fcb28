use crate::entities::{addresses, courses, persons, seats, users};
use crate::error::{RegistrarError, Result};
use crate::services::filter::contains_ci;
use chrono::Utc;
use log::debug;
use models::person::{PersonKind, PersonPayload};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

/// Address fields for a person's owned address record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Input for creating a person of any variant.
///
/// `user_id` links an existing account; a person is never created with a
/// fresh account implicitly.
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<NewAddress>,
    pub user_id: Option<Uuid>,
    pub payload: PersonPayload,
}

/// Input for updating a person. The variant itself is fixed at creation;
/// `student_number`, when given, must match the stored value and `salary`
/// only applies to professors.
#[derive(Debug, Clone)]
pub struct UpdatePerson {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<NewAddress>,
    pub user_id: Option<Uuid>,
    pub student_number: Option<Uuid>,
    pub salary: Option<f64>,
}

pub struct PersonService;

impl PersonService {
    pub async fn create(db: &DatabaseConnection, new: NewPerson) -> Result<persons::Model> {
        Self::validate_profile(&new.name, &new.email)?;

        let kind = new.payload.kind();
        let (student_number, salary) = match new.payload {
            PersonPayload::Student { student_number } => {
                (Some(student_number.unwrap_or_else(Uuid::new_v4)), None)
            }
            PersonPayload::Professor { salary } => {
                Self::validate_salary(salary)?;
                (None, Some(salary))
            }
            PersonPayload::Administrator => (None, None),
        };

        let email_taken = persons::Entity::find()
            .filter(persons::Column::Email.eq(new.email.as_str()))
            .count(db)
            .await?
            > 0;
        if email_taken {
            return Err(RegistrarError::DuplicateEmail);
        }

        if let Some(number) = student_number {
            let taken = persons::Entity::find()
                .filter(persons::Column::StudentNumber.eq(number))
                .count(db)
                .await?
                > 0;
            if taken {
                return Err(RegistrarError::DuplicateStudentNumber);
            }
        }

        if let Some(user_id) = new.user_id {
            Self::ensure_account_exists(db, user_id).await?;
            Self::ensure_account_not_linked(db, user_id, None).await?;
        }

        let now = Utc::now().naive_utc();
        let txn = db.begin().await?;

        let address_id = match new.address {
            Some(address) => Some(Self::insert_address(&txn, address).await?),
            None => None,
        };

        let person = persons::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            email: Set(new.email),
            phone: Set(new.phone),
            kind: Set(kind),
            student_number: Set(student_number),
            salary: Set(salary),
            address_id: Set(address_id),
            user_id: Set(new.user_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(RegistrarError::from_write_err)?;

        txn.commit().await?;
        Ok(person)
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<persons::Model>> {
        Ok(persons::Entity::find_by_id(id).one(db).await?)
    }

    /// Loads a person together with its owned address.
    pub async fn find_with_address(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<Option<(persons::Model, Option<addresses::Model>)>> {
        Ok(persons::Entity::find_by_id(id)
            .find_also_related(addresses::Entity)
            .one(db)
            .await?)
    }

    /// Resolves a login account to its person profile, if one is linked.
    pub async fn find_by_user_id(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<Option<persons::Model>> {
        Ok(persons::Entity::find()
            .filter(persons::Column::UserId.eq(user_id))
            .one(db)
            .await?)
    }

    pub async fn find_all_of_kind(
        db: &DatabaseConnection,
        kind: PersonKind,
    ) -> Result<Vec<persons::Model>> {
        Ok(persons::Entity::find()
            .filter(persons::Column::Kind.eq(kind))
            .all(db)
            .await?)
    }

    /// Case-insensitive substring search over name OR email; a blank term
    /// returns everyone.
    pub async fn search(
        db: &DatabaseConnection,
        term: &str,
        kind: Option<PersonKind>,
    ) -> Result<Vec<persons::Model>> {
        let mut query = persons::Entity::find();
        if let Some(condition) =
            contains_ci(&[persons::Column::Name, persons::Column::Email], term)
        {
            query = query.filter(condition);
        }
        if let Some(kind) = kind {
            query = query.filter(persons::Column::Kind.eq(kind));
        }
        Ok(query.all(db).await?)
    }

    pub async fn save(db: &DatabaseConnection, update: UpdatePerson) -> Result<persons::Model> {
        Self::validate_profile(&update.name, &update.email)?;

        let person = Self::find_by_id(db, update.id)
            .await?
            .ok_or(RegistrarError::NotFound)?;

        let email_taken = persons::Entity::find()
            .filter(persons::Column::Email.eq(update.email.as_str()))
            .filter(persons::Column::Id.ne(update.id))
            .count(db)
            .await?
            > 0;
        if email_taken {
            return Err(RegistrarError::DuplicateEmail);
        }

        // The student number is assigned once and never changes.
        if let Some(requested) = update.student_number
            && person.student_number != Some(requested)
        {
            return Err(RegistrarError::validation(
                "student number cannot be changed once assigned",
            ));
        }

        let salary = match person.kind {
            PersonKind::Professor => {
                let salary = update
                    .salary
                    .ok_or_else(|| RegistrarError::validation("professor salary is required"))?;
                Self::validate_salary(salary)?;
                Some(salary)
            }
            _ => None,
        };

        if let Some(user_id) = update.user_id {
            Self::ensure_account_exists(db, user_id).await?;
            Self::ensure_account_not_linked(db, user_id, Some(update.id)).await?;
        }

        let now = Utc::now().naive_utc();
        let txn = db.begin().await?;

        let mut orphaned_address = None;
        let address_id = match update.address {
            Some(address) => match person.address_id {
                Some(existing) => {
                    let row = addresses::Entity::find_by_id(existing)
                        .one(&txn)
                        .await?
                        .ok_or(RegistrarError::NotFound)?;
                    let mut active: addresses::ActiveModel = row.into();
                    active.street = Set(address.street);
                    active.city = Set(address.city);
                    active.state = Set(address.state);
                    active.country = Set(address.country);
                    active.update(&txn).await?;
                    Some(existing)
                }
                None => Some(Self::insert_address(&txn, address).await?),
            },
            None => {
                orphaned_address = person.address_id;
                None
            }
        };

        let mut active: persons::ActiveModel = person.into();
        active.name = Set(update.name);
        active.email = Set(update.email);
        active.phone = Set(update.phone);
        active.salary = Set(salary);
        active.address_id = Set(address_id);
        active.user_id = Set(update.user_id);
        active.updated_at = Set(now);
        let saved = active
            .update(&txn)
            .await
            .map_err(RegistrarError::from_write_err)?;

        // Orphan removal: a disassociated address has no owner left.
        if let Some(id) = orphaned_address {
            addresses::Entity::delete_by_id(id).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(saved)
    }

    /// Deletes a person and everything it owns as one atomic unit: the
    /// student's seats, the owned address, and the linked account. The
    /// cascade is spelled out here instead of delegated to the schema.
    pub async fn delete_by_id(db: &DatabaseConnection, id: Uuid) -> Result<()> {
        let txn = db.begin().await?;

        let person = persons::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RegistrarError::NotFound)?;

        match person.kind {
            PersonKind::Student => {
                let removed = seats::Entity::delete_many()
                    .filter(seats::Column::StudentId.eq(person.id))
                    .exec(&txn)
                    .await?;
                debug!(
                    "removed {} seats while deleting student {}",
                    removed.rows_affected, person.id
                );
            }
            PersonKind::Professor => {
                let owned_courses = courses::Entity::find()
                    .filter(courses::Column::ProfessorId.eq(person.id))
                    .count(&txn)
                    .await?;
                if owned_courses > 0 {
                    return Err(RegistrarError::ForeignKeyViolation(format!(
                        "professor still owns {owned_courses} courses"
                    )));
                }
            }
            PersonKind::Administrator => {}
        }

        persons::Entity::delete_by_id(person.id).exec(&txn).await?;

        if let Some(address_id) = person.address_id {
            addresses::Entity::delete_by_id(address_id).exec(&txn).await?;
        }
        if let Some(user_id) = person.user_id {
            users::Entity::delete_by_id(user_id).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    fn validate_profile(name: &str, email: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(RegistrarError::validation("name must not be blank"));
        }
        if email.trim().is_empty() {
            return Err(RegistrarError::validation("email must not be blank"));
        }
        Ok(())
    }

    fn validate_salary(salary: f64) -> Result<()> {
        if !salary.is_finite() || salary < 0.0 {
            return Err(RegistrarError::validation(
                "professor salary must be non-negative",
            ));
        }
        Ok(())
    }

    async fn ensure_account_exists(db: &DatabaseConnection, user_id: Uuid) -> Result<()> {
        let exists = users::Entity::find_by_id(user_id).count(db).await? > 0;
        if exists {
            Ok(())
        } else {
            Err(RegistrarError::ForeignKeyViolation(format!(
                "user account {user_id} does not exist"
            )))
        }
    }

    /// An account backs at most one profile; `exclude` lets a person keep
    /// its own link on save. The unique index on `user_id` is the arbiter
    /// when two writers race past this check.
    async fn ensure_account_not_linked(
        db: &DatabaseConnection,
        user_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<()> {
        let mut query = persons::Entity::find().filter(persons::Column::UserId.eq(user_id));
        if let Some(person_id) = exclude {
            query = query.filter(persons::Column::Id.ne(person_id));
        }
        if query.count(db).await? > 0 {
            return Err(RegistrarError::DuplicateAccountLink);
        }
        Ok(())
    }

    async fn insert_address<C>(conn: &C, address: NewAddress) -> Result<Uuid>
    where
        C: sea_orm::ConnectionTrait,
    {
        let id = Uuid::new_v4();
        addresses::ActiveModel {
            id: Set(id),
            street: Set(address.street),
            city: Set(address.city),
            state: Set(address.state),
            country: Set(address.country),
        }
        .insert(conn)
        .await?;
        Ok(id)
    }
}
