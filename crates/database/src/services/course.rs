use crate::entities::{courses, persons, seats};
use crate::error::{RegistrarError, Result};
use crate::services::filter::contains_ci;
use chrono::Utc;
use log::debug;
use models::person::PersonKind;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

/// Course catalog: every course is owned by exactly one professor.
pub struct CourseService;

impl CourseService {
    pub async fn create(
        db: &DatabaseConnection,
        name: &str,
        professor_id: Uuid,
    ) -> Result<courses::Model> {
        Self::validate_name(name)?;
        Self::ensure_professor_exists(db, professor_id).await?;

        let now = Utc::now().naive_utc();
        courses::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.trim().to_owned()),
            professor_id: Set(professor_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(RegistrarError::from_write_err)
    }

    pub async fn save(
        db: &DatabaseConnection,
        id: Uuid,
        name: &str,
        professor_id: Uuid,
    ) -> Result<courses::Model> {
        Self::validate_name(name)?;
        Self::ensure_professor_exists(db, professor_id).await?;

        let course = courses::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(RegistrarError::NotFound)?;

        let mut active: courses::ActiveModel = course.into();
        active.name = Set(name.trim().to_owned());
        active.professor_id = Set(professor_id);
        active.updated_at = Set(Utc::now().naive_utc());
        active
            .update(db)
            .await
            .map_err(RegistrarError::from_write_err)
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<courses::Model>> {
        Ok(courses::Entity::find_by_id(id).one(db).await?)
    }

    pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<courses::Model>> {
        Ok(courses::Entity::find().all(db).await?)
    }

    pub async fn find_by_professor_id(
        db: &DatabaseConnection,
        professor_id: Uuid,
    ) -> Result<Vec<courses::Model>> {
        Ok(courses::Entity::find()
            .filter(courses::Column::ProfessorId.eq(professor_id))
            .all(db)
            .await?)
    }

    /// Case-insensitive substring search on the course name; a blank term
    /// returns the whole catalog.
    pub async fn search(db: &DatabaseConnection, term: &str) -> Result<Vec<courses::Model>> {
        let mut query = courses::Entity::find();
        if let Some(condition) = contains_ci(&[courses::Column::Name], term) {
            query = query.filter(condition);
        }
        Ok(query.all(db).await?)
    }

    /// Deletes a course and every seat that references it in one
    /// transaction, so no seat can outlive its course.
    pub async fn delete_by_id(db: &DatabaseConnection, id: Uuid) -> Result<()> {
        let txn = db.begin().await?;

        let course = courses::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RegistrarError::NotFound)?;

        let removed = seats::Entity::delete_many()
            .filter(seats::Column::CourseId.eq(course.id))
            .exec(&txn)
            .await?;
        debug!(
            "removed {} seats while deleting course {}",
            removed.rows_affected, course.id
        );

        courses::Entity::delete_by_id(course.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(RegistrarError::validation("course name must not be blank"));
        }
        Ok(())
    }

    async fn ensure_professor_exists(db: &DatabaseConnection, professor_id: Uuid) -> Result<()> {
        let professor = persons::Entity::find_by_id(professor_id).one(db).await?;
        match professor {
            Some(person) if person.kind == PersonKind::Professor => Ok(()),
            _ => Err(RegistrarError::ForeignKeyViolation(format!(
                "professor {professor_id} does not exist"
            ))),
        }
    }
}
