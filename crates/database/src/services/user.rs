use crate::entities::{persons, users};
use crate::error::{RegistrarError, Result};
use chrono::Utc;
use log::debug;
use models::role::Role;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

/// Identity store: login accounts with an opaque password hash.
///
/// Accounts exist independently of person profiles; linking them is the
/// person service's concern. Plaintext credentials never reach this layer,
/// hashing and verification live with the presentation collaborator.
pub struct UserService;

impl UserService {
    pub async fn create_account(
        db: &DatabaseConnection,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<users::Model> {
        if username.trim().is_empty() {
            return Err(RegistrarError::validation("username must not be blank"));
        }
        if Self::exists_by_username(db, username).await? {
            return Err(RegistrarError::DuplicateUsername);
        }

        let now = Utc::now().naive_utc();
        users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_owned()),
            password_hash: Set(password_hash.to_owned()),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(RegistrarError::from_write_err)
    }

    /// Sole authentication lookup point; the caller compares credentials
    /// against the returned hash.
    pub async fn find_by_username(
        db: &DatabaseConnection,
        username: &str,
    ) -> Result<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await?)
    }

    pub async fn exists_by_username(db: &DatabaseConnection, username: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<users::Model>> {
        Ok(users::Entity::find_by_id(id).one(db).await?)
    }

    pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<users::Model>> {
        Ok(users::Entity::find().all(db).await?)
    }

    pub async fn save(db: &DatabaseConnection, user: users::Model) -> Result<users::Model> {
        if user.username.trim().is_empty() {
            return Err(RegistrarError::validation("username must not be blank"));
        }
        let taken = users::Entity::find()
            .filter(users::Column::Username.eq(user.username.as_str()))
            .filter(users::Column::Id.ne(user.id))
            .count(db)
            .await?
            > 0;
        if taken {
            return Err(RegistrarError::DuplicateUsername);
        }

        let mut active: users::ActiveModel = user.clone().into();
        active.username = Set(user.username);
        active.password_hash = Set(user.password_hash);
        active.role = Set(user.role);
        active.updated_at = Set(Utc::now().naive_utc());
        active
            .update(db)
            .await
            .map_err(RegistrarError::from_write_err)
    }

    /// Removes an account, detaching any person profile that links to it.
    /// The profile itself stays; only person deletion cascades the other way.
    pub async fn delete_by_id(db: &DatabaseConnection, id: Uuid) -> Result<()> {
        let txn = db.begin().await?;

        let user = users::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(RegistrarError::NotFound)?;

        if let Some(person) = persons::Entity::find()
            .filter(persons::Column::UserId.eq(id))
            .one(&txn)
            .await?
        {
            debug!("detaching person {} from account {}", person.id, id);
            let mut active: persons::ActiveModel = person.into();
            active.user_id = Set(None);
            active.updated_at = Set(Utc::now().naive_utc());
            active.update(&txn).await?;
        }

        users::Entity::delete_by_id(user.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::person::{NewPerson, PersonService};
    use migration::{Migrator, MigratorTrait};
    use models::person::PersonPayload;
    use sea_orm::Database;

    async fn setup() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_account_persists_hash_and_role() {
        let db = setup().await;
        let user = UserService::create_account(&db, "ana", "$argon2$fake", Role::Admin)
            .await
            .unwrap();

        assert_eq!(user.username, "ana");
        assert_eq!(user.password_hash, "$argon2$fake");
        assert_eq!(user.role, Role::Admin);

        let fetched = UserService::find_by_username(&db, "ana").await.unwrap();
        assert_eq!(fetched.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = setup().await;
        UserService::create_account(&db, "ana", "h1", Role::Student)
            .await
            .unwrap();

        let err = UserService::create_account(&db, "ana", "h2", Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::DuplicateUsername));
    }

    #[tokio::test]
    async fn test_find_all_returns_every_account() {
        let db = setup().await;
        UserService::create_account(&db, "ana", "h", Role::Student)
            .await
            .unwrap();
        UserService::create_account(&db, "bob", "h", Role::Professor)
            .await
            .unwrap();

        let all = UserService::find_all(&db).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_username_lookup_is_case_sensitive() {
        let db = setup().await;
        UserService::create_account(&db, "Ana", "h", Role::Student)
            .await
            .unwrap();

        assert!(UserService::exists_by_username(&db, "Ana").await.unwrap());
        assert!(!UserService::exists_by_username(&db, "ana").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_rejects_username_of_other_account() {
        let db = setup().await;
        UserService::create_account(&db, "ana", "h", Role::Student)
            .await
            .unwrap();
        let bob = UserService::create_account(&db, "bob", "h", Role::Student)
            .await
            .unwrap();

        let renamed = users::Model {
            username: "ana".to_owned(),
            ..bob
        };
        let err = UserService::save(&db, renamed).await.unwrap_err();
        assert!(matches!(err, RegistrarError::DuplicateUsername));
    }

    #[tokio::test]
    async fn test_save_keeps_own_username() {
        let db = setup().await;
        let ana = UserService::create_account(&db, "ana", "h", Role::Student)
            .await
            .unwrap();

        let updated = users::Model {
            password_hash: "new-hash".to_owned(),
            ..ana
        };
        let saved = UserService::save(&db, updated).await.unwrap();
        assert_eq!(saved.username, "ana");
        assert_eq!(saved.password_hash, "new-hash");
    }

    #[tokio::test]
    async fn test_delete_missing_account_is_not_found() {
        let db = setup().await;
        let err = UserService::delete_by_id(&db, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_account_detaches_linked_person() {
        let db = setup().await;
        let user = UserService::create_account(&db, "ana", "h", Role::Student)
            .await
            .unwrap();
        let person = PersonService::create(
            &db,
            NewPerson {
                name: "Ana García".to_owned(),
                email: "ana@example.com".to_owned(),
                phone: None,
                address: None,
                user_id: Some(user.id),
                payload: PersonPayload::Student {
                    student_number: None,
                },
            },
        )
        .await
        .unwrap();
        assert_eq!(person.user_id, Some(user.id));

        UserService::delete_by_id(&db, user.id).await.unwrap();

        let person = PersonService::find_by_id(&db, person.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(person.user_id, None, "profile must survive with the link cleared");
        assert!(
            UserService::find_by_id(&db, user.id).await.unwrap().is_none(),
            "account row must be gone"
        );
    }
}
