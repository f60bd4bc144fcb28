use crate::entities::{courses, persons, seats};
use crate::error::{RegistrarError, Result};
use crate::services::person::PersonService;
use chrono::Utc;
use models::person::PersonKind;
use models::principal::Principal;
use models::role::Role;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect,
};
use sea_orm::prelude::Date;
use uuid::Uuid;

pub const MIN_MARK: f64 = 0.0;
pub const MAX_MARK: f64 = 10.0;

/// Enrollment ledger. A seat starts Enrolled (no mark) and becomes
/// Evaluated once a mark is recorded; a mark is never cleared, the only way
/// out is unenrollment or a cascading delete.
pub struct SeatService;

impl SeatService {
    pub async fn enroll(
        db: &DatabaseConnection,
        principal: &Principal,
        student_id: Uuid,
        course_id: Uuid,
        exam_date: Date,
    ) -> Result<seats::Model> {
        Self::ensure_owns_student(db, principal, student_id).await?;

        let student = persons::Entity::find_by_id(student_id).one(db).await?;
        if !matches!(student, Some(ref p) if p.kind == PersonKind::Student) {
            return Err(RegistrarError::ForeignKeyViolation(format!(
                "student {student_id} does not exist"
            )));
        }
        let course_exists = courses::Entity::find_by_id(course_id).count(db).await? > 0;
        if !course_exists {
            return Err(RegistrarError::ForeignKeyViolation(format!(
                "course {course_id} does not exist"
            )));
        }

        let already_enrolled = seats::Entity::find()
            .filter(seats::Column::StudentId.eq(student_id))
            .filter(seats::Column::CourseId.eq(course_id))
            .count(db)
            .await?
            > 0;
        if already_enrolled {
            return Err(RegistrarError::DuplicateEnrollment);
        }

        let now = Utc::now().naive_utc();
        seats::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id),
            course_id: Set(course_id),
            exam_date: Set(exam_date),
            evaluation_date: Set(None),
            mark: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(RegistrarError::from_write_err)
    }

    /// Records (or re-records) an evaluation. Passing no mark keeps any
    /// existing one; a mark outside [0, 10] fails and leaves the seat in
    /// its prior state.
    pub async fn record_evaluation(
        db: &DatabaseConnection,
        principal: &Principal,
        seat_id: Uuid,
        evaluation_date: Date,
        mark: Option<f64>,
    ) -> Result<seats::Model> {
        let seat = seats::Entity::find_by_id(seat_id)
            .one(db)
            .await?
            .ok_or(RegistrarError::NotFound)?;

        let course = courses::Entity::find_by_id(seat.course_id)
            .one(db)
            .await?
            .ok_or(RegistrarError::NotFound)?;
        Self::ensure_owns_course(db, principal, &course).await?;

        if let Some(mark) = mark
            && !(MIN_MARK..=MAX_MARK).contains(&mark)
        {
            return Err(RegistrarError::validation(format!(
                "mark {mark} is outside [{MIN_MARK}, {MAX_MARK}]"
            )));
        }

        let kept_mark = mark.or(seat.mark);
        let mut active: seats::ActiveModel = seat.into();
        active.evaluation_date = Set(Some(evaluation_date));
        active.mark = Set(kept_mark);
        active.updated_at = Set(Utc::now().naive_utc());
        Ok(active.update(db).await?)
    }

    pub async fn unenroll(
        db: &DatabaseConnection,
        principal: &Principal,
        seat_id: Uuid,
    ) -> Result<()> {
        let seat = seats::Entity::find_by_id(seat_id)
            .one(db)
            .await?
            .ok_or(RegistrarError::NotFound)?;
        Self::ensure_owns_student(db, principal, seat.student_id).await?;

        seats::Entity::delete_by_id(seat.id).exec(db).await?;
        Ok(())
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<seats::Model>> {
        Ok(seats::Entity::find_by_id(id).one(db).await?)
    }

    pub async fn list_by_course(
        db: &DatabaseConnection,
        course_id: Uuid,
    ) -> Result<Vec<seats::Model>> {
        Ok(seats::Entity::find()
            .filter(seats::Column::CourseId.eq(course_id))
            .all(db)
            .await?)
    }

    /// Lists a student's seats. A student principal may only view its own.
    pub async fn list_by_student(
        db: &DatabaseConnection,
        principal: &Principal,
        student_id: Uuid,
    ) -> Result<Vec<seats::Model>> {
        Self::ensure_owns_student(db, principal, student_id).await?;
        Ok(seats::Entity::find()
            .filter(seats::Column::StudentId.eq(student_id))
            .all(db)
            .await?)
    }

    /// Seats of the student profile linked to a login account.
    pub async fn list_by_student_user_id(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<Vec<seats::Model>> {
        let Some(person) = PersonService::find_by_user_id(db, user_id).await? else {
            return Ok(Vec::new());
        };
        Ok(seats::Entity::find()
            .filter(seats::Column::StudentId.eq(person.id))
            .all(db)
            .await?)
    }

    pub async fn count_by_course(db: &DatabaseConnection, course_id: Uuid) -> Result<u64> {
        Ok(seats::Entity::find()
            .filter(seats::Column::CourseId.eq(course_id))
            .count(db)
            .await?)
    }

    /// Average of the recorded marks for a course. Seats that have no mark
    /// yet are excluded, not counted as zero; `None` when nothing has been
    /// marked.
    pub async fn average_mark_by_course(
        db: &DatabaseConnection,
        course_id: Uuid,
    ) -> Result<Option<f64>> {
        let marks: Vec<f64> = seats::Entity::find()
            .select_only()
            .column(seats::Column::Mark)
            .filter(seats::Column::CourseId.eq(course_id))
            .filter(seats::Column::Mark.is_not_null())
            .into_tuple()
            .all(db)
            .await?;

        if marks.is_empty() {
            return Ok(None);
        }
        Ok(Some(marks.iter().sum::<f64>() / marks.len() as f64))
    }

    async fn ensure_owns_student(
        db: &DatabaseConnection,
        principal: &Principal,
        student_id: Uuid,
    ) -> Result<()> {
        match principal.role {
            Role::Admin => Ok(()),
            Role::Professor => Err(RegistrarError::unauthorized(
                "only the student themself or an administrator may manage enrollments",
            )),
            Role::Student => {
                match PersonService::find_by_user_id(db, principal.user_id).await? {
                    Some(person) if person.id == student_id => Ok(()),
                    _ => Err(RegistrarError::unauthorized(
                        "students may only act on their own enrollments",
                    )),
                }
            }
        }
    }

    async fn ensure_owns_course(
        db: &DatabaseConnection,
        principal: &Principal,
        course: &courses::Model,
    ) -> Result<()> {
        match principal.role {
            Role::Admin => Ok(()),
            Role::Student => Err(RegistrarError::unauthorized(
                "students may not record evaluations",
            )),
            Role::Professor => {
                match PersonService::find_by_user_id(db, principal.user_id).await? {
                    Some(person) if person.id == course.professor_id => Ok(()),
                    _ => Err(RegistrarError::unauthorized(
                        "professors may only grade their own courses",
                    )),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::course::CourseService;
    use crate::services::person::{NewPerson, PersonService};
    use crate::services::user::UserService;
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use models::person::PersonPayload;
    use sea_orm::Database;

    async fn setup() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn admin() -> Principal {
        Principal::new(Uuid::new_v4(), Role::Admin)
    }

    fn exam_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    async fn make_person(
        db: &DatabaseConnection,
        email: &str,
        user_id: Option<Uuid>,
        payload: PersonPayload,
    ) -> Uuid {
        PersonService::create(
            db,
            NewPerson {
                name: "Someone".to_owned(),
                email: email.to_owned(),
                phone: None,
                address: None,
                user_id,
                payload,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn make_student(db: &DatabaseConnection, email: &str) -> Uuid {
        make_person(
            db,
            email,
            None,
            PersonPayload::Student {
                student_number: None,
            },
        )
        .await
    }

    async fn make_course(db: &DatabaseConnection) -> Uuid {
        let professor = make_person(
            db,
            "prof@example.com",
            None,
            PersonPayload::Professor { salary: 50_000.0 },
        )
        .await;
        CourseService::create(db, "Compilers", professor)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_enroll_creates_unmarked_seat() {
        let db = setup().await;
        let course = make_course(&db).await;
        let ana = make_student(&db, "ana@example.com").await;

        let seat = SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();
        assert_eq!(seat.mark, None);
        assert_eq!(seat.evaluation_date, None);
        assert_eq!(seat.exam_date, exam_date());
    }

    #[tokio::test]
    async fn test_second_enrollment_for_same_pair_rejected() {
        let db = setup().await;
        let course = make_course(&db).await;
        let ana = make_student(&db, "ana@example.com").await;

        let first = SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();
        let err = SeatService::enroll(
            &db,
            &admin(),
            ana,
            course,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RegistrarError::DuplicateEnrollment));

        // The first seat is unaffected.
        let kept = SeatService::find_by_id(&db, first.id).await.unwrap().unwrap();
        assert_eq!(kept.exam_date, exam_date());
    }

    #[tokio::test]
    async fn test_enroll_requires_existing_student_and_course() {
        let db = setup().await;
        let course = make_course(&db).await;
        let ana = make_student(&db, "ana@example.com").await;

        let err = SeatService::enroll(&db, &admin(), Uuid::new_v4(), course, exam_date())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::ForeignKeyViolation(_)));

        let err = SeatService::enroll(&db, &admin(), ana, Uuid::new_v4(), exam_date())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn test_enroll_rejects_non_student_person() {
        let db = setup().await;
        let course = make_course(&db).await;
        let professor = make_person(
            &db,
            "other@example.com",
            None,
            PersonPayload::Professor { salary: 1.0 },
        )
        .await;

        let err = SeatService::enroll(&db, &admin(), professor, course, exam_date())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn test_student_may_only_enroll_itself() {
        let db = setup().await;
        let course = make_course(&db).await;
        let account = UserService::create_account(&db, "ana", "h", Role::Student)
            .await
            .unwrap();
        let ana = make_person(
            &db,
            "ana@example.com",
            Some(account.id),
            PersonPayload::Student {
                student_number: None,
            },
        )
        .await;
        let bea = make_student(&db, "bea@example.com").await;
        let principal = Principal::new(account.id, Role::Student);

        let err = SeatService::enroll(&db, &principal, bea, course, exam_date())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::Unauthorized(_)));

        SeatService::enroll(&db, &principal, ana, course, exam_date())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_out_of_range_mark_leaves_seat_untouched() {
        let db = setup().await;
        let course = make_course(&db).await;
        let ana = make_student(&db, "ana@example.com").await;
        let seat = SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();

        let eval = NaiveDate::from_ymd_opt(2026, 6, 20).unwrap();
        let err = SeatService::record_evaluation(&db, &admin(), seat.id, eval, Some(11.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::Validation(_)));

        let unchanged = SeatService::find_by_id(&db, seat.id).await.unwrap().unwrap();
        assert_eq!(unchanged.mark, None);
        assert_eq!(unchanged.evaluation_date, None);
    }

    #[tokio::test]
    async fn test_evaluation_sets_mark_and_allows_regrade() {
        let db = setup().await;
        let course = make_course(&db).await;
        let ana = make_student(&db, "ana@example.com").await;
        let seat = SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();

        let eval = NaiveDate::from_ymd_opt(2026, 6, 20).unwrap();
        let graded = SeatService::record_evaluation(&db, &admin(), seat.id, eval, Some(6.5))
            .await
            .unwrap();
        assert_eq!(graded.mark, Some(6.5));
        assert_eq!(graded.evaluation_date, Some(eval));

        // Re-grade replaces the mark; an evaluation without a mark keeps it.
        let regraded = SeatService::record_evaluation(&db, &admin(), seat.id, eval, Some(7.0))
            .await
            .unwrap();
        assert_eq!(regraded.mark, Some(7.0));

        let kept = SeatService::record_evaluation(&db, &admin(), seat.id, eval, None)
            .await
            .unwrap();
        assert_eq!(kept.mark, Some(7.0), "a mark is never cleared");
    }

    #[tokio::test]
    async fn test_student_cannot_record_evaluation() {
        let db = setup().await;
        let course = make_course(&db).await;
        let account = UserService::create_account(&db, "ana", "h", Role::Student)
            .await
            .unwrap();
        let ana = make_person(
            &db,
            "ana@example.com",
            Some(account.id),
            PersonPayload::Student {
                student_number: None,
            },
        )
        .await;
        let seat = SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();

        // Not even their own seat.
        let principal = Principal::new(account.id, Role::Student);
        let eval = NaiveDate::from_ymd_opt(2026, 6, 20).unwrap();
        let err = SeatService::record_evaluation(&db, &principal, seat.id, eval, Some(10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::Unauthorized(_)));

        let unchanged = SeatService::find_by_id(&db, seat.id).await.unwrap().unwrap();
        assert_eq!(unchanged.mark, None);
    }

    #[tokio::test]
    async fn test_professor_cannot_manage_enrollments() {
        let db = setup().await;
        let course = make_course(&db).await;
        let ana = make_student(&db, "ana@example.com").await;
        let seat = SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();

        let account = UserService::create_account(&db, "grace", "h", Role::Professor)
            .await
            .unwrap();
        let principal = Principal::new(account.id, Role::Professor);

        let bea = make_student(&db, "bea@example.com").await;
        let err = SeatService::enroll(&db, &principal, bea, course, exam_date())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::Unauthorized(_)));

        let err = SeatService::unenroll(&db, &principal, seat.id)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::Unauthorized(_)));
        assert!(SeatService::find_by_id(&db, seat.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_professor_may_only_grade_own_courses() {
        let db = setup().await;
        let course = make_course(&db).await;
        let ana = make_student(&db, "ana@example.com").await;
        let seat = SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();

        let account = UserService::create_account(&db, "intruder", "h", Role::Professor)
            .await
            .unwrap();
        make_person(
            &db,
            "intruder@example.com",
            Some(account.id),
            PersonPayload::Professor { salary: 1.0 },
        )
        .await;
        let principal = Principal::new(account.id, Role::Professor);

        let eval = NaiveDate::from_ymd_opt(2026, 6, 20).unwrap();
        let err = SeatService::record_evaluation(&db, &principal, seat.id, eval, Some(5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_average_excludes_unmarked_seats() {
        let db = setup().await;
        let course = make_course(&db).await;
        let ana = make_student(&db, "ana@example.com").await;
        let bea = make_student(&db, "bea@example.com").await;
        let carl = make_student(&db, "carl@example.com").await;

        let eval = NaiveDate::from_ymd_opt(2026, 6, 20).unwrap();
        let s1 = SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();
        let s2 = SeatService::enroll(&db, &admin(), bea, course, exam_date())
            .await
            .unwrap();
        SeatService::enroll(&db, &admin(), carl, course, exam_date())
            .await
            .unwrap();
        SeatService::record_evaluation(&db, &admin(), s1.id, eval, Some(7.0))
            .await
            .unwrap();
        SeatService::record_evaluation(&db, &admin(), s2.id, eval, Some(9.0))
            .await
            .unwrap();

        let average = SeatService::average_mark_by_course(&db, course)
            .await
            .unwrap();
        assert_eq!(average, Some(8.0), "null marks are excluded, not zero");
        assert_eq!(SeatService::count_by_course(&db, course).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_average_is_none_without_marks() {
        let db = setup().await;
        let course = make_course(&db).await;
        let ana = make_student(&db, "ana@example.com").await;
        SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();

        assert_eq!(
            SeatService::average_mark_by_course(&db, course).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_listing_unknown_course_returns_empty() {
        let db = setup().await;
        let seats = SeatService::list_by_course(&db, Uuid::new_v4()).await.unwrap();
        assert!(seats.is_empty());
        assert_eq!(
            SeatService::count_by_course(&db, Uuid::new_v4()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_student_sees_only_own_seats() {
        let db = setup().await;
        let course = make_course(&db).await;
        let account = UserService::create_account(&db, "ana", "h", Role::Student)
            .await
            .unwrap();
        let ana = make_person(
            &db,
            "ana@example.com",
            Some(account.id),
            PersonPayload::Student {
                student_number: None,
            },
        )
        .await;
        let bea = make_student(&db, "bea@example.com").await;
        SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();
        SeatService::enroll(&db, &admin(), bea, course, exam_date())
            .await
            .unwrap();

        let principal = Principal::new(account.id, Role::Student);
        let own = SeatService::list_by_student(&db, &principal, ana).await.unwrap();
        assert_eq!(own.len(), 1);

        let err = SeatService::list_by_student(&db, &principal, bea)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrarError::Unauthorized(_)));

        let mine = SeatService::list_by_student_user_id(&db, account.id)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_unenroll_deletes_the_seat() {
        let db = setup().await;
        let course = make_course(&db).await;
        let ana = make_student(&db, "ana@example.com").await;
        let seat = SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();

        SeatService::unenroll(&db, &admin(), seat.id).await.unwrap();
        assert!(SeatService::find_by_id(&db, seat.id).await.unwrap().is_none());

        let err = SeatService::unenroll(&db, &admin(), seat.id).await.unwrap_err();
        assert!(matches!(err, RegistrarError::NotFound));
    }

    #[tokio::test]
    async fn test_deleting_student_removes_their_seats() {
        let db = setup().await;
        let course = make_course(&db).await;
        let ana = make_student(&db, "ana@example.com").await;
        SeatService::enroll(&db, &admin(), ana, course, exam_date())
            .await
            .unwrap();

        PersonService::delete_by_id(&db, ana).await.unwrap();
        assert!(SeatService::list_by_course(&db, course).await.unwrap().is_empty());
    }
}
