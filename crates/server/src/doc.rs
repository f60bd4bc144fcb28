use crate::routes::{auth, course, health, person, root, seat};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        auth::login,
        auth::register,
        person::list_persons,
        person::create_person,
        person::get_person,
        person::update_person,
        person::delete_person,
        course::list_courses,
        course::create_course,
        course::get_course,
        course::update_course,
        course::delete_course,
        course::list_course_seats,
        course::get_course_stats,
        seat::enroll,
        seat::my_seats,
        seat::record_evaluation,
        seat::unenroll
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Accounts and bearer tokens"),
        (name = "Persons", description = "Students, professors and administrators"),
        (name = "Courses", description = "Courses and their statistics"),
        (name = "Seats", description = "Enrollment and evaluations"),
        (name = "Health", description = "Liveness probe"),
    ),
    info(
        title = "Registrar API",
        version = "1.0.0",
        description = "Academic records backend",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
