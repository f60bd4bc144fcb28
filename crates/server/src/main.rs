use axum::{
    Router,
    routing::{get, post, put},
};
use database::db::create_connection;
use log::info;
use migration::{Migrator, MigratorTrait};
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::doc::ApiDoc;
use crate::state::AppState;
use crate::utils::shutdown::shutdown_signal;

mod doc;
mod dtos;
mod error;
mod routes;
mod security;
mod state;
mod utils;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let db = create_connection()
        .await
        .expect("failed to connect to the database");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");

    let jwt_secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let state = AppState { db, jwt_secret };

    let app = Router::new()
        .route("/", get(routes::root::root))
        .route("/health", get(routes::health::health))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/register", post(routes::auth::register))
        .route(
            "/persons",
            get(routes::person::list_persons).post(routes::person::create_person),
        )
        .route(
            "/persons/{id}",
            get(routes::person::get_person)
                .put(routes::person::update_person)
                .delete(routes::person::delete_person),
        )
        .route(
            "/courses",
            get(routes::course::list_courses).post(routes::course::create_course),
        )
        .route(
            "/courses/{id}",
            get(routes::course::get_course)
                .put(routes::course::update_course)
                .delete(routes::course::delete_course),
        )
        .route("/courses/{id}/seats", get(routes::course::list_course_seats))
        .route("/courses/{id}/stats", get(routes::course::get_course_stats))
        .route("/seats", post(routes::seat::enroll))
        .route("/seats/mine", get(routes::seat::my_seats))
        .route(
            "/seats/{id}/evaluation",
            put(routes::seat::record_evaluation),
        )
        .route("/seats/{id}", axum::routing::delete(routes::seat::unenroll))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listener");
    info!("Running axum on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}
