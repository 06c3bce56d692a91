mod handlers;
mod middleware;

pub use middleware::{RateLimiter, SecurityConfig};

use axum::{
    extract::FromRef,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::grading::AutoGrader;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub grader: AutoGrader,
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AutoGrader {
    fn from_ref(state: &AppState) -> Self {
        state.grader
    }
}

/// Router with default grading and no authentication.
pub fn create_router(db: Database) -> Router {
    create_router_with(db, AutoGrader::default(), SecurityConfig::disabled())
}

pub fn create_router_with(db: Database, grader: AutoGrader, security: SecurityConfig) -> Router {
    let api = Router::new()
        // Courses
        .route("/courses", get(handlers::list_courses))
        .route("/courses", post(handlers::create_course))
        .route("/courses/{id}", get(handlers::get_course))
        .route("/courses/{id}", put(handlers::update_course))
        .route("/courses/{id}", delete(handlers::delete_course))
        .route("/courses/{id}/archive", post(handlers::archive_course))
        .route("/courses/{id}/restore", post(handlers::restore_course))
        // Employees and development plans
        .route("/employees", get(handlers::list_employees))
        .route("/employees", post(handlers::create_employee))
        .route("/employees/{id}", get(handlers::get_employee))
        .route("/employees/{id}", delete(handlers::delete_employee))
        .route("/employees/{id}/plan", post(handlers::assign_course))
        .route("/employees/{id}/plan/{course_id}", delete(handlers::unassign_course))
        .route("/employees/{id}/courses", get(handlers::list_plan_courses))
        .route("/employees/{id}/courses/{course_id}/access", get(handlers::check_access))
        .route("/employees/{id}/courses/{course_id}/progress", put(handlers::update_progress))
        .route("/employees/{id}/courses/{course_id}/certify", post(handlers::certify_course))
        .route(
            "/employees/{id}/courses/{course_id}/tasks/{task_id}/submissions",
            post(handlers::submit_task),
        )
        .route("/employees/{id}/submissions", get(handlers::list_submissions))
        // Submissions
        .route("/submissions/{id}", get(handlers::get_submission))
        .route("/submissions/{id}/review", post(handlers::review_submission))
        // ЗРС documents
        .route("/zrs", get(handlers::list_zrs))
        .route("/zrs", post(handlers::create_zrs))
        .route("/zrs/{id}", get(handlers::get_zrs))
        .route("/zrs/{id}", put(handlers::update_zrs))
        .route("/zrs/{id}", delete(handlers::delete_zrs))
        .route("/zrs/{id}/submit", post(handlers::submit_zrs))
        .route("/zrs/{id}/approve", post(handlers::approve_zrs))
        .route("/zrs/{id}/reject", post(handlers::reject_zrs))
        .route("/zrs/{id}/rework", post(handlers::rework_zrs));

    let mut api = api.layer(from_fn_with_state(
        security.clone(),
        middleware::auth_middleware,
    ));
    if let Some(limiter) = security.rate_limiter.clone() {
        api = api.layer(from_fn_with_state(limiter, middleware::rate_limit_middleware));
    }

    // Health stays reachable without a key.
    let api = api.route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&security))
        .with_state(AppState { db, grader })
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    match &security.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
        None => CorsLayer::permissive(),
    }
}
