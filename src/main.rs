use std::path::PathBuf;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_portal::{auth, config, db, handlers, paths, state::AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_portal=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = db::Store::connect(&config::mongodb_uri(), &config::db_name())
        .await
        .expect("Failed to connect to MongoDB");

    std::fs::create_dir_all(paths::uploads_dir()).expect("Failed to create uploads directory");

    let state = AppState::new(store, PathBuf::from(paths::data_dir()));

    let app = Router::new()
        // Student accounts
        .route("/api/v1/student/register", post(auth::handlers::register_student))
        .route("/api/v1/student/login", post(auth::handlers::login_student))
        .route(
            "/api/v1/student/profile",
            get(auth::handlers::student_profile)
                .put(auth::handlers::update_student_profile)
                .delete(auth::handlers::delete_student_account),
        )
        // Student portal
        .route("/api/v1/student/dashboard-stats", get(handlers::student::dashboard_stats))
        .route("/api/v1/student/enrolled-courses", get(handlers::student::enrolled_courses))
        .route("/api/v1/student/enroll/{course_id}", post(handlers::student::enroll))
        .route("/api/v1/student/course/{course_id}", get(handlers::student::course_detail))
        .route(
            "/api/v1/student/course/{course_id}/mark-complete",
            post(handlers::student::mark_complete),
        )
        .route(
            "/api/v1/student/course/{course_id}/download/{content_id}",
            get(handlers::delivery::download_content),
        )
        .route(
            "/api/v1/student/course/{course_id}/view/{content_id}",
            get(handlers::delivery::view_content),
        )
        .route("/api/v1/student/progress", get(handlers::student::progress_report))
        .route("/api/v1/student/certificates", get(handlers::student::certificates))
        .route(
            "/api/v1/student/messages",
            post(handlers::student::send_message).get(handlers::student::inbox),
        )
        .route("/api/v1/courses/", get(handlers::student::list_courses))
        .route("/api/v1/reviews/", post(handlers::student::submit_review))
        // Admin accounts
        .route("/api/v1/admin/register", post(auth::handlers::register_admin))
        .route("/api/v1/admin/login", post(auth::handlers::login_admin))
        .route(
            "/api/v1/admin/profile",
            get(auth::handlers::admin_profile).put(auth::handlers::update_admin_profile),
        )
        .route("/api/v1/admin/delete", delete(auth::handlers::delete_admin_account))
        // Admin portal
        .route("/api/v1/admin/dashboard-stats", get(handlers::admin::dashboard_stats))
        .route("/api/v1/admin/students/", get(handlers::admin::student_roster))
        .route("/api/v1/admin/students/{student_id}", delete(handlers::admin::delete_student))
        .route(
            "/api/v1/admin/students/{student_id}/allow-certificate",
            post(handlers::admin::allow_certificate),
        )
        .route(
            "/api/v1/admin/messages",
            post(handlers::admin::send_message).get(handlers::admin::inbox),
        )
        .route("/api/v1/admin/reviews/", get(handlers::admin::list_reviews))
        .route("/api/v1/admin/courses/", get(handlers::admin::list_courses))
        .route("/api/v1/admin/courses/{course_id}", delete(handlers::admin::delete_course))
        .route("/api/v1/courses/no-file/", post(handlers::admin::create_course))
        .route("/api/v1/admin/upload", post(handlers::admin::upload_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let bind_addr = config::server_bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

    tracing::info!("Server running on http://localhost:{}", config::server_port());

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
