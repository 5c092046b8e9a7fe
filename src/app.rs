use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/history", get(handlers::history_page))
        .route("/stats", get(handlers::stats_page))
        .route("/edit/:id", get(handlers::edit_page))
        .route("/export", get(handlers::export_session))
        .route("/api/logs", get(handlers::list_logs).post(handlers::create_log))
        .route(
            "/api/logs/:id",
            get(handlers::get_log)
                .put(handlers::update_log)
                .delete(handlers::delete_log),
        )
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/projects", get(handlers::get_projects))
        .route("/api/migrate", post(handlers::migrate_session))
        .with_state(state)
}
