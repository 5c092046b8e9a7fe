use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::Html,
};

use crate::errors::AppError;
use crate::models::{LogDraft, LogEntry, MigrationReport, StatsQuery};
use crate::state::AppState;
use crate::stats::{ProjectStats, project_names, project_stats};
use crate::ui;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let entries = state.repo.list_visible().await?;
    let page = ui::render_log_page(
        &project_names(&entries),
        state.repo.current_user().is_some(),
        state.repo.session_count().await,
    );
    Ok(Html(page))
}

pub async fn history_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let entries = state.repo.list_visible().await?;
    Ok(Html(ui::render_history_page(
        &entries,
        state.repo.current_user().is_some(),
    )))
}

pub async fn stats_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let entries = state.repo.list_visible().await?;
    Ok(Html(ui::render_stats_page(
        &project_names(&entries),
        state.repo.current_user().is_some(),
    )))
}

pub async fn edit_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let entry = state.repo.get_by_id(&id).await?;
    Ok(Html(ui::render_edit_page(
        &entry,
        state.repo.current_user().is_some(),
    )))
}

pub async fn list_logs(State(state): State<AppState>) -> Result<Json<Vec<LogEntry>>, AppError> {
    Ok(Json(state.repo.list_visible().await?))
}

pub async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LogEntry>, AppError> {
    Ok(Json(state.repo.get_by_id(&id).await?))
}

pub async fn create_log(
    State(state): State<AppState>,
    Json(draft): Json<LogDraft>,
) -> Result<(StatusCode, Json<LogEntry>), AppError> {
    draft.validate().map_err(|err| AppError::bad_request(err.to_string()))?;
    let entry = state.repo.create(draft).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Replaces the editable fields of an existing entry; `id` and
/// `createdAt` stay what the repository assigned at creation.
pub async fn update_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<LogDraft>,
) -> Result<Json<LogEntry>, AppError> {
    draft.validate().map_err(|err| AppError::bad_request(err.to_string()))?;
    let existing = state.repo.get_by_id(&id).await?;
    let updated = LogEntry {
        id: existing.id,
        created_at: existing.created_at,
        project: draft.project,
        work_time: draft.work_time,
        gains: draft.gains,
        challenges: draft.challenges,
        plan: draft.plan,
    };
    state.repo.update(updated.clone()).await?;
    Ok(Json(updated))
}

pub async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ProjectStats>, AppError> {
    let entries = state.repo.list_visible().await?;
    Ok(Json(project_stats(&entries, &query.project)))
}

pub async fn get_projects(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let entries = state.repo.list_visible().await?;
    Ok(Json(project_names(&entries)))
}

pub async fn export_session(
    State(state): State<AppState>,
) -> Result<([(header::HeaderName, String); 2], String), AppError> {
    let Some((filename, body)) = state.repo.export_session().await? else {
        return Err(AppError::not_found("no session logs to export"));
    };
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}

pub async fn migrate_session(
    State(state): State<AppState>,
) -> Result<Json<MigrationReport>, AppError> {
    Ok(Json(state.repo.migrate_session_to_remote().await?))
}
