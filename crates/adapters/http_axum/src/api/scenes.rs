//! JSON REST handlers for scenes.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use matterhub_app::ports::{CommandRunner, LogSink, NetworkScanner};
use matterhub_domain::scene::Scene;

use crate::error::ApiError;
use crate::state::AppState;

/// Result of running a scene once.
#[derive(Debug, Serialize)]
pub struct SceneRun {
    pub label: String,
    pub dispatched: usize,
    pub failed: usize,
}

/// `GET /api/scenes`: the built-in scenes.
pub async fn list() -> Json<Vec<Scene>> {
    Json(Scene::builtins())
}

/// `POST /api/scenes/{label}`: apply a scene to every device once.
pub async fn run<R, S, N>(
    State(state): State<AppState<R, S, N>>,
    Path(label): Path<String>,
) -> Result<Json<SceneRun>, ApiError>
where
    R: CommandRunner + 'static,
    S: LogSink + Clone + 'static,
    N: NetworkScanner + 'static,
{
    let report = state.scheduler.run_scene_once(&label).await?;
    Ok(Json(SceneRun {
        label,
        dispatched: report.dispatched,
        failed: report.failed,
    }))
}
