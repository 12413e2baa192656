use std::{collections::HashMap, sync::{Arc, RwLock}, sync::atomic::{AtomicU64, Ordering}};

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::{get, post}, Json, Router};
use riskpath_core::{EngineError, EnvRegistry, Environment, Observation, Snapshot, ToolCall};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;

type SharedEnv = Arc<Mutex<Box<dyn Environment>>>;

/// Live environments keyed by id. The map lock is only held to look up or
/// insert an entry; each environment has its own async lock for the
/// duration of a call.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<EnvRegistry>,
    store: Arc<RwLock<HashMap<String, SharedEnv>>>,
    id_ctr: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(registry: EnvRegistry) -> Self {
        Self { registry: Arc::new(registry), store: Arc::new(RwLock::new(HashMap::new())), id_ctr: Arc::new(AtomicU64::new(1)) }
    }

    fn next_id(&self) -> String { format!("env-{}", self.id_ctr.fetch_add(1, Ordering::Relaxed)) }

    fn lookup(&self, id: &str) -> Result<SharedEnv, EngineError> {
        let guard = self.store.read().map_err(|_| EngineError::Internal("env store poisoned".into()))?;
        guard.get(id).cloned().ok_or_else(|| EngineError::NotFound(format!("env {id} not found")))
    }

    fn insert(&self, id: String, env: Box<dyn Environment>) -> Result<(), EngineError> {
        let mut guard = self.store.write().map_err(|_| EngineError::Internal("env store poisoned".into()))?;
        guard.insert(id, Arc::new(Mutex::new(env)));
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<SharedEnv, EngineError> {
        let mut guard = self.store.write().map_err(|_| EngineError::Internal("env store poisoned".into()))?;
        guard.remove(id).ok_or_else(|| EngineError::NotFound(format!("env {id} not found")))
    }

    pub fn live_count(&self) -> usize {
        self.store.read().map(|g| g.len()).unwrap_or(0)
    }
}

#[derive(Deserialize)]
pub struct InitRequest {
    pub env_type: String,
    #[serde(default)]
    pub config: Option<JsonValue>,
}

#[derive(Serialize)]
pub struct InitResponse {
    pub env_id: String,
    pub observation: Observation,
}

#[derive(Deserialize)]
pub struct StepRequest {
    pub env_id: String,
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Deserialize)]
pub struct IdRequest { pub env_id: String }

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

async fn list_envs(State(state): State<AppState>) -> impl IntoResponse { Json(state.registry.names()) }

async fn initialize(State(state): State<AppState>, Json(req): Json<InitRequest>) -> ApiResult<InitResponse> {
    let mut env = state.registry.create(&req.env_type, req.config).map_err(map_engine_err)?;
    let obs = env.initialize().await.map_err(map_engine_err)?;
    let id = state.next_id();
    state.insert(id.clone(), env).map_err(map_engine_err)?;
    tracing::info!(env_id = %id, env_type = %req.env_type, "environment created");
    Ok(Json(InitResponse { env_id: id, observation: obs }))
}

async fn step(State(state): State<AppState>, Json(req): Json<StepRequest>) -> ApiResult<Observation> {
    let env = state.lookup(&req.env_id).map_err(map_engine_err)?;
    let mut env = env.lock().await;
    let obs = env.step(req.tool_calls).await.map_err(map_engine_err)?;
    tracing::debug!(env_id = %req.env_id, terminated = obs.terminated, truncated = obs.truncated, "step");
    Ok(Json(obs))
}

async fn checkpoint(State(state): State<AppState>, Json(req): Json<IdRequest>) -> ApiResult<Snapshot> {
    let env = state.lookup(&req.env_id).map_err(map_engine_err)?;
    let env = env.lock().await;
    let snap = env.checkpoint().await.map_err(map_engine_err)?;
    Ok(Json(snap))
}

async fn terminate(State(state): State<AppState>, Json(req): Json<IdRequest>) -> ApiResult<Observation> {
    let env = state.remove(&req.env_id).map_err(map_engine_err)?;
    let mut env = env.lock().await;
    let obs = env.terminate().await.map_err(map_engine_err)?;
    tracing::info!(env_id = %req.env_id, "environment terminated");
    Ok(Json(obs))
}

fn map_engine_err(err: EngineError) -> (StatusCode, String) {
    tracing::warn!(error = %err, "request rejected");
    match err {
        EngineError::Validation(s) => (StatusCode::BAD_REQUEST, s),
        EngineError::NotFound(s) => (StatusCode::NOT_FOUND, s),
        EngineError::Internal(s) => (StatusCode::INTERNAL_SERVER_ERROR, s),
    }
}

pub fn make_app(registry: EnvRegistry) -> Router {
    router(AppState::new(registry))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/envs", get(list_envs))
        .route("/initialize", post(initialize))
        .route("/step", post(step))
        .route("/checkpoint", post(checkpoint))
        .route("/terminate", post(terminate))
        .with_state(state)
}

/// Registry holding every environment this service can host.
pub fn default_registry() -> EnvRegistry {
    let mut registry = EnvRegistry::new();
    risky_path_env::register_default_envs(&mut registry);
    registry
}
