//! HTTP façade: JSON endpoints over the analyzer and the store.

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::brain::{ChatReply, StressAnalyzer};
use crate::database::Store;
use crate::error::AppError;
use crate::models::{ActionLog, ChatRecord, JournalEntry, ResourceLink, UserRecord};

const INDEX_HTML: &str = include_str!("../static/index.html");

const BREATHING_STEPS: [&str; 5] = [
    "Sit comfortably and place one hand on your belly.",
    "Inhale slowly for 4 seconds, feeling your belly rise.",
    "Hold gently for 4 seconds.",
    "Exhale slowly for 6 seconds, feeling your belly fall.",
    "Repeat this 4–6 times until you feel calmer.",
];

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<StressAnalyzer>,
    pub knowledge: Arc<Value>,
    pub store: Store,
}

impl AppState {
    pub fn new(analyzer: StressAnalyzer, knowledge: Value, store: Store) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            knowledge: Arc::new(knowledge),
            store,
        }
    }
}

/// Accepts a JSON body, a urlencoded form or a multipart form. A request
/// without a content type yields `T::default()` so missing fields surface as
/// validation errors; any other content type is rejected with 415.
pub struct FormOrJson<T>(pub T);

impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            Ok(Self(value))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            Ok(Self(value))
        } else if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            Ok(Self(multipart_fields(multipart).await?))
        } else if content_type.is_empty() {
            Ok(Self(T::default()))
        } else {
            Err(AppError::UnsupportedMediaType(content_type))
        }
    }
}

/// Collects the text parts of a multipart form into `T`. File parts are
/// skipped; a repeated name keeps its first value.
async fn multipart_fields<T: DeserializeOwned>(mut multipart: Multipart) -> Result<T, AppError> {
    let mut fields = Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let text = field
            .text()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        fields.entry(name).or_insert(Value::String(text));
    }
    Ok(serde_json::from_value(Value::Object(fields))?)
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JournalForm {
    #[serde(default)]
    pub entry: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BreathingStep {
    pub text: &'static str,
}

pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/get", post(chat))
        .route("/history", get(history))
        .route("/resources_db", get(resources_db))
        .route("/breathing", get(breathing))
        .route("/journal", post(save_journal))
        .route("/journal/recent", get(journal_recent))
        .route("/user", post(create_user))
        .route("/knowledge", get(knowledge))
        .route("/log_action", post(log_action));

    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip_all)]
async fn chat(
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<ChatForm>,
) -> Result<Json<ChatReply>, AppError> {
    let msg = form.msg.unwrap_or_default().trim().to_string();
    if msg.is_empty() {
        return Err(AppError::Validation("Empty message".to_string()));
    }

    let reply = {
        let mut rng = rand::thread_rng();
        state.analyzer.analyze(&msg, &mut rng)
    };

    match reply {
        ChatReply::OutOfScope(deflection) => {
            info!("Deflected out-of-scope message");
            Ok(Json(ChatReply::OutOfScope(deflection)))
        }
        ChatReply::Analysis(mut analysis) => {
            analysis.resources = state
                .store
                .resources_for(analysis.stress_type.label())
                .await?;

            if let Err(e) = state
                .store
                .insert_chat(&msg, &analysis.message, &analysis.label)
                .await
            {
                warn!("Failed to log chat: {}", e);
            }

            info!(
                label = %analysis.label,
                stress_type = %analysis.stress_type,
                intent = %analysis.intent,
                "Chat analysed"
            );
            Ok(Json(ChatReply::Analysis(analysis)))
        }
    }
}

async fn history(State(state): State<AppState>) -> Result<Json<Vec<ChatRecord>>, AppError> {
    Ok(Json(state.store.recent_chats().await?))
}

async fn resources_db(State(state): State<AppState>) -> Result<Json<Vec<ResourceLink>>, AppError> {
    Ok(Json(state.store.all_resources().await?))
}

async fn breathing() -> Json<Value> {
    let steps: Vec<BreathingStep> = BREATHING_STEPS
        .iter()
        .map(|text| BreathingStep { text: *text })
        .collect();
    Json(json!({ "steps": steps }))
}

#[instrument(skip_all)]
async fn save_journal(
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<JournalForm>,
) -> Result<Json<Value>, AppError> {
    let entry = form.entry.unwrap_or_default();
    if entry.is_empty() {
        return Err(AppError::Validation("Empty entry".to_string()));
    }
    let created_at = state.store.insert_journal(&entry).await?;
    Ok(Json(json!({ "status": "ok", "created_at": created_at })))
}

async fn journal_recent(
    State(state): State<AppState>,
) -> Result<Json<Vec<JournalEntry>>, AppError> {
    Ok(Json(state.store.recent_journals().await?))
}

#[instrument(skip_all)]
async fn create_user(
    State(state): State<AppState>,
    FormOrJson(user): FormOrJson<UserRecord>,
) -> Result<Json<UserRecord>, AppError> {
    state.store.insert_user(&user).await?;
    Ok(Json(user))
}

async fn knowledge(State(state): State<AppState>) -> Json<Value> {
    Json(state.knowledge.as_ref().clone())
}

#[instrument(skip_all)]
async fn log_action(
    State(state): State<AppState>,
    FormOrJson(action): FormOrJson<ActionLog>,
) -> Result<Json<Value>, AppError> {
    state.store.insert_action(&action).await?;
    Ok(Json(json!({ "status": "logged" })))
}
