//! HTTP front-end wrapping the campaign orchestrator

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use novamind_core::{CampaignOrchestrator, NovaMindError};
use novamind_types::CampaignOverview;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<CampaignOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<CampaignOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

/// Any component failure, reported as a 500 with the `success:false` envelope
pub struct ApiError(NovaMindError);

impl From<NovaMindError> for ApiError {
    fn from(err: NovaMindError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(NovaMindError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::error!("Request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": self.0.to_string() })),
        )
            .into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    context: String,
}

#[derive(Debug, Deserialize)]
pub struct LaunchRequest {
    blog_id: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/generate", get(generate_page))
        .route("/analytics", get(analytics_page))
        .route("/api/campaigns", get(list_campaigns))
        .route("/api/generate-content", post(generate_content))
        .route("/api/launch-campaign", post(launch_campaign))
        .route("/api/campaign/:id", get(campaign_details))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn serve(
    orchestrator: Arc<CampaignOrchestrator>,
    bind_addr: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await.map_err(|e| {
        log::error!("Failed to bind HTTP server on {}: {}", bind_addr, e);
        e
    })?;

    log::info!("Starting HTTP server on {}", bind_addr);
    axum::serve(listener, router(AppState::new(orchestrator))).await?;
    log::info!("HTTP server stopped normally");
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_campaigns(State(state): State<AppState>) -> ApiResult {
    let campaigns = state.orchestrator.list_campaigns()?;
    Ok(Json(json!({ "success": true, "campaigns": campaigns })))
}

async fn generate_content(
    State(state): State<AppState>,
    request: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = request?;
    let topic = request
        .topic
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| NovaMindError::Validation("topic is required".to_string()))?;

    let generated = state.orchestrator.generate_content(&topic, &request.context).await?;

    Ok(Json(json!({
        "success": true,
        "blog_id": generated.blog_id,
        "blog": generated.blog,
        "newsletters": generated.newsletters,
    })))
}

async fn launch_campaign(
    State(state): State<AppState>,
    request: Result<Json<LaunchRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = request?;
    let outcome = state.orchestrator.launch_campaign(request.blog_id).await?;

    Ok(Json(json!({
        "success": true,
        "campaign_id": outcome.campaign_id,
        "analysis": outcome.analysis,
    })))
}

async fn campaign_details(State(state): State<AppState>, Path(campaign_id): Path<i64>) -> ApiResult {
    let metrics = state.orchestrator.campaign_metrics(campaign_id)?;
    Ok(Json(json!({ "success": true, "metrics": metrics })))
}

async fn index_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let campaigns = state.orchestrator.list_campaigns()?;

    let rows = if campaigns.is_empty() {
        "<tr><td colspan=\"4\">No campaigns yet. <a href=\"/generate\">Generate content</a> to get started.</td></tr>".to_string()
    } else {
        campaigns.iter().map(campaign_row).collect::<Vec<_>>().join("\n")
    };

    Ok(Html(page(
        "Campaigns",
        &format!(
            "<table>\n<tr><th>Campaign</th><th>Topic</th><th>Sent</th><th>Status</th></tr>\n{}\n</table>",
            rows
        ),
    )))
}

async fn generate_page() -> Html<String> {
    Html(page("Generate Content", GENERATE_FORM))
}

async fn analytics_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let campaigns = state.orchestrator.list_campaigns()?;

    let items = campaigns
        .iter()
        .map(|c| {
            format!(
                "<li><a href=\"/api/campaign/{}\">{}</a> ({})</li>",
                c.id,
                escape_html(&c.name),
                escape_html(&c.topic)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Html(page("Analytics", &format!("<ul>\n{}\n</ul>", items))))
}

fn campaign_row(campaign: &CampaignOverview) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        escape_html(&campaign.name),
        escape_html(&campaign.topic),
        campaign.send_date.format("%Y-%m-%d %H:%M"),
        campaign.status.as_str()
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>NovaMind - {title}</title></head>\n<body>\n\
        <nav><a href=\"/\">Campaigns</a> | <a href=\"/generate\">Generate</a> | <a href=\"/analytics\">Analytics</a></nav>\n\
        <h1>{title}</h1>\n{body}\n</body>\n</html>"
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const GENERATE_FORM: &str = r#"<form id="generate-form">
  <label>Topic <input name="topic" required></label>
  <label>Context <textarea name="context"></textarea></label>
  <button type="submit">Generate</button>
</form>
<pre id="result"></pre>
<script>
document.getElementById('generate-form').addEventListener('submit', async (event) => {
  event.preventDefault();
  const form = new FormData(event.target);
  const response = await fetch('/api/generate-content', {
    method: 'POST',
    headers: {'Content-Type': 'application/json'},
    body: JSON.stringify({topic: form.get('topic'), context: form.get('context')})
  });
  document.getElementById('result').textContent = JSON.stringify(await response.json(), null, 2);
});
</script>"#;
