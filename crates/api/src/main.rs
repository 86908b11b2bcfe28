use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use insureconsult_core::dashboard::{html, view::DashboardView};
use insureconsult_core::domain::analysis::ConsultantAnalysis;
use insureconsult_core::domain::financial::FinancialInput;
use insureconsult_core::export::{deck, pptx};
use insureconsult_core::form::{demo_input, FormSubmission};
use insureconsult_core::llm::error::{AnalysisError, AnalysisErrorKind};
use insureconsult_core::llm::gemini::GeminiClient;
use insureconsult_core::llm::AnalysisClient;
use insureconsult_core::ratios::{self, ReferenceScores};
use insureconsult_core::session::{Session, SessionState, Ticket};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = insureconsult_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let client = GeminiClient::from_settings(&settings)?;
    if client.is_configured() {
        tracing::info!(provider = ?client.provider(), model = client.model(), "analysis client ready");
    } else if let Err(e) = settings.require_gemini_api_key() {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %e, "gemini credential missing; analysis will fail until it is set");
    }

    let state = AppState {
        session: Arc::new(Mutex::new(Session::new())),
        client: Arc::new(client),
    };
    let app = build_router(state);

    let port = settings.port.unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<Session>>,
    client: Arc<dyn AnalysisClient>,
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(submit_analysis))
        .route("/reset", post(reset))
        .route("/demo", get(demo))
        .route("/export", get(export_deck))
        .route("/api/analyze", post(api_analyze))
        .route("/api/score", post(api_score))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<AppState>) -> Html<String> {
    // Clone out of the lock; rendering does not need it.
    let current = state.session.lock().await.state().clone();
    let page = match current {
        SessionState::Input { error } => {
            html::render_input_page(&FormSubmission::default(), error.as_deref())
        }
        SessionState::Analyzing { .. } => html::render_analyzing_page(),
        SessionState::Result { input, analysis } => {
            html::render_result_page(&DashboardView::build(&analysis, &input))
        }
    };
    Html(page)
}

async fn demo() -> Html<String> {
    Html(html::render_input_page(
        &FormSubmission::from_input(&demo_input()),
        None,
    ))
}

async fn submit_analysis(
    State(state): State<AppState>,
    Form(form): Form<FormSubmission>,
) -> Response {
    let input = match form.parse() {
        Ok(input) => input,
        Err(e) => {
            tracing::info!(error = %e, "form rejected");
            let page = html::render_input_page(&form, Some(&e.to_string()));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
        }
    };

    let submitted = state.session.lock().await.submit(input);
    match submitted {
        Ok((ticket, input)) => {
            tracing::info!(%ticket, company = %input.company_name, "analysis started");
            tokio::spawn(run_analysis(state, ticket, input));
        }
        Err(e) => tracing::info!(error = %e, "submission ignored"),
    }
    Redirect::to("/").into_response()
}

async fn run_analysis(state: AppState, ticket: Ticket, input: Arc<FinancialInput>) {
    let outcome = state.client.analyze(&input).await;
    if let Err(e) = &outcome {
        report_analysis_error(e);
    }
    let completion = state.session.lock().await.complete(ticket, outcome);
    tracing::info!(%ticket, provider = ?state.client.provider(), ?completion, "analysis finished");
}

async fn reset(State(state): State<AppState>) -> Redirect {
    state.session.lock().await.reset();
    Redirect::to("/")
}

async fn export_deck(State(state): State<AppState>) -> Result<Response, StatusCode> {
    let (input, analysis) = match state.session.lock().await.state() {
        SessionState::Result { input, analysis } => (Arc::clone(input), Arc::clone(analysis)),
        _ => return Err(StatusCode::NOT_FOUND),
    };

    let file_name = deck::file_name(&input.company_name);
    let bytes = tokio::task::spawn_blocking(move || {
        let today = chrono::Local::now().date_naive();
        pptx::write_pptx(&deck::build_deck(&analysis, &input, today))
    })
    .await
    .map_err(|e| {
        let err = anyhow::Error::new(e).context("deck export task failed");
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "deck export failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %e, "deck export failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!(file = %file_name, size = bytes.len(), "deck exported");

    let disposition = format!(
        "attachment; filename=\"proposal.pptx\"; filename*=UTF-8''{}",
        urlencoding::encode(&file_name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, pptx::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiAnalysis {
    analysis: ConsultantAnalysis,
    reference_scores: ReferenceScores,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
    kind: String,
}

async fn api_analyze(
    State(state): State<AppState>,
    Json(input): Json<FinancialInput>,
) -> Result<Json<ApiAnalysis>, (StatusCode, Json<ApiError>)> {
    if input.company_name.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError {
                error: "companyName is required".to_string(),
                kind: "input".to_string(),
            }),
        ));
    }

    let analysis = state.client.analyze(&input).await.map_err(|e| {
        report_analysis_error(&e);
        let status = match e.kind {
            AnalysisErrorKind::Configuration => StatusCode::SERVICE_UNAVAILABLE,
            AnalysisErrorKind::Service | AnalysisErrorKind::Parse => StatusCode::BAD_GATEWAY,
        };
        (
            status,
            Json(ApiError {
                error: e.user_message().to_string(),
                kind: e.kind.to_string(),
            }),
        )
    })?;

    Ok(Json(ApiAnalysis {
        analysis,
        reference_scores: ratios::calculate(&input),
    }))
}

async fn api_score(Json(input): Json<FinancialInput>) -> Json<ReferenceScores> {
    Json(ratios::calculate(&input))
}

fn report_analysis_error(e: &AnalysisError) {
    tracing::error!(
        kind = %e.kind,
        stage = e.stage,
        raw_output = e.raw_output.as_deref().unwrap_or(""),
        error = %e,
        "analysis failed"
    );
    sentry_anyhow::capture_anyhow(&anyhow::Error::new(e.clone()));
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &insureconsult_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
