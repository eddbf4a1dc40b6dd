use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::chart;
use crate::config::Config;
use crate::dataset::{self, Dataset};
use crate::downloader;
use crate::loader;
use crate::pipeline::filter_records;
use crate::views::{self, Screen, Selection};

/// Shared, read-only state. The dataset lives for the whole process, so
/// handlers read it without locking.
pub struct AppState {
    dataset: &'static Dataset,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(default)]
struct ExportQuery {
    format: String,
    continent: Option<String>,
    country: Option<String>,
    year_min: Option<i32>,
    year_max: Option<i32>,
}

impl Default for ExportQuery {
    fn default() -> Self {
        ExportQuery {
            format: "csv".to_string(),
            continent: None,
            country: None,
            year_min: None,
            year_max: None,
        }
    }
}

impl ExportQuery {
    fn selection(&self) -> Selection {
        Selection {
            continent: self.continent.clone(),
            country: self.country.clone(),
            year_min: self.year_min,
            year_max: self.year_max,
            year: None,
        }
    }
}

pub async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    // Load once; every request reads the same table
    let dataset = loader::from_csv(&config.data_path)?;
    let dataset = dataset::init_global(dataset)?;

    let app = router(dataset);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(dataset: &'static Dataset) -> Router {
    let app_state = Arc::new(AppState { dataset });

    Router::new()
        .route("/", get(serve_dashboard))
        .route("/api/options", get(get_options))
        .route("/api/eda", get(get_eda))
        .route("/api/global", get(get_global))
        .route("/api/continent", get(get_continent))
        .route("/api/country", get(get_country))
        .route("/api/export", get(export_records))
        .route("/chart/:screen/:chart", get(get_chart))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn serve_dashboard() -> Html<&'static str> {
    Html(include_str!("./static/dashboard.html"))
}

async fn get_options(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(views::options(state.dataset))
}

async fn get_eda(
    Query(selection): Query<Selection>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    Json(views::eda_view(state.dataset, &selection))
}

async fn get_global(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(views::global_view(state.dataset))
}

async fn get_continent(
    Query(selection): Query<Selection>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    Json(views::continent_view(state.dataset, &selection))
}

async fn get_country(
    Query(selection): Query<Selection>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    Json(views::country_view(state.dataset, &selection))
}

async fn get_chart(
    Path((screen, chart_name)): Path<(String, String)>,
    Query(selection): Query<Selection>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Ok(screen) = screen.parse::<Screen>() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match chart::render(state.dataset, screen, &chart_name, &selection) {
        Ok(Some(svg)) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!("rendering {:?}/{} failed: {}", screen, chart_name, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn export_records(
    Query(query): Query<ExportQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let rows = filter_records(state.dataset, &query.selection().to_filter());

    let (content_type, filename, body) = match query.format.as_str() {
        "csv" => match downloader::to_csv(rows.iter().copied()) {
            Ok(csv) => ("text/csv", "gapminder.csv", csv.into_bytes()),
            Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        },
        "xlsx" => match downloader::to_xlsx(rows.iter().copied()) {
            Ok(bytes) => (
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                "gapminder.xlsx",
                bytes,
            ),
            Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        },
        other => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("unsupported export format: {}", other),
            );
        }
    };

    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

fn error_response(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(StatusResponse {
            status: "error".to_string(),
            message: Some(message),
        }),
    )
        .into_response()
}
