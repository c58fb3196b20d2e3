#![allow(clippy::multiple_crate_versions)]

use std::sync::{Arc, Mutex};

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use storefront::config::{Config, ConfigError};
use storefront::db::{self, DbError};
use storefront::icon::{render_icon, IconDefinition, IconError, IconLibrary, IconProps};
use storefront::products::Product;

#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<rusqlite::Connection>>,
    icons: Arc<IconLibrary>,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("db error: {0}")]
    Db(#[from] DbError),
    #[error("icon error: {0}")]
    Icon(#[from] IconError),
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown icon: {0}")]
    UnknownIcon(String),
    #[error("task join error")]
    Join,
    #[error("db lock error")]
    Lock,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            Self::UnknownIcon(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{}", self);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    icons: Vec<IconCard>,
    products: Vec<Product>,
}

struct IconCard {
    name: String,
    svg: String,
    alt_svg: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.runtime_mode.default_log_filter())),
        )
        .init();

    info!(
        mode = %config.runtime_mode,
        preset = %config.server_preset,
        "Database path: {:?}",
        config.database_path
    );
    let connection = db::open(&config.database_path)?;
    let icons = IconLibrary::builtin()?;
    info!("Loaded {} built-in icons", icons.len());

    let state = AppState {
        db: Arc::new(Mutex::new(connection)),
        icons: Arc::new(icons),
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/icons/:name", get(icon_handler))
        .route("/api/products", get(products_api_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
    info!("Shutting down");
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let products = with_db(state.clone(), db::fetch_products).await?;

    let icons = state
        .icons
        .iter()
        .map(|(name, entry)| {
            let props = IconProps::new(&entry.icon).size(32);
            IconCard {
                name: name.to_string(),
                svg: render_icon(&props).to_markup(),
                alt_svg: entry
                    .alt
                    .as_ref()
                    .map(|alt| render_icon(&props.clone().alt_icon(alt).show_alt(true)).to_markup()),
            }
        })
        .collect();

    let template = IndexTemplate { icons, products };
    Ok(Html(template.render()?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IconQuery {
    size: Option<u32>,
    color: Option<String>,
    primary_color: Option<String>,
    secondary_color: Option<String>,
    #[serde(default)]
    disable_secondary_opacity: bool,
    stroke_width: Option<f64>,
    #[serde(default)]
    show_alt: bool,
}

async fn icon_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<IconQuery>,
) -> Result<impl IntoResponse, AppError> {
    let name = name.strip_suffix(".svg").unwrap_or(&name);
    let entry = state
        .icons
        .get(name)
        .ok_or_else(|| AppError::UnknownIcon(name.to_string()))?;

    let svg = render_icon(&icon_props(&entry.icon, entry.alt.as_ref(), query));
    Ok((
        [(header::CONTENT_TYPE, "image/svg+xml")],
        svg.to_markup(),
    ))
}

fn icon_props<'a>(
    icon: &'a IconDefinition,
    alt: Option<&'a IconDefinition>,
    query: IconQuery,
) -> IconProps<'a> {
    let mut props = IconProps::new(icon)
        .show_alt(query.show_alt)
        .disable_secondary_opacity(query.disable_secondary_opacity)
        .attribute("xmlns", "http://www.w3.org/2000/svg");
    props.alt_icon = alt;
    props.primary_color = query.primary_color;
    props.secondary_color = query.secondary_color;
    props.stroke_width = query.stroke_width;
    if let Some(size) = query.size {
        props.size = size;
    }
    if let Some(color) = query.color {
        props.color = color;
    }
    props
}

#[derive(Serialize)]
struct ProductsResponse {
    products: Vec<Product>,
    count: usize,
}

async fn products_api_handler(
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>, AppError> {
    let products = with_db(state, db::fetch_products).await?;
    let count = products.len();
    Ok(Json(ProductsResponse { products, count }))
}

async fn with_db<T, F>(state: AppState, func: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<T, DbError> + Send + 'static,
{
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<T, AppError> {
        let guard = db.lock().map_err(|_| AppError::Lock)?;
        Ok(func(&guard)?)
    })
    .await
    .map_err(|_| AppError::Join)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use storefront::products::SAMPLE_PRODUCTS;
    use storefront::query_builder::{self, BuiltQuery};
    use storefront::schema::PRODUCTS;
    use tower::ServiceExt;

    fn seeded_state() -> AppState {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        db::create_schema(&conn).unwrap();
        let BuiltQuery { sql, params } = query_builder::insert(&PRODUCTS)
            .values(SAMPLE_PRODUCTS)
            .unwrap();
        conn.execute(&sql, rusqlite::params_from_iter(params.iter()))
            .unwrap();

        AppState {
            db: Arc::new(Mutex::new(conn)),
            icons: Arc::new(IconLibrary::builtin().unwrap()),
        }
    }

    async fn send_get(uri: &str) -> (StatusCode, String, String) {
        let response = app(seeded_state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn products_route_returns_rows_and_count() {
        let (status, content_type, body) = send_get("/api/products").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("application/json"));

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["count"], SAMPLE_PRODUCTS.len());
        let products = json["products"].as_array().unwrap();
        assert_eq!(products.len(), SAMPLE_PRODUCTS.len());
        assert_eq!(products[0]["name"], SAMPLE_PRODUCTS[0].name);
    }

    #[tokio::test]
    async fn icon_route_renders_svg_with_query_overrides() {
        let (status, content_type, body) =
            send_get("/icons/star.svg?primaryColor=red&strokeWidth=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "image/svg+xml");
        assert!(body.starts_with("<svg "));
        assert!(body.contains("xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(body.contains("stroke=\"red\""));
        assert!(body.contains("stroke-width=\"3\""));
        assert!(!body.contains("stroke-width=\"1.5\""));
    }

    #[tokio::test]
    async fn icon_route_accepts_names_without_suffix() {
        let (with_suffix_status, _, with_suffix) = send_get("/icons/search.svg").await;
        let (status, _, body) = send_get("/icons/search").await;
        assert_eq!(with_suffix_status, StatusCode::OK);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, with_suffix);
    }

    #[tokio::test]
    async fn unknown_icon_route_is_not_found() {
        let (status, content_type, body) = send_get("/icons/nope.svg").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(content_type.starts_with("application/json"));
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "unknown icon: nope");
    }

    #[tokio::test]
    async fn index_route_lists_icons_and_products() {
        let (status, content_type, body) = send_get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
        assert!(body.contains("<svg "));
        assert!(body.contains("shopping-cart"));
        assert!(body.contains(SAMPLE_PRODUCTS[0].name));
    }

    fn definition() -> IconDefinition {
        IconDefinition::from_json(
            r#"[["path", {"stroke": "currentColor", "strokeWidth": 1.5}]]"#,
        )
        .unwrap()
    }

    #[test]
    fn query_parameters_use_camel_case() {
        let query: IconQuery = serde_json::from_str(
            r#"{"size": 48, "primaryColor": "red", "disableSecondaryOpacity": true, "strokeWidth": 2.5, "showAlt": true}"#,
        )
        .unwrap();
        assert_eq!(query.size, Some(48));
        assert_eq!(query.primary_color.as_deref(), Some("red"));
        assert!(query.disable_secondary_opacity);
        assert!(query.show_alt);
        assert_eq!(query.stroke_width, Some(2.5));
    }

    #[test]
    fn empty_query_keeps_component_defaults() {
        let icon = definition();
        let props = icon_props(&icon, None, IconQuery::default());
        assert_eq!(props.size, 24);
        assert_eq!(props.color, "currentColor");
        assert!(props.primary_color.is_none());

        let svg = render_icon(&props);
        assert_eq!(svg.attr("xmlns"), Some("http://www.w3.org/2000/svg"));
        assert_eq!(svg.children[0].attr("stroke-width"), Some("1.5"));
    }

    #[test]
    fn query_overrides_reach_rendered_nodes() {
        let icon = definition();
        let query = IconQuery {
            size: Some(16),
            primary_color: Some("#ff0000".into()),
            stroke_width: Some(3.0),
            ..IconQuery::default()
        };
        let svg = render_icon(&icon_props(&icon, None, query));
        assert_eq!(svg.attr("width"), Some("16"));
        assert_eq!(svg.children[0].attr("stroke"), Some("#ff0000"));
        assert_eq!(svg.children[0].attr("stroke-width"), Some("3"));
    }

    #[test]
    fn unknown_icon_maps_to_not_found() {
        let response = AppError::UnknownIcon("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
