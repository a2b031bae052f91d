//! Local replica of the Sauce Demo storefront.
//! Serves the same pages, selectors, and messages from the fixtures so the
//! suite can run without network access.

pub mod assets;
pub mod views;

use crate::error::{Result, SuiteError};
use crate::fixtures::{paths, products};
use axum::{
    extract::{Path as AxumPath, Query},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Deserialize)]
struct ItemQuery {
    id: Option<String>,
}

async fn item_page(Query(query): Query<ItemQuery>) -> Html<String> {
    let id = query.id.as_deref().and_then(|s| s.trim().parse::<u32>().ok());
    Html(views::product_detail(id))
}

async fn style() -> Response {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], assets::STYLE_CSS).into_response()
}

async fn script() -> Response {
    match assets::app_js() {
        Ok(js) => ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], js)
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to build client script: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn product_image(AxumPath(id): AxumPath<String>) -> Response {
    let product = id
        .trim_end_matches(".svg")
        .parse::<u32>()
        .ok()
        .and_then(products::by_id);
    match product {
        Some(p) => (
            [(header::CONTENT_TYPE, "image/svg+xml")],
            assets::product_svg(p.id),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn not_found(uri: Uri) -> Response {
    (StatusCode::NOT_FOUND, Html(views::not_found(uri.path()))).into_response()
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(|| async { Html(views::login()) }))
        .route(paths::INVENTORY, get(|| async { Html(views::inventory()) }))
        .route(paths::ITEM_DETAIL, get(item_page))
        .route(paths::CART, get(|| async { Html(views::cart()) }))
        .route(paths::CHECKOUT_STEP_ONE, get(|| async { Html(views::checkout_step_one()) }))
        .route(paths::CHECKOUT_STEP_TWO, get(|| async { Html(views::checkout_step_two()) }))
        .route(paths::CHECKOUT_COMPLETE, get(|| async { Html(views::checkout_complete()) }))
        .route("/static/style.css", get(style))
        .route("/static/app.js", get(script))
        .route("/static/img/:id", get(product_image))
        .fallback(not_found)
}

/// A replica bound to a loopback port. Dropping the handle stops the server.
pub struct Replica {
    addr: SocketAddr,
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Replica {
    /// Bind `127.0.0.1:0` and serve in the background.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_on(0).await
    }

    pub async fn spawn_on(port: u16) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| SuiteError::Launch(format!("Failed to bind replica port {}: {}", port, e)))?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, router())
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::warn!("Replica server stopped with error: {}", e);
            }
        });
        let base_url = format!("http://{}", addr);
        tracing::debug!("Replica storefront listening on {}", base_url);
        Ok(Self {
            addr,
            base_url,
            shutdown: Some(tx),
            task: Some(task),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Replica {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Start a replica on an ephemeral loopback port.
pub async fn spawn() -> Result<Replica> {
    Replica::spawn().await
}

/// Serve on `port` until Ctrl-C.
pub async fn serve(port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(|e| SuiteError::Launch(format!("Failed to bind replica port {}: {}", port, e)))?;
    tracing::info!("Replica storefront listening on http://127.0.0.1:{}", port);
    axum::serve(listener, router())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down replica storefront");
        })
        .await?;
    Ok(())
}
