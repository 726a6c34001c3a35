//! The HTTP front end: routes, handlers and graceful shutdown. Handlers only
//! translate between HTTP and the page functions on [`Site`].

use crate::error::AppError;
use crate::site::Site;
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::services::ServeDir;
use tracing::{error, info};

/// Binds `address` and serves `site` until Ctrl+C or SIGTERM.
pub async fn serve(site: Arc<Site>, address: &str) -> Result<()> {
    let app = router(site);

    info!("Binding to {address}");
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Binding to {}", address))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Serving")?;

    info!("Server shut down");
    Ok(())
}

pub fn router(site: Arc<Site>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/projects", get(index_handler))
        .route("/projects/:id", get(project_handler))
        .route("/tags/:slug", get(tag_handler))
        .nest_service("/img", ServeDir::new(site.static_directory.join("img")))
        .nest_service("/css", ServeDir::new(site.static_directory.join("css")))
        .fallback(not_found_handler)
        .with_state(site)
}

#[derive(Deserialize)]
pub struct IndexQuery {
    tag: Option<String>,
}

async fn root_handler() -> Redirect {
    Redirect::temporary("/projects")
}

async fn index_handler(
    State(site): State<Arc<Site>>,
    query: std::result::Result<Query<IndexQuery>, QueryRejection>,
) -> Response {
    let page = match query {
        Ok(Query(query)) => site.index_page(query.tag.as_deref()),
        Err(_) => Err(AppError::Status(StatusCode::BAD_REQUEST)),
    };
    respond(&site, page)
}

async fn project_handler(State(site): State<Arc<Site>>, Path(id): Path<String>) -> Response {
    let page = site.project_page(&id);
    respond(&site, page)
}

async fn tag_handler(State(site): State<Arc<Site>>, Path(slug): Path<String>) -> Response {
    let page = site.tag_page(&slug);
    respond(&site, page)
}

async fn not_found_handler(State(site): State<Arc<Site>>) -> Response {
    respond(&site, Err(AppError::Status(StatusCode::NOT_FOUND)))
}

// Turns a page result into a response. Statuses with an error page are
// rendered; anything else is logged and answered without a page.
fn respond(site: &Site, page: std::result::Result<String, AppError>) -> Response {
    match page {
        Ok(html) => Html(html).into_response(),
        Err(AppError::Status(status)) => match site.error_page(status) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => uncaught(err),
        },
        Err(err) => uncaught(err),
    }
}

fn uncaught(err: AppError) -> Response {
    error!("Uncaught: {err}");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
