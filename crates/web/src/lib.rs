pub use crate::common::RouteResult;

use axum::{routing::on, Router};
use common::{route_not_found, METHOD_FILTER_ALL};
use log::info;
use public_transport::{database::Database, placement::AnchorScope, session::Session};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub mod api;
pub mod common;
pub mod config;

#[derive(Clone)]
pub struct WebState<D: Database> {
    pub database: D,
    pub anchor_scope: AnchorScope,
}

impl<D: Database> WebState<D> {
    pub fn new(database: D, anchor_scope: AnchorScope) -> Self {
        Self {
            database,
            anchor_scope,
        }
    }

    /// A fresh unit of work for one request.
    pub fn session(&self) -> Session<D> {
        Session::new(self.database.clone())
    }
}

pub fn router<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .nest_service("/api", api::routes(state))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

pub async fn start_web_server<D: Database>(
    state: WebState<D>,
    bind_address: &str,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_address).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state).into_make_service()).await?;

    Ok(())
}
