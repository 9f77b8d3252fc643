use axum::{
    response::IntoResponse,
    routing::{get, on},
    Json, Router,
};
use public_transport::database::Database;
use serde_json::json;

pub mod v1;

use crate::{
    common::{route_not_found, METHOD_FILTER_ALL},
    WebState,
};

pub fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .nest_service("/v1", v1::routes(state))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

pub(crate) async fn ping() -> impl IntoResponse {
    Json(json!({
        "message": "pong!"
    }))
}
