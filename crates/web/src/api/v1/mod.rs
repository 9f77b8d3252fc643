use axum::{
    routing::{get, on},
    Router,
};
use public_transport::database::Database;

use crate::{
    api::ping,
    common::{route_not_found, METHOD_FILTER_ALL},
    WebState,
};

mod nodes;
mod route_stops;
mod routes;
mod stops;
mod types;
mod units;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .nest_service("/types", types::routes(state.clone()))
        .nest_service("/routes", routes::routes(state.clone()))
        .nest_service("/route_stops", route_stops::routes(state.clone()))
        .nest_service("/nodes", nodes::routes(state.clone()))
        .nest_service("/stops", stops::routes(state.clone()))
        .nest_service("/units", units::routes(state))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}
