use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{get, on},
    Json, Router,
};
use model::{Route, RouteStop, Stop};
use public_transport::{
    database::Database,
    service::{ResourceService, RouteStopService},
};
use serde::Deserialize;
use utility::id::Id;

use crate::{
    common::{failed, route_not_found, schema, JsonBody, JsonResult, QueryParams, METHOD_FILTER_ALL},
    WebState,
};

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<RouteStop>))
        .route("/", get(get_route_stops::<D>).put(put_route_stop::<D>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
struct RouteStopFilter {
    route_id: Option<Id<Route>>,
    stop_id: Option<Id<Stop>>,
}

async fn get_route_stops<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    QueryParams(filter): QueryParams<RouteStopFilter>,
    State(state): State<WebState<D>>,
) -> JsonResult<Vec<RouteStop>> {
    let mut session = state.session();
    RouteStopService::new(&mut session)
        .list_filtered(filter.route_id.as_ref(), filter.stop_id.as_ref())
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

/// Stores the given distance as is, without looking for a gap.
async fn put_route_stop<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
    JsonBody(route_stop): JsonBody<RouteStop>,
) -> JsonResult<RouteStop> {
    let mut session = state.session();
    RouteStopService::new(&mut session)
        .update(route_stop)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}
