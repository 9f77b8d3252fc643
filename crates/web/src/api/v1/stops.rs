use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{get, on},
    Json, Router,
};
use model::{Node, Stop};
use public_transport::{
    database::Database,
    network::NetworkService,
    service::{ResourceService, StopService},
};
use serde::Deserialize;
use utility::{
    geo::{Latitude, Longitude},
    id::Id,
};

use crate::{
    common::{failed, route_not_found, schema, JsonBody, JsonResult, PathParams, METHOD_FILTER_ALL},
    WebState,
};

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Stop>))
        .route(
            "/",
            get(get_stops::<D>).put(put_stop::<D>).post(add_stop::<D>),
        )
        .route("/:id", get(get_stop::<D>).delete(delete_stop::<D>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
struct NewStop {
    node_id: Id<Node>,
    lat: Latitude,
    lon: Longitude,
}

async fn get_stops<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
) -> JsonResult<Vec<Stop>> {
    let mut session = state.session();
    StopService::new(&mut session)
        .list()
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn put_stop<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
    JsonBody(stop): JsonBody<Stop>,
) -> JsonResult<Stop> {
    let mut session = state.session();
    StopService::new(&mut session)
        .update(stop)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn add_stop<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
    JsonBody(new): JsonBody<NewStop>,
) -> JsonResult<Stop> {
    let mut session = state.session();
    NetworkService::new(&mut session)
        .add_stop(new.node_id, new.lat, new.lon)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn get_stop<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams(id): PathParams<Id<Stop>>,
    State(state): State<WebState<D>>,
) -> JsonResult<Stop> {
    let mut session = state.session();
    StopService::new(&mut session)
        .get(&id)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn delete_stop<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams(id): PathParams<Id<Stop>>,
    State(state): State<WebState<D>>,
) -> JsonResult<()> {
    let mut session = state.session();
    StopService::new(&mut session)
        .delete(&id)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}
