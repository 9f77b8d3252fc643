use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{get, on},
    Json, Router,
};
use model::{node::NodeName, Node};
use public_transport::{
    database::Database,
    network::NetworkService,
    service::{NodeService, ResourceService},
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
        .route("/schema", get(schema::<Node>))
        .route(
            "/",
            get(get_nodes::<D>).put(put_node::<D>).post(add_node::<D>),
        )
        .route("/:id", get(get_node::<D>).delete(delete_node::<D>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: Latitude,
    lon: Longitude,
}

#[derive(Debug, Deserialize)]
struct NewNode {
    name: NodeName,
    #[serde(default)]
    stops: Vec<Location>,
}

async fn get_nodes<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
) -> JsonResult<Vec<Node>> {
    let mut session = state.session();
    NodeService::new(&mut session)
        .list()
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn put_node<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
    JsonBody(node): JsonBody<Node>,
) -> JsonResult<Node> {
    let mut session = state.session();
    NodeService::new(&mut session)
        .update(node)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

/// Creates the node together with one stop per location.
async fn add_node<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
    JsonBody(new): JsonBody<NewNode>,
) -> JsonResult<Node> {
    let locations = new
        .stops
        .iter()
        .map(|location| (location.lat, location.lon))
        .collect::<Vec<_>>();
    let mut session = state.session();
    NetworkService::new(&mut session)
        .add_node(new.name, &locations)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn get_node<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams(id): PathParams<Id<Node>>,
    State(state): State<WebState<D>>,
) -> JsonResult<Node> {
    let mut session = state.session();
    NodeService::new(&mut session)
        .get(&id)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn delete_node<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams(id): PathParams<Id<Node>>,
    State(state): State<WebState<D>>,
) -> JsonResult<()> {
    let mut session = state.session();
    NodeService::new(&mut session)
        .delete(&id)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}
