use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{get, on},
    Json, Router,
};
use model::{route::RouteNumber, Route, RouteStop, RouteStopKey, Stop, TransportType};
use public_transport::{
    database::Database,
    network::NetworkService,
    service::{ResourceService, RouteService, RouteStopService},
};
use serde::Deserialize;
use utility::id::Id;

use crate::{
    common::{
        failed, route_not_found, schema, JsonBody, JsonResult, PathParams, QueryParams,
        METHOD_FILTER_ALL,
    },
    WebState,
};

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Route>))
        .route(
            "/",
            get(get_routes::<D>)
                .put(put_route::<D>)
                .post(add_route::<D>),
        )
        .route("/:id", get(get_route::<D>).delete(delete_route::<D>))
        .route("/:id/stops", get(get_route_stops::<D>))
        .route(
            "/:id/stops/:stop_id",
            get(get_route_stop::<D>)
                .put(place_route_stop::<D>)
                .post(append_route_stop::<D>)
                .delete(delete_route_stop::<D>),
        )
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
struct NewRoute {
    number: RouteNumber,
    type_name: Id<TransportType>,
    #[serde(default)]
    stops: Vec<Id<Stop>>,
}

#[derive(Debug, Deserialize)]
struct PlacementParams {
    after: Option<Id<Stop>>,
}

async fn get_routes<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
) -> JsonResult<Vec<Route>> {
    let mut session = state.session();
    RouteService::new(&mut session)
        .list()
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn put_route<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
    JsonBody(route): JsonBody<Route>,
) -> JsonResult<Route> {
    let mut session = state.session();
    RouteService::new(&mut session)
        .update(route)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn add_route<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
    JsonBody(new): JsonBody<NewRoute>,
) -> JsonResult<Route> {
    let mut session = state.session();
    NetworkService::new(&mut session)
        .add_route(new.number, new.type_name, &new.stops)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn get_route<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams(id): PathParams<Id<Route>>,
    State(state): State<WebState<D>>,
) -> JsonResult<Route> {
    let mut session = state.session();
    RouteService::new(&mut session)
        .get(&id)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn delete_route<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams(id): PathParams<Id<Route>>,
    State(state): State<WebState<D>>,
) -> JsonResult<()> {
    let mut session = state.session();
    RouteService::new(&mut session)
        .delete(&id)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

/// The stops of one route, in driving order.
async fn get_route_stops<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams(id): PathParams<Id<Route>>,
    State(state): State<WebState<D>>,
) -> JsonResult<Vec<RouteStop>> {
    let mut session = state.session();
    RouteStopService::new(&mut session)
        .list_filtered(Some(&id), None)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn get_route_stop<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams((id, stop_id)): PathParams<(Id<Route>, Id<Stop>)>,
    State(state): State<WebState<D>>,
) -> JsonResult<RouteStop> {
    let mut session = state.session();
    RouteStopService::new(&mut session)
        .get(&RouteStopKey::new(id, stop_id).into())
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn place_route_stop<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams((id, stop_id)): PathParams<(Id<Route>, Id<Stop>)>,
    QueryParams(params): QueryParams<PlacementParams>,
    State(state): State<WebState<D>>,
) -> JsonResult<RouteStop> {
    let mut session = state.session();
    RouteStopService::new(&mut session)
        .with_scope(state.anchor_scope)
        .place(&id, &stop_id, params.after.as_ref())
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn append_route_stop<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams((id, stop_id)): PathParams<(Id<Route>, Id<Stop>)>,
    State(state): State<WebState<D>>,
) -> JsonResult<RouteStop> {
    let mut session = state.session();
    NetworkService::new(&mut session)
        .append_route_stop(id, stop_id)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn delete_route_stop<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams((id, stop_id)): PathParams<(Id<Route>, Id<Stop>)>,
    State(state): State<WebState<D>>,
) -> JsonResult<()> {
    let mut session = state.session();
    RouteStopService::new(&mut session)
        .delete(&RouteStopKey::new(id, stop_id).into())
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}
