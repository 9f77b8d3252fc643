use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{delete, on},
    Json, Router,
};
use public_transport::{database::Database, network::NetworkService};
use uuid::Uuid;

use crate::{
    common::{failed, route_not_found, JsonResult, PathParams, METHOD_FILTER_ALL},
    WebState,
};

/// Deletion by bare id, for clients that do not know whether the id names a
/// route, a node or a stop.
pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/:id", delete(delete_unit::<D>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn delete_unit<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams(id): PathParams<Uuid>,
    State(state): State<WebState<D>>,
) -> JsonResult<()> {
    let mut session = state.session();
    NetworkService::new(&mut session)
        .delete_unique(id)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}
