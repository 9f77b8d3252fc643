use axum::{
    extract::{OriginalUri, State},
    http::{Method, StatusCode, Uri},
    routing::{get, on},
    Json, Router,
};
use model::{ResourceKind, TransportType};
use public_transport::{
    database::Database,
    service::{ResourceService, TypeService},
};
use utility::id::Id;

use crate::{
    common::{
        failed, route_not_found, schema, JsonBody, JsonResult, PathParams, RouteErrorResponse,
        RouteResult, METHOD_FILTER_ALL,
    },
    WebState,
};

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<TransportType>))
        .route("/", get(get_types::<D>).put(create_type::<D>))
        .route(
            "/:name",
            get(get_type::<D>)
                .put(update_type::<D>)
                .delete(delete_type::<D>),
        )
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// Names that `/types/{name}` can not address because a static route wins.
const RESERVED_NAMES: [&str; 1] = ["schema"];

fn check_name(method: &Method, uri: &Uri, new: &TransportType) -> RouteResult<()> {
    let name = new.name.raw_ref::<str>();
    if RESERVED_NAMES.contains(&name) {
        return Err(RouteErrorResponse::new(StatusCode::UNPROCESSABLE_ENTITY)
            .with_method(method)
            .with_uri(uri.path())
            .with_message("Type name is reserved.")
            .with_resource(ResourceKind::Type)
            .with_identifier(name));
    }
    Ok(())
}

async fn get_types<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
) -> JsonResult<Vec<TransportType>> {
    let mut session = state.session();
    TypeService::new(&mut session)
        .list()
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn create_type<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    State(state): State<WebState<D>>,
    JsonBody(new): JsonBody<TransportType>,
) -> JsonResult<TransportType> {
    check_name(&method, &original_uri, &new)?;
    let mut session = state.session();
    TypeService::new(&mut session)
        .create(new)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

async fn get_type<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams(name): PathParams<Id<TransportType>>,
    State(state): State<WebState<D>>,
) -> JsonResult<TransportType> {
    let mut session = state.session();
    TypeService::new(&mut session)
        .get(&name)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}

/// Renames the type when the body carries a different name.
async fn update_type<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams(name): PathParams<Id<TransportType>>,
    State(state): State<WebState<D>>,
    JsonBody(new): JsonBody<TransportType>,
) -> JsonResult<TransportType> {
    check_name(&method, &original_uri, &new)?;
    let mut session = state.session();
    let mut types = TypeService::new(&mut session);
    let result = if new.name == name {
        types.update(new).await
    } else {
        types.rename(&name, new).await
    };
    result.map(Json).map_err(failed(&method, &original_uri))
}

async fn delete_type<D: Database>(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
    PathParams(name): PathParams<Id<TransportType>>,
    State(state): State<WebState<D>>,
) -> JsonResult<()> {
    let mut session = state.session();
    TypeService::new(&mut session)
        .delete(&name)
        .await
        .map(Json)
        .map_err(failed(&method, &original_uri))
}
