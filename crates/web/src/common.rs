use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, OriginalUri, Path, Query, Request,
    },
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    routing::MethodFilter,
    Json,
};
use log::error;
use model::{ExampleData, ResourceKind};
use public_transport::ServiceError;
use schemars::{schema_for, schema_for_value, JsonSchema};
use serde::{Deserialize, Serialize};

pub type RouteResult<O> = Result<O, RouteErrorResponse>;
pub type JsonResult<O> = RouteResult<Json<O>>;

/// A `MethodFilter` that matches all http methods.
pub(crate) const METHOD_FILTER_ALL: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE);

// - Extractors answering with a `RouteErrorResponse` when they reject -

#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(RouteErrorResponse))]
pub(crate) struct JsonBody<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(RouteErrorResponse))]
pub(crate) struct PathParams<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(RouteErrorResponse))]
pub(crate) struct QueryParams<T>(pub T);

// - Services returning commonly used responses -

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchemaParams {
    #[serde(default = "Default::default")]
    example_data: bool,
}

pub(crate) async fn schema<T: ExampleData + JsonSchema + Serialize>(
    QueryParams(params): QueryParams<SchemaParams>,
) -> impl IntoResponse {
    if params.example_data {
        Json(schema_for_value!(T::example_data()))
    } else {
        Json(schema_for!(T))
    }
}

pub(crate) async fn route_not_found(
    OriginalUri(original_uri): OriginalUri,
    req: Request,
) -> impl IntoResponse {
    RouteErrorResponse::not_found(req.method(), original_uri.path())
}

// - Commonly used responeses -

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteErrorResponse {
    #[serde(skip)]
    pub status_code: StatusCode,
    pub http_method: Option<String>,
    pub requested_uri: Option<String>,
    pub message: Option<String>,
    pub resource_type: Option<String>,
    pub resource_identifier: Option<String>,
    pub details: Option<String>,
}

impl RouteErrorResponse {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            http_method: None,
            requested_uri: None,
            message: None,
            resource_type: None,
            resource_identifier: None,
            details: None,
        }
    }

    pub fn not_found(method: &Method, uri: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND)
            .with_method(method)
            .with_uri(uri)
            .with_default_message()
    }

    pub fn with_method(mut self, method: &Method) -> Self {
        self.http_method = Some(method.to_string());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.requested_uri = Some(uri.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_default_message(self) -> Self {
        let message = self
            .status_code
            .canonical_reason()
            .unwrap_or("i dunno what happened here :/");
        self.with_message(message)
    }

    pub fn with_resource(mut self, kind: ResourceKind) -> Self {
        self.resource_type = Some(kind.to_string());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.resource_identifier = Some(identifier.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<ServiceError> for RouteErrorResponse {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::ResourceNotFound { kind, identifier } => {
                Self::new(StatusCode::NOT_FOUND)
                    .with_message("Resource with given identity could not be found.")
                    .with_resource(kind)
                    .with_identifier(identifier)
            }
            ServiceError::ResourceAlreadyExists { kind, identifier } => {
                Self::new(StatusCode::CONFLICT)
                    .with_message("Resource with given identity already exists.")
                    .with_resource(kind)
                    .with_identifier(identifier)
            }
            ServiceError::DatabaseIntegrityViolated { kind, details } => {
                Self::new(StatusCode::CONFLICT)
                    .with_message("Request violates database integrity.")
                    .with_resource(kind)
                    .with_details(details)
            }
            ServiceError::Fatal(why) => {
                error!("request failed: {why}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR).with_default_message()
            }
        }
    }
}

impl From<JsonRejection> for RouteErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status())
            .with_message("Request body could not be read.")
            .with_details(rejection.body_text())
    }
}

impl From<PathRejection> for RouteErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status())
            .with_message("Request path could not be read.")
            .with_details(rejection.body_text())
    }
}

impl From<QueryRejection> for RouteErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status())
            .with_message("Query parameters could not be read.")
            .with_details(rejection.body_text())
    }
}

impl IntoResponse for RouteErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(self)).into_response()
    }
}

/// Turns a service error into a response naming the failed request.
pub(crate) fn failed<'a>(
    method: &'a Method,
    uri: &'a Uri,
) -> impl FnOnce(ServiceError) -> RouteErrorResponse + 'a {
    move |why| {
        RouteErrorResponse::from(why)
            .with_method(method)
            .with_uri(uri.path())
    }
}
