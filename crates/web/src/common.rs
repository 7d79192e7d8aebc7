use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, OriginalUri, Query,
    },
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use database::DatabaseError;
use model::ExampleData;
use schemars::{schema_for, schema_for_value, JsonSchema};
use serde::{Deserialize, Serialize};
use utility::id::InvalidId;

pub type RouteResult<O> = Result<O, RouteErrorResponse>;

/// A json request body whose rejection is reported as a [`RouteErrorResponse`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(RouteErrorResponse))]
pub struct JsonBody<T>(pub T);

/// A query string whose rejection is reported as a [`RouteErrorResponse`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(RouteErrorResponse))]
pub struct QueryParams<T>(pub T);

// - Services returning commonly used responses -

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchemaParams {
    #[serde(default = "Default::default")]
    example_data: bool,
}

pub(crate) async fn schema<T: ExampleData + JsonSchema + Serialize>(
    Query(params): Query<SchemaParams>,
) -> impl IntoResponse {
    if params.example_data {
        Json(schema_for_value!(T::example_data()))
    } else {
        Json(schema_for!(T))
    }
}

pub(crate) async fn route_not_found(
    method: Method,
    OriginalUri(original_uri): OriginalUri,
) -> impl IntoResponse {
    RouteErrorResponse::not_found(&method, original_uri.path())
}

// - Commonly used responeses -

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteErrorResponse {
    #[serde(skip)]
    pub status_code: StatusCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_uri: Option<String>,

    #[serde(rename = "detail", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RouteErrorResponse {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            http_method: None,
            requested_uri: None,
            message: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST).with_message(message)
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
}

impl From<DatabaseError> for RouteErrorResponse {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound => {
                Self::new(StatusCode::NOT_FOUND).with_message("Location not found")
            }
            other => {
                // the error text stays in the log
                log::error!("database error: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR).with_default_message()
            }
        }
    }
}

impl From<InvalidId> for RouteErrorResponse {
    fn from(_: InvalidId) -> Self {
        Self::bad_request("Invalid ID format")
    }
}

impl From<JsonRejection> for RouteErrorResponse {
    fn from(value: JsonRejection) -> Self {
        Self::new(value.status()).with_message(value.body_text())
    }
}

impl From<QueryRejection> for RouteErrorResponse {
    fn from(value: QueryRejection) -> Self {
        Self::new(value.status()).with_message(value.body_text())
    }
}

impl IntoResponse for RouteErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use serde_json::json;

    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = RouteErrorResponse::from(DatabaseError::NotFound);
        assert_eq!(response.status_code, StatusCode::NOT_FOUND);
        assert_eq!(response.message.as_deref(), Some("Location not found"));
    }

    #[test]
    fn other_database_errors_map_to_500() {
        let why = io::Error::new(io::ErrorKind::Other, "connection reset");
        let response = RouteErrorResponse::from(DatabaseError::other(why));
        assert_eq!(response.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.message.as_deref(), Some("Internal Server Error"));

        let response = RouteErrorResponse::from(DatabaseError::IdMissing);
        assert_eq!(response.status_code, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_ids_map_to_400() {
        let why = model::location::LocationId::parse("nope").unwrap_err();
        let response = RouteErrorResponse::from(why);
        assert_eq!(response.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(response.message.as_deref(), Some("Invalid ID format"));
    }

    #[test]
    fn body_only_carries_known_fields() {
        let response = RouteErrorResponse::bad_request("Invalid ID format")
            .with_method(&Method::GET)
            .with_uri("/locations/nope");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "httpMethod": "GET",
                "requestedUri": "/locations/nope",
                "detail": "Invalid ID format",
            })
        );

        let bare = RouteErrorResponse::new(StatusCode::NOT_FOUND);
        assert_eq!(serde_json::to_value(&bare).unwrap(), json!({}));
    }
}
