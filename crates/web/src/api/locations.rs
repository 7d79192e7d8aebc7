use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode, Uri},
    routing::{get, post},
    Json, Router,
};
use database::{DatabaseError, LocationRepo};
use model::location::{
    InsertedIds, Location, LocationCreate, LocationId, LocationUpdate, LocationsBatch,
};
use serde::Deserialize;

use crate::{
    common::{schema, JsonBody, QueryParams, RouteErrorResponse, RouteResult},
    WebState,
};

pub const DEFAULT_LIMIT: i64 = 100;

macro_rules! resource {
    ($($arg:tt)*) => {
        format!("/locations{}", format_args!($($arg)*))
    };
}

/// Collection routes are served with and without the trailing slash.
pub(crate) fn routes<R: LocationRepo>(state: WebState<R>) -> Router {
    let mut router = Router::new();
    for slash in ["", "/"] {
        router = router
            .route(
                &resource!("{}", slash),
                get(get_locations::<R>).post(create_location::<R>),
            )
            .route(
                &resource!("/batch{}", slash),
                post(create_locations_batch::<R>),
            )
            .route(&resource!("/last{}", slash), get(get_last_location::<R>));
    }

    router
        .route(&resource!("/schema"), get(schema::<Location>))
        .route(
            &resource!("/:id"),
            get(get_location::<R>)
                .put(update_location::<R>)
                .delete(delete_location::<R>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    limit: Option<i64>,
}

fn parse_id(id: &str, method: &Method, uri: &Uri) -> RouteResult<LocationId> {
    LocationId::parse(id).map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(method)
            .with_uri(uri.path())
    })
}

async fn create_location<R: LocationRepo>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { locations }): State<WebState<R>>,
    JsonBody(location): JsonBody<LocationCreate>,
) -> RouteResult<(StatusCode, Json<Location>)> {
    locations
        .insert(location)
        .await
        .map(|location| (StatusCode::CREATED, Json(location)))
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })
}

async fn create_locations_batch<R: LocationRepo>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { locations }): State<WebState<R>>,
    JsonBody(batch): JsonBody<LocationsBatch>,
) -> RouteResult<(StatusCode, Json<InsertedIds>)> {
    locations
        .insert_many(batch.locations)
        .await
        .map(|inserted_ids| (StatusCode::CREATED, Json(InsertedIds { inserted_ids })))
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })
}

async fn get_locations<R: LocationRepo>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { locations }): State<WebState<R>>,
    QueryParams(params): QueryParams<ListQuery>,
) -> RouteResult<Json<Vec<Location>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if limit < 0 {
        return Err(RouteErrorResponse::bad_request("limit must not be negative")
            .with_method(&Method::GET)
            .with_uri(original_uri.path()));
    }

    locations
        .get_all((limit > 0).then_some(limit))
        .await
        .map(Json)
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn get_last_location<R: LocationRepo>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { locations }): State<WebState<R>>,
) -> RouteResult<Json<Location>> {
    locations.last().await.map(Json).map_err(|why| {
        let empty = matches!(why, DatabaseError::NotFound);
        let response = RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path());
        if empty {
            response.with_message("No locations found")
        } else {
            response
        }
    })
}

async fn get_location<R: LocationRepo>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { locations }): State<WebState<R>>,
) -> RouteResult<Json<Location>> {
    let id = parse_id(&id, &Method::GET, &original_uri)?;
    locations.get(id).await.map(Json).map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })
}

async fn update_location<R: LocationRepo>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { locations }): State<WebState<R>>,
    JsonBody(update): JsonBody<LocationUpdate>,
) -> RouteResult<Json<Location>> {
    let id = parse_id(&id, &Method::PUT, &original_uri)?;
    if update.is_empty() {
        return Err(RouteErrorResponse::bad_request("No fields to update")
            .with_method(&Method::PUT)
            .with_uri(original_uri.path()));
    }

    locations.update(id, update).await.map(Json).map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::PUT)
            .with_uri(original_uri.path())
    })
}

async fn delete_location<R: LocationRepo>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { locations }): State<WebState<R>>,
) -> RouteResult<StatusCode> {
    let id = parse_id(&id, &Method::DELETE, &original_uri)?;
    locations
        .delete(id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::DELETE)
                .with_uri(original_uri.path())
        })
}
