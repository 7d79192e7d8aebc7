use axum::{response::IntoResponse, routing::get, Json, Router};
use database::LocationRepo;
use serde_json::json;

pub mod locations;

use crate::{common::route_not_found, WebState};

pub fn routes<R: LocationRepo>(state: WebState<R>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .merge(locations::routes(state))
        .fallback(route_not_found)
}

async fn ping() -> impl IntoResponse {
    Json(json!({
        "message": "pong!"
    }))
}
