//! City lookup endpoint handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::models::CityQuery;

/// `POST /api/v1/city-data` — populated places matching a city-name prefix
/// and country code. An empty result set is a 404, not an empty list.
pub async fn city_data(
    State(state): State<AppState>,
    Json(query): Json<CityQuery>,
) -> Result<Response, ApiError> {
    let matches = state.geonames.lookup(&query.city, &query.country).await?;

    if matches.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "No data found, maybe the city name or country code is not correct.",
            })),
        )
            .into_response());
    }

    Ok(Json(json!({"data": matches})).into_response())
}
