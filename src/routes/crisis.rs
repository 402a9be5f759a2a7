use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Deserialize;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::{CrisisResult, handle_crisis_request};

#[derive(Debug, Deserialize)]
pub struct CrisisRequestBody {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon")]
    pub longitude: f64,
}

pub async fn crisis_agent(
    State(state): State<AppState>,
    body: Result<Json<CrisisRequestBody>, JsonRejection>,
) -> AppResult<Json<CrisisResult>> {
    let Json(body) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let result = handle_crisis_request(
        &state.weather_client,
        &state.llm_client,
        body.latitude,
        body.longitude,
    )
    .await?;

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_full_names() {
        let body: CrisisRequestBody =
            serde_json::from_str(r#"{"latitude": 12.97, "longitude": 77.59}"#).unwrap();
        assert_eq!(body.latitude, 12.97);
        assert_eq!(body.longitude, 77.59);
    }

    #[test]
    fn test_body_short_names() {
        let body: CrisisRequestBody =
            serde_json::from_str(r#"{"lat": -33.86, "lon": 151.2}"#).unwrap();
        assert_eq!(body.latitude, -33.86);
        assert_eq!(body.longitude, 151.2);
    }

    #[test]
    fn test_body_missing_coordinate() {
        assert!(serde_json::from_str::<CrisisRequestBody>(r#"{"lat": 1.0}"#).is_err());
    }
}
