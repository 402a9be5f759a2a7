use std::time::Instant;

use opentelemetry::KeyValue;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, UpstreamError};
use crate::llm::LlmClient;
use crate::telemetry::metrics::{CRISIS_REQUEST_DURATION, CRISIS_REQUEST_FAILURES};
use crate::weather::{WeatherClient, WeatherRecord};

use super::report;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisResult {
    pub weather: WeatherRecord,
    pub analysis: String,
}

/// Looks up the weather at a coordinate and turns it into a crisis report.
///
/// All-or-nothing: the report is only requested once the weather lookup has
/// succeeded, and no weather data is returned if the report fails. Callers see
/// a single [`AppError::RequestFailed`]; the root cause goes to the logs.
#[tracing::instrument(
    name = "pipeline crisis",
    skip(weather_client, llm_client),
    fields(
        crisis.duration_ms,
        crisis.failed_stage,
    )
)]
pub async fn handle_crisis_request(
    weather_client: &WeatherClient,
    llm_client: &LlmClient,
    latitude: f64,
    longitude: f64,
) -> Result<CrisisResult, AppError> {
    let start = Instant::now();

    let result = run(weather_client, llm_client, latitude, longitude).await;

    let duration = start.elapsed();
    let span = tracing::Span::current();
    span.record("crisis.duration_ms", duration.as_millis() as i64);

    let outcome = if result.is_ok() { "success" } else { "failure" };
    CRISIS_REQUEST_DURATION.record(
        duration.as_secs_f64(),
        &[KeyValue::new("outcome", outcome)],
    );

    result.map_err(|err| {
        let stage = err.stage();
        span.record("crisis.failed_stage", stage.as_str());
        CRISIS_REQUEST_FAILURES.add(1, &[KeyValue::new("stage", stage.as_str())]);
        tracing::error!(
            stage = stage.as_str(),
            error = %err,
            latitude,
            longitude,
            "crisis request failed"
        );
        AppError::RequestFailed
    })
}

async fn run(
    weather_client: &WeatherClient,
    llm_client: &LlmClient,
    latitude: f64,
    longitude: f64,
) -> Result<CrisisResult, UpstreamError> {
    // Stage 1: current conditions
    let weather = weather_client.fetch_weather(latitude, longitude).await?;

    // Stage 2: report from those conditions
    let analysis = report::generate_report(llm_client, &weather).await?;

    Ok(CrisisResult { weather, analysis })
}
