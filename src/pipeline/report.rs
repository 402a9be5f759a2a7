use crate::error::UpstreamError;
use crate::llm::{GenerateRequest, LlmClient};
use crate::telemetry::metrics::REPORT_SECTIONS_PRESENT;
use crate::weather::WeatherRecord;

use super::prompt::{REPORT_SECTIONS, build_prompt};

#[tracing::instrument(
    name = "pipeline_stage report",
    skip(llm_client, weather),
    fields(
        pipeline.stage = "report",
        weather.condition = %weather.condition,
        report.chars,
        report.sections_present,
    )
)]
pub async fn generate_report(
    llm_client: &LlmClient,
    weather: &WeatherRecord,
) -> Result<String, UpstreamError> {
    let resp = llm_client
        .generate(&GenerateRequest {
            model: llm_client.model().to_string(),
            prompt: build_prompt(weather),
        })
        .await
        .map_err(|e| UpstreamError::Generation(format!("{e:#}")))?;

    if resp.content.trim().is_empty() {
        return Err(UpstreamError::EmptyGeneration);
    }

    let found = sections_present(&resp.content);
    REPORT_SECTIONS_PRESENT.record(found as f64, &[]);

    let span = tracing::Span::current();
    span.record("report.chars", resp.content.chars().count());
    span.record("report.sections_present", found);

    Ok(resp.content)
}

/// Number of expected section markers found in the generated text.
///
/// Only observed for telemetry; the report itself is passed through untouched.
fn sections_present(report: &str) -> usize {
    REPORT_SECTIONS
        .iter()
        .filter(|marker| report.contains(*marker))
        .count()
}
