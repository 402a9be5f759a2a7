use std::time::Instant;

use opentelemetry::KeyValue;
use serde::Deserialize;

use super::WeatherRecord;
use crate::error::{UpstreamError, truncate};
use crate::telemetry::metrics::{WEATHER_LOOKUP_DURATION, WEATHER_LOOKUP_ERRORS};

/// Client for the OpenWeatherMap current-weather endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    rain: Option<OwRain>,
}

impl WeatherClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    #[tracing::instrument(
        name = "weather.lookup",
        skip(self),
        fields(
            server.address = %self.base_url,
            http.response.status_code = tracing::field::Empty,
            weather.condition = tracing::field::Empty,
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherRecord, UpstreamError> {
        let start = Instant::now();
        let result = self.fetch_current(latitude, longitude).await;

        WEATHER_LOOKUP_DURATION.record(start.elapsed().as_secs_f64(), &[]);

        let span = tracing::Span::current();
        match &result {
            Ok(record) => {
                span.record("weather.condition", record.condition.as_str());
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                WEATHER_LOOKUP_ERRORS.add(1, &[KeyValue::new("error.type", error_kind(err))]);
            }
        }

        result
    }

    async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherRecord, UpstreamError> {
        let url = format!("{}/weather", self.base_url);

        // reqwest errors carry the full URL, which includes the API key.
        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.without_url()))?;

        let status = res.status();
        tracing::Span::current().record("http.response.status_code", status.as_u16() as i64);

        let body = res
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.without_url()))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        parse_current(&body)
    }
}

fn parse_current(body: &str) -> Result<WeatherRecord, UpstreamError> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).map_err(|e| UpstreamError::Payload(e.to_string()))?;

    let condition = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| UpstreamError::Payload("empty `weather` list".to_string()))?;

    let rainfall = parsed.rain.and_then(|r| r.one_hour).unwrap_or(0.0);

    Ok(WeatherRecord {
        temperature: parsed.main.temp,
        humidity: parsed.main.humidity,
        condition,
        wind_speed: parsed.wind.speed,
        rainfall,
    })
}

fn error_kind(err: &UpstreamError) -> &'static str {
    match err {
        UpstreamError::Transport(e) if e.is_timeout() => "timeout",
        UpstreamError::Transport(_) => "network_error",
        UpstreamError::Status { .. } => "status",
        _ => "payload",
    }
}
