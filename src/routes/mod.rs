pub mod crisis;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(health::index))
        .route("/api/health", get(health::health))
        .route("/crisis-agent", post(crisis::crisis_agent))
        .fallback_service(static_files)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::Config;
    use crate::error::GENERIC_FAILURE;
    use crate::llm::LlmClient;
    use crate::llm::testing::FakeProvider;
    use crate::weather::WeatherClient;

    fn state(weather_url: &str, provider: Arc<FakeProvider>) -> AppState {
        let config = Config {
            port: 0,
            environment: "test".to_string(),
            weather_api_key: "weather-key".to_string(),
            weather_base_url: weather_url.to_string(),
            llm_provider: "google".to_string(),
            llm_model: "gemini-1.5-pro".to_string(),
            gemini_api_key: Some("gemini-key".to_string()),
            openai_api_key: None,
            ollama_base_url: "http://localhost:11434".to_string(),
            static_dir: "public".to_string(),
            otel_service_name: "crisis-agent".to_string(),
            otel_exporter_endpoint: "http://localhost:4317".to_string(),
        };

        AppState {
            weather_client: Arc::new(WeatherClient::new(
                &config.weather_base_url,
                &config.weather_api_key,
            )),
            llm_client: Arc::new(LlmClient::new(provider, config.llm_model.clone())),
            config,
        }
    }

    fn crisis_post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/crisis-agent")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_index_banner() {
        let app = create_router(state("http://127.0.0.1:1", Arc::new(FakeProvider::replying("x"))));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("POST /crisis-agent"));
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(state("http://127.0.0.1:1", Arc::new(FakeProvider::replying("x"))));

        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "crisis-agent");
    }

    #[tokio::test]
    async fn test_crisis_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [{"description": "moderate rain"}],
                "main": {"temp": 24.3, "humidity": 91},
                "wind": {"speed": 6.7},
                "rain": {"1h": 8.4}
            })))
            .mount(&server)
            .await;

        let provider = Arc::new(FakeProvider::replying("🌾 Crisis Report:\nFlood watch."));
        let app = create_router(state(&server.uri(), provider.clone()));

        let response = app
            .oneshot(crisis_post(r#"{"lat": 19.07, "lon": 72.87}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["weather"],
            json!({
                "temp": 24.3,
                "humidity": 91.0,
                "condition": "moderate rain",
                "windSpeed": 6.7,
                "rainfall": 8.4
            })
        );
        assert_eq!(body["analysis"], "🌾 Crisis Report:\nFlood watch.");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_crisis_upstream_failure_is_generic() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "cod": 401,
                "message": "Invalid API key"
            })))
            .mount(&server)
            .await;

        let provider = Arc::new(FakeProvider::replying("unused"));
        let app = create_router(state(&server.uri(), provider.clone()));

        let response = app
            .oneshot(crisis_post(r#"{"latitude": 1.0, "longitude": 2.0}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], GENERIC_FAILURE);
        assert!(body.get("weather").is_none());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_crisis_bad_body() {
        let provider = Arc::new(FakeProvider::replying("unused"));
        let app = create_router(state("http://127.0.0.1:1", provider.clone()));

        let response = app.oneshot(crisis_post(r#"{"lat": "north"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(provider.calls(), 0);
    }
}
