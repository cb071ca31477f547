//! Integration tests for WeatherProvider using wiremock.

use std::time::Duration;

use roam_weather::{Coordinate, WeatherError, WeatherLookup, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> WeatherProvider {
    WeatherProvider::new("test-key", &server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_current_weather_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "37.82"))
        .and(query_param("lon", "-122.48"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": { "temp": 14.3, "humidity": 80 },
            "weather": [
                { "id": 701, "main": "Mist", "description": "mist" },
                { "id": 800, "main": "Clear", "description": "clear sky" }
            ],
            "name": "San Francisco"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let weather = provider(&mock_server)
        .current(Coordinate::new(37.82, -122.48))
        .await
        .unwrap();

    assert_eq!(weather.temperature, 14.3);
    assert_eq!(weather.condition, "Mist");
}

#[tokio::test]
async fn test_empty_condition_list_is_unknown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": { "temp": -3.0 },
            "weather": []
        })))
        .mount(&mock_server)
        .await;

    let weather = provider(&mock_server)
        .current(Coordinate::new(0.0, 0.0))
        .await
        .unwrap();

    assert_eq!(weather.temperature, -3.0);
    assert_eq!(weather.condition, "Unknown");
}

#[tokio::test]
async fn test_unauthorized_is_invalid_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key"
        })))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .current(Coordinate::new(0.0, 0.0))
        .await;

    assert!(matches!(result, Err(WeatherError::InvalidApiKey)));
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .current(Coordinate::new(0.0, 0.0))
        .await;

    match result {
        Err(WeatherError::Api { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"weather\": []}"))
        .mount(&mock_server)
        .await;

    let result = provider(&mock_server)
        .current(Coordinate::new(0.0, 0.0))
        .await;

    assert!(matches!(result, Err(WeatherError::Parse(_))));
}
