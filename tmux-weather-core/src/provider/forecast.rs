use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;

use crate::{cache::Producer, model::{Forecast, LatLon}};

use super::truncate_body;

/// Current conditions from a forecast.io-style endpoint:
/// `GET <endpoint>/<api_key>/<latitude>,<longitude>`.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl ForecastClient {
    pub fn new(api_key: String, endpoint: impl Into<String>) -> Self {
        Self {
            api_key,
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }

    fn url(&self, at: &LatLon) -> String {
        format!(
            "{}/{}/{},{}",
            self.endpoint.trim_end_matches('/'),
            self.api_key,
            at.latitude,
            at.longitude
        )
    }
}

#[async_trait]
impl Producer for ForecastClient {
    type Args = LatLon;
    type Output = Forecast;

    async fn produce(&self, at: &LatLon) -> Result<Forecast> {
        tracing::debug!(latitude = at.latitude, longitude = at.longitude, "fetching weather");

        let res = self
            .http
            .get(self.url(at))
            .send()
            .await
            .context("Failed to send request to the forecast service")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let forecast: Forecast =
            serde_json::from_str(&body).context("Failed to parse forecast JSON")?;

        tracing::debug!(summary = %forecast.daily.summary, "got weather");
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Temperature;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY: &str = r#"{
        "latitude": 37.8267,
        "longitude": -122.4233,
        "currently": { "time": 1700000000, "icon": "partly-cloudy-day", "temperature": 61.42 },
        "daily": { "summary": "Light rain on Thursday.", "data": [] }
    }"#;

    fn here() -> LatLon {
        LatLon { latitude: 37.8267, longitude: -122.4233 }
    }

    #[tokio::test]
    async fn fetches_and_parses_current_conditions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/SECRET/37.8267,-122.4233"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .expect(1)
            .mount(&server)
            .await;

        let client = ForecastClient::new("SECRET".into(), server.uri());
        let forecast = client.produce(&here()).await.unwrap();

        assert_eq!(forecast.currently.icon, "partly-cloudy-day");
        assert_eq!(forecast.currently.temperature, Temperature::Number(61.42));
        assert_eq!(forecast.daily.summary, "Light rain on Thursday.");
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("daily usage limit exceeded"))
            .mount(&server)
            .await;

        let client = ForecastClient::new("SECRET".into(), format!("{}/", server.uri()));
        let err = client.produce(&here()).await.unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("daily usage limit exceeded"));
    }

    #[tokio::test]
    async fn unexpected_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"currently": {}}"#))
            .mount(&server)
            .await;

        let client = ForecastClient::new("SECRET".into(), server.uri());
        let err = client.produce(&here()).await.unwrap_err();

        assert!(err.to_string().contains("Failed to parse forecast JSON"));
    }
}
