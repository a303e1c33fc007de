use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use tmux_weather_core::{Config, EntryStore, ErrorSink, Forecast, format, provider};

/// Resolve location, fetch weather for it and render the status line.
pub async fn run(config: &Config, store: EntryStore, sink: Arc<dyn ErrorSink>) -> Result<String> {
    let location = provider::location_resolver(config, store.clone(), sink.clone());
    let weather = provider::weather_fetcher(config, store, sink)?;

    let here = location.fetch(&()).await.context("Failed to resolve location")?;
    tracing::debug!(latitude = here.latitude, longitude = here.longitude, "location");

    let forecast = weather.fetch(&here).await.context("Failed to fetch weather")?;
    tracing::debug!(summary = %forecast.daily.summary, "weather");

    render(&forecast)
}

pub fn render(forecast: &Forecast) -> Result<String> {
    let currently = &forecast.currently;
    let degrees = currently
        .temperature
        .degrees()
        .ok_or_else(|| anyhow!("Forecast temperature {:?} is not a number", currently.temperature))?;

    Ok(format::status_line(&currently.icon, degrees))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;
    use std::sync::Mutex;
    use tmux_weather_core::{Currently, Daily, Temperature};

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<String>>);

    impl ErrorSink for RecordingSink {
        fn submit(&self, err: &(dyn StdError + 'static)) {
            self.0.lock().unwrap().push(err.to_string());
        }
    }

    fn forecast(icon: &str, temperature: Temperature) -> Forecast {
        Forecast {
            daily: Daily { summary: "Clear throughout the day.".into() },
            currently: Currently { icon: icon.into(), temperature },
        }
    }

    #[test]
    fn render_formats_icon_and_temperature() {
        let line = render(&forecast("clear-day", Temperature::Text("72".into()))).unwrap();
        assert_eq!(line, "☀️ #[fg=colour208]72");

        let line = render(&forecast("tornado", Temperature::Number(91.3))).unwrap();
        assert_eq!(line, "tornado #[fg=colour196]91");
    }

    #[test]
    fn render_rejects_non_numeric_temperature() {
        let err = render(&forecast("fog", Temperature::Text("n/a".into()))).unwrap_err();
        assert!(err.to_string().contains("is not a number"));
    }

    #[cfg(unix)]
    mod end_to_end {
        use super::*;
        use tmux_weather_core::Dirs;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn setup(server: &MockServer, location_script: &str) -> (tempfile::TempDir, Dirs, Config) {
            let root = tempfile::tempdir().unwrap();
            let dirs = Dirs {
                config_dir: root.path().join("config"),
                cache_dir: root.path().join("cache"),
                home_dir: Some(root.path().to_path_buf()),
            };
            dirs.ensure().unwrap();
            let config = Config {
                api_key: Some("KEY".into()),
                location_command: "sh".into(),
                location_args: vec!["-c".into(), location_script.into()],
                endpoint: server.uri(),
                ..Config::default()
            };
            (root, dirs, config)
        }

        #[tokio::test]
        async fn second_run_is_served_from_cache() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/KEY/40.7,-74"))
                .respond_with(ResponseTemplate::new(200).set_body_string(
                    r#"{"daily":{"summary":"Snow."},"currently":{"icon":"snow","temperature":28.4}}"#,
                ))
                .expect(1)
                .mount(&server)
                .await;

            let (_root, dirs, config) =
                setup(&server, r#"echo '{"latitude": 40.7, "longitude": -74.0}'"#);
            let store = EntryStore::new(&dirs.cache_dir);
            let sink = Arc::new(RecordingSink::default());

            let first = run(&config, store.clone(), sink.clone()).await.unwrap();
            let second = run(&config, store.clone(), sink.clone()).await.unwrap();

            assert_eq!(first, "❄️ #[fg=colour27]28");
            assert_eq!(first, second);
            assert!(store.entry_path("latlon").exists());
            assert!(store.entry_path("weather").exists());
            assert!(sink.0.lock().unwrap().is_empty());
        }

        #[tokio::test]
        async fn weather_failure_surfaces_as_error() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;

            let (_root, dirs, config) =
                setup(&server, r#"echo '{"latitude": 1, "longitude": 2}'"#);
            let store = EntryStore::new(&dirs.cache_dir);

            let err = run(&config, store.clone(), Arc::new(RecordingSink::default()))
                .await
                .unwrap_err();

            assert!(format!("{err:#}").contains("Failed to fetch weather"));
            assert!(!store.entry_path("weather").exists());
            assert!(store.entry_path("latlon").exists());
        }
    }
}
