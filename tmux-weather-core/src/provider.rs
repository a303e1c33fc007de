use std::sync::Arc;

use crate::{
    Config,
    cache::{CachedFetch, ErrorSink},
    provider::{forecast::ForecastClient, location::LocationCommand},
    store::EntryStore,
};

pub mod forecast;
pub mod location;

pub const LOCATION_KEY: &str = "latlon";
pub const WEATHER_KEY: &str = "weather";

pub type LocationResolver = CachedFetch<LocationCommand>;
pub type WeatherFetcher = CachedFetch<ForecastClient>;

/// Location lookups; a failed lookup falls back to the last known position.
pub fn location_resolver(
    config: &Config,
    store: EntryStore,
    sink: Arc<dyn ErrorSink>,
) -> LocationResolver {
    let command = LocationCommand::new(config.location_command.clone(), config.location_args.clone());
    CachedFetch::new(LOCATION_KEY, command, config.freshness(), true, store, sink)
}

/// Weather lookups; failures always surface to the caller.
pub fn weather_fetcher(
    config: &Config,
    store: EntryStore,
    sink: Arc<dyn ErrorSink>,
) -> anyhow::Result<WeatherFetcher> {
    let client = ForecastClient::new(config.api_key()?.to_owned(), config.endpoint.clone());
    Ok(CachedFetch::new(WEATHER_KEY, client, config.freshness(), false, store, sink))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    struct NoopSink;

    impl ErrorSink for NoopSink {
        fn submit(&self, _err: &(dyn StdError + 'static)) {}
    }

    #[test]
    fn weather_fetcher_errors_when_missing_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::default();

        let err = weather_fetcher(&cfg, EntryStore::new(dir.path()), Arc::new(NoopSink))
            .err()
            .unwrap();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn resolvers_use_their_own_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        let store = EntryStore::new(dir.path());

        let location = location_resolver(&cfg, store.clone(), Arc::new(NoopSink));
        let weather = weather_fetcher(&cfg, store, Arc::new(NoopSink)).unwrap();

        assert_eq!(location.key(), "latlon");
        assert_eq!(location.producer().program(), "latlon");
        assert_eq!(weather.key(), "weather");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(250);

        let out = truncate_body(&long);

        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
