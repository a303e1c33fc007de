//! Core library for the `tmux-weather` status widget.
//!
//! This crate defines:
//! - Configuration & per-user directories
//! - A file-backed entry store and the fetch-with-cache policy on top of it
//! - The location and forecast producers wrapped by that policy
//! - Status-line formatting
//!
//! It is used by `tmux-weather-cli`.

pub mod cache;
pub mod clock;
pub mod config;
pub mod format;
pub mod model;
pub mod provider;
pub mod store;

pub use cache::{CachedFetch, ErrorSink, FetchError, Producer};
pub use clock::{Clock, SystemClock};
pub use config::{Config, Dirs};
pub use model::{Currently, Daily, Forecast, LatLon, Temperature};
pub use provider::{LOCATION_KEY, LocationResolver, WEATHER_KEY, WeatherFetcher};
pub use store::{Entry, EntryStore, StoreError};
