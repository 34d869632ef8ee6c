//! Core library for the `weathermap` explorer.
//!
//! This crate defines:
//! - The session: view switching, the lazily created map and its single
//!   marker, click and search handling
//! - Concurrent weather + place fetching for a coordinate
//! - HTTP providers (Open-Meteo, Nominatim) and configuration
//! - Shared domain models and rendering for the results region
//!
//! The map widget and UI surfaces are traits implemented by the front end,
//! `weathermap-cli` being one of them.

pub mod catalog;
pub mod config;
pub mod coord;
pub mod display;
pub mod error;
pub mod fetcher;
pub mod map;
pub mod model;
pub mod provider;
pub mod search;
pub mod session;
pub mod view;

pub use catalog::WeatherCode;
pub use config::Config;
pub use coord::{Coordinate, format_coordinates};
pub use display::DisplaySink;
pub use error::SessionError;
pub use fetcher::{Clock, FetchOutcome, FixedClock, SystemClock, WeatherFetcher};
pub use map::{ClickReceiver, ClickSender, MapController, MapWidget, MapWidgetFactory};
pub use model::{LocationReport, PlaceInfo, View, WeatherRow, WeatherSnapshot};
pub use provider::{Geocoder, WeatherSource};
pub use session::{MapState, RacePolicy, Session, SessionDeps};
pub use view::{ShowEffect, ViewManager, ViewSurface};
