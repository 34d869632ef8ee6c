//! The session context: every handler goes through one [`Session`].
//!
//! State lives behind short `parking_lot` critical sections that are never
//! held across an await, so handlers can interleave at request boundaries
//! exactly like the event loop they model.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::{mpsc, watch};

use crate::{
    Config, Coordinate, SessionError, View,
    display::{self, DisplaySink},
    fetcher::{Clock, FetchOutcome, SystemClock, WeatherFetcher},
    map::{ClickReceiver, MapController, MapWidgetFactory, SEARCH_ZOOM},
    provider::{self, Geocoder, WeatherSource},
    search::SearchController,
    view::{ShowEffect, ViewManager, ViewSurface},
};

/// How results of overlapping clicks are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RacePolicy {
    /// Apply every result when it arrives; a slow earlier click may overwrite
    /// a newer one.
    #[default]
    LastResolvedWins,
    /// Drop results whose click has been superseded.
    LatestClickWins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapState {
    Pending,
    Ready,
    Failed(SessionError),
}

/// Collaborators a session is built from.
pub struct SessionDeps {
    pub map_factory: Box<dyn MapWidgetFactory>,
    pub weather: Arc<dyn WeatherSource>,
    pub geocoder: Arc<dyn Geocoder>,
    pub surface: Arc<dyn ViewSurface>,
    pub display: Arc<dyn DisplaySink>,
    pub clock: Arc<dyn Clock>,
    pub policy: RacePolicy,
}

pub struct Session {
    views: Mutex<ViewManager>,
    map: Mutex<MapController>,
    surface: Arc<dyn ViewSurface>,
    display: Arc<dyn DisplaySink>,
    fetcher: WeatherFetcher,
    search: SearchController,
    policy: RacePolicy,
    latest_click: AtomicU64,
    map_state: watch::Sender<MapState>,
}

impl Session {
    /// Build a session showing the home view. Clicks registered with the map
    /// widget arrive on the returned receiver; feed it to
    /// [`Session::dispatch_clicks`].
    pub fn new(deps: SessionDeps) -> (Self, ClickReceiver) {
        let (clicks_tx, clicks_rx) = mpsc::unbounded_channel();
        let (map_state, _) = watch::channel(MapState::Pending);

        let mut views = ViewManager::new();
        views.show(View::Home, deps.surface.as_ref(), false);

        let session = Self {
            views: Mutex::new(views),
            map: Mutex::new(MapController::new(deps.map_factory, clicks_tx)),
            surface: deps.surface,
            display: deps.display,
            fetcher: WeatherFetcher::new(deps.weather, deps.geocoder.clone(), deps.clock),
            search: SearchController::new(deps.geocoder),
            policy: deps.policy,
            latest_click: AtomicU64::new(0),
            map_state,
        };

        (session, clicks_rx)
    }

    /// Build a session backed by the HTTP providers described by `config`.
    pub fn from_config(
        config: &Config,
        map_factory: Box<dyn MapWidgetFactory>,
        surface: Arc<dyn ViewSurface>,
        display: Arc<dyn DisplaySink>,
    ) -> anyhow::Result<(Self, ClickReceiver)> {
        let http = provider::http_client(config)?;
        let weather = provider::weather_source_from_config(config, http.clone());
        let geocoder = provider::geocoder_from_config(config, http);
        let policy = if config.session.latest_click_wins {
            RacePolicy::LatestClickWins
        } else {
            RacePolicy::LastResolvedWins
        };

        Ok(Self::new(SessionDeps {
            map_factory,
            weather: weather.into(),
            geocoder: geocoder.into(),
            surface,
            display,
            clock: Arc::new(SystemClock),
            policy,
        }))
    }

    pub fn active_view(&self) -> View {
        self.views.lock().active()
    }

    pub fn policy(&self) -> RacePolicy {
        self.policy
    }

    pub fn map_state(&self) -> MapState {
        self.map_state.borrow().clone()
    }

    pub fn marker_position(&self) -> Option<Coordinate> {
        self.map.lock().marker_position()
    }

    /// Switch views. The first entry into the map view also creates the map
    /// and returns once it is ready.
    pub async fn show(&self, view: View) -> Result<(), SessionError> {
        let map_exists = self.map.lock().is_initialized();
        let effect = self
            .views
            .lock()
            .show(view, self.surface.as_ref(), map_exists);

        if effect == ShowEffect::InitializeMap {
            self.initialize_map().await?;
        }
        Ok(())
    }

    async fn initialize_map(&self) -> Result<(), SessionError> {
        let settled = {
            let mut map = self.map.lock();
            if !map.is_initialized() {
                self.map_state.send_replace(MapState::Pending);
            }
            match map.initialize() {
                Ok(true) => map.settled(),
                // Another handler got there first and will publish readiness.
                Ok(false) => return Ok(()),
                Err(err) => {
                    tracing::warn!(error = %err, "map initialization failed");
                    self.map_state.send_replace(MapState::Failed(err.clone()));
                    self.display.notify(err.user_message());
                    return Err(err);
                }
            }
        };

        if let Some(settled) = settled {
            settled.await;
        }
        self.map.lock().recalculate_size();
        self.map_state.send_replace(MapState::Ready);

        tracing::info!("map ready");
        Ok(())
    }

    /// Wait until the map has been created and re-measured.
    pub async fn wait_map_ready(&self) -> Result<(), SessionError> {
        let mut state = self.map_state.subscribe();
        let current = state
            .wait_for(|s| *s != MapState::Pending)
            .await
            .map_err(|_| SessionError::Initialization("map state channel closed".into()))?;

        match &*current {
            MapState::Failed(err) => Err(err.clone()),
            _ => Ok(()),
        }
    }

    /// Single entry point for map clicks, real or synthesized by search.
    pub async fn click(&self, at: Coordinate) -> FetchOutcome {
        let token = self.latest_click.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(%at, token, "map clicked");

        self.map.lock().on_click(at);
        display::render_loading(self.display.as_ref(), at);

        let outcome = self.fetcher.fetch(at).await;

        if self.policy == RacePolicy::LatestClickWins
            && self.latest_click.load(Ordering::SeqCst) != token
        {
            tracing::debug!(%at, token, "discarding result of superseded click");
            return outcome;
        }

        match &outcome {
            Ok(report) => {
                let popup = display::popup_text(report);
                self.map.lock().update_marker_popup(&popup);
                display::render_report(self.display.as_ref(), report);
            }
            Err(err) => display::render_failure(self.display.as_ref(), err),
        }

        outcome
    }

    /// Search for `text` and, on a match, jump there and click it.
    ///
    /// Returns the matched coordinate, or `None` for blank input. Not-found
    /// and search failures are announced through [`DisplaySink::notify`] and
    /// leave the view untouched.
    pub async fn search(&self, text: &str) -> Result<Option<Coordinate>, SessionError> {
        let query = text.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let found = match self.search.resolve(query).await {
            Ok(found) => found,
            Err(err) => {
                self.display.notify(err.user_message());
                return Err(err);
            }
        };

        self.show(View::Map).await?;
        self.wait_map_ready().await?;

        self.map.lock().go_to(found, SEARCH_ZOOM);
        let _ = self.click(found).await;

        Ok(Some(found))
    }

    /// Handle clicks coming from the map widget until its channel closes.
    /// Each click runs on its own task so fetches may overlap.
    pub async fn dispatch_clicks(self: Arc<Self>, mut clicks: ClickReceiver) {
        while let Some(at) = clicks.recv().await {
            let session = Arc::clone(&self);
            tokio::spawn(async move {
                let _ = session.click(at).await;
            });
        }
        tracing::debug!("click channel closed");
    }
}
