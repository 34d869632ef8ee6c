#![allow(dead_code)]

use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Notify, oneshot};

use weathermap_core::{
    ClickSender, Coordinate, DisplaySink, FixedClock, Geocoder, MapWidget, MapWidgetFactory,
    PlaceInfo, RacePolicy, Session, SessionDeps, View, ViewSurface, WeatherRow, WeatherSource,
    map::{MapOptions, MarkerId, MarkerOptions, TileLayer},
    provider::{CurrentConditions, Forecast, HourlySeries},
};

pub fn forecast(code: i64) -> Forecast {
    Forecast {
        current_weather: CurrentConditions {
            temperature: 22.3,
            windspeed: 12.6,
            winddirection: 180.0,
            weathercode: code,
        },
        hourly: HourlySeries {
            relativehumidity_2m: vec![Some(65.0); 24],
            precipitation: vec![Some(0.0); 24],
        },
    }
}

pub fn place(city: &str, country: &str) -> PlaceInfo {
    PlaceInfo {
        city: city.to_string(),
        country: country.to_string(),
    }
}

fn key(at: Coordinate) -> (i64, i64) {
    (
        (at.latitude() * 1e4).round() as i64,
        (at.longitude() * 1e4).round() as i64,
    )
}

struct Scripted<T> {
    gate: Option<oneshot::Receiver<()>>,
    response: anyhow::Result<T>,
}

/// Weather source answering from per-coordinate scripts, optionally held
/// back until a gate is released.
#[derive(Default)]
pub struct ScriptedWeather {
    scripts: Mutex<HashMap<(i64, i64), Scripted<Forecast>>>,
}

impl std::fmt::Debug for ScriptedWeather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ScriptedWeather")
    }
}

impl ScriptedWeather {
    pub fn respond(&self, at: Coordinate, response: anyhow::Result<Forecast>) {
        let script = Scripted {
            gate: None,
            response,
        };
        self.scripts.lock().insert(key(at), script);
    }

    /// Like `respond`, but the answer is held until the returned sender fires.
    pub fn respond_gated(
        &self,
        at: Coordinate,
        response: anyhow::Result<Forecast>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        let script = Scripted {
            gate: Some(rx),
            response,
        };
        self.scripts.lock().insert(key(at), script);
        tx
    }
}

#[async_trait]
impl WeatherSource for ScriptedWeather {
    async fn forecast(&self, at: Coordinate) -> anyhow::Result<Forecast> {
        let script = self.scripts.lock().remove(&key(at));
        let Some(script) = script else {
            anyhow::bail!("no weather scripted for {at}");
        };
        if let Some(gate) = script.gate {
            let _ = gate.await;
        }
        script.response
    }
}

#[derive(Default)]
pub struct ScriptedGeocoder {
    places: Mutex<HashMap<(i64, i64), PlaceInfo>>,
    failing: Mutex<Vec<(i64, i64)>>,
    searches: Mutex<HashMap<String, anyhow::Result<Option<Coordinate>>>>,
}

impl std::fmt::Debug for ScriptedGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ScriptedGeocoder")
    }
}

impl ScriptedGeocoder {
    pub fn place(&self, at: Coordinate, place: PlaceInfo) {
        self.places.lock().insert(key(at), place);
    }

    pub fn fail_reverse(&self, at: Coordinate) {
        self.failing.lock().push(key(at));
    }

    pub fn search_result(&self, query: &str, result: anyhow::Result<Option<Coordinate>>) {
        self.searches.lock().insert(query.to_string(), result);
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn reverse(&self, at: Coordinate) -> anyhow::Result<PlaceInfo> {
        if self.failing.lock().contains(&key(at)) {
            anyhow::bail!("reverse geocoding returned 500");
        }
        self.places
            .lock()
            .get(&key(at))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no place scripted for {at}"))
    }

    async fn search(&self, query: &str) -> anyhow::Result<Option<Coordinate>> {
        self.searches.lock().remove(query).unwrap_or(Ok(None))
    }
}

/// Last state pushed to the results region.
#[derive(Debug, Default, Clone)]
pub struct DisplayState {
    pub label: String,
    pub coordinates: String,
    pub loading: bool,
    pub rows: Vec<WeatherRow>,
    pub error: Option<String>,
    pub notices: Vec<String>,
}

impl DisplayState {
    pub fn row(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    state: Mutex<DisplayState>,
}

impl RecordingDisplay {
    pub fn snapshot(&self) -> DisplayState {
        self.state.lock().clone()
    }
}

impl DisplaySink for RecordingDisplay {
    fn set_location_label(&self, text: &str) {
        self.state.lock().label = text.to_string();
    }

    fn set_coordinates_text(&self, text: &str) {
        self.state.lock().coordinates = text.to_string();
    }

    fn set_loading(&self) {
        let mut state = self.state.lock();
        state.loading = true;
        state.rows.clear();
        state.error = None;
    }

    fn set_weather_rows(&self, rows: &[WeatherRow]) {
        let mut state = self.state.lock();
        state.loading = false;
        state.rows = rows.to_vec();
        state.error = None;
    }

    fn set_error_message(&self, text: &str) {
        let mut state = self.state.lock();
        state.loading = false;
        state.rows.clear();
        state.error = Some(text.to_string());
    }

    fn notify(&self, text: &str) {
        self.state.lock().notices.push(text.to_string());
    }
}

#[derive(Default)]
pub struct RecordingSurface {
    nav: Mutex<HashMap<View, bool>>,
    visible: Mutex<HashMap<View, bool>>,
}

impl RecordingSurface {
    pub fn active_navs(&self) -> Vec<View> {
        let nav = self.nav.lock();
        View::all()
            .iter()
            .copied()
            .filter(|v| nav.get(v) == Some(&true))
            .collect()
    }

    pub fn visible_views(&self) -> Vec<View> {
        let visible = self.visible.lock();
        View::all()
            .iter()
            .copied()
            .filter(|v| visible.get(v) == Some(&true))
            .collect()
    }
}

impl ViewSurface for RecordingSurface {
    fn set_nav_active(&self, view: View, active: bool) {
        self.nav.lock().insert(view, active);
    }

    fn set_container_visible(&self, view: View, visible: bool) {
        self.visible.lock().insert(view, visible);
    }
}

#[derive(Default)]
pub struct MapLog {
    pub created: usize,
    pub layers: Vec<TileLayer>,
    pub clicks: Option<ClickSender>,
    pub markers: HashMap<MarkerId, (Coordinate, String)>,
    pub views: Vec<(Coordinate, u8)>,
    pub invalidated: usize,
}

impl MapLog {
    pub fn popup_at(&self, at: Coordinate) -> Option<&str> {
        self.markers
            .values()
            .find(|(c, _)| *c == at)
            .map(|(_, p)| p.as_str())
    }
}

struct FakeWidget {
    log: Arc<Mutex<MapLog>>,
    settle: Option<Arc<Notify>>,
    next: u64,
}

impl MapWidget for FakeWidget {
    fn add_tile_layer(&mut self, layer: TileLayer) {
        self.log.lock().layers.push(layer);
    }

    fn on_click(&mut self, clicks: ClickSender) {
        self.log.lock().clicks = Some(clicks);
    }

    fn add_marker(&mut self, at: Coordinate, options: MarkerOptions) -> MarkerId {
        assert!(options.rise_on_hover);
        self.next += 1;
        let id = MarkerId(self.next);
        self.log.lock().markers.insert(id, (at, String::new()));
        id
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.log.lock().markers.remove(&marker);
    }

    fn bind_popup(&mut self, marker: MarkerId, content: &str) {
        if let Some(entry) = self.log.lock().markers.get_mut(&marker) {
            entry.1 = content.to_string();
        }
    }

    fn open_popup(&mut self, _marker: MarkerId) {}

    fn set_popup_content(&mut self, marker: MarkerId, content: &str) {
        self.bind_popup(marker, content);
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.log.lock().views.push((center, zoom));
    }

    fn invalidate_size(&mut self) {
        self.log.lock().invalidated += 1;
    }

    fn settled(&self) -> BoxFuture<'static, ()> {
        match self.settle.clone() {
            Some(notify) => Box::pin(async move { notify.notified().await }),
            None => Box::pin(futures::future::ready(())),
        }
    }
}

pub struct FakeMapFactory {
    pub log: Arc<Mutex<MapLog>>,
    pub settle: Option<Arc<Notify>>,
    /// Number of `create` calls that fail before one succeeds.
    pub failures: Mutex<usize>,
}

impl FakeMapFactory {
    pub fn new(log: Arc<Mutex<MapLog>>) -> Self {
        Self {
            log,
            settle: None,
            failures: Mutex::new(0),
        }
    }
}

impl MapWidgetFactory for FakeMapFactory {
    fn create(&self, options: &MapOptions) -> anyhow::Result<Box<dyn MapWidget>> {
        {
            let mut failures = self.failures.lock();
            if *failures > 0 {
                *failures -= 1;
                anyhow::bail!("map container missing");
            }
        }
        let mut log = self.log.lock();
        log.created += 1;
        log.views.push((options.center, options.zoom));
        Ok(Box::new(FakeWidget {
            log: self.log.clone(),
            settle: self.settle.clone(),
            next: 0,
        }))
    }
}

/// A session wired to fakes, plus handles to inspect and script them.
pub struct Harness {
    pub session: Arc<Session>,
    pub clicks: Option<weathermap_core::ClickReceiver>,
    pub weather: Arc<ScriptedWeather>,
    pub geocoder: Arc<ScriptedGeocoder>,
    pub display: Arc<RecordingDisplay>,
    pub surface: Arc<RecordingSurface>,
    pub map: Arc<Mutex<MapLog>>,
}

pub struct HarnessBuilder {
    policy: RacePolicy,
    settle: Option<Arc<Notify>>,
    map_failures: usize,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            policy: RacePolicy::LastResolvedWins,
            settle: None,
            map_failures: 0,
        }
    }
}

impl HarnessBuilder {
    pub fn policy(mut self, policy: RacePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn settle_on(mut self, notify: Arc<Notify>) -> Self {
        self.settle = Some(notify);
        self
    }

    /// Make the first `times` map creations fail.
    pub fn failing_map(mut self, times: usize) -> Self {
        self.map_failures = times;
        self
    }

    pub fn build(self) -> Harness {
        let weather = Arc::new(ScriptedWeather::default());
        let geocoder = Arc::new(ScriptedGeocoder::default());
        let display = Arc::new(RecordingDisplay::default());
        let surface = Arc::new(RecordingSurface::default());
        let map = Arc::new(Mutex::new(MapLog::default()));

        let (session, clicks) = Session::new(SessionDeps {
            map_factory: Box::new(FakeMapFactory {
                log: map.clone(),
                settle: self.settle,
                failures: Mutex::new(self.map_failures),
            }),
            weather: weather.clone(),
            geocoder: geocoder.clone(),
            surface: surface.clone(),
            display: display.clone(),
            clock: Arc::new(FixedClock(9)),
            policy: self.policy,
        });

        Harness {
            session: Arc::new(session),
            clicks: Some(clicks),
            weather,
            geocoder,
            display,
            surface,
            map,
        }
    }
}

pub fn harness() -> Harness {
    HarnessBuilder::default().build()
}
