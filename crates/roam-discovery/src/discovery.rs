//! Discovery view-model: the state behind the map and landmark list.
//!
//! One [`DiscoveryState`] behind a mutex, mutated by explicit operations and
//! by completed lookups. Every change is announced on a broadcast channel as a
//! [`DiscoveryEvent`]; readers pull the data itself with
//! [`DiscoveryModel::snapshot`] or [`DiscoveryModel::displayed`].
//!
//! Search text and viewport changes go through 500 ms debouncers. Weather
//! lookups are spawned and never awaited by the caller; whichever response
//! arrives last is the one kept.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use roam_core::DiscoveryConfig;
use roam_landmarks::{Catalogue, Landmark};
use roam_weather::{Coordinate, Location, Weather, WeatherLookup};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::debounce::Debouncer;
use crate::error_mapping::IntoAppError;
use crate::slot::Fetched;
use crate::viewport::{Span, Viewport};

const EVENT_CAPACITY: usize = 64;

/// Construction-time settings for [`DiscoveryModel`].
#[derive(Debug, Clone, Copy)]
pub struct DiscoverySettings {
    pub debounce: Duration,
    /// Map center when no device position is known
    pub fallback: Coordinate,
    pub initial_span: Span,
}

impl DiscoverySettings {
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        let initial_span =
            Span::new(config.span_latitude, config.span_longitude).unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid map span {}x{}, using default",
                    config.span_latitude,
                    config.span_longitude
                );
                Span::default()
            });

        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            fallback: Coordinate::new(config.fallback_latitude, config.fallback_longitude),
            initial_span,
        }
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryEvent {
    /// The displayed landmark list changed
    FilteredChanged,
    ViewportChanged(Viewport),
    WeatherChanged,
}

#[derive(Debug, Clone)]
struct DiscoveryState {
    search_text: String,
    applied_search_text: String,
    /// Catalogue subsequence matching `applied_search_text`
    text_filtered: Vec<Landmark>,
    category: Option<String>,
    viewport: Viewport,
    position: Option<Location>,
    weather: Fetched<Weather>,
}

/// Point-in-time copy of the view-model state.
#[derive(Debug, Clone)]
pub struct DiscoverySnapshot {
    /// Text as typed, possibly not yet applied
    pub search_text: String,
    /// Text the displayed list reflects
    pub applied_search_text: String,
    pub category: Option<String>,
    pub displayed: Vec<Landmark>,
    pub viewport: Viewport,
    pub position: Option<Location>,
    pub weather: Fetched<Weather>,
}

/// Landmarks whose name contains `text` (case-insensitive), in catalogue order.
pub fn filter_by_text(landmarks: &[Landmark], text: &str) -> Vec<Landmark> {
    landmarks
        .iter()
        .filter(|l| l.name_contains(text))
        .cloned()
        .collect()
}

/// Landmarks with exactly `category`; everything when `None`.
pub fn filter_by_category(landmarks: &[Landmark], category: Option<&str>) -> Vec<Landmark> {
    match category {
        Some(category) => landmarks
            .iter()
            .filter(|l| l.category == category)
            .cloned()
            .collect(),
        None => landmarks.to_vec(),
    }
}

struct Shared {
    catalogue: Catalogue,
    weather: Arc<dyn WeatherLookup>,
    settings: DiscoverySettings,
    state: Mutex<DiscoveryState>,
    events: broadcast::Sender<DiscoveryEvent>,
}

impl Shared {
    fn emit(&self, event: DiscoveryEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn apply_search(&self, text: String) {
        let filtered = filter_by_text(self.catalogue.as_slice(), &text);
        {
            let mut state = self.state.lock();
            tracing::debug!("Search {:?} matched {} landmarks", text, filtered.len());
            state.text_filtered = filtered;
            state.applied_search_text = text;
        }
        self.emit(DiscoveryEvent::FilteredChanged);
    }

    fn set_viewport(&self, viewport: Viewport) {
        self.state.lock().viewport = viewport;
        self.emit(DiscoveryEvent::ViewportChanged(viewport));
    }

    fn on_position_update(self: &Arc<Self>, position: Option<Location>) {
        let center = match &position {
            Some(loc) => loc.coordinate(),
            None => {
                tracing::debug!("No position, centering on fallback");
                self.settings.fallback
            }
        };

        let viewport = {
            let mut state = self.state.lock();
            state.position = position;
            state.viewport = state.viewport.recentered(center);
            state.viewport
        };
        self.emit(DiscoveryEvent::ViewportChanged(viewport));
        self.spawn_weather_refresh(center);
    }

    fn spawn_weather_refresh(self: &Arc<Self>, center: Coordinate) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            shared.fetch_weather(center).await;
        });
    }

    async fn fetch_weather(&self, center: Coordinate) {
        let result = self.weather.current(center).await;
        {
            let mut state = self.state.lock();
            match result {
                Ok(weather) => {
                    tracing::info!(
                        "Weather updated: {:.1}°C {}",
                        weather.temperature,
                        weather.condition
                    );
                    state.weather.succeed(weather);
                }
                Err(e) => {
                    let err = e.into_app_error();
                    tracing::warn!("Weather refresh failed: {}", err);
                    state.weather.fail(err.user_message());
                }
            }
        }
        self.emit(DiscoveryEvent::WeatherChanged);
    }
}

pub struct DiscoveryModel {
    shared: Arc<Shared>,
    search: Debouncer<String>,
    /// Fires a weather refresh at whatever the center is when the window closes
    viewport_changes: Debouncer<()>,
}

impl DiscoveryModel {
    /// Must be called inside a tokio runtime.
    pub fn new(
        catalogue: Catalogue,
        weather: Arc<dyn WeatherLookup>,
        settings: DiscoverySettings,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = DiscoveryState {
            search_text: String::new(),
            applied_search_text: String::new(),
            text_filtered: catalogue.as_slice().to_vec(),
            category: None,
            viewport: Viewport::new(settings.fallback, settings.initial_span),
            position: None,
            weather: Fetched::Empty,
        };

        let shared = Arc::new(Shared {
            catalogue,
            weather,
            settings,
            state: Mutex::new(state),
            events,
        });

        let search = {
            let shared = Arc::clone(&shared);
            Debouncer::new(settings.debounce, move |text: String| {
                shared.apply_search(text)
            })
        };

        let viewport_changes = {
            let shared = Arc::clone(&shared);
            Debouncer::new(settings.debounce, move |()| {
                let center = shared.state.lock().viewport.center;
                shared.spawn_weather_refresh(center)
            })
        };

        Self {
            shared,
            search,
            viewport_changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DiscoveryEvent> {
        self.shared.events.subscribe()
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.shared.catalogue
    }

    /// Store the raw text now; the list follows after the quiet window.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.shared.state.lock().search_text = text.clone();
        self.search.push(text);
    }

    /// Restrict the text-filtered list to one category, or clear with `None`.
    pub fn set_category_filter(&self, category: Option<String>) {
        self.shared.state.lock().category = category;
        self.shared.emit(DiscoveryEvent::FilteredChanged);
    }

    /// The list currently shown: text filter, then category filter.
    pub fn displayed(&self) -> Vec<Landmark> {
        let state = self.shared.state.lock();
        filter_by_category(&state.text_filtered, state.category.as_deref())
    }

    /// Sorted distinct categories of the whole catalogue.
    pub fn categories(&self) -> Vec<String> {
        self.shared.catalogue.categories()
    }

    /// Recenter on `position`, or on the fallback coordinate when `None`,
    /// and refresh the weather.
    pub fn on_position_update(&self, position: Option<Location>) {
        self.shared.on_position_update(position);
    }

    /// Record a viewport change (pan, zoom, recenter). Weather follows after
    /// the quiet window.
    pub fn on_viewport_change(&self, viewport: Viewport) {
        self.shared.set_viewport(viewport);
        self.viewport_changes.push(());
    }

    /// Center the map on a landmark, keeping the current span.
    pub fn focus_landmark(&self, landmark: &Landmark) {
        let viewport = self.viewport().recentered(landmark.coordinate());
        self.on_viewport_change(viewport);
    }

    /// Fire-and-forget weather lookup at the current viewport center.
    pub fn refresh_weather(&self) {
        let center = self.viewport().center;
        self.shared.spawn_weather_refresh(center);
    }

    /// Weather lookup at the current viewport center, awaiting the result.
    pub async fn refresh_weather_now(&self) -> Fetched<Weather> {
        let center = self.viewport().center;
        self.shared.fetch_weather(center).await;
        self.weather()
    }

    /// Forward every emission of a location source to
    /// [`on_position_update`](Self::on_position_update), starting with its
    /// current value.
    pub fn bind_location(&self, mut rx: watch::Receiver<Option<Location>>) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let initial = rx.borrow_and_update().clone();
            shared.on_position_update(initial);

            while rx.changed().await.is_ok() {
                let position = rx.borrow_and_update().clone();
                shared.on_position_update(position);
            }
            tracing::debug!("Location source closed");
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.shared.state.lock().viewport
    }

    pub fn position(&self) -> Option<Location> {
        self.shared.state.lock().position.clone()
    }

    pub fn weather(&self) -> Fetched<Weather> {
        self.shared.state.lock().weather.clone()
    }

    pub fn snapshot(&self) -> DiscoverySnapshot {
        let state = self.shared.state.lock();
        DiscoverySnapshot {
            search_text: state.search_text.clone(),
            applied_search_text: state.applied_search_text.clone(),
            category: state.category.clone(),
            displayed: filter_by_category(&state.text_filtered, state.category.as_deref()),
            viewport: state.viewport,
            position: state.position.clone(),
            weather: state.weather.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use roam_weather::WeatherError;
    use std::collections::VecDeque;

    const WINDOW: Duration = Duration::from_millis(500);

    fn catalogue() -> Catalogue {
        Catalogue::from_json(
            r#"[
                {"id":1,"name":"Golden Gate","description":"","latitude":37.82,"longitude":-122.48,"image":"gg","category":"bridge"},
                {"id":2,"name":"Pier 39","description":"","latitude":37.81,"longitude":-122.41,"image":"p39","category":"pier"},
                {"id":3,"name":"Bay Bridge","description":"","latitude":37.79,"longitude":-122.37,"image":"bb","category":"bridge"},
                {"id":4,"name":"Gateway Pier","description":"","latitude":37.80,"longitude":-122.39,"image":"gp","category":"pier"}
            ]"#,
        )
        .unwrap()
    }

    fn weather(temperature: f64, condition: &str) -> Weather {
        Weather {
            temperature,
            condition: condition.to_string(),
            fetched_at: chrono::Utc::now(),
        }
    }

    /// Returns queued responses in order; errors once the queue is empty.
    #[derive(Default)]
    struct ScriptedWeather {
        responses: Mutex<VecDeque<Result<Weather, WeatherError>>>,
        calls: Mutex<Vec<Coordinate>>,
    }

    impl ScriptedWeather {
        fn with(responses: Vec<Result<Weather, WeatherError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Coordinate> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl WeatherLookup for ScriptedWeather {
        async fn current(&self, at: Coordinate) -> Result<Weather, WeatherError> {
            self.calls.lock().push(at);
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(WeatherError::Parse("no scripted response".into())))
        }
    }

    fn model(weather: Arc<ScriptedWeather>) -> DiscoveryModel {
        DiscoveryModel::new(catalogue(), weather, DiscoverySettings::default())
    }

    fn ids(landmarks: &[Landmark]) -> Vec<i64> {
        landmarks.iter().map(|l| l.id).collect()
    }

    async fn settle() {
        tokio::time::sleep(WINDOW + Duration::from_millis(100)).await;
    }

    #[test]
    fn test_filter_by_text_is_case_insensitive_subsequence() {
        let catalogue = catalogue();
        let landmarks = catalogue.as_slice();
        assert_eq!(ids(&filter_by_text(landmarks, "GATE")), vec![1, 4]);
        assert_eq!(ids(&filter_by_text(landmarks, "pier")), vec![2, 4]);
        assert!(filter_by_text(landmarks, "louvre").is_empty());
    }

    #[test]
    fn test_filter_empty_text_is_whole_catalogue() {
        let catalogue = catalogue();
        assert_eq!(filter_by_text(catalogue.as_slice(), ""), catalogue.as_slice());
    }

    #[test]
    fn test_category_after_text_only_keeps_category() {
        let catalogue = catalogue();
        for text in ["", "g", "gate", "bridge", "zzz"] {
            let text_filtered = filter_by_text(catalogue.as_slice(), text);
            for category in catalogue.categories() {
                let shown = filter_by_category(&text_filtered, Some(&category));
                assert!(shown.iter().all(|l| l.category == category));
                assert!(shown.iter().all(|l| text_filtered.contains(l)));
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_scenario_golden_gate() {
        let catalogue = Catalogue::from_json(
            r#"[
                {"id":1,"name":"Golden Gate","description":"","latitude":37.82,"longitude":-122.48,"image":"","category":"bridge"},
                {"id":2,"name":"Pier 39","description":"","latitude":37.81,"longitude":-122.41,"image":"","category":"pier"}
            ]"#,
        )
        .unwrap();
        let model = DiscoveryModel::new(
            catalogue,
            ScriptedWeather::with(vec![]),
            DiscoverySettings::default(),
        );

        model.set_search_text("gate");
        settle().await;

        assert_eq!(ids(&model.displayed()), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_is_debounced_latest_wins() {
        let model = model(ScriptedWeather::with(vec![]));
        let mut events = model.subscribe();

        model.set_search_text("p");
        model.set_search_text("pi");
        model.set_search_text("gate");

        // Raw text is stored immediately, the list is not
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(model.snapshot().search_text, "gate");
        assert_eq!(ids(&model.displayed()), vec![1, 2, 3, 4]);

        settle().await;
        assert_eq!(ids(&model.displayed()), vec![1, 4]);
        assert_eq!(model.snapshot().applied_search_text, "gate");

        assert_eq!(events.try_recv().unwrap(), DiscoveryEvent::FilteredChanged);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_search_restores_catalogue_order() {
        let model = model(ScriptedWeather::with(vec![]));

        model.set_search_text("bridge");
        settle().await;
        assert_eq!(ids(&model.displayed()), vec![3]);

        model.set_search_text("");
        settle().await;
        assert_eq!(model.displayed(), model.catalogue().as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn test_category_filter_applies_immediately() {
        let model = model(ScriptedWeather::with(vec![]));

        model.set_category_filter(Some("pier".to_string()));
        assert_eq!(ids(&model.displayed()), vec![2, 4]);

        model.set_search_text("gate");
        settle().await;
        assert_eq!(ids(&model.displayed()), vec![4]);

        model.set_category_filter(None);
        assert_eq!(ids(&model.displayed()), vec![1, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_categories_sorted() {
        let model = model(ScriptedWeather::with(vec![]));
        assert_eq!(model.categories(), vec!["bridge", "pier"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_position_centers_on_fallback() {
        let weather = ScriptedWeather::with(vec![Ok(weather(18.0, "Clear"))]);
        let model = model(weather.clone());
        let fallback = DiscoverySettings::default().fallback;

        // Move away first so a stale center would be visible
        let elsewhere = model.viewport().recentered(Coordinate::new(48.85, 2.35));
        model.on_viewport_change(elsewhere);

        model.on_position_update(None);
        assert_eq!(model.viewport().center, fallback);
        assert_eq!(model.viewport().span, elsewhere.span);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(weather.calls().first(), Some(&fallback));
        assert_eq!(model.weather().value().map(|w| w.temperature), Some(18.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_position_update_recenters_and_refreshes() {
        let weather = ScriptedWeather::with(vec![Ok(weather(11.0, "Fog"))]);
        let model = model(weather.clone());

        model.on_position_update(Some(Location::new(40.0, -74.0)));
        assert_eq!(model.viewport().center, Coordinate::new(40.0, -74.0));
        assert_eq!(model.position().map(|p| p.latitude), Some(40.0));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(weather.calls(), vec![Coordinate::new(40.0, -74.0)]);
        assert_eq!(
            model.weather().value().map(|w| w.condition.clone()),
            Some("Fog".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_viewport_changes_are_debounced() {
        let weather = ScriptedWeather::with(vec![Ok(weather(9.0, "Rain"))]);
        let model = model(weather.clone());
        let base = model.viewport();

        let centers: Vec<Coordinate> = (1..=5)
            .map(|i| Coordinate::new(37.0 + i as f64 * 0.01, -122.0))
            .collect();
        for center in &centers {
            model.on_viewport_change(base.recentered(*center));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(weather.calls().is_empty());

        settle().await;
        assert_eq!(weather.calls(), vec![centers[4]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_position_update_during_pending_pan_wins() {
        let weather = ScriptedWeather::with(vec![
            Ok(weather(25.0, "Clear")),
            Ok(weather(26.0, "Clear")),
        ]);
        let model = model(weather.clone());
        let fix = Coordinate::new(40.0, -74.0);

        model.on_viewport_change(model.viewport().recentered(Coordinate::new(10.0, 10.0)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        model.on_position_update(Some(Location::new(40.0, -74.0)));

        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(model.viewport().center, fix);
        let calls = weather.calls();
        assert!(!calls.is_empty());
        assert!(calls.iter().all(|c| *c == fix));
        assert_eq!(calls.last(), Some(&fix));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_previous_weather() {
        let weather = ScriptedWeather::with(vec![
            Ok(weather(20.0, "Clear")),
            Err(WeatherError::Api {
                status: 500,
                message: "boom".into(),
            }),
        ]);
        let model = model(weather);

        let first = model.refresh_weather_now().await;
        assert!(matches!(first, Fetched::Fresh(_)));

        let second = model.refresh_weather_now().await;
        assert!(second.is_stale());
        assert_eq!(second.value().map(|w| w.temperature), Some(20.0));
        assert!(second.error().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_without_value_is_failed() {
        let model = model(ScriptedWeather::with(vec![]));
        let result = model.refresh_weather_now().await;
        assert!(matches!(result, Fetched::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_landmark_recenters() {
        let weather = ScriptedWeather::with(vec![Ok(weather(15.0, "Clouds"))]);
        let model = model(weather.clone());
        let pier = model.catalogue().get(2).cloned().unwrap();

        model.focus_landmark(&pier);
        assert_eq!(model.viewport().center, pier.coordinate());

        settle().await;
        assert_eq!(weather.calls(), vec![pier.coordinate()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bind_location_follows_source() {
        let weather =
            ScriptedWeather::with(vec![Ok(weather(1.0, "Snow")), Ok(weather(2.0, "Snow"))]);
        let model = model(weather.clone());
        let provider = roam_weather::LocationProvider::new();

        let task = model.bind_location(provider.subscribe());
        tokio::time::sleep(Duration::from_millis(10)).await;
        // Nothing published yet: fallback
        assert_eq!(model.viewport().center, DiscoverySettings::default().fallback);

        provider.publish(Some(Location::new(51.5, -0.12)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(model.viewport().center, Coordinate::new(51.5, -0.12));
        assert_eq!(weather.calls().len(), 2);

        task.abort();
    }
}
