//! Landmark detail: distance, nearby dining and lodging, similar landmarks.
//!
//! Both nearby lookups run concurrently and fail independently. Selecting a
//! new landmark does not cancel lookups already in flight; their results are
//! dropped on arrival because they carry an older generation.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;
use roam_core::Config;
use roam_landmarks::Landmark;
use roam_places::{Place, PlaceCategory, PlaceLookup};
use roam_weather::Coordinate;
use tokio::sync::broadcast;

use crate::error_mapping::IntoAppError;
use crate::slot::LookupState;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct DetailSettings {
    pub radius_meters: f64,
    /// Distance origin when no device position is known
    pub fallback: Coordinate,
    pub similar_limit: usize,
}

impl DetailSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            radius_meters: config.places.radius_meters,
            fallback: Coordinate::new(
                config.discovery.fallback_latitude,
                config.discovery.fallback_longitude,
            ),
            similar_limit: config.discovery.similar_limit,
        }
    }
}

impl Default for DetailSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkDetail {
    pub landmark: Landmark,
    /// Great-circle meters from the device (or fallback) to the landmark
    pub distance_meters: f64,
    pub dining: LookupState<Place>,
    pub lodging: LookupState<Place>,
}

impl LandmarkDetail {
    fn loading(landmark: Landmark, distance_meters: f64) -> Self {
        Self {
            landmark,
            distance_meters,
            dining: LookupState::Loading,
            lodging: LookupState::Loading,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.dining.is_loading() && !self.lodging.is_loading()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailEvent {
    Selected(i64),
    DiningChanged,
    LodgingChanged,
}

fn distance_from(landmark: &Landmark, position: Option<Coordinate>, fallback: Coordinate) -> f64 {
    position
        .unwrap_or(fallback)
        .distance_to(&landmark.coordinate())
}

async fn lookup(
    places: &dyn PlaceLookup,
    center: Coordinate,
    radius_meters: f64,
    category: &PlaceCategory,
) -> LookupState<Place> {
    match places.nearby(center, radius_meters, category).await {
        Ok(items) => {
            tracing::debug!("{} lookup returned {} places", category.label(), items.len());
            LookupState::from_items(items)
        }
        Err(e) => {
            let err = e.into_app_error();
            tracing::warn!("{} lookup failed: {}", category.label(), err);
            LookupState::Failed(err.user_message().to_string())
        }
    }
}

/// Run both lookups for `landmark` and wait for them.
pub async fn enrich(
    places: &dyn PlaceLookup,
    landmark: &Landmark,
    position: Option<Coordinate>,
    settings: &DetailSettings,
) -> LandmarkDetail {
    let center = landmark.coordinate();
    let (dining, lodging) = tokio::join!(
        lookup(places, center, settings.radius_meters, &PlaceCategory::Dining),
        lookup(places, center, settings.radius_meters, &PlaceCategory::Lodging),
    );

    LandmarkDetail {
        landmark: landmark.clone(),
        distance_meters: distance_from(landmark, position, settings.fallback),
        dining,
        lodging,
    }
}

/// Other landmarks sharing `landmark`'s category, in catalogue order.
///
/// When more than `limit` qualify, a uniform sample of exactly `limit` is
/// drawn from `rng`. Uncategorized landmarks are similar to each other.
pub fn similar_landmarks<R: Rng + ?Sized>(
    landmarks: &[Landmark],
    landmark: &Landmark,
    limit: usize,
    rng: &mut R,
) -> Vec<Landmark> {
    let candidates: Vec<&Landmark> = landmarks
        .iter()
        .filter(|l| l.category == landmark.category && l.id != landmark.id)
        .collect();

    if candidates.len() <= limit {
        return candidates.into_iter().cloned().collect();
    }

    let mut picked = rand::seq::index::sample(rng, candidates.len(), limit).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| candidates[i].clone()).collect()
}

/// "1.23 km"
pub fn format_distance(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.0)
}

#[derive(Default)]
struct DetailState {
    generation: u64,
    detail: Option<LandmarkDetail>,
}

pub struct DetailModel {
    places: Arc<dyn PlaceLookup>,
    settings: DetailSettings,
    state: Arc<Mutex<DetailState>>,
    events: broadcast::Sender<DetailEvent>,
}

impl DetailModel {
    pub fn new(places: Arc<dyn PlaceLookup>, settings: DetailSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            places,
            settings,
            state: Arc::new(Mutex::new(DetailState::default())),
            events,
        }
    }

    pub fn settings(&self) -> &DetailSettings {
        &self.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DetailEvent> {
        self.events.subscribe()
    }

    /// Current detail, if a landmark has been selected.
    pub fn detail(&self) -> Option<LandmarkDetail> {
        self.state.lock().detail.clone()
    }

    /// Show `landmark` and dispatch its nearby lookups. Must be called inside
    /// a tokio runtime.
    pub fn select_landmark(&self, landmark: Landmark, position: Option<Coordinate>) {
        let distance = distance_from(&landmark, position, self.settings.fallback);
        let center = landmark.coordinate();
        let id = landmark.id;

        let generation = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.detail = Some(LandmarkDetail::loading(landmark, distance));
            state.generation
        };
        tracing::debug!("Selected landmark {} (generation {})", id, generation);
        let _ = self.events.send(DetailEvent::Selected(id));

        for category in [PlaceCategory::Dining, PlaceCategory::Lodging] {
            let places = Arc::clone(&self.places);
            let state = Arc::clone(&self.state);
            let events = self.events.clone();
            let radius = self.settings.radius_meters;

            tokio::spawn(async move {
                let result = lookup(places.as_ref(), center, radius, &category).await;

                let mut state = state.lock();
                if state.generation != generation {
                    tracing::debug!("Dropping {} result for stale selection", category.label());
                    return;
                }
                let Some(detail) = state.detail.as_mut() else {
                    return;
                };
                let event = match category {
                    PlaceCategory::Lodging => {
                        detail.lodging = result;
                        DetailEvent::LodgingChanged
                    }
                    PlaceCategory::Dining => {
                        detail.dining = result;
                        DetailEvent::DiningChanged
                    }
                };
                drop(state);
                let _ = events.send(event);
            });
        }
    }

    /// Awaitable enrichment that does not touch the selected detail.
    pub async fn enrich(&self, landmark: &Landmark, position: Option<Coordinate>) -> LandmarkDetail {
        enrich(self.places.as_ref(), landmark, position, &self.settings).await
    }
}
