use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use roam_core::{ColorScheme, Config};
use roam_discovery::{
    format_distance, similar_landmarks, DetailModel, DetailSettings, DiscoveryEvent,
    DiscoveryModel, DiscoverySettings, Fetched, IntoAppError, LookupState,
};
use roam_landmarks::{Catalogue, CatalogueSource, FavoritesStore, Landmark, SqliteStore};
use roam_places::{Place, PlacesClient};
use roam_weather::{Location, LocationProvider, WeatherProvider};
use tokio::sync::broadcast;

const USAGE: &str = "\
Usage: roam <command>

Commands:
  categories                 List landmark categories
  search <text> [category]   Find landmarks by name
  detail <id>                Show a landmark with nearby dining and lodging
  favorite <id>              Toggle a landmark as favorite
  favorites                  List favorite landmarks
  weather                    Current weather at your position";

/// How long the CLI waits for a model update before giving up.
const EVENT_TIMEOUT: Duration = Duration::from_secs(15);

struct Services {
    config: Config,
    catalogue: Catalogue,
    favorites: FavoritesStore,
    location: LocationProvider,
}

impl Services {
    fn new(config: Config) -> Result<Self> {
        let catalogue = Catalogue::load(&CatalogueSource::from(config.catalogue.path.clone()));

        let store = SqliteStore::open(config.database_path())
            .context("Failed to open favorites database")?;
        let favorites = FavoritesStore::new(Arc::new(store));

        let location = match config.location.fixed_position() {
            Some((latitude, longitude)) => {
                LocationProvider::with_fixed(Location::new(latitude, longitude))
            }
            None => LocationProvider::new(),
        };

        Ok(Self {
            config,
            catalogue,
            favorites,
            location,
        })
    }

    fn discovery(&self) -> Result<DiscoveryModel> {
        let weather = WeatherProvider::new(
            self.config.weather.api_key.clone(),
            &self.config.weather.base_url,
            Duration::from_secs(self.config.weather.timeout_secs),
        )?;

        Ok(DiscoveryModel::new(
            self.catalogue.clone(),
            Arc::new(weather),
            DiscoverySettings::from_config(&self.config.discovery),
        ))
    }

    fn detail(&self) -> Result<DetailModel> {
        let places = PlacesClient::with_base_url(
            &self.config.places.api_key,
            &self.config.places.base_url,
            Duration::from_secs(self.config.places.timeout_secs),
        )?
        .limit(self.config.places.limit);

        Ok(DetailModel::new(
            Arc::new(places),
            DetailSettings::from_config(&self.config),
        ))
    }

    fn landmark(&self, arg: Option<&String>) -> Result<&Landmark> {
        let id: i64 = arg
            .context("Missing landmark id")?
            .parse()
            .context("Landmark id must be a number")?;
        self.catalogue
            .get(id)
            .with_context(|| format!("No landmark with id {}", id))
    }
}

async fn wait_for(
    events: &mut broadcast::Receiver<DiscoveryEvent>,
    wanted: fn(&DiscoveryEvent) -> bool,
) -> Result<()> {
    tokio::time::timeout(EVENT_TIMEOUT, async {
        loop {
            match events.recv().await {
                Ok(event) if wanted(&event) => return Ok(()),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    anyhow::bail!("Discovery model shut down")
                }
            }
        }
    })
    .await
    .context("Timed out waiting for update")?
}

fn print_landmarks(landmarks: &[Landmark], favorites: &FavoritesStore) {
    if landmarks.is_empty() {
        println!("No landmarks found.");
        return;
    }
    for landmark in landmarks {
        let star = if favorites.is_favorite(landmark.id) { "*" } else { " " };
        println!(
            "{} {:>3}  {:<32} {}",
            star, landmark.id, landmark.name, landmark.category
        );
    }
}

/// Bold heading in a color readable on the configured background.
fn heading(scheme: ColorScheme, text: &str) -> String {
    let color = match scheme {
        ColorScheme::Light => "34",
        ColorScheme::Dark => "96",
    };
    format!("\x1b[1;{}m{}\x1b[0m", color, text)
}

fn print_places(scheme: ColorScheme, title: &str, state: &LookupState<Place>) {
    println!("\n{}", heading(scheme, &format!("{}:", title)));
    match state {
        LookupState::Loading => println!("  Loading..."),
        LookupState::Empty => println!("  Nothing nearby."),
        LookupState::Failed(message) => println!("  {}", message),
        LookupState::Loaded(places) => {
            for place in places {
                println!("  {:<32} {}", place.name, place.address);
            }
        }
    }
}

async fn run(services: &Services, args: &[String]) -> Result<()> {
    let command = args.first().map(String::as_str);

    match command {
        Some("categories") => {
            for category in services.catalogue.categories() {
                println!("{}", category);
            }
        }
        Some("search") => {
            let text = args.get(1).cloned().unwrap_or_default();
            let model = services.discovery()?;
            model.set_category_filter(args.get(2).cloned());

            let mut events = model.subscribe();
            model.set_search_text(text);
            wait_for(&mut events, |e| matches!(e, DiscoveryEvent::FilteredChanged)).await?;

            print_landmarks(&model.displayed(), &services.favorites);
        }
        Some("detail") => {
            let landmark = services.landmark(args.get(1))?;
            let detail_model = services.detail()?;
            let position = services.location.latest().map(|l| l.coordinate());
            let detail = detail_model.enrich(landmark, position).await;

            let scheme = services.config.ui.color_scheme;
            println!(
                "{}",
                heading(scheme, &format!("{} ({})", landmark.name, landmark.category))
            );
            println!("{}", landmark.description);
            println!("Distance: {}", format_distance(detail.distance_meters));
            if services.favorites.is_favorite(landmark.id) {
                println!("Favorite");
            }
            print_places(scheme, "Restaurants", &detail.dining);
            print_places(scheme, "Hotels", &detail.lodging);

            let similar = similar_landmarks(
                services.catalogue.as_slice(),
                landmark,
                detail_model.settings().similar_limit,
                &mut rand::thread_rng(),
            );
            if !similar.is_empty() {
                println!("\n{}", heading(scheme, "Similar landmarks:"));
                print_landmarks(&similar, &services.favorites);
            }
        }
        Some("favorite") => {
            let landmark = services.landmark(args.get(1))?;
            let now_favorite = services.favorites.toggle(landmark.id).map_err(|e| {
                let err = e.into_app_error();
                tracing::error!("Favorite toggle failed: {}", err);
                anyhow::anyhow!(err.user_message())
            })?;

            if now_favorite {
                println!("Added {} to favorites.", landmark.name);
            } else {
                println!("Removed {} from favorites.", landmark.name);
            }
        }
        Some("favorites") => {
            print_landmarks(
                &services.favorites.landmarks(&services.catalogue),
                &services.favorites,
            );
        }
        Some("weather") => {
            let model = services.discovery()?;
            let mut events = model.subscribe();
            model.on_position_update(services.location.latest());
            wait_for(&mut events, |e| matches!(e, DiscoveryEvent::WeatherChanged)).await?;

            let center = model.viewport().center;
            match model.weather() {
                Fetched::Fresh(weather) | Fetched::Stale { value: weather, .. } => println!(
                    "{:.1}°C, {} at {:.4}, {:.4}",
                    weather.temperature, weather.condition, center.latitude, center.longitude
                ),
                Fetched::Failed(message) => println!("{}", message),
                Fetched::Empty => println!("No weather available."),
            }
        }
        _ => {
            println!("{}", USAGE);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    roam_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    tracing::info!("Config directory: {}", config.config_dir.display());

    let services = Services::new(config)?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    run(&services, &args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_color_follows_scheme() {
        assert_eq!(heading(ColorScheme::Light, "Hotels:"), "\x1b[1;34mHotels:\x1b[0m");
        assert_eq!(heading(ColorScheme::Dark, "Hotels:"), "\x1b[1;96mHotels:\x1b[0m");
    }
}
