//! Landmark catalogue loading.
//!
//! The catalogue is a JSON array of landmark records, parsed once at startup.
//! Load failures never stop the app: they are logged and leave the catalogue
//! empty.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::landmark::Landmark;

const BUNDLED_CATALOGUE: &str = include_str!("../data/landmarks.json");

#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("Failed to read catalogue {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed catalogue: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where to load landmarks from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueSource {
    /// The document compiled into the binary
    Bundled,
    File(PathBuf),
}

impl From<Option<PathBuf>> for CatalogueSource {
    fn from(path: Option<PathBuf>) -> Self {
        path.map(Self::File).unwrap_or(Self::Bundled)
    }
}

/// Immutable, ordered landmark list. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    landmarks: Arc<Vec<Landmark>>,
}

impl Catalogue {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks: Arc::new(landmarks),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogueError> {
        let landmarks: Vec<Landmark> = serde_json::from_str(json)?;
        Ok(Self::new(landmarks))
    }

    /// Strict load: surfaces read and parse errors.
    pub fn try_load(source: &CatalogueSource) -> Result<Self, CatalogueError> {
        match source {
            CatalogueSource::Bundled => Self::from_json(BUNDLED_CATALOGUE),
            CatalogueSource::File(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| CatalogueError::Read {
                    path: path.clone(),
                    source,
                })?;
                Self::from_json(&json)
            }
        }
    }

    /// Load the catalogue, degrading to an empty one on any failure.
    pub fn load(source: &CatalogueSource) -> Self {
        match Self::try_load(source) {
            Ok(catalogue) => {
                tracing::info!("Loaded {} landmarks from {:?}", catalogue.len(), source);
                catalogue
            }
            Err(e) => {
                tracing::error!("Error loading landmarks: {}", e);
                Self::default()
            }
        }
    }

    pub fn bundled() -> Self {
        Self::load(&CatalogueSource::Bundled)
    }

    pub fn get(&self, id: i64) -> Option<&Landmark> {
        self.landmarks.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Landmark> {
        self.landmarks.iter()
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Sorted distinct category labels. Computed on every call.
    pub fn categories(&self) -> Vec<String> {
        self.landmarks
            .iter()
            .filter(|l| !l.category.is_empty())
            .map(|l| l.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl<'a> IntoIterator for &'a Catalogue {
    type Item = &'a Landmark;
    type IntoIter = std::slice::Iter<'a, Landmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
