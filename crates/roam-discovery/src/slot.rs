//! Result holders for remote lookups.
//!
//! Failures never clear data silently: a failed refresh keeps the last good
//! value and says so, and an empty answer is kept apart from a failed one.

/// Latest-wins value refreshed from a remote source.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    /// Nothing requested yet
    Empty,
    Fresh(T),
    /// Last refresh failed; `value` is from an earlier success
    Stale { value: T, error: String },
    /// Failed with nothing to fall back on
    Failed(String),
}

impl<T> Fetched<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Fresh(value) | Self::Stale { value, .. } => Some(value),
            Self::Empty | Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Stale { error, .. } | Self::Failed(error) => Some(error),
            Self::Empty | Self::Fresh(_) => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    pub fn succeed(&mut self, value: T) {
        *self = Self::Fresh(value);
    }

    /// Record a failure, keeping any previous value.
    pub fn fail(&mut self, error: impl Into<String>) {
        let error = error.into();
        *self = match std::mem::replace(self, Self::Empty) {
            Self::Fresh(value) | Self::Stale { value, .. } => Self::Stale { value, error },
            Self::Empty | Self::Failed(_) => Self::Failed(error),
        };
    }
}

impl<T> Default for Fetched<T> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Presentation state of a list lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupState<T> {
    Loading,
    Loaded(Vec<T>),
    /// Request succeeded with no results
    Empty,
    Failed(String),
}

impl<T> LookupState<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Loaded(items)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Self::Loaded(items) => items,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}
