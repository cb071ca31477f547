use roam_weather::Coordinate;

/// Visible extent of the map in degrees. Both deltas are always positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    latitude_delta: f64,
    longitude_delta: f64,
}

impl Span {
    /// `None` unless both deltas are finite and strictly positive.
    pub fn new(latitude_delta: f64, longitude_delta: f64) -> Option<Self> {
        let valid = |d: f64| d.is_finite() && d > 0.0;
        if valid(latitude_delta) && valid(longitude_delta) {
            Some(Self {
                latitude_delta,
                longitude_delta,
            })
        } else {
            None
        }
    }

    pub fn latitude_delta(&self) -> f64 {
        self.latitude_delta
    }

    pub fn longitude_delta(&self) -> f64 {
        self.longitude_delta
    }
}

impl Default for Span {
    fn default() -> Self {
        Self {
            latitude_delta: 0.1,
            longitude_delta: 0.1,
        }
    }
}

/// Map region: center plus span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub span: Span,
}

impl Viewport {
    pub fn new(center: Coordinate, span: Span) -> Self {
        Self { center, span }
    }

    /// Same span around a new center.
    pub fn recentered(&self, center: Coordinate) -> Self {
        Self {
            center,
            span: self.span,
        }
    }
}
