use reqwest::StatusCode;

/// Everything that can end a search early.
///
/// The `Display` text is what the user sees in the output area, so it is
/// written in the display locale.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Gat ekki fundið staðsetningu")]
    NotFound,

    #[error("Staðsetningarþjónusta er ekki studd")]
    Unsupported,

    #[error("Gat ekki sótt staðsetningu")]
    Position,

    #[error("Villa við að sækja staðsetningu")]
    GeocodeFailed { status: StatusCode },

    #[error("Villa við að sækja veðurspá{}", reason_suffix(.reason))]
    ForecastFailed {
        status: StatusCode,
        reason: Option<String>,
    },

    #[error("Villa í samskiptum við þjónustu: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Ógilt svar frá þjónustu: {0}")]
    Malformed(String),

    #[error("Ógild hnit ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) if !r.trim().is_empty() => format!(": {}", r.trim()),
        _ => String::new(),
    }
}

/// Reasons a geolocation capability can fail to produce a position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    Unavailable,
    #[error("{0}")]
    Other(String),
}
