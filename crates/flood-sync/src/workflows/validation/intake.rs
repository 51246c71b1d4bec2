use chrono::{DateTime, Utc};
use rand::Rng;

use super::domain::{NewReport, ReportSubmission, MAP_CENTER, PLACEHOLDER_IMAGE_URL};

/// Width in degrees of the box used for simulated field coordinates.
const COORDINATE_SPREAD: f64 = 0.1;

/// Reasons a submission is refused before it reaches the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionError {
    #[error("location must not be blank")]
    BlankLocation,
    #[error("description must not be blank")]
    BlankDescription,
    #[error("water level must be a non-negative number of meters, got {0}")]
    InvalidWaterLevel(f64),
    #[error("coordinates ({latitude}, {longitude}) are out of range")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

/// Check a submission and turn it into a pending report ready for the store.
///
/// Missing coordinates are simulated around the map centre, a missing image
/// falls back to the placeholder.
pub fn prepare_report<G: Rng + ?Sized>(
    submission: ReportSubmission,
    timestamp: DateTime<Utc>,
    rng: &mut G,
) -> Result<NewReport, SubmissionError> {
    let location = submission.location.trim().to_string();
    if location.is_empty() {
        return Err(SubmissionError::BlankLocation);
    }

    let description = submission.description.trim().to_string();
    if description.is_empty() {
        return Err(SubmissionError::BlankDescription);
    }

    let water_level = submission.water_level;
    if !water_level.is_finite() || water_level < 0.0 {
        return Err(SubmissionError::InvalidWaterLevel(water_level));
    }

    let latitude = submission
        .latitude
        .unwrap_or_else(|| jitter(MAP_CENTER.0, rng));
    let longitude = submission
        .longitude
        .unwrap_or_else(|| jitter(MAP_CENTER.1, rng));
    if !valid_coordinates(latitude, longitude) {
        return Err(SubmissionError::InvalidCoordinates {
            latitude,
            longitude,
        });
    }

    let image_url = submission
        .image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());

    Ok(NewReport {
        location,
        latitude,
        longitude,
        water_level,
        description,
        image_url,
        timestamp,
    })
}

fn jitter<G: Rng + ?Sized>(center: f64, rng: &mut G) -> f64 {
    center + (rng.gen::<f64>() - 0.5) * COORDINATE_SPREAD
}

fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}
