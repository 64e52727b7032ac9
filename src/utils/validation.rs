use anyhow::{anyhow, Result};

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(anyhow!("Coordinates must be numbers"));
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(anyhow!("Latitude must be between -90 and 90"));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(anyhow!("Longitude must be between -180 and 180"));
    }

    Ok(())
}

/// Trims a free-text place name and checks it is worth sending to the
/// geocoder.
pub fn validate_place_name(name: &str) -> Result<&str> {
    let name = name.trim();

    if name.is_empty() {
        return Err(anyhow!("Place name cannot be empty"));
    }

    if name.chars().count() > 100 {
        return Err(anyhow!("Place name cannot be longer than 100 characters"));
    }

    if name.contains('\n') || name.contains('\r') {
        return Err(anyhow!("Place name cannot contain line breaks"));
    }

    Ok(name)
}
