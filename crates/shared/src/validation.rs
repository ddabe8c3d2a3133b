//! Coordinate validation utilities.

use validator::ValidationError;

/// Largest circle radius accepted for a place, in meters.
pub const MAX_RADIUS_METERS: f64 = 100_000.0;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that accuracy is finite and non-negative.
pub fn validate_accuracy(accuracy: f64) -> Result<(), ValidationError> {
    if accuracy.is_finite() && accuracy >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("accuracy_range");
        err.message = Some("Accuracy must be a finite non-negative number".into());
        Err(err)
    }
}

/// Validates a circle radius: positive and at most [`MAX_RADIUS_METERS`].
pub fn validate_radius(radius: f64) -> Result<(), ValidationError> {
    if radius > 0.0 && radius <= MAX_RADIUS_METERS {
        Ok(())
    } else {
        let mut err = ValidationError::new("radius_range");
        err.message = Some("Radius must be greater than 0 and at most 100000 meters".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.1).is_err());
        assert!(validate_latitude(-90.1).is_err());
    }

    #[test]
    fn test_validate_latitude_error_message() {
        let err = validate_latitude(100.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Latitude must be between -90 and 90"
        );
    }

    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(0.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.1).is_err());
        assert!(validate_longitude(-180.1).is_err());
    }

    #[test]
    fn test_validate_longitude_rejects_nan() {
        assert!(validate_longitude(f64::NAN).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_accuracy() {
        assert!(validate_accuracy(0.0).is_ok());
        assert!(validate_accuracy(100.0).is_ok());
        assert!(validate_accuracy(-1.0).is_err());
        assert!(validate_accuracy(f64::INFINITY).is_err());
        assert!(validate_accuracy(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_radius() {
        assert!(validate_radius(500.0).is_ok());
        assert!(validate_radius(MAX_RADIUS_METERS).is_ok());
        assert!(validate_radius(0.0).is_err());
        assert!(validate_radius(-10.0).is_err());
        assert!(validate_radius(MAX_RADIUS_METERS + 1.0).is_err());
    }
}
