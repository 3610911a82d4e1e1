use uuid::Uuid;

use super::ApiError;

/// Reject malformed UUIDs before any lookup happens. `param` names the
/// offending field in the message ("userId", "trackId", ...).
pub fn validate_uuid(id: &str, param: &str) -> Result<(), ApiError> {
    if Uuid::parse_str(id).is_err() {
        return Err(ApiError::validation(format!("Invalid {param} format!")));
    }
    Ok(())
}

pub fn validate_duration(duration: i32) -> Result<i32, ApiError> {
    if duration < 1 {
        return Err(ApiError::validation(
            "duration must be a positive integer",
        ));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("c6a3a9de-81780-4a3b-b1c9-cd2bc3c0e03f", "userId").is_err());
        assert!(validate_uuid("not-a-uuid", "userId").is_err());
        assert!(validate_uuid("", "userId").is_err());
        assert!(validate_uuid("c6a3a9de-8178-4a3b-b1c9-cd2bc3c0e03f", "userId").is_ok());
    }

    #[test]
    fn test_validate_uuid_names_the_param() {
        let err = validate_uuid("nope", "trackId").unwrap_err();
        assert!(err.to_string().contains("trackId"));
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration(1).is_ok());
        assert!(validate_duration(262).is_ok());
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(-5).is_err());
    }
}
