use std::io;

/// Custom error type for relay operations
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Invalid payload: expected a JSON object")]
    NotAnObject,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Discord API returned status: {0}")]
    DeliveryStatus(reqwest::StatusCode),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Helper type for Results that use RelayError
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_a_message() {
        let errors = [
            RelayError::Config("missing url".into()),
            RelayError::InvalidPayload(serde_json::from_str::<u8>("x").unwrap_err()),
            RelayError::NotAnObject,
            RelayError::DeliveryStatus(reqwest::StatusCode::BAD_GATEWAY),
            RelayError::Io(io::Error::other("disk")),
        ];

        for err in &errors {
            let label = match err {
                RelayError::Config(_) => "Configuration error",
                RelayError::InvalidPayload(_) | RelayError::NotAnObject => "Invalid payload",
                RelayError::Http(_) => "HTTP request failed",
                RelayError::DeliveryStatus(_) => "Discord API returned status",
                RelayError::Io(_) => "IO error",
            };
            assert!(err.to_string().starts_with(label), "{}", err);
        }
        assert_eq!(
            errors[3].to_string(),
            "Discord API returned status: 502 Bad Gateway"
        );
    }
}
