use thiserror::Error;

/// Failure while retrieving a single region's status token.
///
/// This never escapes the fetch boundary: `StatusFetcher` renders it into the
/// region's error text so the rest of the board is unaffected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("HTTP {code}: {reason}")]
    HttpStatus { code: u16, reason: String },
    #[error("response body is not valid UTF-8 text")]
    Decode,
    #[error("{0}")]
    Transport(String),
    #[error("http client could not be built: {0}")]
    Client(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown region `{0}` (expected overall|au|ca|or|us)")]
pub struct UnknownRegion(pub String);

#[cfg(test)]
mod tests {
    use crate::errors::FetchError;

    #[test]
    fn transport_errors_display_the_raw_message() {
        let error = FetchError::Transport("Connection timeout".to_owned());
        assert_eq!(error.to_string(), "Connection timeout");
    }

    #[test]
    fn http_status_errors_name_code_and_reason() {
        let error =
            FetchError::HttpStatus { code: 500, reason: "Internal Server Error".to_owned() };
        assert_eq!(error.to_string(), "HTTP 500: Internal Server Error");
    }
}
