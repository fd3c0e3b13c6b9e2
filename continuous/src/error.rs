use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    SqlError(#[from] sqlx::Error),
    #[error("Tracing error: {0}")]
    TracingError(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("Io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Env var error: {0}")]
    EnvVarError(#[from] std::env::VarError),
    #[error("Url error: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("Serde Json error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("Malformed contract code '{code}' on {date}")]
    MalformedCode { code: String, date: NaiveDate },
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Custom error: {0}")]
    CustomError(String),
}

#[macro_export]
macro_rules! error {
    ($variant:ident, $($arg:tt)*) => {
        Error::$variant(format!($($arg)*))
    };
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_macro() {
        let error = error!(CustomError, "Testing 123 : {}", 69);
        let x_error = Error::CustomError(format!("Testing 123 : {}", 69));

        // Test
        assert_eq!(error.to_string(), x_error.to_string());
    }

    #[test]
    fn test_malformed_code_message() {
        let error = Error::MalformedCode {
            code: "ag2401".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };

        // Validate
        assert_eq!(
            error.to_string(),
            "Malformed contract code 'ag2401' on 2024-01-02"
        );
    }
}
