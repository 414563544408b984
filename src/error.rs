use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price API returned {0}")]
    Status(StatusCode),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no {currency} price for '{asset}' in response")]
    MissingPrice { asset: String, currency: String },

    #[error("invalid price {0}")]
    InvalidPrice(f64),
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail provider rejected message with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name}={value:?} is not a valid number")]
    NotANumber { name: &'static str, value: String },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: String },
}
