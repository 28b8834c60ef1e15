//! Error types for configuration loading and the HTTP surface.
//!
//! The scoring and path computations never fail; only file loading and
//! request validation produce errors.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse TOML config {path}: {source}")]
  Toml {
    path: String,
    #[source]
    source: toml::de::Error,
  },
  #[error("failed to parse mission JSON {path}: {source}")]
  Json {
    path: String,
    #[source]
    source: serde_json::Error,
  },
  #[error("invalid config: {0}")]
  Invalid(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),
}

impl ApiError {
  pub fn bad_request(message: impl Into<String>) -> Self {
    ApiError::BadRequest(message.into())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
