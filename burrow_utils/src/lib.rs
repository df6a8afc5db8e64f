#[macro_use]
extern crate lazy_static;

pub mod settings;
pub mod utils;
pub mod version;

use actix_web::http::StatusCode;
use std::num::ParseIntError;
use thiserror::Error;

/// A string error code, rendered to the client as `{"error":"some_code"}`.
#[derive(Debug, Error)]
#[error("{{\"error\":\"{message}\"}}")]
pub struct ApiError {
  pub message: String,
}

impl ApiError {
  pub fn err(msg: &str) -> Self {
    ApiError {
      message: msg.to_string(),
    }
  }
}

#[derive(Debug)]
pub struct BurrowError {
  pub inner: anyhow::Error,
  pub status_code: Option<StatusCode>,
}

impl BurrowError {
  pub fn with_status(mut self, status_code: StatusCode) -> Self {
    self.status_code = Some(status_code);
    self
  }
}

impl std::fmt::Display for BurrowError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    self.inner.fmt(f)
  }
}

impl From<anyhow::Error> for BurrowError {
  fn from(e: anyhow::Error) -> Self {
    BurrowError {
      inner: e,
      status_code: None,
    }
  }
}

/// Validation failures are the client's fault.
impl From<ApiError> for BurrowError {
  fn from(e: ApiError) -> Self {
    BurrowError {
      inner: e.into(),
      status_code: Some(StatusCode::BAD_REQUEST),
    }
  }
}

impl From<diesel::result::Error> for BurrowError {
  fn from(e: diesel::result::Error) -> Self {
    let status_code = match e {
      diesel::result::Error::NotFound => Some(StatusCode::NOT_FOUND),
      _ => None,
    };
    BurrowError {
      inner: e.into(),
      status_code,
    }
  }
}

impl From<diesel::r2d2::PoolError> for BurrowError {
  fn from(e: diesel::r2d2::PoolError) -> Self {
    BurrowError {
      inner: e.into(),
      status_code: None,
    }
  }
}

impl From<actix_web::error::BlockingError> for BurrowError {
  fn from(e: actix_web::error::BlockingError) -> Self {
    BurrowError {
      inner: e.into(),
      status_code: None,
    }
  }
}

impl From<jsonwebtoken::errors::Error> for BurrowError {
  fn from(e: jsonwebtoken::errors::Error) -> Self {
    BurrowError {
      inner: e.into(),
      status_code: Some(StatusCode::UNAUTHORIZED),
    }
  }
}

impl From<bcrypt::BcryptError> for BurrowError {
  fn from(e: bcrypt::BcryptError) -> Self {
    BurrowError {
      inner: e.into(),
      status_code: None,
    }
  }
}

impl From<config::ConfigError> for BurrowError {
  fn from(e: config::ConfigError) -> Self {
    BurrowError {
      inner: e.into(),
      status_code: None,
    }
  }
}

impl From<std::io::Error> for BurrowError {
  fn from(e: std::io::Error) -> Self {
    BurrowError {
      inner: e.into(),
      status_code: None,
    }
  }
}

impl From<ParseIntError> for BurrowError {
  fn from(e: ParseIntError) -> Self {
    BurrowError {
      inner: e.into(),
      status_code: None,
    }
  }
}

impl From<strum::ParseError> for BurrowError {
  fn from(e: strum::ParseError) -> Self {
    BurrowError {
      inner: e.into(),
      status_code: Some(StatusCode::BAD_REQUEST),
    }
  }
}

impl actix_web::error::ResponseError for BurrowError {
  fn status_code(&self) -> StatusCode {
    self
      .status_code
      .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
  }
}
