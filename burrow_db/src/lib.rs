pub mod comment;
pub mod community;
pub mod newtypes;
pub mod post;
pub mod schema;
pub mod user;
pub mod views;
pub mod vote;

use chrono::NaiveDateTime;
use diesel::{
  pg::PgConnection,
  r2d2::{ConnectionManager, Pool, PoolError},
  result::Error,
  Connection,
};
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub const FETCH_LIMIT_DEFAULT: i64 = 10;
pub const FETCH_LIMIT_MAX: i64 = 50;

pub trait Crud<Form, IdType> {
  fn create(conn: &mut PgConnection, form: &Form) -> Result<Self, Error>
  where
    Self: Sized;
  fn read(conn: &mut PgConnection, id: IdType) -> Result<Self, Error>
  where
    Self: Sized;
  fn update(conn: &mut PgConnection, id: IdType, form: &Form) -> Result<Self, Error>
  where
    Self: Sized;
  fn delete(conn: &mut PgConnection, id: IdType) -> Result<usize, Error>
  where
    Self: Sized;
}

pub trait Joinable<Form> {
  fn join(conn: &mut PgConnection, form: &Form) -> Result<Self, Error>
  where
    Self: Sized;
  fn leave(conn: &mut PgConnection, form: &Form) -> Result<usize, Error>
  where
    Self: Sized;
}

pub trait Likeable<Form> {
  fn like(conn: &mut PgConnection, form: &Form) -> Result<Self, Error>
  where
    Self: Sized;
  fn remove(conn: &mut PgConnection, form: &Form) -> Result<usize, Error>
  where
    Self: Sized;
}

pub trait Saveable<Form> {
  fn save(conn: &mut PgConnection, form: &Form) -> Result<Self, Error>
  where
    Self: Sized;
  fn unsave(conn: &mut PgConnection, form: &Form) -> Result<usize, Error>
  where
    Self: Sized;
}

pub trait MaybeOptional<T> {
  fn get_optional(self) -> Option<T>;
}

impl<T> MaybeOptional<T> for T {
  fn get_optional(self) -> Option<T> {
    Some(self)
  }
}

impl<T> MaybeOptional<T> for Option<T> {
  fn get_optional(self) -> Option<T> {
    self
  }
}

/// The feed orderings: `New` pages on the post id, `Popular` on (score, post id).
#[derive(EnumString, Display, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SortType {
  New,
  Popular,
}

#[derive(
  EnumString, Display, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, DbEnum,
)]
#[ExistingTypePath = "crate::schema::sql_types::CommunityVisibilityType"]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "lowercase")]
pub enum CommunityVisibility {
  #[default]
  Public,
  Restricted,
  Private,
}

#[derive(
  EnumString, Display, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, DbEnum,
)]
#[ExistingTypePath = "crate::schema::sql_types::MembershipRoleType"]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
  #[default]
  Member,
  Moderator,
}

pub fn build_db_pool(db_url: &str, pool_size: u32) -> Result<DbPool, PoolError> {
  let manager = ConnectionManager::<PgConnection>::new(db_url);
  Pool::builder().max_size(pool_size).build(manager)
}

pub fn get_database_url_from_env() -> Result<String, std::env::VarError> {
  std::env::var("BURROW_DATABASE_URL")
}

pub fn establish_unpooled_connection() -> PgConnection {
  let db_url = match get_database_url_from_env() {
    Ok(url) => url,
    Err(e) => panic!("Failed to read database URL from env var BURROW_DATABASE_URL: {}", e),
  };
  PgConnection::establish(&db_url).unwrap_or_else(|_| panic!("Error connecting to {}", db_url))
}

pub fn naive_now() -> NaiveDateTime {
  chrono::Utc::now().naive_utc()
}

pub fn fetch_limit(limit: Option<i64>) -> Result<i64, Error> {
  let limit = limit.unwrap_or(FETCH_LIMIT_DEFAULT);
  if !(1..=FETCH_LIMIT_MAX).contains(&limit) {
    return Err(Error::QueryBuilderError(
      format!("Fetch limit must be between 1 and {}", FETCH_LIMIT_MAX).into(),
    ));
  }
  Ok(limit)
}

#[cfg(test)]
mod tests {
  use super::{fetch_limit, CommunityVisibility, SortType};
  use std::str::FromStr;

  #[test]
  fn test_sort_type_from_str() {
    assert_eq!(SortType::New, SortType::from_str("New").unwrap());
    assert_eq!(SortType::Popular, SortType::from_str("Popular").unwrap());
    assert!(SortType::from_str("Hot").is_err());
  }

  #[test]
  fn test_visibility_from_str() {
    assert_eq!(
      CommunityVisibility::Private,
      CommunityVisibility::from_str("private").unwrap()
    );
    assert!(CommunityVisibility::from_str("hidden").is_err());
  }

  #[test]
  fn test_fetch_limit() {
    assert_eq!(10, fetch_limit(None).unwrap());
    assert_eq!(25, fetch_limit(Some(25)).unwrap());
    assert!(fetch_limit(Some(0)).is_err());
    assert!(fetch_limit(Some(51)).is_err());
  }
}
