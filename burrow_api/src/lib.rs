pub mod claims;
pub mod comment;
pub mod community;
pub mod post;
pub mod site;
pub mod user;

use crate::claims::Claims;
use actix_web::{http::StatusCode, web};
use burrow_db::{
  community::CommunityMembership,
  newtypes::{CommunityId, UserId},
  user::User_,
  views::community_view::CommunityView,
  CommunityVisibility,
  Crud,
  DbPool,
};
use burrow_utils::{ApiError, BurrowError};
use diesel::PgConnection;

#[derive(Clone)]
pub struct BurrowContext {
  pool: DbPool,
}

impl BurrowContext {
  pub fn create(pool: DbPool) -> BurrowContext {
    BurrowContext { pool }
  }

  pub fn pool(&self) -> &DbPool {
    &self.pool
  }
}

/// Runs a synchronous diesel call on the blocking thread pool.
pub async fn blocking<F, T>(pool: &DbPool, f: F) -> Result<T, BurrowError>
where
  F: FnOnce(&mut PgConnection) -> T + Send + 'static,
  T: Send + 'static,
{
  let pool = pool.clone();
  let res = web::block(move || {
    let mut conn = pool.get()?;
    let res = (f)(&mut conn);
    Ok(res) as Result<T, BurrowError>
  })
  .await??;

  Ok(res)
}

pub async fn get_user_from_jwt(auth: &str, pool: &DbPool) -> Result<User_, BurrowError> {
  let claims = Claims::decode(auth)?.claims;
  let user_id = UserId(claims.id);
  let user = blocking(pool, move |conn| User_::read(conn, user_id)).await??;
  if user.banned {
    return Err(
      BurrowError::from(ApiError::err("site_ban")).with_status(StatusCode::UNAUTHORIZED),
    );
  }
  Ok(user)
}

pub async fn get_user_from_jwt_opt(
  auth: &Option<String>,
  pool: &DbPool,
) -> Result<Option<User_>, BurrowError> {
  match auth {
    Some(auth) => Ok(Some(get_user_from_jwt(auth, pool).await?)),
    None => Ok(None),
  }
}

/// Community settings mutations are gated on the moderator role; site
/// admins pass as well.
pub async fn is_mod_or_admin(
  user: &User_,
  community_id: &CommunityId,
  pool: &DbPool,
) -> Result<(), BurrowError> {
  if user.admin {
    return Ok(());
  }
  let community_id = community_id.clone();
  let user_id = user.id;
  let is_moderator = blocking(pool, move |conn| {
    CommunityMembership::is_moderator(conn, &community_id, user_id)
  })
  .await??;
  if !is_moderator {
    return Err(
      BurrowError::from(ApiError::err("not_a_moderator")).with_status(StatusCode::FORBIDDEN),
    );
  }
  Ok(())
}

/// Posting into a community the viewer can't see is a plain not-found;
/// posting into a restricted one additionally requires membership.
pub async fn check_can_post(
  user: &User_,
  community_id: &CommunityId,
  pool: &DbPool,
) -> Result<(), BurrowError> {
  let community_id2 = community_id.clone();
  let user_id = user.id;
  let community =
    blocking(pool, move |conn| CommunityView::read(conn, community_id2, Some(user_id))).await??;

  if community.visibility != CommunityVisibility::Public {
    let community_id3 = community_id.clone();
    let is_member = blocking(pool, move |conn| {
      CommunityMembership::is_member(conn, &community_id3, user_id)
    })
    .await??;
    if !is_member {
      return Err(
        BurrowError::from(ApiError::err("not_a_member")).with_status(StatusCode::FORBIDDEN),
      );
    }
  }
  Ok(())
}
