use crate::{blocking, claims::Claims, get_user_from_jwt, BurrowContext};
use actix_web::web::{Data, Json, Query};
use burrow_db::{
  newtypes::PostId,
  user::{User_, UserForm},
  views::{
    comment_view::CommentQueryBuilder,
    post_view::{PostCursor, PostQueryBuilder},
  },
  SortType,
  FETCH_LIMIT_MAX,
};
use burrow_structs::user::{GetSaved, GetSavedResponse, Login, LoginResponse, Register};
use burrow_utils::{utils::is_valid_username, ApiError, BurrowError};

pub async fn register(
  data: Json<Register>,
  context: Data<BurrowContext>,
) -> Result<Json<LoginResponse>, BurrowError> {
  let data = data.into_inner();

  if !is_valid_username(&data.name) {
    return Err(ApiError::err("invalid_username").into());
  }
  if !(6..=60).contains(&data.password.chars().count()) {
    return Err(ApiError::err("invalid_password").into());
  }

  let user_form = UserForm {
    name: data.name.to_owned(),
    password_encrypted: data.password.to_owned(),
    email: data.email.to_owned(),
    ..UserForm::default()
  };

  let inserted_user =
    match blocking(context.pool(), move |conn| User_::register(conn, &user_form)).await? {
      Ok(user) => user,
      Err(_e) => return Err(ApiError::err("user_already_exists").into()),
    };

  Ok(Json(LoginResponse {
    jwt: Claims::jwt(inserted_user.id.0)?,
  }))
}

pub async fn login(
  data: Json<Login>,
  context: Data<BurrowContext>,
) -> Result<Json<LoginResponse>, BurrowError> {
  let data = data.into_inner();

  let username_or_email = data.username_or_email.to_owned();
  let user = match blocking(context.pool(), move |conn| {
    User_::find_by_email_or_username(conn, &username_or_email)
  })
  .await?
  {
    Ok(user) => user,
    Err(_e) => return Err(ApiError::err("couldnt_find_that_username_or_email").into()),
  };

  if !user.check_password(&data.password) {
    return Err(ApiError::err("password_incorrect").into());
  }

  Ok(Json(LoginResponse {
    jwt: Claims::jwt(user.id.0)?,
  }))
}

/// The caller's bookmarks: a cursor-paginated post page plus the saved
/// comments.
pub async fn get_saved(
  data: Query<GetSaved>,
  context: Data<BurrowContext>,
) -> Result<Json<GetSavedResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  let viewer_id = user.id;
  let cursor = data.cursor_post_id.map(|post_id| PostCursor {
    post_id: PostId(post_id),
    score: None,
  });
  let limit = data.limit;
  let page = blocking(context.pool(), move |conn| {
    PostQueryBuilder::create(conn)
      .sort(SortType::New)
      .viewer_id(viewer_id)
      .saved_only(true)
      .cursor(cursor)
      .limit(limit)
      .page()
  })
  .await??;

  let comments = blocking(context.pool(), move |conn| {
    CommentQueryBuilder::create(conn)
      .saved_only_for(viewer_id)
      .limit(FETCH_LIMIT_MAX)
      .list()
  })
  .await??;

  Ok(Json(GetSavedResponse {
    posts: page.posts,
    next_cursor: page.next_cursor,
    comments,
  }))
}
