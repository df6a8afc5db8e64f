use crate::{
  blocking,
  check_can_post,
  get_user_from_jwt,
  get_user_from_jwt_opt,
  BurrowContext,
};
use actix_web::web::{Data, Json, Query};
use burrow_db::{
  naive_now,
  newtypes::PostId,
  post::{Post, PostForm, PostSaved, PostSavedForm},
  views::{
    comment_view::CommentQueryBuilder,
    post_view::{PostCursor, PostQueryBuilder, PostView},
  },
  vote::{Vote, VoteForm},
  Crud,
  Likeable,
  Saveable,
  SortType,
  FETCH_LIMIT_MAX,
};
use burrow_structs::post::{
  CreatePost,
  CreatePostLike,
  DeletePost,
  EditPost,
  GetPost,
  GetPostResponse,
  GetPosts,
  GetPostsResponse,
  PostResponse,
  SavePost,
};
use burrow_utils::{utils::is_valid_post_title, ApiError, BurrowError};
use std::str::FromStr;

pub async fn create_post(
  data: Json<CreatePost>,
  context: Data<BurrowContext>,
) -> Result<Json<PostResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  if !is_valid_post_title(&data.name) {
    return Err(ApiError::err("invalid_post_title").into());
  }

  if let Some(community_id) = &data.community_id {
    check_can_post(&user, community_id, context.pool()).await?;
  }

  let post_form = PostForm {
    creator_id: user.id,
    community_id: data.community_id.clone(),
    name: data.name.trim().to_owned(),
    body: data.body.to_owned(),
    updated: None,
  };

  let inserted_post =
    match blocking(context.pool(), move |conn| Post::create(conn, &post_form)).await? {
      Ok(post) => post,
      Err(_e) => return Err(ApiError::err("couldnt_create_post").into()),
    };

  let inserted_post_id = inserted_post.id;
  let viewer_id = user.id;
  let post_view = blocking(context.pool(), move |conn| {
    PostView::read(conn, inserted_post_id, Some(viewer_id))
  })
  .await??;

  Ok(Json(PostResponse { post: post_view }))
}

pub async fn get_post(
  data: Query<GetPost>,
  context: Data<BurrowContext>,
) -> Result<Json<GetPostResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt_opt(&data.auth, context.pool()).await?;
  let viewer_id = user.map(|u| u.id);

  let id = data.id;
  let post_view = blocking(context.pool(), move |conn| {
    PostView::read(conn, id, viewer_id)
  })
  .await??;

  let comments = blocking(context.pool(), move |conn| {
    CommentQueryBuilder::create(conn)
      .for_post_id(id)
      .sort(SortType::Popular)
      .limit(FETCH_LIMIT_MAX)
      .list()
  })
  .await??;

  Ok(Json(GetPostResponse {
    post: post_view,
    comments,
  }))
}

pub async fn list_posts(
  data: Query<GetPosts>,
  context: Data<BurrowContext>,
) -> Result<Json<GetPostsResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt_opt(&data.auth, context.pool()).await?;
  let viewer_id = user.map(|u| u.id);

  let sort = match &data.sort {
    Some(sort) => {
      SortType::from_str(sort).map_err(|_| ApiError::err("invalid_sort"))?
    }
    None => SortType::New,
  };

  let cursor = parse_cursor(sort, data.cursor_post_id, data.cursor_score)?;

  let community_id = data.community_id.clone();
  let limit = data.limit;
  let page = blocking(context.pool(), move |conn| {
    PostQueryBuilder::create(conn)
      .sort(sort)
      .viewer_id(viewer_id)
      .for_community_id(community_id)
      .cursor(cursor)
      .limit(limit)
      .page()
  })
  .await??;

  Ok(Json(GetPostsResponse {
    posts: page.posts,
    next_cursor: page.next_cursor,
  }))
}

/// The popular ordering pages on a (score, id) pair, so a popular cursor
/// missing its score half is malformed. A score without a post id is never
/// valid.
fn parse_cursor(
  sort: SortType,
  cursor_post_id: Option<i32>,
  cursor_score: Option<i64>,
) -> Result<Option<PostCursor>, ApiError> {
  match (cursor_post_id, cursor_score) {
    (None, None) => Ok(None),
    (None, Some(_)) => Err(ApiError::err("invalid_cursor")),
    (Some(post_id), score) => {
      if sort == SortType::Popular && score.is_none() {
        return Err(ApiError::err("invalid_cursor"));
      }
      Ok(Some(PostCursor {
        post_id: PostId(post_id),
        score,
      }))
    }
  }
}

pub async fn edit_post(
  data: Json<EditPost>,
  context: Data<BurrowContext>,
) -> Result<Json<PostResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  if !is_valid_post_title(&data.name) {
    return Err(ApiError::err("invalid_post_title").into());
  }

  let edit_id = data.edit_id;
  let orig_post = blocking(context.pool(), move |conn| Post::read(conn, edit_id)).await??;

  // Only the creator can edit
  if !Post::is_post_creator(user.id, orig_post.creator_id) {
    return Err(ApiError::err("no_post_edit_allowed").into());
  }

  let post_form = PostForm {
    creator_id: orig_post.creator_id,
    community_id: orig_post.community_id.clone(),
    name: data.name.trim().to_owned(),
    body: data.body.to_owned(),
    updated: Some(naive_now()),
  };

  let updated_post = match blocking(context.pool(), move |conn| {
    Post::update(conn, edit_id, &post_form)
  })
  .await?
  {
    Ok(post) => post,
    Err(_e) => return Err(ApiError::err("couldnt_update_post").into()),
  };

  let viewer_id = user.id;
  let updated_post_id = updated_post.id;
  let post_view = blocking(context.pool(), move |conn| {
    PostView::read(conn, updated_post_id, Some(viewer_id))
  })
  .await??;

  Ok(Json(PostResponse { post: post_view }))
}

pub async fn delete_post(
  data: Json<DeletePost>,
  context: Data<BurrowContext>,
) -> Result<Json<PostResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  let edit_id = data.edit_id;
  let orig_post = blocking(context.pool(), move |conn| Post::read(conn, edit_id)).await??;

  if !Post::is_post_creator(user.id, orig_post.creator_id) {
    return Err(ApiError::err("no_post_edit_allowed").into());
  }

  blocking(context.pool(), move |conn| Post::soft_delete(conn, edit_id)).await??;

  let viewer_id = user.id;
  let post_view = blocking(context.pool(), move |conn| {
    PostView::read(conn, edit_id, Some(viewer_id))
  })
  .await??;

  Ok(Json(PostResponse { post: post_view }))
}

pub async fn like_post(
  data: Json<CreatePostLike>,
  context: Data<BurrowContext>,
) -> Result<Json<PostResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  if !(-1..=1).contains(&data.score) {
    return Err(ApiError::err("invalid_vote_value").into());
  }

  // Doubles as the existence check: a post the viewer can't see is 404.
  let post_id = data.post_id;
  let viewer_id = user.id;
  blocking(context.pool(), move |conn| {
    PostView::read(conn, post_id, Some(viewer_id))
  })
  .await??;

  let vote_form = VoteForm {
    user_id: user.id,
    post_id: data.post_id,
    comment_id: None,
    value: data.score,
    updated: None,
  };

  if data.score == 0 {
    blocking(context.pool(), move |conn| Vote::remove(conn, &vote_form)).await??;
  } else if blocking(context.pool(), move |conn| Vote::like(conn, &vote_form))
    .await?
    .is_err()
  {
    return Err(ApiError::err("couldnt_like_post").into());
  }

  let post_view = blocking(context.pool(), move |conn| {
    PostView::read(conn, post_id, Some(viewer_id))
  })
  .await??;

  Ok(Json(PostResponse { post: post_view }))
}

pub async fn save_post(
  data: Json<SavePost>,
  context: Data<BurrowContext>,
) -> Result<Json<PostResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  let post_id = data.post_id;
  let viewer_id = user.id;
  blocking(context.pool(), move |conn| {
    PostView::read(conn, post_id, Some(viewer_id))
  })
  .await??;

  let saved_form = PostSavedForm {
    post_id: data.post_id,
    user_id: user.id,
  };

  if data.save {
    if blocking(context.pool(), move |conn| PostSaved::save(conn, &saved_form))
      .await?
      .is_err()
    {
      return Err(ApiError::err("couldnt_save_post").into());
    }
  } else if blocking(context.pool(), move |conn| {
    PostSaved::unsave(conn, &saved_form)
  })
  .await?
  .is_err()
  {
    return Err(ApiError::err("couldnt_save_post").into());
  }

  let post_view = blocking(context.pool(), move |conn| {
    PostView::read(conn, post_id, Some(viewer_id))
  })
  .await??;

  Ok(Json(PostResponse { post: post_view }))
}

#[cfg(test)]
mod tests {
  use super::parse_cursor;
  use burrow_db::{newtypes::PostId, SortType};
  use pretty_assertions::assert_eq;

  #[test]
  fn test_parse_cursor_absent() {
    assert_eq!(None, parse_cursor(SortType::New, None, None).unwrap());
    assert_eq!(None, parse_cursor(SortType::Popular, None, None).unwrap());
  }

  #[test]
  fn test_parse_cursor_new() {
    let cursor = parse_cursor(SortType::New, Some(42), None).unwrap().unwrap();
    assert_eq!(PostId(42), cursor.post_id);
    assert_eq!(None, cursor.score);
  }

  #[test]
  fn test_parse_cursor_popular() {
    let cursor = parse_cursor(SortType::Popular, Some(42), Some(7))
      .unwrap()
      .unwrap();
    assert_eq!(PostId(42), cursor.post_id);
    assert_eq!(Some(7), cursor.score);
  }

  #[test]
  fn test_parse_cursor_popular_needs_both_halves() {
    assert!(parse_cursor(SortType::Popular, Some(42), None).is_err());
    assert!(parse_cursor(SortType::New, None, Some(7)).is_err());
  }
}
