use crate::{blocking, get_user_from_jwt, get_user_from_jwt_opt, BurrowContext};
use actix_web::web::{Data, Json, Query};
use burrow_db::{
  comment::{Comment, CommentForm, CommentSaved, CommentSavedForm},
  naive_now,
  views::{comment_view::{CommentQueryBuilder, CommentView}, post_view::PostView},
  vote::{Vote, VoteForm},
  Crud,
  Likeable,
  Saveable,
  SortType,
  FETCH_LIMIT_MAX,
};
use burrow_structs::comment::{
  CommentResponse,
  CreateComment,
  CreateCommentLike,
  DeleteComment,
  EditComment,
  GetComments,
  GetCommentsResponse,
  SaveComment,
};
use burrow_utils::{ApiError, BurrowError};
use std::str::FromStr;

pub async fn create_comment(
  data: Json<CreateComment>,
  context: Data<BurrowContext>,
) -> Result<Json<CommentResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  let content = data.content.trim().to_owned();
  if content.is_empty() {
    return Err(ApiError::err("invalid_comment_content").into());
  }

  // The post must exist and be visible to the commenter.
  let post_id = data.post_id;
  let viewer_id = user.id;
  blocking(context.pool(), move |conn| {
    PostView::read(conn, post_id, Some(viewer_id))
  })
  .await??;

  // A parent comment has to belong to the same post.
  if let Some(parent_id) = data.parent_id {
    let parent = blocking(context.pool(), move |conn| Comment::read(conn, parent_id)).await??;
    if parent.post_id != data.post_id {
      return Err(ApiError::err("couldnt_create_comment").into());
    }
  }

  let comment_form = CommentForm {
    creator_id: user.id,
    post_id: data.post_id,
    parent_id: data.parent_id,
    content,
    updated: None,
  };

  let inserted_comment = match blocking(context.pool(), move |conn| {
    Comment::create(conn, &comment_form)
  })
  .await?
  {
    Ok(comment) => comment,
    Err(_e) => return Err(ApiError::err("couldnt_create_comment").into()),
  };

  let inserted_comment_id = inserted_comment.id;
  let comment_view = blocking(context.pool(), move |conn| {
    CommentView::read(conn, inserted_comment_id)
  })
  .await??;

  Ok(Json(CommentResponse {
    comment: comment_view,
  }))
}

pub async fn edit_comment(
  data: Json<EditComment>,
  context: Data<BurrowContext>,
) -> Result<Json<CommentResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  let content = data.content.trim().to_owned();
  if content.is_empty() {
    return Err(ApiError::err("invalid_comment_content").into());
  }

  let edit_id = data.edit_id;
  let orig_comment = blocking(context.pool(), move |conn| Comment::read(conn, edit_id)).await??;

  if user.id != orig_comment.creator_id {
    return Err(ApiError::err("no_comment_edit_allowed").into());
  }

  let comment_form = CommentForm {
    creator_id: orig_comment.creator_id,
    post_id: orig_comment.post_id,
    parent_id: orig_comment.parent_id,
    content,
    updated: Some(naive_now()),
  };

  let updated_comment = match blocking(context.pool(), move |conn| {
    Comment::update(conn, edit_id, &comment_form)
  })
  .await?
  {
    Ok(comment) => comment,
    Err(_e) => return Err(ApiError::err("couldnt_update_comment").into()),
  };

  let updated_comment_id = updated_comment.id;
  let comment_view = blocking(context.pool(), move |conn| {
    CommentView::read(conn, updated_comment_id)
  })
  .await??;

  Ok(Json(CommentResponse {
    comment: comment_view,
  }))
}

pub async fn delete_comment(
  data: Json<DeleteComment>,
  context: Data<BurrowContext>,
) -> Result<Json<CommentResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  let edit_id = data.edit_id;
  let orig_comment = blocking(context.pool(), move |conn| Comment::read(conn, edit_id)).await??;

  if user.id != orig_comment.creator_id {
    return Err(ApiError::err("no_comment_edit_allowed").into());
  }

  blocking(context.pool(), move |conn| {
    Comment::soft_delete(conn, edit_id)
  })
  .await??;

  let comment_view = blocking(context.pool(), move |conn| {
    CommentView::read(conn, edit_id)
  })
  .await??;

  Ok(Json(CommentResponse {
    comment: comment_view,
  }))
}

pub async fn list_comments(
  data: Query<GetComments>,
  context: Data<BurrowContext>,
) -> Result<Json<GetCommentsResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt_opt(&data.auth, context.pool()).await?;
  let viewer_id = user.map(|u| u.id);

  let sort = match &data.sort {
    Some(sort) => SortType::from_str(sort).map_err(|_| ApiError::err("invalid_sort"))?,
    None => SortType::Popular,
  };

  // Listing comments of an invisible post would leak its existence.
  let post_id = data.post_id;
  blocking(context.pool(), move |conn| {
    PostView::read(conn, post_id, viewer_id)
  })
  .await??;

  let limit = data.limit;
  let comments = blocking(context.pool(), move |conn| {
    CommentQueryBuilder::create(conn)
      .for_post_id(post_id)
      .sort(sort)
      .limit(limit.or(Some(FETCH_LIMIT_MAX)))
      .list()
  })
  .await??;

  Ok(Json(GetCommentsResponse { comments }))
}

pub async fn like_comment(
  data: Json<CreateCommentLike>,
  context: Data<BurrowContext>,
) -> Result<Json<CommentResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  if !(-1..=1).contains(&data.score) {
    return Err(ApiError::err("invalid_vote_value").into());
  }

  let comment_id = data.comment_id;
  let orig_comment = blocking(context.pool(), move |conn| {
    Comment::read(conn, comment_id)
  })
  .await??;

  let viewer_id = user.id;
  let post_id = orig_comment.post_id;
  blocking(context.pool(), move |conn| {
    PostView::read(conn, post_id, Some(viewer_id))
  })
  .await??;

  let vote_form = VoteForm {
    user_id: user.id,
    post_id: orig_comment.post_id,
    comment_id: Some(data.comment_id),
    value: data.score,
    updated: None,
  };

  if data.score == 0 {
    blocking(context.pool(), move |conn| Vote::remove(conn, &vote_form)).await??;
  } else if blocking(context.pool(), move |conn| Vote::like(conn, &vote_form))
    .await?
    .is_err()
  {
    return Err(ApiError::err("couldnt_like_comment").into());
  }

  let comment_view = blocking(context.pool(), move |conn| {
    CommentView::read(conn, comment_id)
  })
  .await??;

  Ok(Json(CommentResponse {
    comment: comment_view,
  }))
}

pub async fn save_comment(
  data: Json<SaveComment>,
  context: Data<BurrowContext>,
) -> Result<Json<CommentResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  let comment_id = data.comment_id;
  blocking(context.pool(), move |conn| {
    Comment::read(conn, comment_id)
  })
  .await??;

  let saved_form = CommentSavedForm {
    comment_id: data.comment_id,
    user_id: user.id,
  };

  if data.save {
    if blocking(context.pool(), move |conn| {
      CommentSaved::save(conn, &saved_form)
    })
    .await?
    .is_err()
    {
      return Err(ApiError::err("couldnt_save_comment").into());
    }
  } else if blocking(context.pool(), move |conn| {
    CommentSaved::unsave(conn, &saved_form)
  })
  .await?
  .is_err()
  {
    return Err(ApiError::err("couldnt_save_comment").into());
  }

  let comment_view = blocking(context.pool(), move |conn| {
    CommentView::read(conn, comment_id)
  })
  .await??;

  Ok(Json(CommentResponse {
    comment: comment_view,
  }))
}
