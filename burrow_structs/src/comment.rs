use burrow_db::{
  newtypes::{CommentId, PostId},
  views::comment_view::CommentView,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct CreateComment {
  pub content: String,
  pub post_id: PostId,
  pub parent_id: Option<CommentId>,
  pub auth: String,
}

#[derive(Serialize, Clone)]
pub struct CommentResponse {
  pub comment: CommentView,
}

#[derive(Deserialize, Debug)]
pub struct EditComment {
  pub edit_id: CommentId,
  pub content: String,
  pub auth: String,
}

#[derive(Deserialize, Debug)]
pub struct DeleteComment {
  pub edit_id: CommentId,
  pub auth: String,
}

#[derive(Deserialize, Debug)]
pub struct GetComments {
  pub post_id: PostId,
  pub sort: Option<String>,
  pub limit: Option<i64>,
  pub auth: Option<String>,
}

#[derive(Serialize)]
pub struct GetCommentsResponse {
  pub comments: Vec<CommentView>,
}

#[derive(Deserialize, Debug)]
pub struct CreateCommentLike {
  pub comment_id: CommentId,
  pub score: i16,
  pub auth: String,
}

#[derive(Deserialize, Debug)]
pub struct SaveComment {
  pub comment_id: CommentId,
  pub save: bool,
  pub auth: String,
}
