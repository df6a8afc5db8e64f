use burrow_db::views::{comment_view::CommentView, post_view::{PostCursor, PostView}};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct Register {
  pub name: String,
  pub password: String,
  pub email: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Login {
  pub username_or_email: String,
  pub password: String,
}

#[derive(Serialize, Clone)]
pub struct LoginResponse {
  pub jwt: String,
}

#[derive(Deserialize, Debug)]
pub struct GetSaved {
  pub limit: Option<i64>,
  pub cursor_post_id: Option<i32>,
  pub auth: String,
}

#[derive(Serialize)]
pub struct GetSavedResponse {
  pub posts: Vec<PostView>,
  pub next_cursor: Option<PostCursor>,
  pub comments: Vec<CommentView>,
}
