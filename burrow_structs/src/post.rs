use burrow_db::{
  newtypes::{CommunityId, PostId},
  views::{
    comment_view::CommentView,
    post_view::{PostCursor, PostView},
  },
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct CreatePost {
  pub name: String,
  pub body: Option<String>,
  pub community_id: Option<CommunityId>,
  pub auth: String,
}

#[derive(Serialize, Clone)]
pub struct PostResponse {
  pub post: PostView,
}

#[derive(Deserialize, Debug)]
pub struct GetPost {
  pub id: PostId,
  pub auth: Option<String>,
}

#[derive(Serialize)]
pub struct GetPostResponse {
  pub post: PostView,
  pub comments: Vec<CommentView>,
}

/// One listing endpoint serves the global feed and the community-scoped
/// one; the same access filter applies to both.
#[derive(Deserialize, Debug)]
pub struct GetPosts {
  pub sort: Option<String>,
  pub limit: Option<i64>,
  pub community_id: Option<CommunityId>,
  pub cursor_post_id: Option<i32>,
  pub cursor_score: Option<i64>,
  pub auth: Option<String>,
}

#[derive(Serialize)]
pub struct GetPostsResponse {
  pub posts: Vec<PostView>,
  pub next_cursor: Option<PostCursor>,
}

#[derive(Deserialize, Debug)]
pub struct EditPost {
  pub edit_id: PostId,
  pub name: String,
  pub body: Option<String>,
  pub auth: String,
}

#[derive(Deserialize, Debug)]
pub struct DeletePost {
  pub edit_id: PostId,
  pub auth: String,
}

#[derive(Deserialize, Debug)]
pub struct CreatePostLike {
  pub post_id: PostId,
  pub score: i16,
  pub auth: String,
}

#[derive(Deserialize, Debug)]
pub struct SavePost {
  pub post_id: PostId,
  pub save: bool,
  pub auth: String,
}
