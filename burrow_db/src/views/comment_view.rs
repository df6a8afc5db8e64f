use crate::{
  fetch_limit,
  newtypes::{CommentId, PostId, UserId},
  schema::comment_saved,
  MaybeOptional,
  SortType,
};
use diesel::{dsl::exists, prelude::*, result::Error};
use serde::{Deserialize, Serialize};

// Like post_view, the comment score is recomputed from the vote table on
// every read.
diesel::table! {
  comment_view (id) {
    id -> Int4,
    creator_id -> Int4,
    post_id -> Int4,
    parent_id -> Nullable<Int4>,
    content -> Text,
    deleted -> Bool,
    published -> Timestamp,
    updated -> Nullable<Timestamp>,
    creator_name -> Varchar,
    score -> BigInt,
  }
}

diesel::allow_tables_to_appear_in_same_query!(comment_view, comment_saved);

#[derive(Clone, Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[diesel(table_name = comment_view)]
pub struct CommentView {
  pub id: CommentId,
  pub creator_id: UserId,
  pub post_id: PostId,
  pub parent_id: Option<CommentId>,
  pub content: String,
  pub deleted: bool,
  pub published: chrono::NaiveDateTime,
  pub updated: Option<chrono::NaiveDateTime>,
  pub creator_name: String,
  pub score: i64,
}

impl CommentView {
  pub fn read(conn: &mut PgConnection, from_comment_id: CommentId) -> Result<Self, Error> {
    comment_view::table
      .find(from_comment_id)
      .first::<Self>(conn)
  }
}

pub struct CommentQueryBuilder<'a> {
  conn: &'a mut PgConnection,
  sort: SortType,
  for_post_id: Option<PostId>,
  saved_only_for: Option<UserId>,
  limit: Option<i64>,
}

impl<'a> CommentQueryBuilder<'a> {
  pub fn create(conn: &'a mut PgConnection) -> Self {
    CommentQueryBuilder {
      conn,
      sort: SortType::New,
      for_post_id: None,
      saved_only_for: None,
      limit: None,
    }
  }

  pub fn sort(mut self, sort: SortType) -> Self {
    self.sort = sort;
    self
  }

  pub fn for_post_id<T: MaybeOptional<PostId>>(mut self, for_post_id: T) -> Self {
    self.for_post_id = for_post_id.get_optional();
    self
  }

  /// Restrict to comments the given user has bookmarked.
  pub fn saved_only_for<T: MaybeOptional<UserId>>(mut self, user_id: T) -> Self {
    self.saved_only_for = user_id.get_optional();
    self
  }

  pub fn limit<T: MaybeOptional<i64>>(mut self, limit: T) -> Self {
    self.limit = limit.get_optional();
    self
  }

  pub fn list(self) -> Result<Vec<CommentView>, Error> {
    let limit = fetch_limit(self.limit)?;

    let mut query = comment_view::table.into_boxed();

    if let Some(for_post_id) = self.for_post_id {
      query = query.filter(comment_view::post_id.eq(for_post_id));
    }

    if let Some(user_id) = self.saved_only_for {
      query = query.filter(exists(
        comment_saved::table
          .filter(comment_saved::comment_id.eq(comment_view::id))
          .filter(comment_saved::user_id.eq(user_id)),
      ));
    }

    query = match self.sort {
      SortType::New => query.order_by(comment_view::id.desc()),
      SortType::Popular => query
        .order_by(comment_view::score.desc())
        .then_order_by(comment_view::id.desc()),
    };

    query.limit(limit).load::<CommentView>(self.conn)
  }
}
