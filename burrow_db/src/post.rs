use crate::{
  naive_now,
  newtypes::{CommunityId, PostId, UserId},
  schema::{post, post_saved},
  Crud,
  Saveable,
};
use diesel::{dsl::insert_into, prelude::*, result::Error};
use serde::{Deserialize, Serialize};

/// Soft deletes keep the row around so comment threads stay reachable.
pub const DELETED_REPLACEMENT_TEXT: &str = "*deleted by creator*";

#[derive(Clone, Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[diesel(table_name = post)]
pub struct Post {
  pub id: PostId,
  pub creator_id: UserId,
  pub community_id: Option<CommunityId>,
  pub name: String,
  pub body: Option<String>,
  pub deleted: bool,
  pub published: chrono::NaiveDateTime,
  pub updated: Option<chrono::NaiveDateTime>,
}

#[derive(Insertable, AsChangeset, Clone, Default)]
#[diesel(table_name = post)]
pub struct PostForm {
  pub creator_id: UserId,
  pub community_id: Option<CommunityId>,
  pub name: String,
  pub body: Option<String>,
  pub updated: Option<chrono::NaiveDateTime>,
}

impl Crud<PostForm, PostId> for Post {
  fn read(conn: &mut PgConnection, post_id: PostId) -> Result<Self, Error> {
    post::table.find(post_id).first::<Self>(conn)
  }

  fn create(conn: &mut PgConnection, form: &PostForm) -> Result<Self, Error> {
    insert_into(post::table)
      .values(form)
      .get_result::<Self>(conn)
  }

  fn update(conn: &mut PgConnection, post_id: PostId, form: &PostForm) -> Result<Self, Error> {
    diesel::update(post::table.find(post_id))
      .set(form)
      .get_result::<Self>(conn)
  }

  fn delete(conn: &mut PgConnection, post_id: PostId) -> Result<usize, Error> {
    diesel::delete(post::table.find(post_id)).execute(conn)
  }
}

impl Post {
  /// Replaces the body with a deletion marker instead of removing the row.
  pub fn soft_delete(conn: &mut PgConnection, post_id: PostId) -> Result<Self, Error> {
    diesel::update(post::table.find(post_id))
      .set((
        post::deleted.eq(true),
        post::body.eq(DELETED_REPLACEMENT_TEXT),
        post::updated.eq(naive_now()),
      ))
      .get_result::<Self>(conn)
  }

  pub fn is_post_creator(user_id: UserId, post_creator_id: UserId) -> bool {
    user_id == post_creator_id
  }
}

#[derive(Clone, Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[diesel(table_name = post_saved)]
pub struct PostSaved {
  pub id: i32,
  pub post_id: PostId,
  pub user_id: UserId,
  pub published: chrono::NaiveDateTime,
}

#[derive(Insertable, AsChangeset, Clone)]
#[diesel(table_name = post_saved)]
pub struct PostSavedForm {
  pub post_id: PostId,
  pub user_id: UserId,
}

impl Saveable<PostSavedForm> for PostSaved {
  fn save(conn: &mut PgConnection, form: &PostSavedForm) -> Result<Self, Error> {
    insert_into(post_saved::table)
      .values(form)
      .on_conflict((post_saved::post_id, post_saved::user_id))
      .do_update()
      .set(form)
      .get_result::<Self>(conn)
  }

  fn unsave(conn: &mut PgConnection, form: &PostSavedForm) -> Result<usize, Error> {
    diesel::delete(
      post_saved::table
        .filter(post_saved::post_id.eq(form.post_id))
        .filter(post_saved::user_id.eq(form.user_id)),
    )
    .execute(conn)
  }
}

#[cfg(test)]
mod tests {
  use super::{Crud, Post, PostForm, PostSaved, PostSavedForm, Saveable, DELETED_REPLACEMENT_TEXT};
  use crate::{
    establish_unpooled_connection,
    user::{User_, UserForm},
  };
  use pretty_assertions::assert_eq;
  use serial_test::serial;

  #[test]
  #[serial]
  #[ignore = "requires a migrated postgres at BURROW_DATABASE_URL"]
  fn test_crud() {
    let conn = &mut establish_unpooled_connection();

    let new_user = UserForm {
      name: "jim".into(),
      password_encrypted: "nope".into(),
      ..UserForm::default()
    };
    let inserted_user = User_::create(conn, &new_user).unwrap();

    let new_post = PostForm {
      creator_id: inserted_user.id,
      community_id: None,
      name: "A test post".into(),
      body: Some("the body".into()),
      updated: None,
    };
    let inserted_post = Post::create(conn, &new_post).unwrap();

    let expected_post = Post {
      id: inserted_post.id,
      creator_id: inserted_user.id,
      community_id: None,
      name: "A test post".into(),
      body: Some("the body".into()),
      deleted: false,
      published: inserted_post.published,
      updated: None,
    };

    let read_post = Post::read(conn, inserted_post.id).unwrap();
    assert_eq!(expected_post, read_post);

    // Save, then unsave
    let saved_form = PostSavedForm {
      post_id: inserted_post.id,
      user_id: inserted_user.id,
    };
    PostSaved::save(conn, &saved_form).unwrap();
    // Saving twice is an upsert, not an error
    PostSaved::save(conn, &saved_form).unwrap();
    let unsaved = PostSaved::unsave(conn, &saved_form).unwrap();
    assert_eq!(1, unsaved);

    // Soft delete keeps the row but swaps in the marker
    let deleted_post = Post::soft_delete(conn, inserted_post.id).unwrap();
    assert!(deleted_post.deleted);
    assert_eq!(Some(DELETED_REPLACEMENT_TEXT.to_string()), deleted_post.body);

    let num_deleted = Post::delete(conn, inserted_post.id).unwrap();
    User_::delete(conn, inserted_user.id).unwrap();
    assert_eq!(1, num_deleted);
  }
}
