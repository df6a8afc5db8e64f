use crate::{
  naive_now,
  newtypes::{CommentId, PostId, UserId},
  schema::{comment, comment_saved},
  Crud,
  Saveable,
};
use diesel::{dsl::insert_into, prelude::*, result::Error};
use serde::{Deserialize, Serialize};

pub const DELETED_REPLACEMENT_TEXT: &str = "*deleted by creator*";

#[derive(Clone, Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[diesel(table_name = comment)]
pub struct Comment {
  pub id: CommentId,
  pub creator_id: UserId,
  pub post_id: PostId,
  pub parent_id: Option<CommentId>,
  pub content: String,
  pub deleted: bool,
  pub published: chrono::NaiveDateTime,
  pub updated: Option<chrono::NaiveDateTime>,
}

#[derive(Insertable, AsChangeset, Clone, Default)]
#[diesel(table_name = comment)]
pub struct CommentForm {
  pub creator_id: UserId,
  pub post_id: PostId,
  pub parent_id: Option<CommentId>,
  pub content: String,
  pub updated: Option<chrono::NaiveDateTime>,
}

impl Crud<CommentForm, CommentId> for Comment {
  fn read(conn: &mut PgConnection, comment_id: CommentId) -> Result<Self, Error> {
    comment::table.find(comment_id).first::<Self>(conn)
  }

  fn create(conn: &mut PgConnection, form: &CommentForm) -> Result<Self, Error> {
    insert_into(comment::table)
      .values(form)
      .get_result::<Self>(conn)
  }

  fn update(
    conn: &mut PgConnection,
    comment_id: CommentId,
    form: &CommentForm,
  ) -> Result<Self, Error> {
    diesel::update(comment::table.find(comment_id))
      .set(form)
      .get_result::<Self>(conn)
  }

  fn delete(conn: &mut PgConnection, comment_id: CommentId) -> Result<usize, Error> {
    diesel::delete(comment::table.find(comment_id)).execute(conn)
  }
}

impl Comment {
  pub fn soft_delete(conn: &mut PgConnection, comment_id: CommentId) -> Result<Self, Error> {
    diesel::update(comment::table.find(comment_id))
      .set((
        comment::deleted.eq(true),
        comment::content.eq(DELETED_REPLACEMENT_TEXT),
        comment::updated.eq(naive_now()),
      ))
      .get_result::<Self>(conn)
  }
}

#[derive(Clone, Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[diesel(table_name = comment_saved)]
pub struct CommentSaved {
  pub id: i32,
  pub comment_id: CommentId,
  pub user_id: UserId,
  pub published: chrono::NaiveDateTime,
}

#[derive(Insertable, AsChangeset, Clone)]
#[diesel(table_name = comment_saved)]
pub struct CommentSavedForm {
  pub comment_id: CommentId,
  pub user_id: UserId,
}

impl Saveable<CommentSavedForm> for CommentSaved {
  fn save(conn: &mut PgConnection, form: &CommentSavedForm) -> Result<Self, Error> {
    insert_into(comment_saved::table)
      .values(form)
      .on_conflict((comment_saved::comment_id, comment_saved::user_id))
      .do_update()
      .set(form)
      .get_result::<Self>(conn)
  }

  fn unsave(conn: &mut PgConnection, form: &CommentSavedForm) -> Result<usize, Error> {
    diesel::delete(
      comment_saved::table
        .filter(comment_saved::comment_id.eq(form.comment_id))
        .filter(comment_saved::user_id.eq(form.user_id)),
    )
    .execute(conn)
  }
}

#[cfg(test)]
mod tests {
  use super::{Comment, CommentForm, Crud};
  use crate::{
    establish_unpooled_connection,
    post::{Post, PostForm},
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
      name: "terry".into(),
      password_encrypted: "nope".into(),
      ..UserForm::default()
    };
    let inserted_user = User_::create(conn, &new_user).unwrap();

    let new_post = PostForm {
      creator_id: inserted_user.id,
      name: "A post for comments".into(),
      ..PostForm::default()
    };
    let inserted_post = Post::create(conn, &new_post).unwrap();

    let comment_form = CommentForm {
      creator_id: inserted_user.id,
      post_id: inserted_post.id,
      parent_id: None,
      content: "A test comment".into(),
      updated: None,
    };
    let inserted_comment = Comment::create(conn, &comment_form).unwrap();

    let child_form = CommentForm {
      parent_id: Some(inserted_comment.id),
      content: "A child comment".into(),
      ..comment_form.clone()
    };
    let inserted_child = Comment::create(conn, &child_form).unwrap();

    assert_eq!(Some(inserted_comment.id), inserted_child.parent_id);

    let read_comment = Comment::read(conn, inserted_comment.id).unwrap();
    assert_eq!("A test comment", read_comment.content);

    Comment::delete(conn, inserted_child.id).unwrap();
    Comment::delete(conn, inserted_comment.id).unwrap();
    Post::delete(conn, inserted_post.id).unwrap();
    User_::delete(conn, inserted_user.id).unwrap();
  }
}
