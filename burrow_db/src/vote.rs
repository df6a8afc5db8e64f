use crate::{
  naive_now,
  newtypes::{CommentId, PostId, UserId, VoteId},
  schema::vote,
  Likeable,
};
use diesel::{dsl::insert_into, prelude::*, result::Error, DecoratableTarget};
use serde::{Deserialize, Serialize};

#[derive(Clone, Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[diesel(table_name = vote)]
pub struct Vote {
  pub id: VoteId,
  pub user_id: UserId,
  pub post_id: PostId,
  pub comment_id: Option<CommentId>,
  pub value: i16,
  pub published: chrono::NaiveDateTime,
  pub updated: Option<chrono::NaiveDateTime>,
}

/// A null `comment_id` means the vote is on the post itself.
#[derive(Insertable, AsChangeset, Clone)]
#[diesel(table_name = vote)]
pub struct VoteForm {
  pub user_id: UserId,
  pub post_id: PostId,
  pub comment_id: Option<CommentId>,
  pub value: i16,
  pub updated: Option<chrono::NaiveDateTime>,
}

impl Likeable<VoteForm> for Vote {
  /// Upserts against the partial unique index for the vote kind, so a
  /// concurrent duplicate from the same user can only land on the same row.
  fn like(conn: &mut PgConnection, form: &VoteForm) -> Result<Self, Error> {
    match form.comment_id {
      Some(_) => insert_into(vote::table)
        .values(form)
        .on_conflict((vote::user_id, vote::comment_id))
        .filter_target(vote::comment_id.is_not_null())
        .do_update()
        .set((form, vote::updated.eq(naive_now())))
        .get_result::<Self>(conn),
      None => insert_into(vote::table)
        .values(form)
        .on_conflict((vote::user_id, vote::post_id))
        .filter_target(vote::comment_id.is_null())
        .do_update()
        .set((form, vote::updated.eq(naive_now())))
        .get_result::<Self>(conn),
    }
  }

  /// Retraction zeroes the value but keeps the row.
  fn remove(conn: &mut PgConnection, form: &VoteForm) -> Result<usize, Error> {
    match form.comment_id {
      Some(comment_id) => diesel::update(
        vote::table
          .filter(vote::user_id.eq(form.user_id))
          .filter(vote::comment_id.eq(comment_id)),
      )
      .set((vote::value.eq(0), vote::updated.eq(naive_now())))
      .execute(conn),
      None => diesel::update(
        vote::table
          .filter(vote::user_id.eq(form.user_id))
          .filter(vote::post_id.eq(form.post_id))
          .filter(vote::comment_id.is_null()),
      )
      .set((vote::value.eq(0), vote::updated.eq(naive_now())))
      .execute(conn),
    }
  }
}

impl Vote {
  pub fn read_for_post(conn: &mut PgConnection, from_post_id: PostId) -> Result<Vec<Self>, Error> {
    vote::table
      .filter(vote::post_id.eq(from_post_id))
      .filter(vote::comment_id.is_null())
      .load::<Self>(conn)
  }
}

#[cfg(test)]
mod tests {
  use super::{Likeable, Vote, VoteForm};
  use crate::{
    establish_unpooled_connection,
    post::{Post, PostForm},
    user::{User_, UserForm},
    Crud,
  };
  use pretty_assertions::assert_eq;
  use serial_test::serial;

  #[test]
  #[serial]
  #[ignore = "requires a migrated postgres at BURROW_DATABASE_URL"]
  fn test_vote_upsert() {
    let conn = &mut establish_unpooled_connection();

    let new_user = UserForm {
      name: "kim".into(),
      password_encrypted: "nope".into(),
      ..UserForm::default()
    };
    let inserted_user = User_::create(conn, &new_user).unwrap();

    let new_post = PostForm {
      creator_id: inserted_user.id,
      name: "A voted-on post".into(),
      ..PostForm::default()
    };
    let inserted_post = Post::create(conn, &new_post).unwrap();

    let vote_form = VoteForm {
      user_id: inserted_user.id,
      post_id: inserted_post.id,
      comment_id: None,
      value: 1,
      updated: None,
    };
    let inserted_vote = Vote::like(conn, &vote_form).unwrap();
    assert_eq!(1, inserted_vote.value);

    // A second like from the same user lands on the same row
    let flipped = Vote::like(
      conn,
      &VoteForm {
        value: -1,
        ..vote_form.clone()
      },
    )
    .unwrap();
    assert_eq!(inserted_vote.id, flipped.id);
    assert_eq!(-1, flipped.value);

    // Retraction keeps the row with a zero value
    let removed = Vote::remove(conn, &vote_form).unwrap();
    assert_eq!(1, removed);
    let votes = Vote::read_for_post(conn, inserted_post.id).unwrap();
    assert_eq!(1, votes.len());
    assert_eq!(0, votes[0].value);

    Post::delete(conn, inserted_post.id).unwrap();
    User_::delete(conn, inserted_user.id).unwrap();
  }
}
