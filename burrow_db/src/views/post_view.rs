use crate::{
  fetch_limit,
  newtypes::{CommunityId, PostId, UserId},
  schema::{community_membership, post_saved},
  CommunityVisibility,
  MaybeOptional,
  SortType,
};
use diesel::{dsl::exists, pg::Pg, prelude::*, result::Error, sql_types};
use serde::{Deserialize, Serialize};

// The post_view SQL view joins creator and community onto the post and
// recomputes the vote score on every read. A post without a community
// surfaces as `public` visibility here.
diesel::table! {
  use diesel::sql_types::*;
  use crate::schema::sql_types::CommunityVisibilityType;

  post_view (id) {
    id -> Int4,
    creator_id -> Int4,
    community_id -> Nullable<Varchar>,
    name -> Varchar,
    body -> Nullable<Text>,
    deleted -> Bool,
    published -> Timestamp,
    updated -> Nullable<Timestamp>,
    creator_name -> Varchar,
    community_visibility -> CommunityVisibilityType,
    score -> BigInt,
  }
}

diesel::allow_tables_to_appear_in_same_query!(post_view, community_membership);
diesel::allow_tables_to_appear_in_same_query!(post_view, post_saved);

#[derive(Clone, Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[diesel(table_name = post_view)]
pub struct PostView {
  pub id: PostId,
  pub creator_id: UserId,
  pub community_id: Option<CommunityId>,
  pub name: String,
  pub body: Option<String>,
  pub deleted: bool,
  pub published: chrono::NaiveDateTime,
  pub updated: Option<chrono::NaiveDateTime>,
  pub creator_name: String,
  pub community_visibility: CommunityVisibility,
  pub score: i64,
}

/// The keyset cursor. `score` is only meaningful for `SortType::Popular`,
/// where ordering is (score, post id) with the id as tie breaker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostCursor {
  pub post_id: PostId,
  pub score: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
  pub posts: Vec<PostView>,
  pub next_cursor: Option<PostCursor>,
}

type BoxedCondition =
  Box<dyn BoxableExpression<post_view::table, Pg, SqlType = sql_types::Bool>>;

/// The one visibility predicate shared by every listing path and the single
/// read: a post is visible when its community is not private, or when the
/// viewer holds a membership row in that community.
fn visible_to(viewer_id: Option<UserId>) -> BoxedCondition {
  let not_private = post_view::community_visibility.ne(CommunityVisibility::Private);
  match viewer_id {
    Some(viewer_id) => Box::new(
      not_private.or(exists(
        community_membership::table
          .filter(
            community_membership::community_id
              .nullable()
              .eq(post_view::community_id),
          )
          .filter(community_membership::user_id.eq(viewer_id)),
      )),
    ),
    None => Box::new(not_private),
  }
}

impl PostView {
  /// A filtered-out private post is indistinguishable from an absent one.
  pub fn read(
    conn: &mut PgConnection,
    from_post_id: PostId,
    viewer_id: Option<UserId>,
  ) -> Result<Self, Error> {
    post_view::table
      .find(from_post_id)
      .filter(visible_to(viewer_id))
      .first::<Self>(conn)
  }
}

pub struct PostQueryBuilder<'a> {
  conn: &'a mut PgConnection,
  sort: SortType,
  viewer_id: Option<UserId>,
  for_community_id: Option<CommunityId>,
  saved_only: bool,
  cursor: Option<PostCursor>,
  limit: Option<i64>,
}

impl<'a> PostQueryBuilder<'a> {
  pub fn create(conn: &'a mut PgConnection) -> Self {
    PostQueryBuilder {
      conn,
      sort: SortType::New,
      viewer_id: None,
      for_community_id: None,
      saved_only: false,
      cursor: None,
      limit: None,
    }
  }

  pub fn sort(mut self, sort: SortType) -> Self {
    self.sort = sort;
    self
  }

  pub fn viewer_id<T: MaybeOptional<UserId>>(mut self, viewer_id: T) -> Self {
    self.viewer_id = viewer_id.get_optional();
    self
  }

  pub fn for_community_id<T: MaybeOptional<CommunityId>>(mut self, for_community_id: T) -> Self {
    self.for_community_id = for_community_id.get_optional();
    self
  }

  pub fn saved_only(mut self, saved_only: bool) -> Self {
    self.saved_only = saved_only;
    self
  }

  pub fn cursor<T: MaybeOptional<PostCursor>>(mut self, cursor: T) -> Self {
    self.cursor = cursor.get_optional();
    self
  }

  pub fn limit<T: MaybeOptional<i64>>(mut self, limit: T) -> Self {
    self.limit = limit.get_optional();
    self
  }

  pub fn page(self) -> Result<PostPage, Error> {
    let limit = fetch_limit(self.limit)?;

    // Bookmarks are per user, so an anonymous saved listing is empty.
    if self.saved_only && self.viewer_id.is_none() {
      return Ok(PostPage {
        posts: vec![],
        next_cursor: None,
      });
    }

    let mut query = post_view::table.into_boxed();

    // Access control composes with the cursor predicate via AND, ahead of
    // the limit, so cursor arithmetic stays correct.
    query = query
      .filter(visible_to(self.viewer_id))
      .filter(post_view::deleted.eq(false));

    if let Some(for_community_id) = self.for_community_id.clone() {
      query = query.filter(post_view::community_id.eq(for_community_id));
    }

    if self.saved_only {
      if let Some(viewer_id) = self.viewer_id {
        query = query.filter(exists(
          post_saved::table
            .filter(post_saved::post_id.eq(post_view::id))
            .filter(post_saved::user_id.eq(viewer_id)),
        ));
      }
    }

    query = match self.sort {
      SortType::New => {
        if let Some(cursor) = self.cursor {
          query = query.filter(post_view::id.lt(cursor.post_id));
        }
        query.order_by(post_view::id.desc())
      }
      SortType::Popular => {
        if let Some(cursor) = self.cursor {
          let cursor_score = cursor.score.unwrap_or_default();
          // A single compound predicate, so rows at a score boundary are
          // neither skipped nor repeated.
          query = query.filter(
            post_view::score.lt(cursor_score).or(
              post_view::score
                .eq(cursor_score)
                .and(post_view::id.lt(cursor.post_id)),
            ),
          );
        }
        query
          .order_by(post_view::score.desc())
          .then_order_by(post_view::id.desc())
      }
    };

    // Fetch one row past the limit instead of issuing a second
    // existence-check query.
    let rows = query.limit(limit + 1).load::<PostView>(self.conn)?;
    Ok(build_page(rows, limit, self.sort))
  }
}

fn build_page(mut rows: Vec<PostView>, limit: i64, sort: SortType) -> PostPage {
  let limit = limit as usize;
  let has_more = rows.len() > limit;
  rows.truncate(limit);
  let next_cursor = if has_more {
    rows.last().map(|last| PostCursor {
      post_id: last.id,
      score: match sort {
        SortType::Popular => Some(last.score),
        SortType::New => None,
      },
    })
  } else {
    None
  };
  PostPage {
    posts: rows,
    next_cursor,
  }
}

#[cfg(test)]
mod tests {
  use super::{build_page, PostCursor, PostQueryBuilder, PostView};
  use crate::{
    community::{Community, CommunityForm, CommunityMembership, CommunityMembershipForm},
    establish_unpooled_connection,
    newtypes::{CommunityId, PostId, UserId},
    post::{Post, PostForm},
    user::{User_, UserForm},
    vote::{Vote, VoteForm},
    comment::{Comment, CommentForm},
    CommunityVisibility,
    Crud,
    Joinable,
    Likeable,
    SortType,
  };
  use pretty_assertions::assert_eq;
  use serial_test::serial;

  fn dummy_view(id: i32, score: i64) -> PostView {
    PostView {
      id: PostId(id),
      creator_id: UserId(1),
      community_id: None,
      name: format!("post {}", id),
      body: None,
      deleted: false,
      published: chrono::NaiveDateTime::default(),
      updated: None,
      creator_name: "someone".into(),
      community_visibility: CommunityVisibility::Public,
      score,
    }
  }

  #[test]
  fn test_build_page_trims_the_probe_row() {
    let rows = vec![
      dummy_view(9, 5),
      dummy_view(8, 4),
      dummy_view(7, 3),
      dummy_view(6, 2),
    ];
    let page = build_page(rows, 3, SortType::Popular);
    assert_eq!(3, page.posts.len());
    assert_eq!(
      Some(PostCursor {
        post_id: PostId(7),
        score: Some(3),
      }),
      page.next_cursor
    );
  }

  #[test]
  fn test_build_page_exact_boundary_has_no_next() {
    // limit hits exactly the remaining rows: no trailing empty page
    let rows = vec![dummy_view(3, 0), dummy_view(2, 0), dummy_view(1, 0)];
    let page = build_page(rows, 3, SortType::New);
    assert_eq!(3, page.posts.len());
    assert_eq!(None, page.next_cursor);
  }

  #[test]
  fn test_build_page_new_cursor_has_no_score() {
    let rows = vec![dummy_view(5, 9), dummy_view(4, 9), dummy_view(3, 9)];
    let page = build_page(rows, 2, SortType::New);
    assert_eq!(
      Some(PostCursor {
        post_id: PostId(4),
        score: None,
      }),
      page.next_cursor
    );
  }

  #[test]
  fn test_build_page_empty() {
    let page = build_page(vec![], 10, SortType::New);
    assert!(page.posts.is_empty());
    assert_eq!(None, page.next_cursor);
  }

  struct Data {
    alice: User_,
    bob: User_,
    community: Community,
  }

  fn init_data(conn: &mut diesel::PgConnection) -> Data {
    let alice = User_::create(
      conn,
      &UserForm {
        name: "alice_pv".into(),
        password_encrypted: "nope".into(),
        ..UserForm::default()
      },
    )
    .unwrap();
    let bob = User_::create(
      conn,
      &UserForm {
        name: "bob_pv".into(),
        password_encrypted: "nope".into(),
        ..UserForm::default()
      },
    )
    .unwrap();
    let community = Community::create(
      conn,
      &CommunityForm {
        id: CommunityId("post_view_tests".into()),
        creator_id: alice.id,
        ..CommunityForm::default()
      },
    )
    .unwrap();
    Data {
      alice,
      bob,
      community,
    }
  }

  fn cleanup(data: Data, conn: &mut diesel::PgConnection) {
    Community::delete(conn, data.community.id).unwrap();
    User_::delete(conn, data.alice.id).unwrap();
    User_::delete(conn, data.bob.id).unwrap();
  }

  fn create_post(conn: &mut diesel::PgConnection, data: &Data, name: &str) -> Post {
    Post::create(
      conn,
      &PostForm {
        creator_id: data.alice.id,
        community_id: Some(data.community.id.clone()),
        name: name.into(),
        ..PostForm::default()
      },
    )
    .unwrap()
  }

  fn vote_on(conn: &mut diesel::PgConnection, user: UserId, post: PostId, value: i16) {
    Vote::like(
      conn,
      &VoteForm {
        user_id: user,
        post_id: post,
        comment_id: None,
        value,
        updated: None,
      },
    )
    .unwrap();
  }

  #[test]
  #[serial]
  #[ignore = "requires a migrated postgres at BURROW_DATABASE_URL"]
  fn test_keyset_pagination_new() {
    let conn = &mut establish_unpooled_connection();
    let data = init_data(conn);

    let posts: Vec<Post> = (0..5)
      .map(|i| create_post(conn, &data, &format!("keyset post {}", i)))
      .collect();

    let mut seen = vec![];
    let mut cursor = None;
    loop {
      let page = PostQueryBuilder::create(conn)
        .sort(SortType::New)
        .for_community_id(data.community.id.clone())
        .cursor(cursor)
        .limit(2)
        .page()
        .unwrap();
      seen.extend(page.posts.iter().map(|p| p.id));
      match page.next_cursor {
        Some(c) => cursor = Some(c),
        None => break,
      }
    }

    // Newest first, no duplicates, no omissions.
    let mut expected: Vec<_> = posts.iter().map(|p| p.id).collect();
    expected.reverse();
    assert_eq!(expected, seen);

    for p in posts {
      Post::delete(conn, p.id).unwrap();
    }
    cleanup(data, conn);
  }

  #[test]
  #[serial]
  #[ignore = "requires a migrated postgres at BURROW_DATABASE_URL"]
  fn test_popular_sort_breaks_ties_by_id() {
    let conn = &mut establish_unpooled_connection();
    let data = init_data(conn);

    // b gets the lowest id, c the highest; scores: a = 2, b = 2, c = 1
    let b = create_post(conn, &data, "post b");
    let a = create_post(conn, &data, "post a");
    let c = create_post(conn, &data, "post c");
    for user in [data.alice.id, data.bob.id] {
      vote_on(conn, user, a.id, 1);
      vote_on(conn, user, b.id, 1);
    }
    vote_on(conn, data.alice.id, c.id, 1);

    let page = PostQueryBuilder::create(conn)
      .sort(SortType::Popular)
      .for_community_id(data.community.id.clone())
      .page()
      .unwrap();
    let ids: Vec<_> = page.posts.iter().map(|p| p.id).collect();
    // Score dominates; the id only decides between the tied pair.
    assert_eq!(vec![a.id, b.id, c.id], ids);

    // Paging one at a time must cross the tie boundary without skips.
    let mut seen = vec![];
    let mut cursor = None;
    loop {
      let page = PostQueryBuilder::create(conn)
        .sort(SortType::Popular)
        .for_community_id(data.community.id.clone())
        .cursor(cursor)
        .limit(1)
        .page()
        .unwrap();
      seen.extend(page.posts.iter().map(|p| p.id));
      match page.next_cursor {
        Some(next) => cursor = Some(next),
        None => break,
      }
    }
    assert_eq!(vec![a.id, b.id, c.id], seen);

    for p in [a, b, c] {
      Post::delete(conn, p.id).unwrap();
    }
    cleanup(data, conn);
  }

  #[test]
  #[serial]
  #[ignore = "requires a migrated postgres at BURROW_DATABASE_URL"]
  fn test_score_counts_post_votes_only() {
    let conn = &mut establish_unpooled_connection();
    let data = init_data(conn);
    let post = create_post(conn, &data, "scored post");

    vote_on(conn, data.alice.id, post.id, 1);
    vote_on(conn, data.bob.id, post.id, -1);

    // A comment vote on the same post must not contribute.
    let comment = Comment::create(
      conn,
      &CommentForm {
        creator_id: data.alice.id,
        post_id: post.id,
        content: "a comment".into(),
        ..CommentForm::default()
      },
    )
    .unwrap();
    Vote::like(
      conn,
      &VoteForm {
        user_id: data.bob.id,
        post_id: post.id,
        comment_id: Some(comment.id),
        value: 1,
        updated: None,
      },
    )
    .unwrap();

    let view = PostView::read(conn, post.id, Some(data.alice.id)).unwrap();
    assert_eq!(0, view.score);

    // Retract the downvote; the score reflects the removal exactly once.
    Vote::remove(
      conn,
      &VoteForm {
        user_id: data.bob.id,
        post_id: post.id,
        comment_id: None,
        value: 0,
        updated: None,
      },
    )
    .unwrap();
    let view = PostView::read(conn, post.id, Some(data.alice.id)).unwrap();
    assert_eq!(1, view.score);

    Comment::delete(conn, comment.id).unwrap();
    Post::delete(conn, post.id).unwrap();
    cleanup(data, conn);
  }

  #[test]
  #[serial]
  #[ignore = "requires a migrated postgres at BURROW_DATABASE_URL"]
  fn test_private_community_visibility() {
    let conn = &mut establish_unpooled_connection();
    let data = init_data(conn);

    let private_community = Community::create(
      conn,
      &CommunityForm {
        id: CommunityId("pv_private".into()),
        creator_id: data.alice.id,
        visibility: Some(CommunityVisibility::Private),
        ..CommunityForm::default()
      },
    )
    .unwrap();
    CommunityMembership::join(
      conn,
      &CommunityMembershipForm {
        community_id: private_community.id.clone(),
        user_id: data.alice.id,
        role: None,
      },
    )
    .unwrap();

    let post = Post::create(
      conn,
      &PostForm {
        creator_id: data.alice.id,
        community_id: Some(private_community.id.clone()),
        name: "members only".into(),
        ..PostForm::default()
      },
    )
    .unwrap();

    // Member sees it, non-member and anonymous don't.
    assert!(PostView::read(conn, post.id, Some(data.alice.id)).is_ok());
    assert!(PostView::read(conn, post.id, Some(data.bob.id)).is_err());
    assert!(PostView::read(conn, post.id, None).is_err());

    let member_page = PostQueryBuilder::create(conn)
      .viewer_id(data.alice.id)
      .page()
      .unwrap();
    assert!(member_page.posts.iter().any(|p| p.id == post.id));

    let anon_page = PostQueryBuilder::create(conn).page().unwrap();
    assert!(!anon_page.posts.iter().any(|p| p.id == post.id));

    Post::delete(conn, post.id).unwrap();
    Community::delete(conn, private_community.id).unwrap();
    cleanup(data, conn);
  }
}
