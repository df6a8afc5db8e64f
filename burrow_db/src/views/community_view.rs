use crate::{
  fetch_limit,
  newtypes::{CommunityId, UserId},
  schema::community_membership,
  CommunityVisibility,
  MaybeOptional,
};
use diesel::{dsl::exists, pg::Pg, prelude::*, result::Error, sql_types};
use serde::{Deserialize, Serialize};

diesel::table! {
  use diesel::sql_types::*;
  use crate::schema::sql_types::CommunityVisibilityType;

  community_view (id) {
    id -> Varchar,
    description -> Nullable<Text>,
    visibility -> CommunityVisibilityType,
    nsfw -> Bool,
    icon -> Nullable<Text>,
    banner -> Nullable<Text>,
    creator_id -> Int4,
    deleted -> Bool,
    published -> Timestamp,
    updated -> Nullable<Timestamp>,
    creator_name -> Varchar,
    number_of_members -> BigInt,
  }
}

diesel::allow_tables_to_appear_in_same_query!(community_view, community_membership);

#[derive(Clone, Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[diesel(table_name = community_view)]
pub struct CommunityView {
  pub id: CommunityId,
  pub description: Option<String>,
  pub visibility: CommunityVisibility,
  pub nsfw: bool,
  pub icon: Option<String>,
  pub banner: Option<String>,
  pub creator_id: UserId,
  pub deleted: bool,
  pub published: chrono::NaiveDateTime,
  pub updated: Option<chrono::NaiveDateTime>,
  pub creator_name: String,
  pub number_of_members: i64,
}

type BoxedCondition =
  Box<dyn BoxableExpression<community_view::table, Pg, SqlType = sql_types::Bool>>;

// Same rule as for posts: private communities exist only for their members.
fn visible_to(viewer_id: Option<UserId>) -> BoxedCondition {
  let not_private = community_view::visibility.ne(CommunityVisibility::Private);
  match viewer_id {
    Some(viewer_id) => Box::new(
      not_private.or(exists(
        community_membership::table
          .filter(community_membership::community_id.eq(community_view::id))
          .filter(community_membership::user_id.eq(viewer_id)),
      )),
    ),
    None => Box::new(not_private),
  }
}

impl CommunityView {
  pub fn read(
    conn: &mut PgConnection,
    from_community_id: CommunityId,
    viewer_id: Option<UserId>,
  ) -> Result<Self, Error> {
    community_view::table
      .find(from_community_id)
      .filter(visible_to(viewer_id))
      .filter(community_view::deleted.eq(false))
      .first::<Self>(conn)
  }
}

pub struct CommunityQueryBuilder<'a> {
  conn: &'a mut PgConnection,
  viewer_id: Option<UserId>,
  limit: Option<i64>,
}

impl<'a> CommunityQueryBuilder<'a> {
  pub fn create(conn: &'a mut PgConnection) -> Self {
    CommunityQueryBuilder {
      conn,
      viewer_id: None,
      limit: None,
    }
  }

  pub fn viewer_id<T: MaybeOptional<UserId>>(mut self, viewer_id: T) -> Self {
    self.viewer_id = viewer_id.get_optional();
    self
  }

  pub fn limit<T: MaybeOptional<i64>>(mut self, limit: T) -> Self {
    self.limit = limit.get_optional();
    self
  }

  pub fn list(self) -> Result<Vec<CommunityView>, Error> {
    let limit = fetch_limit(self.limit)?;

    community_view::table
      .filter(visible_to(self.viewer_id))
      .filter(community_view::deleted.eq(false))
      .order_by(community_view::number_of_members.desc())
      .then_order_by(community_view::id.asc())
      .limit(limit)
      .load::<CommunityView>(self.conn)
  }
}
