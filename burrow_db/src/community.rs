use crate::{
  naive_now,
  newtypes::{CommunityId, UserId},
  schema::{community, community_membership},
  CommunityVisibility,
  Crud,
  Joinable,
  MembershipRole,
};
use diesel::{
  dsl::{exists, insert_into},
  prelude::*,
  result::Error,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[diesel(table_name = community)]
pub struct Community {
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
}

#[derive(Insertable, AsChangeset, Clone, Default)]
#[diesel(table_name = community)]
pub struct CommunityForm {
  pub id: CommunityId,
  pub description: Option<String>,
  pub visibility: Option<CommunityVisibility>,
  pub nsfw: Option<bool>,
  pub icon: Option<String>,
  pub banner: Option<String>,
  pub creator_id: UserId,
  pub updated: Option<chrono::NaiveDateTime>,
}

impl Crud<CommunityForm, CommunityId> for Community {
  fn read(conn: &mut PgConnection, community_id: CommunityId) -> Result<Self, Error> {
    community::table.find(community_id).first::<Self>(conn)
  }

  fn create(conn: &mut PgConnection, form: &CommunityForm) -> Result<Self, Error> {
    insert_into(community::table)
      .values(form)
      .get_result::<Self>(conn)
  }

  fn update(
    conn: &mut PgConnection,
    community_id: CommunityId,
    form: &CommunityForm,
  ) -> Result<Self, Error> {
    diesel::update(community::table.find(community_id))
      .set(form)
      .get_result::<Self>(conn)
  }

  fn delete(conn: &mut PgConnection, community_id: CommunityId) -> Result<usize, Error> {
    diesel::delete(community::table.find(community_id)).execute(conn)
  }
}

impl Community {
  pub fn update_deleted(
    conn: &mut PgConnection,
    community_id: CommunityId,
    new_deleted: bool,
  ) -> Result<Self, Error> {
    diesel::update(community::table.find(community_id))
      .set((
        community::deleted.eq(new_deleted),
        community::updated.eq(naive_now()),
      ))
      .get_result::<Self>(conn)
  }
}

#[derive(Clone, Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[diesel(table_name = community_membership)]
pub struct CommunityMembership {
  pub id: i32,
  pub community_id: CommunityId,
  pub user_id: UserId,
  pub role: MembershipRole,
  pub published: chrono::NaiveDateTime,
}

#[derive(Insertable, AsChangeset, Clone)]
#[diesel(table_name = community_membership)]
pub struct CommunityMembershipForm {
  pub community_id: CommunityId,
  pub user_id: UserId,
  pub role: Option<MembershipRole>,
}

impl Joinable<CommunityMembershipForm> for CommunityMembership {
  fn join(conn: &mut PgConnection, form: &CommunityMembershipForm) -> Result<Self, Error> {
    insert_into(community_membership::table)
      .values(form)
      .get_result::<Self>(conn)
  }

  fn leave(conn: &mut PgConnection, form: &CommunityMembershipForm) -> Result<usize, Error> {
    diesel::delete(
      community_membership::table
        .filter(community_membership::community_id.eq(form.community_id.clone()))
        .filter(community_membership::user_id.eq(form.user_id)),
    )
    .execute(conn)
  }
}

impl CommunityMembership {
  pub fn read_for_user(
    conn: &mut PgConnection,
    from_community_id: &CommunityId,
    from_user_id: UserId,
  ) -> Result<Option<Self>, Error> {
    community_membership::table
      .filter(community_membership::community_id.eq(from_community_id.clone()))
      .filter(community_membership::user_id.eq(from_user_id))
      .first::<Self>(conn)
      .optional()
  }

  pub fn is_member(
    conn: &mut PgConnection,
    from_community_id: &CommunityId,
    from_user_id: UserId,
  ) -> Result<bool, Error> {
    diesel::select(exists(
      community_membership::table
        .filter(community_membership::community_id.eq(from_community_id.clone()))
        .filter(community_membership::user_id.eq(from_user_id)),
    ))
    .get_result::<bool>(conn)
  }

  pub fn is_moderator(
    conn: &mut PgConnection,
    from_community_id: &CommunityId,
    from_user_id: UserId,
  ) -> Result<bool, Error> {
    diesel::select(exists(
      community_membership::table
        .filter(community_membership::community_id.eq(from_community_id.clone()))
        .filter(community_membership::user_id.eq(from_user_id))
        .filter(community_membership::role.eq(MembershipRole::Moderator)),
    ))
    .get_result::<bool>(conn)
  }
}

#[cfg(test)]
mod tests {
  use super::{
    Community,
    CommunityForm,
    CommunityMembership,
    CommunityMembershipForm,
    Crud,
    Joinable,
    MembershipRole,
  };
  use crate::{
    establish_unpooled_connection,
    newtypes::CommunityId,
    user::{User_, UserForm},
    CommunityVisibility,
  };
  use pretty_assertions::assert_eq;
  use serial_test::serial;

  #[test]
  #[serial]
  #[ignore = "requires a migrated postgres at BURROW_DATABASE_URL"]
  fn test_crud() {
    let conn = &mut establish_unpooled_connection();

    let new_user = UserForm {
      name: "bonnie".into(),
      password_encrypted: "nope".into(),
      ..UserForm::default()
    };
    let inserted_user = User_::create(conn, &new_user).unwrap();

    let new_community = CommunityForm {
      id: CommunityId("test_community".into()),
      description: Some("a test community".into()),
      visibility: Some(CommunityVisibility::Private),
      creator_id: inserted_user.id,
      ..CommunityForm::default()
    };
    let inserted_community = Community::create(conn, &new_community).unwrap();

    assert_eq!(CommunityVisibility::Private, inserted_community.visibility);

    let membership_form = CommunityMembershipForm {
      community_id: inserted_community.id.clone(),
      user_id: inserted_user.id,
      role: Some(MembershipRole::Moderator),
    };
    let inserted_membership = CommunityMembership::join(conn, &membership_form).unwrap();

    assert_eq!(MembershipRole::Moderator, inserted_membership.role);
    assert!(CommunityMembership::is_member(conn, &inserted_community.id, inserted_user.id).unwrap());
    assert!(
      CommunityMembership::is_moderator(conn, &inserted_community.id, inserted_user.id).unwrap()
    );

    let left = CommunityMembership::leave(conn, &membership_form).unwrap();
    let num_deleted = Community::delete(conn, inserted_community.id.clone()).unwrap();
    User_::delete(conn, inserted_user.id).unwrap();

    assert_eq!(1, left);
    assert_eq!(1, num_deleted);
  }
}
