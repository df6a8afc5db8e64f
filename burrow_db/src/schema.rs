pub mod sql_types {
  #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
  #[diesel(postgres_type(name = "community_visibility"))]
  pub struct CommunityVisibilityType;

  #[derive(diesel::query_builder::QueryId, diesel::sql_types::SqlType)]
  #[diesel(postgres_type(name = "membership_role"))]
  pub struct MembershipRoleType;
}

diesel::table! {
  user_ (id) {
    id -> Int4,
    name -> Varchar,
    password_encrypted -> Text,
    email -> Nullable<Text>,
    admin -> Bool,
    banned -> Bool,
    published -> Timestamp,
    updated -> Nullable<Timestamp>,
  }
}

diesel::table! {
  use diesel::sql_types::*;
  use super::sql_types::CommunityVisibilityType;

  community (id) {
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
  }
}

diesel::table! {
  use diesel::sql_types::*;
  use super::sql_types::MembershipRoleType;

  community_membership (id) {
    id -> Int4,
    community_id -> Varchar,
    user_id -> Int4,
    role -> MembershipRoleType,
    published -> Timestamp,
  }
}

diesel::table! {
  post (id) {
    id -> Int4,
    creator_id -> Int4,
    community_id -> Nullable<Varchar>,
    name -> Varchar,
    body -> Nullable<Text>,
    deleted -> Bool,
    published -> Timestamp,
    updated -> Nullable<Timestamp>,
  }
}

diesel::table! {
  comment (id) {
    id -> Int4,
    creator_id -> Int4,
    post_id -> Int4,
    parent_id -> Nullable<Int4>,
    content -> Text,
    deleted -> Bool,
    published -> Timestamp,
    updated -> Nullable<Timestamp>,
  }
}

diesel::table! {
  vote (id) {
    id -> Int4,
    user_id -> Int4,
    post_id -> Int4,
    comment_id -> Nullable<Int4>,
    value -> Int2,
    published -> Timestamp,
    updated -> Nullable<Timestamp>,
  }
}

diesel::table! {
  post_saved (id) {
    id -> Int4,
    post_id -> Int4,
    user_id -> Int4,
    published -> Timestamp,
  }
}

diesel::table! {
  comment_saved (id) {
    id -> Int4,
    comment_id -> Int4,
    user_id -> Int4,
    published -> Timestamp,
  }
}

diesel::joinable!(community -> user_ (creator_id));
diesel::joinable!(community_membership -> community (community_id));
diesel::joinable!(community_membership -> user_ (user_id));
diesel::joinable!(post -> user_ (creator_id));
diesel::joinable!(post -> community (community_id));
diesel::joinable!(comment -> user_ (creator_id));
diesel::joinable!(comment -> post (post_id));
diesel::joinable!(vote -> user_ (user_id));
diesel::joinable!(vote -> post (post_id));
diesel::joinable!(vote -> comment (comment_id));
diesel::joinable!(post_saved -> post (post_id));
diesel::joinable!(post_saved -> user_ (user_id));
diesel::joinable!(comment_saved -> comment (comment_id));
diesel::joinable!(comment_saved -> user_ (user_id));

diesel::allow_tables_to_appear_in_same_query!(
  user_,
  community,
  community_membership,
  post,
  comment,
  vote,
  post_saved,
  comment_saved,
);
