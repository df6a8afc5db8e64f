use burrow_db::{
  community::CommunityMembership,
  newtypes::CommunityId,
  views::community_view::CommunityView,
  CommunityVisibility,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct CreateCommunity {
  pub id: String,
  pub description: Option<String>,
  pub visibility: Option<CommunityVisibility>,
  pub nsfw: Option<bool>,
  pub icon: Option<String>,
  pub banner: Option<String>,
  pub auth: String,
}

#[derive(Serialize, Clone)]
pub struct CommunityResponse {
  pub community: CommunityView,
}

#[derive(Deserialize, Debug)]
pub struct GetCommunity {
  pub id: CommunityId,
  pub auth: Option<String>,
}

#[derive(Serialize)]
pub struct GetCommunityResponse {
  pub community: CommunityView,
  pub membership: Option<CommunityMembership>,
}

#[derive(Deserialize, Debug)]
pub struct ListCommunities {
  pub limit: Option<i64>,
  pub auth: Option<String>,
}

#[derive(Serialize)]
pub struct ListCommunitiesResponse {
  pub communities: Vec<CommunityView>,
}

#[derive(Deserialize, Debug)]
pub struct EditCommunity {
  pub id: CommunityId,
  pub description: Option<String>,
  pub visibility: Option<CommunityVisibility>,
  pub nsfw: Option<bool>,
  pub icon: Option<String>,
  pub banner: Option<String>,
  pub auth: String,
}

#[derive(Deserialize, Debug)]
pub struct DeleteCommunity {
  pub id: CommunityId,
  pub auth: String,
}

#[derive(Serialize)]
pub struct DeleteCommunityResponse {
  pub id: CommunityId,
  pub deleted: bool,
}

#[derive(Deserialize, Debug)]
pub struct FollowCommunity {
  pub community_id: CommunityId,
  pub follow: bool,
  pub auth: String,
}

#[derive(Serialize)]
pub struct FollowCommunityResponse {
  pub community_id: CommunityId,
  pub joined: bool,
}
