use crate::{blocking, get_user_from_jwt, get_user_from_jwt_opt, is_mod_or_admin, BurrowContext};
use actix_web::web::{Data, Json, Query};
use burrow_db::{
  community::{Community, CommunityForm, CommunityMembership, CommunityMembershipForm},
  naive_now,
  newtypes::CommunityId,
  views::community_view::{CommunityQueryBuilder, CommunityView},
  Crud,
  Joinable,
  MembershipRole,
};
use burrow_structs::community::{
  CommunityResponse,
  CreateCommunity,
  DeleteCommunity,
  DeleteCommunityResponse,
  EditCommunity,
  FollowCommunity,
  FollowCommunityResponse,
  GetCommunity,
  GetCommunityResponse,
  ListCommunities,
  ListCommunitiesResponse,
};
use burrow_utils::{utils::is_valid_community_name, ApiError, BurrowError};

pub async fn create_community(
  data: Json<CreateCommunity>,
  context: Data<BurrowContext>,
) -> Result<Json<CommunityResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  if !is_valid_community_name(&data.id) {
    return Err(ApiError::err("invalid_community_name").into());
  }

  let community_form = CommunityForm {
    id: CommunityId(data.id.to_owned()),
    description: data.description.to_owned(),
    visibility: data.visibility,
    nsfw: data.nsfw,
    icon: data.icon.to_owned(),
    banner: data.banner.to_owned(),
    creator_id: user.id,
    updated: None,
  };

  let inserted_community = match blocking(context.pool(), move |conn| {
    Community::create(conn, &community_form)
  })
  .await?
  {
    Ok(community) => community,
    Err(_e) => return Err(ApiError::err("community_already_exists").into()),
  };

  // The creator starts out as the community's moderator.
  let membership_form = CommunityMembershipForm {
    community_id: inserted_community.id.clone(),
    user_id: user.id,
    role: Some(MembershipRole::Moderator),
  };
  blocking(context.pool(), move |conn| {
    CommunityMembership::join(conn, &membership_form)
  })
  .await??;

  let community_id = inserted_community.id.clone();
  let viewer_id = user.id;
  let community_view = blocking(context.pool(), move |conn| {
    CommunityView::read(conn, community_id, Some(viewer_id))
  })
  .await??;

  Ok(Json(CommunityResponse {
    community: community_view,
  }))
}

pub async fn get_community(
  data: Query<GetCommunity>,
  context: Data<BurrowContext>,
) -> Result<Json<GetCommunityResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt_opt(&data.auth, context.pool()).await?;
  let viewer_id = user.as_ref().map(|u| u.id);

  let community_id = data.id.clone();
  let community_view = blocking(context.pool(), move |conn| {
    CommunityView::read(conn, community_id, viewer_id)
  })
  .await??;

  let membership = match viewer_id {
    Some(viewer_id) => {
      let community_id = data.id.clone();
      blocking(context.pool(), move |conn| {
        CommunityMembership::read_for_user(conn, &community_id, viewer_id)
      })
      .await??
    }
    None => None,
  };

  Ok(Json(GetCommunityResponse {
    community: community_view,
    membership,
  }))
}

pub async fn list_communities(
  data: Query<ListCommunities>,
  context: Data<BurrowContext>,
) -> Result<Json<ListCommunitiesResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt_opt(&data.auth, context.pool()).await?;
  let viewer_id = user.map(|u| u.id);

  let limit = data.limit;
  let communities = blocking(context.pool(), move |conn| {
    CommunityQueryBuilder::create(conn)
      .viewer_id(viewer_id)
      .limit(limit)
      .list()
  })
  .await??;

  Ok(Json(ListCommunitiesResponse { communities }))
}

pub async fn edit_community(
  data: Json<EditCommunity>,
  context: Data<BurrowContext>,
) -> Result<Json<CommunityResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  let community_id = data.id.clone();
  let orig_community =
    blocking(context.pool(), move |conn| Community::read(conn, community_id)).await??;

  is_mod_or_admin(&user, &orig_community.id, context.pool()).await?;

  let community_form = CommunityForm {
    id: orig_community.id.clone(),
    description: data.description.to_owned(),
    visibility: data.visibility,
    nsfw: data.nsfw,
    icon: data.icon.to_owned(),
    banner: data.banner.to_owned(),
    creator_id: orig_community.creator_id,
    updated: Some(naive_now()),
  };

  let community_id = data.id.clone();
  let updated_community = match blocking(context.pool(), move |conn| {
    Community::update(conn, community_id, &community_form)
  })
  .await?
  {
    Ok(community) => community,
    Err(_e) => return Err(ApiError::err("couldnt_update_community").into()),
  };

  let viewer_id = user.id;
  let community_view = blocking(context.pool(), move |conn| {
    CommunityView::read(conn, updated_community.id, Some(viewer_id))
  })
  .await??;

  Ok(Json(CommunityResponse {
    community: community_view,
  }))
}

/// Soft deletion: the community drops out of listings and reads, its rows
/// stay put.
pub async fn delete_community(
  data: Json<DeleteCommunity>,
  context: Data<BurrowContext>,
) -> Result<Json<DeleteCommunityResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  let community_id = data.id.clone();
  let orig_community =
    blocking(context.pool(), move |conn| Community::read(conn, community_id)).await??;

  is_mod_or_admin(&user, &orig_community.id, context.pool()).await?;

  let community_id = data.id.clone();
  blocking(context.pool(), move |conn| {
    Community::update_deleted(conn, community_id, true)
  })
  .await??;

  Ok(Json(DeleteCommunityResponse {
    id: data.id,
    deleted: true,
  }))
}

pub async fn follow_community(
  data: Json<FollowCommunity>,
  context: Data<BurrowContext>,
) -> Result<Json<FollowCommunityResponse>, BurrowError> {
  let data = data.into_inner();
  let user = get_user_from_jwt(&data.auth, context.pool()).await?;

  // Reading through the view enforces visibility: a private community can
  // only be joined by someone who is already a member, so membership there
  // is bootstrapped by the creator alone.
  let community_id = data.community_id.clone();
  let viewer_id = user.id;
  blocking(context.pool(), move |conn| {
    CommunityView::read(conn, community_id, Some(viewer_id))
  })
  .await??;

  let membership_form = CommunityMembershipForm {
    community_id: data.community_id.clone(),
    user_id: user.id,
    role: Some(MembershipRole::Member),
  };

  if data.follow {
    if blocking(context.pool(), move |conn| {
      CommunityMembership::join(conn, &membership_form)
    })
    .await?
    .is_err()
    {
      return Err(ApiError::err("already_a_member").into());
    }
  } else {
    blocking(context.pool(), move |conn| {
      CommunityMembership::leave(conn, &membership_form)
    })
    .await??;
  }

  Ok(Json(FollowCommunityResponse {
    community_id: data.community_id,
    joined: data.follow,
  }))
}
