use actix_web::web::Json;
use burrow_structs::site::GetSiteResponse;
use burrow_utils::{settings::Settings, version::VERSION, BurrowError};

pub async fn get_site() -> Result<Json<GetSiteResponse>, BurrowError> {
  Ok(Json(GetSiteResponse {
    site_name: Settings::get().site_name,
    version: VERSION.to_string(),
  }))
}
