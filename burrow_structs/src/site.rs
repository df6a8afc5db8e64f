use serde::Serialize;

#[derive(Serialize)]
pub struct GetSiteResponse {
  pub site_name: String,
  pub version: String,
}
