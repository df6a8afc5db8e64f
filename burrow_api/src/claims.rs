use burrow_utils::settings::Settings;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

type Jwt = String;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  pub id: i32,
  pub iss: String,
}

impl Claims {
  pub fn decode(jwt: &str) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    // Tokens carry no expiry.
    validation.validate_exp = false;
    validation.required_spec_claims.remove("exp");
    decode::<Claims>(
      jwt,
      &DecodingKey::from_secret(Settings::get().jwt_secret.as_ref()),
      &validation,
    )
  }

  pub fn jwt(user_id: i32) -> Result<Jwt, jsonwebtoken::errors::Error> {
    let my_claims = Claims {
      id: user_id,
      iss: Settings::get().hostname,
    };
    encode(
      &Header::default(),
      &my_claims,
      &EncodingKey::from_secret(Settings::get().jwt_secret.as_ref()),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::Claims;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_jwt_round_trip() {
    let jwt = Claims::jwt(42).unwrap();
    let decoded = Claims::decode(&jwt).unwrap();
    assert_eq!(42, decoded.claims.id);
  }

  #[test]
  fn test_garbage_jwt_is_rejected() {
    assert!(Claims::decode("definitely.not.a-token").is_err());
  }
}
