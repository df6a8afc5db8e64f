use crate::{newtypes::UserId, schema::user_, Crud};
use bcrypt::{hash, DEFAULT_COST};
use diesel::{dsl::insert_into, prelude::*, result::Error};
use serde::{Deserialize, Serialize};

#[derive(Clone, Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[diesel(table_name = user_)]
pub struct User_ {
  pub id: UserId,
  pub name: String,
  #[serde(skip)]
  pub password_encrypted: String,
  #[serde(skip)]
  pub email: Option<String>,
  pub admin: bool,
  pub banned: bool,
  pub published: chrono::NaiveDateTime,
  pub updated: Option<chrono::NaiveDateTime>,
}

#[derive(Insertable, AsChangeset, Clone, Default)]
#[diesel(table_name = user_)]
pub struct UserForm {
  pub name: String,
  pub password_encrypted: String,
  pub email: Option<String>,
  pub admin: Option<bool>,
  pub banned: Option<bool>,
  pub updated: Option<chrono::NaiveDateTime>,
}

impl Crud<UserForm, UserId> for User_ {
  fn read(conn: &mut PgConnection, user_id: UserId) -> Result<Self, Error> {
    user_::table.find(user_id).first::<Self>(conn)
  }

  fn create(conn: &mut PgConnection, form: &UserForm) -> Result<Self, Error> {
    insert_into(user_::table)
      .values(form)
      .get_result::<Self>(conn)
  }

  fn update(conn: &mut PgConnection, user_id: UserId, form: &UserForm) -> Result<Self, Error> {
    diesel::update(user_::table.find(user_id))
      .set(form)
      .get_result::<Self>(conn)
  }

  fn delete(conn: &mut PgConnection, user_id: UserId) -> Result<usize, Error> {
    diesel::delete(user_::table.find(user_id)).execute(conn)
  }
}

impl User_ {
  /// Hashes the plaintext password in the form before inserting.
  pub fn register(conn: &mut PgConnection, form: &UserForm) -> Result<Self, Error> {
    let mut edited_user = form.clone();
    let password_hash = hash(&form.password_encrypted, DEFAULT_COST)
      .map_err(|e| Error::QueryBuilderError(format!("Couldnt hash password: {}", e).into()))?;
    edited_user.password_encrypted = password_hash;

    Self::create(conn, &edited_user)
  }

  pub fn find_by_username(conn: &mut PgConnection, username: &str) -> Result<Self, Error> {
    user_::table
      .filter(user_::name.eq(username))
      .first::<Self>(conn)
  }

  pub fn find_by_email(conn: &mut PgConnection, from_email: &str) -> Result<Self, Error> {
    user_::table
      .filter(user_::email.eq(from_email))
      .first::<Self>(conn)
  }

  pub fn find_by_email_or_username(
    conn: &mut PgConnection,
    username_or_email: &str,
  ) -> Result<Self, Error> {
    if username_or_email.contains('@') {
      Self::find_by_email(conn, username_or_email)
    } else {
      Self::find_by_username(conn, username_or_email)
    }
  }

  pub fn check_password(&self, attempted_password: &str) -> bool {
    bcrypt::verify(attempted_password, &self.password_encrypted).unwrap_or(false)
  }
}

#[cfg(test)]
mod tests {
  use super::{Crud, User_, UserForm};
  use crate::establish_unpooled_connection;
  use pretty_assertions::assert_eq;
  use serial_test::serial;

  #[test]
  #[serial]
  #[ignore = "requires a migrated postgres at BURROW_DATABASE_URL"]
  fn test_crud() {
    let conn = &mut establish_unpooled_connection();

    let new_user = UserForm {
      name: "thommy".into(),
      password_encrypted: "nope".into(),
      email: None,
      ..UserForm::default()
    };

    let inserted_user = User_::register(conn, &new_user).unwrap();

    let expected_user = User_ {
      id: inserted_user.id,
      name: "thommy".into(),
      password_encrypted: inserted_user.password_encrypted.to_owned(),
      email: None,
      admin: false,
      banned: false,
      published: inserted_user.published,
      updated: None,
    };

    let read_user = User_::read(conn, inserted_user.id).unwrap();
    let found_user = User_::find_by_username(conn, "thommy").unwrap();
    assert!(inserted_user.check_password("nope"));
    assert!(!inserted_user.check_password("wrong"));

    let num_deleted = User_::delete(conn, inserted_user.id).unwrap();

    assert_eq!(expected_user, read_user);
    assert_eq!(expected_user, found_user);
    assert_eq!(1, num_deleted);
  }
}
