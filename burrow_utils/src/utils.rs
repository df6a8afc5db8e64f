use regex::Regex;

lazy_static! {
  static ref VALID_USERNAME_REGEX: Regex =
    Regex::new(r"^[a-zA-Z0-9_]{3,20}$").expect("compile username regex");
  // Community names double as primary keys and URL path segments, so keep
  // them to a lowercase slug.
  static ref VALID_COMMUNITY_NAME_REGEX: Regex =
    Regex::new(r"^[a-z0-9_]{3,20}$").expect("compile community name regex");
}

pub fn is_valid_username(name: &str) -> bool {
  VALID_USERNAME_REGEX.is_match(name)
}

pub fn is_valid_community_name(name: &str) -> bool {
  VALID_COMMUNITY_NAME_REGEX.is_match(name)
}

pub fn is_valid_post_title(title: &str) -> bool {
  let length = title.trim().chars().count();
  (3..=200).contains(&length) && !title.contains('\n')
}

#[cfg(test)]
mod tests {
  use super::{is_valid_community_name, is_valid_post_title, is_valid_username};

  #[test]
  fn test_valid_username() {
    assert!(is_valid_username("HelloUser"));
    assert!(is_valid_username("stanford_cardinal"));
    assert!(!is_valid_username("hello@user"));
    assert!(!is_valid_username("f"));
    assert!(!is_valid_username(
      "way_too_long_of_a_username_to_be_allowed"
    ));
  }

  #[test]
  fn test_valid_community_name() {
    assert!(is_valid_community_name("rust"));
    assert!(is_valid_community_name("rust_memes_2"));
    assert!(!is_valid_community_name("Rust"));
    assert!(!is_valid_community_name("c"));
    assert!(!is_valid_community_name("rust memes"));
  }

  #[test]
  fn test_valid_post_title() {
    assert!(is_valid_post_title("A decent title"));
    assert!(is_valid_post_title("  him  "));
    assert!(!is_valid_post_title("hi"));
    assert!(!is_valid_post_title("broken\ntitle"));
    assert!(!is_valid_post_title("   "));
  }
}
