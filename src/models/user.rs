use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A known user, materialized from the identity provider's profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Stable subject identifier (the token's `sub` claim)
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub nickname: String,
    /// Avatar URL
    pub avatar: String,
    pub email: String,
    pub admin: bool,
    /// Raw provider profile
    #[serde(default)]
    pub profile: Value,
}

impl User {
    /// Builds a user from a provider profile document
    ///
    /// Understands the Auth0 userinfo/id-token shape: `name`, `nickname`, `picture`,
    /// `email`, and an admin flag either at the top level or under `app_metadata`.
    pub fn from_profile(subject: impl Into<String>, profile: Value) -> Self {
        let text = |key: &str| {
            profile
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let nickname = text("nickname");
        let avatar = text("picture");
        let email = text("email");
        let name = match text("name") {
            n if n.is_empty() => nickname.clone(),
            n => n,
        };

        let admin = profile
            .get("admin")
            .or_else(|| profile.get("app_metadata").and_then(|m| m.get("admin")))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self {
            user_id: subject.into(),
            name,
            nickname,
            avatar,
            email,
            admin,
            profile,
        }
    }
}

/// Public view of a user, safe to show to every viewer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub nickname: String,
    pub avatar: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            name: user.name.clone(),
            nickname: user.nickname.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_profile_reads_auth0_fields() {
        let profile = json!({
            "sub": "auth0|alice",
            "name": "Alice Liddell",
            "nickname": "alice",
            "picture": "https://example.com/alice.png",
            "email": "alice@example.com",
            "app_metadata": { "admin": true }
        });

        let user = User::from_profile("auth0|alice", profile);
        assert_eq!(user.user_id, "auth0|alice");
        assert_eq!(user.name, "Alice Liddell");
        assert_eq!(user.avatar, "https://example.com/alice.png");
        assert!(user.admin);
    }

    #[test]
    fn test_from_profile_falls_back_to_nickname() {
        let user = User::from_profile("auth0|bob", json!({ "nickname": "bob" }));
        assert_eq!(user.name, "bob");
        assert!(!user.admin);
        assert_eq!(user.avatar, "");
    }

    #[test]
    fn test_summary_hides_private_fields() {
        let user = User::from_profile(
            "auth0|alice",
            json!({ "name": "Alice", "email": "alice@example.com", "picture": "a.png" }),
        );

        let json = serde_json::to_value(UserSummary::from(&user)).unwrap();
        assert_eq!(json["userId"], "auth0|alice");
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["avatar"], "a.png");
        assert!(json.get("email").is_none());
        assert!(json.get("profile").is_none());
        assert!(json.get("admin").is_none());
    }
}
