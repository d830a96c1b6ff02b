use serde::{Deserialize, Serialize};

use super::User;

/// One user's rating of one movie, keyed by (`author_id`, `imdb_id`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rate {
    #[serde(rename = "author")]
    pub author_id: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    pub seen: bool,
    pub rate: i32,
}

/// Body of a rate upsert; replaces the stored row wholesale
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RatePayload {
    pub seen: bool,
    pub rate: i32,
}

impl RatePayload {
    pub fn into_rate(self, author_id: impl Into<String>, imdb_id: impl Into<String>) -> Rate {
        Rate {
            author_id: author_id.into(),
            imdb_id: imdb_id.into(),
            seen: self.seen,
            rate: self.rate,
        }
    }
}

/// Another user's rate with the rater's display identity attached
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnnotatedRate {
    #[serde(flatten)]
    pub rate: Rate,
    #[serde(rename = "authorName")]
    pub author_name: String,
    #[serde(rename = "authorAvatar")]
    pub author_avatar: String,
}

impl AnnotatedRate {
    pub fn new(rate: &Rate, author: Option<&User>) -> Self {
        let (author_name, author_avatar) = author
            .map(|u| (u.name.clone(), u.avatar.clone()))
            .unwrap_or_default();

        Self {
            rate: rate.clone(),
            author_name,
            author_avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_missing_fields_reset_to_defaults() {
        let payload: RatePayload = serde_json::from_str(r#"{"rate": 4}"#).unwrap();
        let rate = payload.into_rate("auth0|alice", "tt0111161");

        assert_eq!(rate.rate, 4);
        assert!(!rate.seen);
        assert_eq!(rate.imdb_id, "tt0111161");
    }

    #[test]
    fn test_annotated_rate_without_user_is_anonymous() {
        let rate = Rate {
            author_id: "ghost".to_string(),
            imdb_id: "tt0111161".to_string(),
            seen: true,
            rate: 2,
        };

        let annotated = AnnotatedRate::new(&rate, None);
        assert_eq!(annotated.author_name, "");
        assert_eq!(annotated.author_avatar, "");

        let json = serde_json::to_value(&annotated).unwrap();
        assert_eq!(json["author"], "ghost");
        assert_eq!(json["authorName"], "");
    }
}
