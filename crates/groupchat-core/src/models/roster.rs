use serde::{Deserialize, Serialize};

use super::message::{null_as_default, UserId};

/// A group member that can be mentioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: UserId,
    #[serde(rename = "user_name", default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Candidate {
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email: None,
        }
    }

    /// First letter of the name, used as an avatar glyph.
    pub fn initial(&self) -> char {
        self.display_name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }
}

/// Group details: name plus the membership snapshot used for mentions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Roster {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "project_space_users", default, deserialize_with = "null_as_default")]
    pub users: Vec<Candidate>,
}

impl Roster {
    pub fn member(&self, id: UserId) -> Option<&Candidate> {
        self.users.iter().find(|u| u.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_details() {
        let json = r#"{
            "name": "Tower B Security",
            "project_space_users": [
                {"id": 5, "user_name": "Sam Ortiz", "email": "sam@example.com"},
                {"id": 9, "user_name": "anya"}
            ]
        }"#;
        let roster: Roster = serde_json::from_str(json).unwrap();
        assert_eq!(roster.name, "Tower B Security");
        assert_eq!(roster.users.len(), 2);
        assert_eq!(roster.member(9).unwrap().initial(), 'A');
        assert_eq!(roster.users[0].email.as_deref(), Some("sam@example.com"));
    }

    #[test]
    fn test_null_name_and_members() {
        let roster: Roster =
            serde_json::from_str(r#"{"name": null, "project_space_users": null}"#).unwrap();
        assert!(roster.name.is_empty());
        assert!(roster.users.is_empty());
        let user: Candidate = serde_json::from_str(r#"{"id": 3, "user_name": null}"#).unwrap();
        assert_eq!(user.initial(), 'U');
    }

    #[test]
    fn test_initial_fallback() {
        assert_eq!(Candidate::new(1, "").initial(), 'U');
    }
}
