use serde::Deserialize;

use super::message::{null_as_default, ConversationId};

/// Where a message is posted: a group space or a one-to-one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Group(ConversationId),
    Direct(ConversationId),
}

impl Destination {
    /// Form field and value naming this destination in a create request.
    pub fn form_field(self) -> (&'static str, String) {
        match self {
            Destination::Group(id) => ("message[project_space_id]", id.to_string()),
            Destination::Direct(id) => ("message[conversation_id]", id.to_string()),
        }
    }
}

/// A chat a message can be forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardTarget {
    pub destination: Destination,
    pub name: String,
}

impl ForwardTarget {
    pub fn is_group(&self) -> bool {
        matches!(self.destination, Destination::Group(_))
    }
}

/// Entry of `GET /conversations.json`. The other party is named by
/// whichever side the current user is not.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectSummary {
    pub id: ConversationId,
    #[serde(default)]
    pub receiver_name: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
}

impl From<DirectSummary> for ForwardTarget {
    fn from(summary: DirectSummary) -> Self {
        let name = summary
            .receiver_name
            .filter(|n| !n.is_empty())
            .or(summary.sender_name.filter(|n| !n.is_empty()))
            .unwrap_or_else(|| "Unknown".to_string());
        Self {
            destination: Destination::Direct(summary.id),
            name,
        }
    }
}

/// Entry of `GET /project_spaces.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupSummary {
    pub id: ConversationId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl From<GroupSummary> for ForwardTarget {
    fn from(summary: GroupSummary) -> Self {
        Self {
            destination: Destination::Group(summary.id),
            name: summary.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_name_falls_back() {
        let json = r#"[
            {"id": 1, "receiver_name": "Rosa", "sender_name": "Me"},
            {"id": 2, "receiver_name": "", "sender_name": "Sam"},
            {"id": 3}
        ]"#;
        let summaries: Vec<DirectSummary> = serde_json::from_str(json).unwrap();
        let names: Vec<String> = summaries
            .into_iter()
            .map(|s| ForwardTarget::from(s).name)
            .collect();
        assert_eq!(names, vec!["Rosa", "Sam", "Unknown"]);
    }

    #[test]
    fn test_destination_form_field() {
        assert_eq!(
            Destination::Group(12).form_field(),
            ("message[project_space_id]", "12".to_string())
        );
        assert_eq!(
            Destination::Direct(4).form_field(),
            ("message[conversation_id]", "4".to_string())
        );
    }
}
