//! Forwarding a message into other chats.
//!
//! The picker holds the message, the loaded targets, a name filter and the
//! chosen destinations. Each chosen destination becomes one create request
//! through [`ChatBackend::send_message`](crate::ChatBackend::send_message).

use crate::models::{Destination, ForwardTarget, Message};
use crate::send::SendPayload;

#[derive(Debug, Clone)]
pub struct ForwardPicker {
    message: Message,
    /// `None` until the target list arrives
    targets: Option<Vec<ForwardTarget>>,
    filter: String,
    index: usize,
    chosen: Vec<Destination>,
}

impl ForwardPicker {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            targets: None,
            filter: String::new(),
            index: 0,
            chosen: Vec::new(),
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn is_loading(&self) -> bool {
        self.targets.is_none()
    }

    pub fn set_targets(&mut self, targets: Vec<ForwardTarget>) {
        self.targets = Some(targets);
        self.clamp_index();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.index = 0;
    }

    pub fn pop_filter(&mut self) {
        if self.filter.pop().is_some() {
            self.index = 0;
        }
    }

    /// Targets whose name contains the filter, case-insensitive. A blank
    /// filter shows everything.
    pub fn filtered(&self) -> Vec<&ForwardTarget> {
        let needle = self.filter.trim().to_lowercase();
        self.targets
            .iter()
            .flatten()
            .filter(|t| needle.is_empty() || t.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn selected_index(&self) -> usize {
        self.index
    }

    pub fn move_up(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.index + 1 < self.filtered().len() {
            self.index += 1;
        }
    }

    /// Choose or unchoose the highlighted target.
    pub fn toggle_selected(&mut self) {
        let Some(destination) = self.filtered().get(self.index).map(|t| t.destination) else {
            return;
        };
        if let Some(pos) = self.chosen.iter().position(|d| *d == destination) {
            self.chosen.remove(pos);
        } else {
            self.chosen.push(destination);
        }
    }

    pub fn is_chosen(&self, destination: Destination) -> bool {
        self.chosen.contains(&destination)
    }

    pub fn chosen_count(&self) -> usize {
        self.chosen.len()
    }

    /// One request per chosen destination, in the order they were picked.
    pub fn payloads(&self) -> Vec<SendPayload> {
        self.chosen
            .iter()
            .map(|d| SendPayload::forward(&self.message, *d))
            .collect()
    }

    fn clamp_index(&mut self) {
        let len = self.filtered().len();
        self.index = self.index.min(len.saturating_sub(1));
    }
}

/// Toast text after every forward request succeeded.
pub fn forwarded_notice(count: usize) -> String {
    let noun = if count == 1 { "chat" } else { "chats" };
    format!("Message forwarded to {} {}", count, noun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::message;

    fn targets() -> Vec<ForwardTarget> {
        vec![
            ForwardTarget {
                destination: Destination::Direct(4),
                name: "Rosa".to_string(),
            },
            ForwardTarget {
                destination: Destination::Group(12),
                name: "Night shift".to_string(),
            },
            ForwardTarget {
                destination: Destination::Group(15),
                name: "Day shift".to_string(),
            },
        ]
    }

    fn picker() -> ForwardPicker {
        let mut picker = ForwardPicker::new(message(8, "Sam", "gate 4 is open"));
        picker.set_targets(targets());
        picker
    }

    #[test]
    fn test_loading_until_targets_arrive() {
        let mut picker = ForwardPicker::new(message(8, "Sam", "x"));
        assert!(picker.is_loading());
        assert!(picker.filtered().is_empty());
        picker.toggle_selected();
        assert_eq!(picker.chosen_count(), 0);
        picker.set_targets(Vec::new());
        assert!(!picker.is_loading());
    }

    #[test]
    fn test_filter_resets_highlight() {
        let mut picker = picker();
        picker.move_down();
        picker.move_down();
        picker.move_down();
        assert_eq!(picker.selected_index(), 2);

        for c in "SHIFT".chars() {
            picker.push_filter(c);
        }
        assert_eq!(picker.selected_index(), 0);
        let names: Vec<&str> = picker.filtered().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Night shift", "Day shift"]);

        picker.pop_filter();
        assert_eq!(picker.filter(), "SHIF");
    }

    #[test]
    fn test_toggle_builds_one_payload_per_target() {
        let mut picker = picker();
        picker.toggle_selected();
        picker.move_down();
        picker.move_down();
        picker.toggle_selected();
        picker.move_up();
        picker.toggle_selected();
        picker.toggle_selected();
        assert_eq!(picker.chosen_count(), 2);
        assert!(picker.is_chosen(Destination::Direct(4)));
        assert!(!picker.is_chosen(Destination::Group(12)));

        let payloads = picker.payloads();
        let destinations: Vec<Destination> = payloads.iter().map(|p| p.destination).collect();
        assert_eq!(destinations, vec![Destination::Direct(4), Destination::Group(15)]);
        assert!(payloads.iter().all(|p| p.is_forwarded && p.body == "gate 4 is open"));
    }

    #[test]
    fn test_forwarded_notice() {
        assert_eq!(forwarded_notice(1), "Message forwarded to 1 chat");
        assert_eq!(forwarded_notice(3), "Message forwarded to 3 chats");
    }
}
