use crate::models::Candidate;

/// Case-insensitive substring match on display names, roster order kept.
pub fn filter_candidates(query: &str, roster: &[Candidate]) -> Vec<Candidate> {
    let needle = query.to_lowercase();
    roster
        .iter()
        .filter(|c| c.display_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Filtered candidate list plus the highlighted row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionPicker {
    query: Option<String>,
    candidates: Vec<Candidate>,
    selected_index: usize,
}

impl MentionPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute for the current query. The selection resets to the top only
    /// when the query text actually changed.
    pub fn refresh(&mut self, query: &str, roster: &[Candidate]) {
        let changed = self.query.as_deref() != Some(query);
        self.candidates = filter_candidates(query, roster);
        if changed {
            self.query = Some(query.to_string());
            self.selected_index = 0;
        }
        self.clamp_index();
    }

    pub fn clear(&mut self) {
        self.query = None;
        self.candidates.clear();
        self.selected_index = 0;
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected(&self) -> Option<&Candidate> {
        self.candidates.get(self.selected_index)
    }

    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.candidates.len() {
            self.selected_index += 1;
        }
    }

    fn clamp_index(&mut self) {
        if self.candidates.is_empty() {
            self.selected_index = 0;
        } else {
            self.selected_index = self.selected_index.min(self.candidates.len() - 1);
        }
    }
}
