//! Output surfaces derived from one estimation context.

use levelup_core::{Diagnostic, EstimatedDate, ItemId, Time};
use levelup_progress::{AnnotatedItem, DateFormatter, MilestonePrediction};
use serde::Serialize;

/// Where a call to action should send the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Some actionable item has never been started
    Lesson,
    /// Every actionable item is waiting for review
    Review,
}

impl Destination {
    /// Path segment of the session page.
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Lesson => "lesson",
            Destination::Review => "review",
        }
    }
}

/// Items that can be acted on right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionHint {
    /// Number of actionable open items
    pub count: usize,
    /// Session kind to start
    pub destination: Destination,
}

impl ActionHint {
    /// Derive the hint from the actionable items, `None` when there are none.
    pub fn from_actionable(actionable: &[AnnotatedItem<'_>]) -> Option<Self> {
        if actionable.is_empty() {
            return None;
        }
        let destination = if actionable.iter().any(|e| !e.item.assignment.is_started()) {
            Destination::Lesson
        } else {
            Destination::Review
        };
        Some(Self {
            count: actionable.len(),
            destination,
        })
    }
}

/// A set of items sharing the same next study date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudySet {
    /// Member ids, in listing order
    pub ids: Vec<ItemId>,
    /// Shared study date, undetermined when empty
    pub at: EstimatedDate,
}

impl StudySet {
    /// Collect a study set.
    pub fn from_items(items: &[AnnotatedItem<'_>]) -> Self {
        Self {
            ids: items.iter().map(|e| e.id()).collect(),
            at: items
                .first()
                .map(|e| e.current_start())
                .unwrap_or_default(),
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn items_phrase(count: usize) -> String {
    format!("{} item{}", count, if count == 1 { "" } else { "s" })
}

/// Everything a UI needs after one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateSummary {
    /// Snapshot load time
    pub loaded_at: Time,
    /// Aggregate milestone over the dependent items
    pub milestone: MilestonePrediction,
    /// Items studiable now, or else soonest
    pub soonest_set: StudySet,
    /// The set after `soonest_set`
    pub look_ahead: StudySet,
    /// Call-to-action, when something is actionable now
    pub actionable_now: Option<ActionHint>,
    /// When the scheduler will refresh next
    pub next_refresh_at: Option<Time>,
    /// Conditions absorbed during the refresh
    pub diagnostics: Vec<Diagnostic>,
}

impl EstimateSummary {
    /// "Earliest Level Up" line with the remaining wait.
    pub fn milestone_line(&self, formatter: &DateFormatter) -> String {
        let date = formatter.format_date(self.milestone.date, false, false);
        let wait = match formatter.format_wait(self.milestone.date, true).as_str() {
            "Now" => "available now".to_string(),
            wait => wait.to_string(),
        };
        format!("Earliest Level Up: {} ({})", date, wait)
    }

    /// Lines describing what can be studied now and what arrives next.
    pub fn action_lines(&self, formatter: &DateFormatter) -> Vec<String> {
        let mut lines = Vec::new();
        let mut next = &self.soonest_set;

        if next.is_empty() {
            return lines;
        }

        if self.soonest_set.at.is_due(formatter.now()) {
            let count = self.soonest_set.len();
            let mut line = format!(
                "{} needed to pass this level {} currently available to study",
                items_phrase(count),
                if count == 1 { "is" } else { "are" }
            );
            if let Some(hint) = self.actionable_now {
                line.push_str(&format!(" (start a {} session)", hint.destination.as_str()));
            }
            lines.push(line);
            next = &self.look_ahead;
        }

        if !next.is_empty() {
            lines.push(format!(
                "The next {} of the ones needed to pass this level will arrive at: {}",
                items_phrase(next.len()),
                formatter.format_date(next.at, true, true)
            ));
        }

        lines
    }

    /// Full text rendering.
    pub fn render(&self, formatter: &DateFormatter) -> String {
        let mut lines = vec![self.milestone_line(formatter)];
        lines.extend(self.action_lines(formatter));
        lines.join("\n")
    }
}
