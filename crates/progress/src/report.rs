//! Debug listing of the items still standing between the learner and the
//! milestone.

use levelup_core::{Diagnostic, ItemClass};

use crate::{AnnotatedItem, DateFormatter};

const HEADER: [&str; 5] = ["Name", "SRS Stage", "Next Study Date", "Earliest Guru Date", "URL"];

fn stage_label(entry: &AnnotatedItem<'_>) -> String {
    if entry.annotation.is_locked {
        "🔒".to_string()
    } else {
        entry.item.assignment.stage.label()
    }
}

/// Render the debug dump for `listing` (expected in listing order).
///
/// Not-yet-completed items are grouped by class, prerequisite class first.
/// Each group gets a count header and, when `detailed`, a padded,
/// tab-separated table. Diagnostics, if any, are listed last.
pub fn render_debug_dump(
    listing: &[AnnotatedItem<'_>],
    diagnostics: &[Diagnostic],
    formatter: &DateFormatter,
    detailed: bool,
) -> String {
    let mut out: Vec<String> = Vec::new();

    for class in [ItemClass::Prerequisite, ItemClass::Dependent] {
        let remaining: Vec<_> = listing
            .iter()
            .filter(|e| e.item.class == class && !e.item.is_completed())
            .collect();
        if remaining.is_empty() {
            continue;
        }

        let locked = remaining.iter().filter(|e| e.annotation.is_locked).count();
        let mut header = format!(
            "{} remaining {} to guru",
            remaining.len(),
            class.noun(remaining.len())
        );
        if locked > 0 {
            header.push_str(&format!(" ({} of which are still locked)", locked));
        }
        out.push(header);

        if !detailed {
            continue;
        }

        let mut rows: Vec<[String; 5]> = vec![HEADER.map(str::to_string)];
        rows.extend(remaining.iter().map(|e| {
            [
                e.item.name.clone(),
                stage_label(e),
                formatter.format_date(e.current_start(), true, false),
                formatter.format_date(e.predicted_completion(), true, false),
                e.item.document_url.clone().unwrap_or_default(),
            ]
        }));

        let mut widths = [0usize; 4];
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count() + 1);
            }
        }

        for [name, stage, next, guru, url] in &rows {
            out.push(format!(
                "{:<w0$}\t{:<w1$}\t{:<w2$}\t{:<w3$}\t{}",
                name,
                stage,
                next,
                guru,
                url,
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
                w3 = widths[3],
            ));
        }
    }

    if !diagnostics.is_empty() {
        out.push(format!("{} diagnostic(s):", diagnostics.len()));
        out.extend(diagnostics.iter().map(|d| format!("  {}", d)));
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SnapshotAnnotator;
    use chrono::{Duration, TimeZone, Utc};
    use levelup_core::{AssignmentState, Item, ItemId, Time};

    fn t0() -> Time {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn snapshot() -> Vec<Item> {
        let now = t0();
        vec![
            Item::new(ItemId::new(1), ItemClass::Prerequisite)
                .named("一")
                .with_assignment(AssignmentState::unlocked(now).at_stage(1u8)),
            Item::new(ItemId::new(2), ItemClass::Prerequisite)
                .named("stick")
                .with_assignment(AssignmentState::unlocked(now).completed(now)),
            Item::new(ItemId::new(10), ItemClass::Dependent)
                .named("二")
                .with_prerequisites([ItemId::new(1)]),
            Item::new(ItemId::new(11), ItemClass::Dependent)
                .named("三")
                .with_prerequisites([ItemId::new(1)]),
        ]
    }

    #[test]
    fn test_headers_without_detail() {
        let items = snapshot();
        let set = SnapshotAnnotator::new().annotate(&items, t0());
        let dump = render_debug_dump(
            &set.listing(&items),
            set.diagnostics(),
            &DateFormatter::utc(t0()),
            false,
        );
        assert_eq!(
            dump,
            "1 remaining radical to guru\n2 remaining kanji to guru (2 of which are still locked)"
        );
    }

    #[test]
    fn test_detailed_table() {
        let items = snapshot();
        let set = SnapshotAnnotator::new().annotate(&items, t0());
        let dump = render_debug_dump(
            &set.listing(&items),
            set.diagnostics(),
            &DateFormatter::utc(t0()),
            true,
        );
        let lines: Vec<_> = dump.lines().collect();

        assert_eq!(lines[0], "1 remaining radical to guru");
        assert!(lines[1].starts_with("Name \tSRS Stage"));
        assert!(lines[2].starts_with("一"));
        assert!(lines[2].contains("Apprentice 1"));
        assert!(lines[2].contains("\tNow"));
        assert!(lines[3].starts_with("2 remaining kanji to guru"));
        assert!(lines[5].contains("🔒"));
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_lists_diagnostics() {
        let now = t0();
        let items = vec![Item::new(ItemId::new(10), ItemClass::Dependent)
            .named("二")
            .with_prerequisites([ItemId::new(99)])];
        let set = SnapshotAnnotator::new().annotate(&items, now);
        let dump = render_debug_dump(
            &set.listing(&items),
            set.diagnostics(),
            &DateFormatter::utc(now + Duration::minutes(1)),
            true,
        );
        assert!(dump.contains("N/A"));
        assert!(dump.contains("2 diagnostic(s):"));
        assert!(dump.contains("prerequisite 99"));
    }
}
