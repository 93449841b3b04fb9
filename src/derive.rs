use crate::models::{StudentRecord, TimelineType};

pub const PROGRAM_WEEKS: i32 = 8;

const DELIVERABLE_STEPS: [(u8, u8); 4] = [(1, 1), (2, 2), (3, 2), (4, 1)];

/// First match wins.
pub const TIMELINE_RULES: [(TimelineType, fn(i32, u8) -> bool); 2] = [
    (TimelineType::Compressed, |remaining, ordinal| remaining < 3 && ordinal < 3),
    (TimelineType::Critical, |remaining, ordinal| remaining < 2 && ordinal < 4),
];

pub fn deliverables_expected(ordinal: u8) -> u8 {
    DELIVERABLE_STEPS
        .iter()
        .filter(|(min_ordinal, _)| ordinal >= *min_ordinal)
        .map(|(_, count)| count)
        .sum()
}

pub fn weeks_remaining(week: i32) -> i32 {
    PROGRAM_WEEKS.saturating_sub(week).max(0)
}

pub fn timeline_type(weeks_remaining: i32, ordinal: u8) -> TimelineType {
    TIMELINE_RULES
        .iter()
        .find(|(_, applies)| applies(weeks_remaining, ordinal))
        .map(|(timeline, _)| *timeline)
        .unwrap_or(TimelineType::Standard)
}

pub fn derive(mut record: StudentRecord) -> StudentRecord {
    let ordinal = record.current_phase.ordinal();

    record.deliverables_expected = deliverables_expected(ordinal);
    record.deliverables_complete = record
        .deliverable_flags()
        .iter()
        .filter(|done| **done)
        .count() as u8;
    record.weeks_remaining = weeks_remaining(record.week);
    record.timeline_type = timeline_type(record.weeks_remaining, ordinal);

    record
}
