use tracing::debug;

use crate::models::{RawRow, StudentRecord};
use crate::phase;

const AI_GENERATED_NOTE: &str = "[AI Generated Response]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolField {
    WhyChosen,
    Reproduction,
    Solution,
    Implementation,
    Testing,
    Feedback,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    StudentId,
    Name,
    MemberId,
    ReadmeLink,
    IssueUrl,
    ForkUrl,
    MrUrl,
    ProgressSummary,
    NextWeekPlan,
    BlockerDesc,
    SubmissionDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    Bool01(BoolField),
    WeekNumber,
    ContributionNumber,
    SubmissionType,
    TagNote,
    Phase,
    Verbatim(TextField),
}

pub const COLUMN_MAP: &[(&str, Decoder)] = &[
    ("#", Decoder::Verbatim(TextField::StudentId)),
    ("What's your name?", Decoder::Verbatim(TextField::Name)),
    ("What's your Member ID?", Decoder::Verbatim(TextField::MemberId)),
    ("Which week is this?", Decoder::WeekNumber),
    ("Which contribution are you reporting on?", Decoder::ContributionNumber),
    ("Link to your contribution README", Decoder::Verbatim(TextField::ReadmeLink)),
    ("Which submission are you completing?", Decoder::SubmissionType),
    ("What phase are you currently in?", Decoder::Phase),
    ("Direct link to your GitLab issue", Decoder::Verbatim(TextField::IssueUrl)),
    (
        "Have you completed the \"Why I chose this issue\" section in your README?",
        Decoder::Bool01(BoolField::WhyChosen),
    ),
    ("Direct link to your GitLab fork", Decoder::Verbatim(TextField::ForkUrl)),
    (
        "Have you documented your reproduction process in your README?",
        Decoder::Bool01(BoolField::Reproduction),
    ),
    (
        "Have you documented your solution approach in your README?",
        Decoder::Bool01(BoolField::Solution),
    ),
    (
        "Have you documented your implementation progress in your README?",
        Decoder::Bool01(BoolField::Implementation),
    ),
    (
        "Have you documented your testing strategy in your README?",
        Decoder::Bool01(BoolField::Testing),
    ),
    (
        "Direct link to your Merge Request (MR) or Pull Request (PR)",
        Decoder::Verbatim(TextField::MrUrl),
    ),
    (
        "Have you documented any maintainer feedback in your README?",
        Decoder::Bool01(BoolField::Feedback),
    ),
    (
        "Briefly summarize what you accomplished this week",
        Decoder::Verbatim(TextField::ProgressSummary),
    ),
    ("What's your plan for next week?", Decoder::Verbatim(TextField::NextWeekPlan)),
    ("Are you currently blocked or stuck?", Decoder::Bool01(BoolField::Blocked)),
    ("Describe what you're blocked on", Decoder::Verbatim(TextField::BlockerDesc)),
    ("Submit Date (UTC)", Decoder::Verbatim(TextField::SubmissionDate)),
    ("Tags", Decoder::TagNote),
];

pub fn mapped_column_count<'a>(headers: impl IntoIterator<Item = &'a str>) -> usize {
    headers
        .into_iter()
        .filter(|header| COLUMN_MAP.iter().any(|(label, _)| *label == *header))
        .count()
}

pub fn map_row(row: RawRow) -> StudentRecord {
    let mut record = StudentRecord::default();

    for (label, decoder) in COLUMN_MAP {
        if let Some(value) = row.get(label) {
            apply(&mut record, *decoder, value);
        }
    }

    record.raw = row;
    record
}

fn apply(record: &mut StudentRecord, decoder: Decoder, value: &str) {
    match decoder {
        Decoder::Bool01(field) => *bool_slot(record, field) = value == "1",
        Decoder::WeekNumber => record.week = parse_week(value),
        Decoder::ContributionNumber => record.contribution_num = parse_contribution(value),
        Decoder::SubmissionType => {
            if value.contains("Wednesday") {
                record.wed_submitted = true;
            } else if value.contains("Sunday") {
                record.sun_submitted = true;
            }
        }
        Decoder::TagNote => {
            if value.contains("AI Generated") {
                record.notes = AI_GENERATED_NOTE.to_string();
            }
        }
        Decoder::Phase => record.current_phase = phase::normalize(value),
        Decoder::Verbatim(field) => *text_slot(record, field) = value.to_string(),
    }
}

fn bool_slot(record: &mut StudentRecord, field: BoolField) -> &mut bool {
    match field {
        BoolField::WhyChosen => &mut record.why_chosen_complete,
        BoolField::Reproduction => &mut record.reproduction_complete,
        BoolField::Solution => &mut record.solution_complete,
        BoolField::Implementation => &mut record.implementation_complete,
        BoolField::Testing => &mut record.testing_complete,
        BoolField::Feedback => &mut record.feedback_complete,
        BoolField::Blocked => &mut record.blocked,
    }
}

fn text_slot(record: &mut StudentRecord, field: TextField) -> &mut String {
    match field {
        TextField::StudentId => &mut record.student_id,
        TextField::Name => &mut record.name,
        TextField::MemberId => &mut record.member_id,
        TextField::ReadmeLink => &mut record.readme_link,
        TextField::IssueUrl => &mut record.issue_url,
        TextField::ForkUrl => &mut record.fork_url,
        TextField::MrUrl => &mut record.mr_url,
        TextField::ProgressSummary => &mut record.progress_summary,
        TextField::NextWeekPlan => &mut record.next_week_plan,
        TextField::BlockerDesc => &mut record.blocker_desc,
        TextField::SubmissionDate => &mut record.submission_date,
    }
}

pub fn parse_week(value: &str) -> i32 {
    match value.replace("Week ", "").trim().parse() {
        Ok(week) => week,
        Err(_) => {
            debug!(value, "unparseable week label, defaulting to 0");
            0
        }
    }
}

pub fn parse_contribution(value: &str) -> i64 {
    if value.contains("No Contribution") {
        return 0;
    }
    if !value.contains("Contribution") {
        return 1;
    }

    match value.split_whitespace().last().map(|token| token.parse::<i64>()) {
        Some(Ok(number)) => number,
        _ => {
            debug!(value, "unparseable contribution label, defaulting to 1");
            1
        }
    }
}
