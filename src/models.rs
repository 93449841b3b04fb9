use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Input row keyed by column label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.0.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (label, value) in iter {
            row.insert(label, value);
        }
        row
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Phase {
    IssueSelection,
    ReproductionPlanning,
    Implementation,
    SubmissionIteration,
    /// Lowercased text that matched none of the canonical phases.
    Unrecognized(String),
}

impl Phase {
    pub fn ordinal(&self) -> u8 {
        match self {
            Phase::IssueSelection => 1,
            Phase::ReproductionPlanning => 2,
            Phase::Implementation => 3,
            Phase::SubmissionIteration => 4,
            Phase::Unrecognized(_) => 0,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Phase::IssueSelection => "Phase 1: Issue Selection",
            Phase::ReproductionPlanning => "Phase 2: Reproduction & Planning",
            Phase::Implementation => "Phase 3: Implementation",
            Phase::SubmissionIteration => "Phase 4: Submission & Iteration",
            Phase::Unrecognized(text) => text,
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Unrecognized(String::new())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TimelineType {
    #[default]
    Standard,
    Compressed,
    Critical,
}

impl TimelineType {
    pub fn as_str(self) -> &'static str {
        match self {
            TimelineType::Standard => "Standard",
            TimelineType::Compressed => "Compressed",
            TimelineType::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    OnTrack,
    Flagged,
    AtRisk,
}

impl Status {
    pub fn display_label(self) -> &'static str {
        match self {
            Status::OnTrack => "🟢 ON TRACK",
            Status::Flagged => "🟡 FLAGGED",
            Status::AtRisk => "🔴 AT RISK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterventionReason {
    MissingBoth,
    PhaseCritical,
    Stalled,
    MissingDeliverables,
    NoActivity,
    TimelineCompressed,
}

impl InterventionReason {
    pub fn code(self) -> &'static str {
        match self {
            InterventionReason::MissingBoth => "MISSING_BOTH",
            InterventionReason::PhaseCritical => "PHASE_CRITICAL",
            InterventionReason::Stalled => "STALLED",
            InterventionReason::MissingDeliverables => "MISSING_DELIVERABLES",
            InterventionReason::NoActivity => "NO_ACTIVITY",
            InterventionReason::TimelineCompressed => "TIMELINE_COMPRESSED",
        }
    }

    pub fn status(self) -> Status {
        match self {
            InterventionReason::MissingBoth
            | InterventionReason::PhaseCritical
            | InterventionReason::Stalled => Status::AtRisk,
            InterventionReason::MissingDeliverables
            | InterventionReason::NoActivity
            | InterventionReason::TimelineCompressed => Status::Flagged,
        }
    }
}

impl fmt::Display for InterventionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub student_id: String,
    pub name: String,
    pub member_id: String,
    pub discord_username: String,

    pub week: i32,
    pub submission_date: String,
    pub wed_submitted: bool,
    pub sun_submitted: bool,
    pub submission_count_cumulative: u32,

    pub current_phase: Phase,
    pub weeks_in_phase: u32,
    pub contribution_num: i64,
    pub contribution_start_week: u32,
    pub weeks_on_contribution: u32,
    pub weeks_remaining: i32,
    pub timeline_type: TimelineType,
    pub phase_changed_this_week: bool,

    pub readme_link: String,
    pub issue_url: String,
    pub fork_url: String,
    pub mr_url: String,

    pub why_chosen_complete: bool,
    pub reproduction_complete: bool,
    pub solution_complete: bool,
    pub implementation_complete: bool,
    pub testing_complete: bool,
    pub feedback_complete: bool,
    pub deliverables_expected: u8,
    pub deliverables_complete: u8,

    pub commits_this_week: u32,
    pub last_commit_date: String,
    pub days_since_commit: i64,
    pub total_commits: u32,

    pub mr_status: String,
    pub mr_created_date: String,
    pub comment_count: u32,
    pub has_maintainer_feedback: bool,

    pub progress_summary: String,
    pub next_week_plan: String,
    pub blocked: bool,
    pub blocker_desc: String,
    pub support_requested: String,

    pub issue_url_previous_week: String,
    pub issue_changed: bool,
    pub issue_change_week: u32,
    pub issue_swap_detected: bool,
    pub new_contribution_detected: bool,

    pub status: Status,
    pub intervention: Option<InterventionReason>,
    pub intervention_sent_date: String,
    pub consecutive_misses: u32,

    pub tue_office_hours: bool,
    pub thu_office_hours: bool,
    pub wed_lecture: bool,

    pub notes: String,

    pub raw: RawRow,
}

impl Default for StudentRecord {
    fn default() -> Self {
        Self {
            student_id: String::new(),
            name: String::new(),
            member_id: String::new(),
            discord_username: String::new(),
            week: 0,
            submission_date: String::new(),
            wed_submitted: false,
            sun_submitted: false,
            submission_count_cumulative: 0,
            current_phase: Phase::default(),
            weeks_in_phase: 1,
            contribution_num: 1,
            contribution_start_week: 1,
            weeks_on_contribution: 1,
            weeks_remaining: 8,
            timeline_type: TimelineType::Standard,
            phase_changed_this_week: false,
            readme_link: String::new(),
            issue_url: String::new(),
            fork_url: String::new(),
            mr_url: String::new(),
            why_chosen_complete: false,
            reproduction_complete: false,
            solution_complete: false,
            implementation_complete: false,
            testing_complete: false,
            feedback_complete: false,
            deliverables_expected: 0,
            deliverables_complete: 0,
            commits_this_week: 0,
            last_commit_date: String::new(),
            days_since_commit: 0,
            total_commits: 0,
            mr_status: String::new(),
            mr_created_date: String::new(),
            comment_count: 0,
            has_maintainer_feedback: false,
            progress_summary: String::new(),
            next_week_plan: String::new(),
            blocked: false,
            blocker_desc: String::new(),
            support_requested: String::new(),
            issue_url_previous_week: String::new(),
            issue_changed: false,
            issue_change_week: 0,
            issue_swap_detected: false,
            new_contribution_detected: false,
            status: Status::OnTrack,
            intervention: None,
            intervention_sent_date: String::new(),
            consecutive_misses: 0,
            tue_office_hours: false,
            thu_office_hours: false,
            wed_lecture: false,
            notes: String::new(),
            raw: RawRow::default(),
        }
    }
}

impl StudentRecord {
    pub fn deliverable_flags(&self) -> [bool; 6] {
        [
            self.why_chosen_complete,
            self.reproduction_complete,
            self.solution_complete,
            self.implementation_complete,
            self.testing_complete,
            self.feedback_complete,
        ]
    }

    pub fn intervention_code(&self) -> &'static str {
        self.intervention.map(InterventionReason::code).unwrap_or("")
    }

    pub fn mr_merged(&self) -> bool {
        self.mr_status.to_lowercase().contains("merged")
    }
}

/// Aggregate statistics backing the dashboard sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CohortSummary {
    pub total: usize,
    pub on_track: usize,
    pub flagged: usize,
    pub at_risk: usize,
    pub sun_submitted: usize,
    pub wed_submitted: usize,
    /// Records per canonical phase, index 0 is phase 1.
    pub phase_counts: [usize; 4],
    pub mr_submitted: usize,
    pub mr_merged: usize,
    pub interventions_needed: usize,
    pub current_week: i32,
}

#[derive(Debug, Clone)]
pub struct TrackerReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub records: Vec<StudentRecord>,
    pub summary: CohortSummary,
    pub workbook: Vec<u8>,
}

/// Boundary result handed to the transport layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingResult {
    pub success: bool,
    pub output_data: Option<Vec<u8>>,
    pub output_filename: Option<String>,
    pub error_message: Option<String>,
    pub rows_processed: usize,
}
