use chrono::{DateTime, Utc};

use crate::models::{CohortSummary, InterventionReason, Status, StudentRecord, TimelineType};
use crate::risk;
use crate::summary::{rate, share};

pub const MASTER_SHEET: &str = "Master Tracker";
pub const AT_RISK_SHEET: &str = "P1 - At Risk";
pub const FLAGGED_SHEET: &str = "P2 - Flagged";
pub const ON_TRACK_SHEET: &str = "P3 - On Track";
pub const DASHBOARD_SHEET: &str = "Weekly Summary";

const MAX_COLUMN_WIDTH: usize = 50;
const COLUMN_PADDING: usize = 2;
const SUMMARY_PREVIEW_CHARS: usize = 100;
const BLOCKER_PREVIEW_CHARS: usize = 30;

pub const DASHBOARD_WIDTHS: [f64; 3] = [5.0, 40.0, 20.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Red,
    Orange,
    Yellow,
    LightYellow,
    Green,
    LightGreen,
}

impl Fill {
    pub fn rgb(self) -> u32 {
        match self {
            Fill::Red => 0xFF6B6B,
            Fill::Orange => 0xFFB347,
            Fill::Yellow => 0xFFEB9C,
            Fill::LightYellow => 0xFFFACD,
            Fill::Green => 0xC6EFCE,
            Fill::LightGreen => 0xE2EFDA,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(i64),
}

impl Cell {
    pub fn display_len(&self) -> usize {
        match self {
            Cell::Text(text) => text.chars().count(),
            Cell::Number(number) => number.to_string().len(),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

impl From<&String> for Cell {
    fn from(text: &String) -> Self {
        Cell::Text(text.clone())
    }
}

macro_rules! number_cell {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Cell {
            fn from(number: $ty) -> Self {
                Cell::Number(i64::from(number))
            }
        })*
    };
}

number_cell!(u8, u32, i32, i64);

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<Cell>,
    pub fill: Fill,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSheet {
    pub name: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<TableRow>,
}

impl TableSheet {
    /// Per-column width: longest cell (header included) capped at 50, plus padding.
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.cells.get(col))
                    .map(Cell::display_len)
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0);
                longest.min(MAX_COLUMN_WIDTH) + COLUMN_PADDING
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Title(String),
    Section(String),
    Metric {
        label: String,
        value: Cell,
        bold: bool,
        fill: Option<Fill>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardLine {
    pub row: u32,
    pub kind: LineKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSheet {
    pub name: &'static str,
    pub lines: Vec<DashboardLine>,
}

impl DashboardSheet {
    pub fn first_row(&self) -> u32 {
        self.lines.first().map(|line| line.row).unwrap_or(0)
    }

    pub fn last_row(&self) -> u32 {
        self.lines.last().map(|line| line.row).unwrap_or(0)
    }

    pub fn line(&self, row: u32) -> Option<&LineKind> {
        self.lines.iter().find(|line| line.row == row).map(|line| &line.kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub master: TableSheet,
    pub at_risk: TableSheet,
    pub flagged: TableSheet,
    pub on_track: TableSheet,
    pub dashboard: DashboardSheet,
}

impl ReportLayout {
    pub fn tables(&self) -> [&TableSheet; 4] {
        [&self.master, &self.at_risk, &self.flagged, &self.on_track]
    }
}

pub fn build_report(
    records: &[StudentRecord],
    summary: &CohortSummary,
    generated_at: DateTime<Utc>,
) -> ReportLayout {
    ReportLayout {
        master: master_sheet(records),
        at_risk: at_risk_sheet(records),
        flagged: flagged_sheet(records),
        on_track: on_track_sheet(records),
        dashboard: dashboard_sheet(summary, generated_at),
    }
}

fn check_or_cross(flag: bool) -> Cell {
    Cell::from(if flag { "✅" } else { "❌" })
}

fn marker(flag: bool, glyph: &str) -> Cell {
    Cell::from(if flag { glyph } else { "" })
}

fn deliverables(record: &StudentRecord) -> Cell {
    Cell::Text(format!(
        "{}/{}",
        record.deliverables_complete, record.deliverables_expected
    ))
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn tier<'a>(records: &'a [StudentRecord], status: Status) -> Vec<&'a StudentRecord> {
    records.iter().filter(|r| r.status == status).collect()
}

const MASTER_HEADERS: [&str; 55] = [
    "student_id",
    "name",
    "member_id",
    "discord_username",
    "week",
    "submission_date",
    "wed_submitted",
    "sun_submitted",
    "submission_count_cumulative",
    "current_phase",
    "weeks_in_phase",
    "contribution_num",
    "contribution_start_week",
    "weeks_on_contribution",
    "weeks_remaining",
    "timeline_type",
    "phase_changed_this_week",
    "readme_link",
    "issue_url",
    "fork_url",
    "mr_url",
    "why_chosen_complete",
    "reproduction_complete",
    "solution_complete",
    "implementation_complete",
    "testing_complete",
    "feedback_complete",
    "deliverables_expected",
    "deliverables_complete",
    "commits_this_week",
    "last_commit_date",
    "days_since_commit",
    "total_commits",
    "mr_status",
    "mr_created_date",
    "comment_count",
    "has_maintainer_feedback",
    "progress_summary",
    "next_week_plan",
    "blocked",
    "blocker_desc",
    "support_requested",
    "issue_url_previous_week",
    "issue_changed",
    "issue_change_week",
    "issue_swap_detected",
    "new_contribution_detected",
    "status",
    "intervention_type",
    "intervention_sent_date",
    "consecutive_misses",
    "tue_office_hours",
    "thu_office_hours",
    "wed_lecture",
    "notes",
];

fn master_cells(r: &StudentRecord) -> Vec<Cell> {
    vec![
        Cell::from(&r.student_id),
        Cell::from(&r.name),
        Cell::from(&r.member_id),
        Cell::from(&r.discord_username),
        Cell::from(r.week),
        Cell::from(&r.submission_date),
        check_or_cross(r.wed_submitted),
        check_or_cross(r.sun_submitted),
        Cell::from(r.submission_count_cumulative),
        Cell::from(r.current_phase.label()),
        Cell::from(r.weeks_in_phase),
        Cell::from(r.contribution_num),
        Cell::from(r.contribution_start_week),
        Cell::from(r.weeks_on_contribution),
        Cell::from(r.weeks_remaining),
        Cell::from(r.timeline_type.as_str()),
        marker(r.phase_changed_this_week, "✅"),
        Cell::from(&r.readme_link),
        Cell::from(&r.issue_url),
        Cell::from(&r.fork_url),
        Cell::from(&r.mr_url),
        check_or_cross(r.why_chosen_complete),
        check_or_cross(r.reproduction_complete),
        check_or_cross(r.solution_complete),
        check_or_cross(r.implementation_complete),
        check_or_cross(r.testing_complete),
        check_or_cross(r.feedback_complete),
        Cell::from(r.deliverables_expected),
        Cell::from(r.deliverables_complete),
        Cell::from(r.commits_this_week),
        Cell::from(&r.last_commit_date),
        Cell::from(r.days_since_commit),
        Cell::from(r.total_commits),
        Cell::from(&r.mr_status),
        Cell::from(&r.mr_created_date),
        Cell::from(r.comment_count),
        marker(r.has_maintainer_feedback, "✅"),
        Cell::from(&r.progress_summary),
        Cell::from(&r.next_week_plan),
        marker(r.blocked, "🚫"),
        Cell::from(&r.blocker_desc),
        Cell::from(&r.support_requested),
        Cell::from(&r.issue_url_previous_week),
        marker(r.issue_changed, "✅"),
        if r.issue_change_week > 0 {
            Cell::from(r.issue_change_week)
        } else {
            Cell::from("")
        },
        marker(r.issue_swap_detected, "⚠️"),
        marker(r.new_contribution_detected, "🆕"),
        Cell::from(r.status.display_label()),
        Cell::from(r.intervention_code()),
        Cell::from(&r.intervention_sent_date),
        Cell::from(r.consecutive_misses),
        marker(r.tue_office_hours, "✅"),
        marker(r.thu_office_hours, "✅"),
        marker(r.wed_lecture, "✅"),
        Cell::from(&r.notes),
    ]
}

pub fn master_sheet(records: &[StudentRecord]) -> TableSheet {
    let rows = records
        .iter()
        .map(|r| TableRow {
            cells: master_cells(r),
            fill: match r.status {
                Status::AtRisk => Fill::Red,
                Status::Flagged => Fill::LightYellow,
                Status::OnTrack => Fill::LightGreen,
            },
        })
        .collect();

    TableSheet {
        name: MASTER_SHEET,
        headers: MASTER_HEADERS.to_vec(),
        rows,
    }
}

fn at_risk_fill(r: &StudentRecord) -> Fill {
    match r.intervention {
        Some(InterventionReason::MissingBoth) => Fill::Red,
        Some(InterventionReason::PhaseCritical) => Fill::Orange,
        _ if matches!(
            r.timeline_type,
            TimelineType::Compressed | TimelineType::Critical
        ) =>
        {
            Fill::Yellow
        }
        _ => Fill::Red,
    }
}

pub fn at_risk_sheet(records: &[StudentRecord]) -> TableSheet {
    let mut at_risk = tier(records, Status::AtRisk);
    at_risk.sort_by_key(|r| risk::at_risk_priority(r.intervention));

    let rows = at_risk
        .into_iter()
        .map(|r| TableRow {
            cells: vec![
                Cell::from(&r.name),
                Cell::from(r.week),
                Cell::from(r.current_phase.label()),
                Cell::from(r.weeks_in_phase),
                Cell::from(r.timeline_type.as_str()),
                check_or_cross(r.sun_submitted),
                Cell::from(r.consecutive_misses),
                deliverables(r),
                Cell::from(r.commits_this_week),
                if r.blocked {
                    Cell::Text(format!(
                        "🚫 {}",
                        truncate_chars(&r.blocker_desc, BLOCKER_PREVIEW_CHARS)
                    ))
                } else {
                    Cell::from("")
                },
                Cell::from(r.intervention_code()),
                Cell::from(&r.readme_link),
                Cell::from(&r.notes),
            ],
            fill: at_risk_fill(r),
        })
        .collect();

    TableSheet {
        name: AT_RISK_SHEET,
        headers: vec![
            "Name",
            "Week",
            "Phase",
            "Weeks in Phase",
            "Timeline",
            "Sun Submitted",
            "Consecutive Misses",
            "Deliverables",
            "Commits",
            "Blocked",
            "Intervention Type",
            "README Link",
            "Notes",
        ],
        rows,
    }
}

pub fn flagged_sheet(records: &[StudentRecord]) -> TableSheet {
    let mut flagged = tier(records, Status::Flagged);
    flagged.sort_by(|a, b| b.weeks_in_phase.cmp(&a.weeks_in_phase));

    let rows = flagged
        .into_iter()
        .map(|r| TableRow {
            cells: vec![
                Cell::from(&r.name),
                Cell::from(r.week),
                Cell::from(r.current_phase.label()),
                Cell::from(r.weeks_in_phase),
                Cell::from(r.timeline_type.as_str()),
                deliverables(r),
                Cell::from(r.commits_this_week),
                Cell::from(r.days_since_commit),
                marker(r.blocked, "🚫 Blocked"),
                Cell::from(r.intervention_code()),
                Cell::from(&r.readme_link),
            ],
            fill: if r.blocked {
                Fill::Orange
            } else {
                Fill::LightYellow
            },
        })
        .collect();

    TableSheet {
        name: FLAGGED_SHEET,
        headers: vec![
            "Name",
            "Week",
            "Phase",
            "Weeks in Phase",
            "Timeline",
            "Deliverables",
            "Commits This Week",
            "Days Since Commit",
            "Blocked",
            "Intervention Type",
            "README Link",
        ],
        rows,
    }
}

pub fn on_track_sheet(records: &[StudentRecord]) -> TableSheet {
    let mut on_track = tier(records, Status::OnTrack);
    on_track.sort_by(|a, b| b.week.cmp(&a.week));

    let rows = on_track
        .into_iter()
        .map(|r| {
            let mr_display = if r.mr_merged() {
                format!("⭐ {}", r.mr_status)
            } else {
                r.mr_status.clone()
            };
            let notes = if r.contribution_num >= 2 {
                format!("🏆 2nd Contribution! {}", r.notes)
            } else {
                r.notes.clone()
            };
            let summary = if r.progress_summary.chars().count() > SUMMARY_PREVIEW_CHARS {
                format!(
                    "{}...",
                    truncate_chars(&r.progress_summary, SUMMARY_PREVIEW_CHARS)
                )
            } else {
                r.progress_summary.clone()
            };

            TableRow {
                cells: vec![
                    Cell::from(&r.name),
                    Cell::from(r.week),
                    Cell::from(r.current_phase.label()),
                    Cell::from(r.weeks_in_phase),
                    Cell::from(r.submission_count_cumulative),
                    Cell::from(mr_display),
                    Cell::from(summary),
                    Cell::from(notes),
                ],
                fill: Fill::LightGreen,
            }
        })
        .collect();

    TableSheet {
        name: ON_TRACK_SHEET,
        headers: vec![
            "Name",
            "Week",
            "Phase",
            "Weeks in Phase",
            "Submission Count",
            "MR Status",
            "Progress Summary",
            "Notes",
        ],
        rows,
    }
}

struct DashboardBuilder {
    row: u32,
    lines: Vec<DashboardLine>,
}

impl DashboardBuilder {
    fn push(&mut self, kind: LineKind) {
        self.lines.push(DashboardLine { row: self.row, kind });
    }

    fn metric(&mut self, label: &str, value: impl Into<Cell>, bold: bool, fill: Option<Fill>) {
        self.push(LineKind::Metric {
            label: label.to_string(),
            value: value.into(),
            bold,
            fill,
        });
    }

    fn skip(&mut self, rows: u32) {
        self.row += rows;
    }
}

pub fn dashboard_sheet(summary: &CohortSummary, generated_at: DateTime<Utc>) -> DashboardSheet {
    let total = summary.total;
    let mut b = DashboardBuilder {
        row: 1,
        lines: Vec::new(),
    };

    b.push(LineKind::Title(format!(
        "WEEK {} OVERVIEW",
        summary.current_week
    )));

    b.skip(2);
    b.metric("Total Students:", Cell::Number(total as i64), true, None);

    b.skip(2);
    b.metric("🟢 On Track:", share(summary.on_track, total), true, Some(Fill::Green));
    b.skip(1);
    b.metric("🟡 Flagged:", share(summary.flagged, total), true, Some(Fill::Yellow));
    b.skip(1);
    b.metric("🔴 At Risk:", share(summary.at_risk, total), true, Some(Fill::Red));

    b.skip(2);
    b.push(LineKind::Section("Submissions".to_string()));
    b.skip(1);
    b.metric("└─ Sunday:", rate(summary.sun_submitted, total), false, None);
    b.skip(1);
    b.metric("└─ Wednesday:", rate(summary.wed_submitted, total), false, None);

    b.skip(2);
    b.push(LineKind::Section("Phase Distribution".to_string()));
    for (idx, count) in summary.phase_counts.iter().enumerate() {
        b.skip(1);
        b.metric(
            &format!("└─ Phase {}:", idx + 1),
            format!("{count} students"),
            false,
            None,
        );
    }

    b.skip(2);
    b.metric("MRs Submitted:", share(summary.mr_submitted, total), true, None);
    b.skip(1);
    b.metric("MRs Merged:", share(summary.mr_merged, total), true, None);

    b.skip(2);
    b.metric(
        "Interventions Needed:",
        Cell::Number(summary.interventions_needed as i64),
        true,
        None,
    );

    b.skip(2);
    b.metric(
        "Generated (UTC):",
        generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        false,
        None,
    );

    DashboardSheet {
        name: DASHBOARD_SHEET,
        lines: b.lines,
    }
}
