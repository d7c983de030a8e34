use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;

use super::model::SelectionModel;
use crate::utils::{PatternSyntaxKind, Result, SweepError};

/// Shared include/exclude shape for all filters: include selects matches
/// without deselecting anything, exclude deselects matches only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    Include,
    Exclude,
}

/// Applies a name-pattern filter to the model's selection flags.
///
/// The pattern compiles exactly once; a malformed pattern fails before any
/// flag changes. Include never selects protected branches, exclude may
/// deselect them. Returns the number of records whose selection changed.
pub fn apply_pattern_filter(
    model: &mut SelectionModel,
    pattern: &str,
    action: FilterAction,
) -> Result<usize> {
    let regex = compile_pattern(pattern)?;
    let selecting = action == FilterAction::Include;

    let changed = model.bulk_set_selected(
        |record| {
            if selecting && record.is_protected {
                return false;
            }
            regex.is_match(record.name())
        },
        selecting,
    );
    Ok(changed)
}

/// Optional commit-date bounds. Both bounds unset matches nothing; a record
/// with an unparseable commit timestamp never matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub after: Option<NaiveDate>,
    pub before: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(after: Option<NaiveDate>, before: Option<NaiveDate>) -> Self {
        Self { after, before }
    }

    pub fn is_unbounded(&self) -> bool {
        self.after.is_none() && self.before.is_none()
    }

    /// `after` is inclusive of the named day; `before` cuts strictly below
    /// midnight of the named day.
    pub fn matches(&self, commit_at: Option<DateTime<Utc>>) -> bool {
        if self.is_unbounded() {
            return false;
        }
        let Some(commit_at) = commit_at else {
            return false;
        };
        if let Some(after) = self.after {
            if commit_at < start_of_day(after) {
                return false;
            }
        }
        if let Some(before) = self.before {
            if commit_at >= start_of_day(before) {
                return false;
            }
        }
        true
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Applies a commit-date filter. Date filters are protection-agnostic; the
/// final confirmation step is the safety net for bulk date cleanup.
pub fn apply_date_filter(model: &mut SelectionModel, range: DateRange, action: FilterAction) -> usize {
    let selecting = action == FilterAction::Include;
    model.bulk_set_selected(|record| range.matches(record.last_commit_at), selecting)
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| classify_pattern_error(pattern, &err))
}

fn classify_pattern_error(pattern: &str, err: &regex::Error) -> SweepError {
    let message = err.to_string();
    let lower = message.to_lowercase();

    let kind = if lower.contains("unclosed group") || lower.contains("unopened group") {
        PatternSyntaxKind::UnterminatedGroup
    } else if lower.contains("repetition operator missing expression")
        || lower.contains("dangling")
    {
        PatternSyntaxKind::DanglingQuantifier
    } else if lower.contains("repetition") {
        PatternSyntaxKind::IllegalRepetition
    } else {
        PatternSyntaxKind::Other
    };

    SweepError::pattern_syntax(kind, pattern, message)
}
