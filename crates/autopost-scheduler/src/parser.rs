use autopost_core::{
    types::{column, COLUMN_COUNT, SCHEDULE_FORMAT},
    Job, JobId, Mode,
};
use chrono::NaiveDateTime;

use crate::error::RowIssue;

/// Validate one raw row.
///
/// Checks run in a fixed order: column count, required fields, schedule,
/// mode. The first failing check is reported.
pub fn parse_row(id: JobId, cells: &[String]) -> Result<Job, RowIssue> {
    if cells.len() != COLUMN_COUNT {
        return Err(RowIssue::WrongColumnCount {
            expected: COLUMN_COUNT,
            found: cells.len(),
        });
    }

    let cell = |i: usize| cells[i].trim();

    for (field, index) in [
        ("platform", column::PLATFORM),
        ("mode", column::MODE),
        ("date", column::DATE),
        ("time_of_day", column::TIME),
        ("caption", column::CAPTION),
    ] {
        if cell(index).is_empty() {
            return Err(RowIssue::MissingField { field });
        }
    }

    let schedule = format!("{} {}", cell(column::DATE), cell(column::TIME));
    let scheduled_at = NaiveDateTime::parse_from_str(&schedule, SCHEDULE_FORMAT)
        .map_err(|_| RowIssue::InvalidSchedule { value: schedule })?;

    let mode_raw = cell(column::MODE).to_lowercase();
    let mode: Mode = mode_raw
        .parse()
        .map_err(|_| RowIssue::InvalidMode { value: mode_raw })?;

    Ok(Job {
        id,
        product: cell(column::PRODUCT).to_string(),
        keywords: cell(column::KEYWORDS).to_string(),
        platform: cell(column::PLATFORM).to_lowercase(),
        scheduled_at,
        token: optional(cell(column::TOKEN)),
        account_id: optional(cell(column::ACCOUNT_ID)),
        mode,
        caption: cell(column::CAPTION).to_string(),
        image: optional(cell(column::IMAGE)),
    })
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
