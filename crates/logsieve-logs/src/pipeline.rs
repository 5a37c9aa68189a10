use tracing::debug;

use logsieve_types::{RawLogLine, TIMESTAMP_FORMAT};

use crate::error::{QueryError, Result};
use crate::filter::QueryFilter;
use crate::parser::LogParser;
use crate::sort::{TimedEntry, sort_descending};

/// Select the lines matching `filter`, most recent first.
///
/// Lines that do not parse are skipped. Timestamps are interpreted only for
/// lines that pass the filter, and a malformed one fails the whole selection.
/// The returned strings are the original lines, unmodified.
///
/// # Errors
///
/// Returns [`QueryError::MalformedTimestamp`] for a matching line whose
/// timestamp does not follow the access log format.
pub fn select<I, S>(lines: I, filter: &QueryFilter) -> Result<Vec<RawLogLine>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut total = 0usize;
    let mut skipped = 0usize;
    let mut matched = Vec::new();

    for line in lines {
        total += 1;
        let Some(entry) = LogParser::parse(line.as_ref()) else {
            skipped += 1;
            continue;
        };
        if !filter.matches(&entry) {
            continue;
        }

        let timestamp = entry
            .timestamp()
            .map_err(|source| QueryError::MalformedTimestamp {
                value: entry.timestamp_text.clone(),
                format: TIMESTAMP_FORMAT,
                source,
            })?;
        matched.push(TimedEntry { timestamp, entry });
    }

    sort_descending(&mut matched);
    debug!(total, skipped, matched = matched.len(), "selected log lines");

    Ok(matched.into_iter().map(|t| t.entry.raw).collect())
}
