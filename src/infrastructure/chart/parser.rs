//! Panel chart parsing.
//!
//! The chart is one HTML table with a row per week. A data row has at least
//! 16 cells: a `"DD/MM/YYYY to DD/MM/YYYY"` range followed by an
//! `open3 | double | close3` triple for each day Monday to Friday.

use crate::domain::draw::{Double, DrawProvenance, DrawRecord, Panel};
use crate::domain::errors::{DrawError, IngestError};
use chrono::{DateTime, Days, NaiveDate, Utc};
use tracing::{debug, warn};

/// Date cell plus five day triples.
pub const MIN_DATA_CELLS: usize = 16;
pub const DAYS_PER_ROW: usize = 5;

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%m/%d/%Y", "%Y-%m-%d"];

/// One `<tr>` of the chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub raw: String,
    pub cells: Vec<String>,
}

/// Every valid draw on the chart, plus the number of day slots rejected.
#[derive(Debug, Clone, Default)]
pub struct ChartHistory {
    pub records: Vec<DrawRecord>,
    pub skipped: usize,
}

/// Data rows of the first table on the page.
pub fn extract_rows(html: &str) -> Result<Vec<ChartRow>, IngestError> {
    let lower = html.to_ascii_lowercase();
    let start = find_tag(&lower, "table", 0).ok_or(IngestError::NoTable)?;
    let end = lower[start..]
        .find("</table")
        .map(|i| start + i)
        .unwrap_or(html.len());

    let mut rows = Vec::new();
    let mut cursor = start;
    while let Some(row_start) = find_tag(&lower, "tr", cursor).filter(|&i| i < end) {
        let row_end = next_boundary(&lower, row_start + 3, end, &["</tr", "<tr"]);
        let cells = extract_cells(&html[row_start..row_end], &lower[row_start..row_end]);
        if cells.len() >= MIN_DATA_CELLS {
            rows.push(ChartRow {
                raw: html[row_start..row_end].trim().to_string(),
                cells,
            });
        }
        cursor = row_end;
    }
    debug!("Found {} data rows in the table", rows.len());
    Ok(rows)
}

/// Start of a `"start to end"` range.
pub fn parse_range_start(range: &str) -> Result<NaiveDate, DrawError> {
    let invalid = |reason: &str| DrawError::InvalidDateRange {
        value: range.to_string(),
        reason: reason.to_string(),
    };
    let to_index = range
        .to_ascii_lowercase()
        .find("to")
        .filter(|&i| i > 0)
        .ok_or_else(|| invalid("missing 'to' separator"))?;
    let start = range[..to_index].trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(start, fmt).ok())
        .ok_or_else(|| invalid("unrecognised start date"))
}

/// Friday draw of the last week on the chart.
pub fn parse_latest(
    html: &str,
    source_url: &str,
    fetched_at: DateTime<Utc>,
) -> Result<DrawRecord, IngestError> {
    let rows = extract_rows(html)?;
    let row = rows.last().ok_or(IngestError::NoDataRows)?;
    let start = parse_range_start(&row.cells[0])?;
    let provenance = DrawProvenance {
        raw_source: row.raw.clone(),
        source_url: source_url.to_string(),
        fetched_at,
    };
    day_record(row, start, DAYS_PER_ROW - 1, provenance).map_err(|reason| {
        IngestError::InvalidRow {
            date: row.cells[0].clone(),
            reason,
        }
    })
}

/// Every valid day of every row, ascending by date.
pub fn parse_history(
    html: &str,
    source_url: &str,
    fetched_at: DateTime<Utc>,
) -> Result<ChartHistory, IngestError> {
    let rows = extract_rows(html)?;
    if rows.is_empty() {
        return Err(IngestError::NoDataRows);
    }

    let mut history = ChartHistory::default();
    for (index, row) in rows.iter().enumerate() {
        let start = match parse_range_start(&row.cells[0]) {
            Ok(date) => date,
            Err(e) => {
                warn!("Skipping row {}: {}", index, e);
                history.skipped += DAYS_PER_ROW;
                continue;
            }
        };
        for day in 0..DAYS_PER_ROW {
            let provenance = DrawProvenance {
                raw_source: row.raw.clone(),
                source_url: source_url.to_string(),
                fetched_at,
            };
            match day_record(row, start, day, provenance) {
                Ok(record) => history.records.push(record),
                Err(reason) => {
                    warn!("Invalid data in row {} day {}: {}", index, day + 1, reason);
                    history.skipped += 1;
                }
            }
        }
    }
    history.records.sort_by_key(|r| r.date);
    Ok(history)
}

fn day_record(
    row: &ChartRow,
    start: NaiveDate,
    day: usize,
    provenance: DrawProvenance,
) -> Result<DrawRecord, String> {
    let base = 1 + day * 3;
    let cell = |offset: usize| {
        row.cells
            .get(base + offset)
            .map(|c| compact(c))
            .unwrap_or_default()
    };
    let open3: Panel = cell(0).parse().map_err(|e: DrawError| e.to_string())?;
    let double: Double = cell(1).parse().map_err(|e: DrawError| e.to_string())?;
    let close3: Panel = cell(2).parse().map_err(|e: DrawError| e.to_string())?;
    let date = start
        .checked_add_days(Days::new(day as u64))
        .ok_or_else(|| format!("date overflow from {}", start))?;
    Ok(DrawRecord::new(date, open3, close3, double, provenance))
}

/// Position of the next `<name` opening tag at or after `from`.
fn find_tag(lower: &str, name: &str, from: usize) -> Option<usize> {
    let needle = format!("<{}", name);
    let mut cursor = from;
    while let Some(offset) = lower.get(cursor..)?.find(&needle) {
        let at = cursor + offset;
        match lower.as_bytes().get(at + needle.len()) {
            Some(b'>') | Some(b'/') => return Some(at),
            Some(b) if b.is_ascii_whitespace() => return Some(at),
            None => return None,
            _ => cursor = at + needle.len(),
        }
    }
    None
}

fn next_boundary(lower: &str, from: usize, limit: usize, markers: &[&str]) -> usize {
    markers
        .iter()
        .filter_map(|m| lower.get(from..limit)?.find(m).map(|i| from + i))
        .min()
        .unwrap_or(limit)
}

fn extract_cells(row: &str, lower: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cursor = 0;
    while let Some(tag) = find_tag(lower, "td", cursor) {
        let Some(open_end) = lower[tag..].find('>').map(|i| tag + i + 1) else {
            break;
        };
        let close = next_boundary(lower, open_end, lower.len(), &["</td", "<td"]);
        cells.push(cell_text(&row[open_end..close]));
        cursor = close;
    }
    cells
}

/// Visible text of a cell, whitespace-normalised.
fn cell_text(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Digits printed across line breaks (`1<br>3<br>8`) read as one value.
fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week(range: &str, days: [(&str, &str, &str); 5]) -> String {
        let mut row = format!("<tr><td>{}</td>", range);
        for (open3, double, close3) in days {
            row.push_str(&format!(
                "<td class=\"cc\">{}</td><td>{}</td><td>{}</td>",
                open3, double, close3
            ));
        }
        row.push_str("</tr>");
        row
    }

    fn page(rows: &[String]) -> String {
        format!(
            "<html><body><TABLE class=\"panel\"><tr><th>Date</th><th>Mon</th></tr>{}</TABLE></body></html>",
            rows.join("\n")
        )
    }

    fn fetched() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_range_start_formats() {
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parse_range_start("01/01/2024 to 07/01/2024").unwrap(), jan1);
        assert_eq!(parse_range_start("01/01/2024to07/01/2024").unwrap(), jan1);
        assert_eq!(parse_range_start("2024-01-01 To 2024-01-07").unwrap(), jan1);
        // Month-first fallback when day-first is impossible.
        assert_eq!(
            parse_range_start("12/25/2023 to 12/29/2023").unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()
        );
        assert!(parse_range_start("to 07/01/2024").is_err());
        assert!(parse_range_start("yesterday").is_err());
    }

    #[test]
    fn test_latest_is_friday_of_last_row() {
        let html = page(&[
            week("25/12/2023 to 29/12/2023", [("111", "33", "111"); 5]),
            week(
                "01/01/2024 to 07/01/2024",
                [
                    ("123", "61", "456"),
                    ("234", "90", "345"),
                    ("***", "**", "***"),
                    ("389", "07", "124"),
                    ("1<br>3<br>8", "23", "5 7 0"),
                ],
            ),
        ]);

        let record = parse_latest(&html, "http://chart", fetched()).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(record.double.value(), 23);
        assert_eq!(record.open3.to_string(), "138");
        assert_eq!(record.close3.to_string(), "570");
        assert!(record.provenance.raw_source.starts_with("<tr>"));
        assert_eq!(record.provenance.source_url, "http://chart");
    }

    #[test]
    fn test_history_skips_invalid_days() {
        let html = page(&[
            week(
                "01/01/2024 to 07/01/2024",
                [
                    ("123", "61", "456"),
                    ("234", "90", "345"),
                    ("***", "**", "***"),
                    ("389", "07", "124"),
                    ("138", "23", "570"),
                ],
            ),
            week("bad range", [("111", "33", "111"); 5]),
        ]);

        let history = parse_history(&html, "http://chart", fetched()).unwrap();
        assert_eq!(history.records.len(), 4);
        assert_eq!(history.skipped, 6);
        let dates: Vec<String> = history.records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-04", "2024-01-05"]);
    }

    #[test]
    fn test_invalid_latest_day_is_error() {
        let html = page(&[week("01/01/2024 to 07/01/2024", [("***", "**", "***"); 5])]);
        assert!(matches!(
            parse_latest(&html, "u", fetched()),
            Err(IngestError::InvalidRow { .. })
        ));
    }

    #[test]
    fn test_missing_table_and_rows() {
        assert!(matches!(
            parse_latest("<html><p>closed</p></html>", "u", fetched()),
            Err(IngestError::NoTable)
        ));
        assert!(matches!(
            parse_latest(&page(&[]), "u", fetched()),
            Err(IngestError::NoDataRows)
        ));
    }

    #[test]
    fn test_short_rows_are_ignored() {
        let html = page(&["<tr><td>01/01/2024 to 07/01/2024</td><td>123</td></tr>".to_string()]);
        assert!(extract_rows(&html).unwrap().is_empty());
    }
}
