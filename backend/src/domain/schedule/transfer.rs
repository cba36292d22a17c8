//! Schedule import and export in CSV, JSON, and iCalendar formats.
//!
//! Export serialises a uniform row shape; import validates payloads
//! field-by-field and reports rejected rows individually instead of failing
//! the whole upload. The iCalendar codec is a minimal RFC 5545 VEVENT
//! writer/reader sufficient for fixture lists.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Wire formats supported for schedule transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array of rows.
    Json,
    /// iCalendar (RFC 5545) VEVENT list.
    Ics,
}

impl TransferFormat {
    /// Parse a query-string format name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "ics" | "ical" | "icalendar" => Some(Self::Ics),
            _ => None,
        }
    }

    /// MIME type for HTTP responses.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Ics => "text/calendar",
        }
    }
}

/// One exported schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    /// Match identifier, when the row describes a persisted match.
    pub match_id: Option<Uuid>,
    /// 1-based matchday number.
    pub matchday: u32,
    /// Kickoff timestamp.
    pub kickoff: DateTime<Utc>,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Venue name, if assigned.
    pub venue: Option<String>,
    /// Draft or game status wire name.
    pub status: String,
    /// Home score, when known.
    pub home_score: Option<i32>,
    /// Away score, when known.
    pub away_score: Option<i32>,
}

/// A proposed match accepted from an import payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedMatch {
    /// 1-based payload row the match came from.
    pub row: usize,
    /// Home team name, resolved to an id by the workflow service.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Proposed kickoff.
    pub kickoff: DateTime<Utc>,
    /// 1-based matchday number.
    pub matchday: u32,
    /// Venue name, if present.
    pub venue: Option<String>,
}

/// One rejected import row with the reason it was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRejection {
    /// 1-based row (CSV/JSON index, ICS event ordinal).
    pub row: usize,
    /// Why the row was rejected.
    pub reason: String,
}

/// Per-row outcome of parsing an import payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedImport {
    /// Rows that passed field validation.
    pub accepted: Vec<ImportedMatch>,
    /// Rows refused, each with its reason.
    pub rejected: Vec<ImportRejection>,
}

/// Failures that abort a transfer outright (unreadable payloads).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The payload is not decodable in the requested format at all.
    #[error("malformed {format} payload: {message}")]
    Malformed {
        /// Format being parsed.
        format: &'static str,
        /// Decoder failure.
        message: String,
    },
}

const CSV_HEADERS: [&str; 7] = [
    "matchday",
    "date",
    "time",
    "home_team",
    "away_team",
    "venue",
    "status",
];

/// Serialise rows in the requested format.
pub fn export_rows(rows: &[ScheduleRow], format: TransferFormat) -> Result<Vec<u8>, TransferError> {
    match format {
        TransferFormat::Csv => export_csv(rows),
        TransferFormat::Json => serde_json::to_vec_pretty(rows).map_err(|err| {
            TransferError::Malformed {
                format: "json",
                message: err.to_string(),
            }
        }),
        TransferFormat::Ics => Ok(export_ics(rows)),
    }
}

fn export_csv(rows: &[ScheduleRow]) -> Result<Vec<u8>, TransferError> {
    let map_err = |err: csv::Error| TransferError::Malformed {
        format: "csv",
        message: err.to_string(),
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut headers: Vec<&str> = CSV_HEADERS.to_vec();
    headers.extend(["home_score", "away_score", "match_id"]);
    writer.write_record(&headers).map_err(map_err)?;
    for row in rows {
        writer
            .write_record([
                row.matchday.to_string(),
                row.kickoff.format("%Y-%m-%d").to_string(),
                row.kickoff.format("%H:%M").to_string(),
                row.home_team.clone(),
                row.away_team.clone(),
                row.venue.clone().unwrap_or_default(),
                row.status.clone(),
                row.home_score.map(|s| s.to_string()).unwrap_or_default(),
                row.away_score.map(|s| s.to_string()).unwrap_or_default(),
                row.match_id.map(|id| id.to_string()).unwrap_or_default(),
            ])
            .map_err(map_err)?;
    }
    writer.into_inner().map_err(|err| TransferError::Malformed {
        format: "csv",
        message: err.to_string(),
    })
}

fn export_ics(rows: &[ScheduleRow]) -> Vec<u8> {
    let mut out = String::new();
    out.push_str("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//league-backend//schedule//EN\r\n");
    for row in rows {
        let uid = row
            .match_id
            .map_or_else(|| Uuid::new_v4().to_string(), |id| id.to_string());
        out.push_str("BEGIN:VEVENT\r\n");
        out.push_str(&format!("UID:{uid}@league-backend\r\n"));
        out.push_str(&format!(
            "DTSTART:{}\r\n",
            row.kickoff.format("%Y%m%dT%H%M%SZ")
        ));
        out.push_str(&format!("SUMMARY:{} vs {}\r\n", row.home_team, row.away_team));
        if let Some(venue) = &row.venue {
            out.push_str(&format!("LOCATION:{venue}\r\n"));
        }
        out.push_str(&format!("CATEGORIES:MATCHDAY-{}\r\n", row.matchday));
        out.push_str("END:VEVENT\r\n");
    }
    out.push_str("END:VCALENDAR\r\n");
    out.into_bytes()
}

/// Parse an import payload, validating each row individually.
pub fn parse_import(payload: &[u8], format: TransferFormat) -> Result<ParsedImport, TransferError> {
    match format {
        TransferFormat::Csv => parse_csv(payload),
        TransferFormat::Json => parse_json(payload),
        TransferFormat::Ics => parse_ics(payload),
    }
}

fn parse_csv(payload: &[u8]) -> Result<ParsedImport, TransferError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(payload);
    let mut parsed = ParsedImport::default();
    for (index, record) in reader.records().enumerate() {
        let row = index + 1;
        match record {
            Ok(record) => match csv_record_to_match(&record, row) {
                Ok(accepted) => parsed.accepted.push(accepted),
                Err(reason) => parsed.rejected.push(ImportRejection { row, reason }),
            },
            Err(err) => parsed.rejected.push(ImportRejection {
                row,
                reason: format!("unreadable record: {err}"),
            }),
        }
    }
    Ok(parsed)
}

fn csv_record_to_match(record: &csv::StringRecord, row: usize) -> Result<ImportedMatch, String> {
    let field = |index: usize, name: &str| -> Result<&str, String> {
        record
            .get(index)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| format!("missing field {name}"))
    };
    let matchday: u32 = field(0, "matchday")?
        .parse()
        .map_err(|_| "matchday must be a positive integer".to_owned())?;
    let date: NaiveDate = field(1, "date")?
        .parse()
        .map_err(|_| "date must be YYYY-MM-DD".to_owned())?;
    let time = NaiveTime::parse_from_str(field(2, "time")?, "%H:%M")
        .map_err(|_| "time must be HH:MM".to_owned())?;
    let home_team = field(3, "home_team")?.to_owned();
    let away_team = field(4, "away_team")?.to_owned();
    if home_team == away_team {
        return Err("home and away team must differ".to_owned());
    }
    let venue = record
        .get(5)
        .filter(|value| !value.is_empty())
        .map(str::to_owned);
    Ok(ImportedMatch {
        row,
        home_team,
        away_team,
        kickoff: Utc.from_utc_datetime(&NaiveDateTime::new(date, time)),
        matchday,
        venue,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonImportRow {
    matchday: u32,
    kickoff: DateTime<Utc>,
    home_team: String,
    away_team: String,
    #[serde(default)]
    venue: Option<String>,
}

fn parse_json(payload: &[u8]) -> Result<ParsedImport, TransferError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_slice(payload).map_err(|err| TransferError::Malformed {
            format: "json",
            message: err.to_string(),
        })?;
    let mut parsed = ParsedImport::default();
    for (index, value) in values.into_iter().enumerate() {
        let row = index + 1;
        match serde_json::from_value::<JsonImportRow>(value) {
            Ok(entry) if entry.home_team == entry.away_team => {
                parsed.rejected.push(ImportRejection {
                    row,
                    reason: "home and away team must differ".to_owned(),
                });
            }
            Ok(entry) => parsed.accepted.push(ImportedMatch {
                row,
                home_team: entry.home_team,
                away_team: entry.away_team,
                kickoff: entry.kickoff,
                matchday: entry.matchday,
                venue: entry.venue,
            }),
            Err(err) => parsed.rejected.push(ImportRejection {
                row,
                reason: err.to_string(),
            }),
        }
    }
    Ok(parsed)
}

fn parse_ics(payload: &[u8]) -> Result<ParsedImport, TransferError> {
    let text = std::str::from_utf8(payload).map_err(|err| TransferError::Malformed {
        format: "ics",
        message: err.to_string(),
    })?;
    if !text.contains("BEGIN:VCALENDAR") {
        return Err(TransferError::Malformed {
            format: "ics",
            message: "missing BEGIN:VCALENDAR".to_owned(),
        });
    }

    let mut parsed = ParsedImport::default();
    let mut ordinal = 0usize;
    let mut current: Option<IcsEvent> = None;
    for line in unfold_ics_lines(text) {
        match line.as_str() {
            "BEGIN:VEVENT" => {
                ordinal += 1;
                current = Some(IcsEvent::default());
            }
            "END:VEVENT" => {
                if let Some(event) = current.take() {
                    match event.into_match(ordinal) {
                        Ok(accepted) => parsed.accepted.push(accepted),
                        Err(reason) => parsed.rejected.push(ImportRejection {
                            row: ordinal,
                            reason,
                        }),
                    }
                }
            }
            _ => {
                if let Some(event) = current.as_mut() {
                    event.absorb(&line);
                }
            }
        }
    }
    Ok(parsed)
}

/// Reassemble folded content lines before property parsing. A physical line
/// starting with a space or tab continues the previous line (RFC 5545
/// section 3.1), with the single leading whitespace octet removed.
fn unfold_ics_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines().map(|line| line.trim_end_matches('\r')) {
        if let Some(rest) = raw.strip_prefix([' ', '\t']) {
            if let Some(previous) = lines.last_mut() {
                previous.push_str(rest);
                continue;
            }
        }
        lines.push(raw.to_owned());
    }
    lines
}

#[derive(Debug, Default)]
struct IcsEvent {
    dtstart: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    categories: Option<String>,
}

impl IcsEvent {
    fn absorb(&mut self, line: &str) {
        if let Some(value) = line.strip_prefix("DTSTART:") {
            self.dtstart = Some(value.to_owned());
        } else if let Some(value) = line.strip_prefix("SUMMARY:") {
            self.summary = Some(value.to_owned());
        } else if let Some(value) = line.strip_prefix("LOCATION:") {
            self.location = Some(value.to_owned());
        } else if let Some(value) = line.strip_prefix("CATEGORIES:") {
            self.categories = Some(value.to_owned());
        }
    }

    fn into_match(self, row: usize) -> Result<ImportedMatch, String> {
        let dtstart = self.dtstart.ok_or("missing DTSTART")?;
        let naive = NaiveDateTime::parse_from_str(&dtstart, "%Y%m%dT%H%M%SZ")
            .map_err(|_| format!("DTSTART not in basic UTC form: {dtstart}"))?;
        let summary = self.summary.ok_or("missing SUMMARY")?;
        let (home, away) = summary
            .split_once(" vs ")
            .ok_or("SUMMARY must be 'Home vs Away'")?;
        if home.is_empty() || away.is_empty() || home == away {
            return Err("SUMMARY must name two distinct teams".to_owned());
        }
        let matchday = self
            .categories
            .as_deref()
            .and_then(|value| value.strip_prefix("MATCHDAY-"))
            .and_then(|value| value.parse().ok())
            .unwrap_or(1);
        Ok(ImportedMatch {
            row,
            home_team: home.to_owned(),
            away_team: away.to_owned(),
            kickoff: Utc.from_utc_datetime(&naive),
            matchday,
            venue: self.location,
        })
    }
}
