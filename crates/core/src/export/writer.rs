use std::fmt::Display;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use tracing::info;

use crate::client::TestResultCode;
use crate::subject::{Subject, SubjectStore};

use super::ExportError;

/// Leading columns of every export, before the carried-through extras.
pub const FIXED_HEADERS: [&str; 6] = [
    "UIN",
    "Nationality",
    "Passport Number",
    "Covid test result",
    "Swab Reason",
    "Produced At",
];

/// `status-YYYYMMDD-HHMMSS.csv` for the given instant.
pub fn export_file_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("status-%Y%m%d-%H%M%S.csv").to_string()
}

/// Write every subject in insertion order. Returns the number of data rows.
pub fn write_csv<W: Write>(store: &SubjectStore, out: W) -> Result<usize, ExportError> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header: Vec<&str> = FIXED_HEADERS.to_vec();
    header.extend(store.extra_headers().iter().map(String::as_str));
    writer.write_record(&header)?;

    let mut rows = 0;
    for subject in store.iter() {
        writer.write_record(row(subject, store.extra_headers()))?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

/// Write the export into `dir` under [`export_file_name`] and return its path.
pub fn export_to_dir(
    store: &SubjectStore,
    dir: &Path,
    now: &DateTime<Local>,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(now));
    let file = File::create(&path).map_err(|source| ExportError::Create {
        path: path.display().to_string(),
        source,
    })?;

    let rows = write_csv(store, file)?;
    info!(path = %path.display(), rows, "Exported results");
    Ok(path)
}

fn row(subject: &Subject, extra_headers: &[String]) -> Vec<String> {
    let (result, swab_reason, produced_at) = match &subject.payload {
        None => (String::new(), String::new(), String::new()),
        Some(payload) => match payload.latest() {
            None => (TestResultCode::NoResult.to_string(), String::new(), String::new()),
            Some(latest) => (
                latest.result.clone(),
                latest.swab_reason.clone().unwrap_or_default(),
                latest
                    .produced_at
                    .as_deref()
                    .map(local_time)
                    .unwrap_or_default(),
            ),
        },
    };

    let mut row = vec![
        subject.uin.clone(),
        subject.nationality.clone(),
        subject.passport.clone(),
        result,
        swab_reason,
        produced_at,
    ];

    for header in extra_headers {
        let value = subject
            .extra
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        row.push(value);
    }
    row
}

/// RFC 3339 timestamps in local time, anything else verbatim.
fn local_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}
