use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::session_log::SessionLog;
use crate::subject::{IdType, Subject, SubjectStore};

use super::validate::IdentifierValidator;
use super::{ImportError, ImportStats};

const FIXED_COLUMNS: usize = 3;

/// Import one CSV file into `store`.
///
/// Row-level problems (bad identifiers, duplicates) are counted in `stats`
/// and written to `log`; only I/O and CSV decoding failures are errors.
pub fn import_file(
    path: &Path,
    store: &mut SubjectStore,
    stats: &mut ImportStats,
    log: &mut SessionLog,
    validator: &dyn IdentifierValidator,
) -> Result<(), ImportError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| ImportError::Open {
            path: path.display().to_string(),
            source,
        })?;

    import_records(&name, reader, store, stats, log, validator)
}

/// Import CSV data from any reader. `name` identifies the sheet in log
/// messages.
pub fn import_reader<R: Read>(
    name: &str,
    input: R,
    store: &mut SubjectStore,
    stats: &mut ImportStats,
    log: &mut SessionLog,
    validator: &dyn IdentifierValidator,
) -> Result<(), ImportError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    import_records(name, reader, store, stats, log, validator)
}

fn import_records<R: Read>(
    name: &str,
    mut reader: csv::Reader<R>,
    store: &mut SubjectStore,
    stats: &mut ImportStats,
    log: &mut SessionLog,
    validator: &dyn IdentifierValidator,
) -> Result<(), ImportError> {
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(|source| read_error(name, 1, source))?,
        None => csv::StringRecord::new(),
    };
    if header.get(0).map(str::trim) != Some("UIN") {
        warn!(file = name, "Cell A1 does not contain UIN, skipping file");
        log.push(format!(
            "WARNING: file '{}' cell A1 does not contain 'UIN'",
            name
        ));
        return Ok(());
    }

    let extra_headers: Vec<String> = header
        .iter()
        .skip(FIXED_COLUMNS)
        .map(|h| h.trim().to_string())
        .collect();
    store.set_extra_headers(extra_headers.clone());

    let before = *stats;
    let mut added = 0usize;

    for (idx, record) in records.enumerate() {
        let row = idx as u64 + 2;
        let record = record.map_err(|source| read_error(name, row, source))?;

        let raw_id = record.get(0).unwrap_or("");
        let raw_nat = record.get(1).unwrap_or("");
        let raw_passport = record.get(2).unwrap_or("");

        if raw_id.trim().is_empty() && raw_nat.trim().is_empty() {
            continue;
        }
        stats.total_read += 1;

        let id = clean(raw_id);
        let nationality = raw_nat.trim().to_uppercase();
        let passport = clean(raw_passport);

        let id_type = if id.is_empty() {
            IdType::Passport
        } else {
            IdType::Uin
        };

        match id_type {
            IdType::Uin if !validator.is_valid(&id) => {
                stats.invalid += 1;
                debug!(file = name, row, "Invalid UIN");
                log.push(format!(
                    "Invalid UIN: file '{}' cell 'A{}' value '{}'",
                    name, row, raw_id
                ));
                continue;
            }
            IdType::Passport if nationality.chars().count() != 2 => {
                stats.invalid += 1;
                debug!(file = name, row, "Invalid passport row");
                log.push(format!(
                    "Invalid Passport Number or Country Code: file '{}' cell 'B{}' value '{}' '{}'",
                    name, row, raw_nat, raw_passport
                ));
                continue;
            }
            _ => {}
        }

        let extra = extra_headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let value = record.get(FIXED_COLUMNS + i).unwrap_or("");
                (h.clone(), value.to_string())
            })
            .collect();

        let subject = Subject::new(id_type, id, nationality, passport).with_extra(extra);
        if store.insert(subject) {
            added += 1;
        } else {
            stats.duplicate += 1;
            log.push(format!(
                "Duplicate ID: file '{}' cell 'A{}' value '{}' '{}' '{}'",
                name, row, raw_id, raw_nat, raw_passport
            ));
        }
    }

    info!(
        file = name,
        read = stats.total_read - before.total_read,
        added,
        invalid = stats.invalid - before.invalid,
        duplicate = stats.duplicate - before.duplicate,
        "Imported sheet"
    );

    Ok(())
}

/// Uppercase and keep only `[A-Z0-9]`.
fn clean(raw: &str) -> String {
    raw.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

fn read_error(name: &str, line: u64, source: csv::Error) -> ImportError {
    ImportError::Read {
        file: name.to_string(),
        line,
        source,
    }
}
