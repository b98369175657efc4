//! Tree register file reading.
//!
//! Reads physical lines, folds records whose quoted values contain line
//! breaks, splits them into fields and constructs [`TreeRecord`]s. A field
//! that fails validation is reset to the sentinel and construction retried,
//! once per distinct failing column.

use crate::config::{ParserConfig, RepairConfig, ValidationBounds};
use crate::constants::SENTINEL_STR;
use crate::error::{Result, TreeError};
use crate::models::{Field, TreeRecord};
use crate::parser::{needs_continuation, split_record};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Statistics collected while loading a register
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Physical lines consumed
    pub lines_read: usize,
    /// Records turned into trees
    pub records_built: usize,
    /// Logical records abandoned
    pub records_skipped: usize,
    /// Individual fields reset to the sentinel
    pub fields_reset: usize,
    /// Reading stopped at the line limit
    pub truncated: bool,
}

/// Result of loading a register
#[derive(Debug, Clone)]
pub struct LoadedRegister {
    pub trees: Vec<TreeRecord>,
    pub stats: LoadStats,
}

/// Read every tree from a register file
pub fn read_trees(
    path: &Path,
    parser: &ParserConfig,
    bounds: &ValidationBounds,
    repair: &RepairConfig,
) -> Result<LoadedRegister> {
    if !path.exists() {
        return Err(TreeError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(TreeError::Io)?;
    let loaded = read_trees_from(BufReader::new(file), parser, bounds, repair)?;

    info!(
        "Loaded {} trees from {} ({} lines read, {} records skipped, {} fields reset)",
        loaded.stats.records_built,
        path.display(),
        loaded.stats.lines_read,
        loaded.stats.records_skipped,
        loaded.stats.fields_reset
    );

    Ok(loaded)
}

/// Read every tree from any buffered source
pub fn read_trees_from<R: BufRead>(
    mut reader: R,
    parser: &ParserConfig,
    bounds: &ValidationBounds,
    repair: &RepairConfig,
) -> Result<LoadedRegister> {
    let mut buf = Vec::new();
    let mut trees = Vec::new();
    let mut stats = LoadStats::default();

    loop {
        if stats.lines_read >= parser.max_lines {
            warn!(
                "Line limit of {} reached, remaining input ignored",
                parser.max_lines
            );
            stats.truncated = true;
            break;
        }

        let Some(mut text) = next_line(&mut reader, &mut buf, stats.lines_read + 1)? else {
            break;
        };
        stats.lines_read += 1;
        let first_line = stats.lines_read;

        let mut appended = 0;
        while needs_continuation(&text, parser)
            && appended < parser.max_continuation_lines
            && stats.lines_read < parser.max_lines
        {
            let Some(next) = next_line(&mut reader, &mut buf, stats.lines_read + 1)? else {
                break;
            };
            text.push('\n');
            text.push_str(&next);
            stats.lines_read += 1;
            appended += 1;
        }

        let record = text.trim();
        if record.is_empty() {
            continue;
        }

        let fields = split_record(record, parser);
        if fields.len() > parser.field_count {
            warn!(
                "Skipping line {}: {} fields, expected {}",
                first_line,
                fields.len(),
                parser.field_count
            );
            stats.records_skipped += 1;
            continue;
        }

        match construct_with_retry(fields, bounds, repair.max_construction_attempts) {
            Ok((tree, resets)) => {
                stats.fields_reset += resets;
                stats.records_built += 1;
                trees.push(tree);
            }
            Err(e) => {
                debug!("Skipping line {}: {}", first_line, e);
                stats.records_skipped += 1;
            }
        }
    }

    Ok(LoadedRegister { trees, stats })
}

/// Read one physical line without its line ending
///
/// Bytes that are not valid UTF-8 are replaced so that a single badly
/// encoded value cannot abort the load. `None` at end of input.
fn next_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    line_number: usize,
) -> Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf).map_err(TreeError::Io)? == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    let text = match String::from_utf8_lossy(buf) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            debug!("Line {} is not valid UTF-8, invalid bytes replaced", line_number);
            text
        }
    };
    Ok(Some(text))
}

/// Construct a tree, resetting each invalid field to the sentinel and retrying
///
/// Returns the tree and the number of fields that were reset. An invalid id
/// is not retried: the record has no identity and is abandoned.
pub fn construct_with_retry(
    mut fields: Vec<Option<String>>,
    bounds: &ValidationBounds,
    max_attempts: usize,
) -> Result<(TreeRecord, usize)> {
    let mut reset: Vec<Field> = Vec::new();
    let mut last_error = TreeError::field_invalid(Field::Id, "");

    for _ in 0..max_attempts.max(1) {
        match TreeRecord::from_fields(&fields, bounds) {
            Ok(tree) => return Ok((tree, reset.len())),
            Err(TreeError::FieldInvalid { field, value }) => {
                if field == Field::Id || reset.contains(&field) {
                    return Err(TreeError::FieldInvalid { field, value });
                }

                debug!("Resetting {} ('{}') to missing", field, value);
                if fields.len() <= field.index() {
                    fields.resize(field.index() + 1, None);
                }
                fields[field.index()] = Some(SENTINEL_STR.to_string());
                reset.push(field);
                last_error = TreeError::FieldInvalid { field, value };
            }
            Err(other) => return Err(other),
        }
    }

    Err(last_error)
}
