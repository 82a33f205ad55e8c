//! Copy measurement columns from matched source rows to matched target rows.

use crate::config::ColumnPair;
use crate::matching::MatchResult;
use crate::table::Table;
use anyhow::Result;
use log::debug;
use std::fmt;

/// Why one accepted match produced no transfer. Apartment stripping is
/// lossy, so several rows can collapse onto one address; guessing which
/// duplicate to use is never acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSourceRow,
    AmbiguousSourceRows(usize),
    NoTargetRow,
    AmbiguousTargetRows(usize),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSourceRow => write!(f, "no source row with this address"),
            Self::AmbiguousSourceRows(n) => write!(f, "{n} source rows share this address"),
            Self::NoTargetRow => write!(f, "no target row with this address"),
            Self::AmbiguousTargetRows(n) => write!(f, "{n} target rows share this address"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedTransfer {
    pub source_address: String,
    pub target_address: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct TransferOutcome {
    pub transferred: usize,
    pub skipped: Vec<SkippedTransfer>,
}

fn unique_row(table: &Table, column: usize, address: &str) -> std::result::Result<usize, usize> {
    let rows = table.rows_with_value(column, address);
    if rows.len() == 1 {
        Ok(rows[0])
    } else {
        Err(rows.len())
    }
}

/// For every accepted match, locate the unique source and target rows by
/// address and overwrite the mapped target columns with the source values.
/// Ambiguous or missing rows skip the pair and record a diagnostic; a mapped
/// column absent from either table is skipped silently for that pair.
pub fn transfer_fields(
    matches: &[MatchResult],
    threshold: f64,
    source: &Table,
    target: &mut Table,
    address_column: &str,
    mapping: &[ColumnPair],
) -> Result<TransferOutcome> {
    let source_address_idx = source.require_column(address_column)?;
    let target_address_idx = target.require_column(address_column)?;

    let mut outcome = TransferOutcome::default();
    for result in matches {
        if !result.is_match(threshold) {
            continue;
        }
        let target_address = match &result.target {
            Some(address) => address,
            None => continue,
        };

        let source_row = match unique_row(source, source_address_idx, &result.source) {
            Ok(row) => row,
            Err(count) => {
                outcome.skipped.push(SkippedTransfer {
                    source_address: result.source.clone(),
                    target_address: target_address.clone(),
                    reason: if count == 0 {
                        SkipReason::NoSourceRow
                    } else {
                        SkipReason::AmbiguousSourceRows(count)
                    },
                });
                continue;
            }
        };
        let target_row = match unique_row(target, target_address_idx, target_address) {
            Ok(row) => row,
            Err(count) => {
                outcome.skipped.push(SkippedTransfer {
                    source_address: result.source.clone(),
                    target_address: target_address.clone(),
                    reason: if count == 0 {
                        SkipReason::NoTargetRow
                    } else {
                        SkipReason::AmbiguousTargetRows(count)
                    },
                });
                continue;
            }
        };

        for pair in mapping {
            let from = match source.column_index(&pair.source) {
                Some(index) => index,
                None => {
                    debug!("source column '{}' absent, not copied", pair.source);
                    continue;
                }
            };
            let to = match target.column_index(&pair.target) {
                Some(index) => index,
                None => {
                    debug!("target column '{}' absent, not copied", pair.target);
                    continue;
                }
            };
            let value = source.value(source_row, from).to_string();
            target.set_value(target_row, to, value);
        }
        outcome.transferred += 1;
    }
    Ok(outcome)
}
