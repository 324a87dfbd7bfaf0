//! Frame-wide repacking.
//!
//! [`repack_frame`] validates the frame's index against the declared key, narrows every
//! column (or applies its override), checks that nothing is left in the mixed
//! representation, renames, and finally re-establishes the key as the index.

use rayon::prelude::*;
use repack_compute::repack_column_with;
use repack_result::{Error, Result};
use rustc_hash::FxHashSet;

use crate::frame::{Frame, NamedColumn};
use crate::options::RepackOptions;
use crate::report::{ColumnReport, RepackReport};

/// Repack every column of `frame`.
pub fn repack_frame(frame: Frame, options: &RepackOptions) -> Result<Frame> {
    repack_frame_with_report(frame, options).map(|(frame, _)| frame)
}

/// [`repack_frame`], also returning a per-column [`RepackReport`].
pub fn repack_frame_with_report(
    frame: Frame,
    options: &RepackOptions,
) -> Result<(Frame, RepackReport)> {
    check_configuration(&frame, options)?;

    let (_, columns) = frame.reset_index().into_parts();
    let parallel = options.parallelism.is_parallel_for(columns.len());
    tracing::debug!(
        columns = columns.len(),
        parallel,
        "[REPACK] narrowing frame columns"
    );

    let repacked: Vec<(NamedColumn, ColumnReport)> = if parallel {
        columns
            .into_par_iter()
            .map(|named| repack_named(named, options))
            .collect::<Result<Vec<_>>>()?
    } else {
        columns
            .into_iter()
            .map(|named| repack_named(named, options))
            .collect::<Result<Vec<_>>>()?
    };

    if let Some((named, _)) = repacked.iter().find(|(named, _)| named.column.is_mixed()) {
        let kinds = named.column.type_label();
        tracing::warn!(column = %named.name, %kinds, "column could not be given a fixed type");
        return Err(Error::UnresolvedColumn {
            column: named.name.clone(),
            kinds,
        });
    }

    let (columns, reports): (Vec<NamedColumn>, Vec<ColumnReport>) = repacked.into_iter().unzip();
    let mut frame = Frame::try_new(columns)?.rename(&options.rename)?;
    if let Some(keys) = &options.key_columns {
        let renamed: Vec<&str> = keys.iter().map(|k| options.renamed(k)).collect();
        frame = frame.set_index(&renamed)?;
    }

    let mut report = RepackReport { columns: reports };
    for column in &mut report.columns {
        column.name = options.renamed(&column.name).to_string();
    }
    // Report rows follow frame order: index columns first.
    let order: Vec<&str> = frame
        .index_names()
        .into_iter()
        .chain(frame.column_names())
        .collect();
    report
        .columns
        .sort_by_key(|c| order.iter().position(|name| *name == c.name));

    Ok((frame, report))
}

/// Every check that must pass before any column is touched.
fn check_configuration(frame: &Frame, options: &RepackOptions) -> Result<()> {
    let index = frame.index_names();
    if !index.is_empty() {
        let matches_key = options
            .key_columns
            .as_ref()
            .is_some_and(|keys| keys.iter().map(String::as_str).eq(index.iter().copied()));
        if !matches_key {
            let declared = options.key_columns.as_deref().unwrap_or_default().join(", ");
            return Err(Error::configuration(format!(
                "frame is indexed by [{}] but the declared key is [{declared}]; \
                 reset the index or declare it as the key",
                index.join(", "),
            )));
        }
    }

    if let Some(keys) = &options.key_columns
        && let Some(missing) = keys.iter().find(|k| !frame.contains(k))
    {
        return Err(Error::configuration(format!(
            "key column '{missing}' is not in the frame"
        )));
    }

    let mut unknown: Vec<&str> = options
        .overrides
        .keys()
        .map(String::as_str)
        .filter(|name| !frame.contains(name))
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(Error::configuration(format!(
            "type overrides name unknown columns [{}]",
            unknown.join(", ")
        )));
    }

    let mut final_names = FxHashSet::default();
    for name in index.iter().copied().chain(frame.column_names()) {
        let renamed = options.renamed(name);
        if !final_names.insert(renamed) {
            return Err(Error::configuration(format!(
                "rename produces duplicate column name '{renamed}'"
            )));
        }
    }
    Ok(())
}

fn repack_named(
    named: NamedColumn,
    options: &RepackOptions,
) -> Result<(NamedColumn, ColumnReport)> {
    let NamedColumn { name, column } = named;
    let source_type = column.type_label();
    let bytes_before = column.memory_size();
    let override_type = options.overrides.get(&name);

    let (column, outcome) = repack_column_with(column, override_type, options.tolerance)
        .map_err(|e| e.for_column(&name))?;

    let final_type = column.type_label();
    tracing::debug!(
        column = %name,
        from = %source_type,
        to = %final_type,
        ?outcome,
        "[REPACK] column repacked"
    );
    let report = ColumnReport {
        name: name.clone(),
        source_type,
        final_type,
        outcome,
        bytes_before,
        bytes_after: column.memory_size(),
    };
    Ok((NamedColumn { name, column }, report))
}
