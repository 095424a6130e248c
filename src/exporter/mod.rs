use std::error::Error;
use std::fmt;

use log::info;

use crate::db::ResultSets;
use crate::output::{write_result_set, SinkResolver};
use crate::DynError;

#[derive(Debug, Clone)]
pub struct SchemaError(String);

impl SchemaError {
    pub fn shape_mismatch(prev: &[String], cur: &[String]) -> SchemaError {
        SchemaError(format!(
            "The columns of each result set must be the same when writing to a \
             single output: got [{}] after [{}]. Add a %d placeholder to the \
             output template to write each result set to its own file",
            cur.join(", "),
            prev.join(", ")
        ))
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Schema consistency error: {}", self.0)
    }
}

impl Error for SchemaError {}

/// Streams every result set to the sink the resolver picks for it. When all
/// result sets share one sink (no counter placeholder in the template) their
/// column sequences must match; the run aborts before any row of a
/// mismatched result set is written.
pub fn export(
    result_sets: &mut dyn ResultSets,
    resolver: &mut SinkResolver,
    no_header: bool,
) -> Result<(), DynError> {
    let mut prev_columns: Option<Vec<String>> = None;
    let mut index = 0usize;
    while let Some(mut rows) = result_sets.next_result_set()? {
        let columns = rows.columns()?;
        if let Some(prev) = &prev_columns {
            if *prev != columns && !resolver.creates_multiple_files() {
                return Err(Box::new(SchemaError::shape_mismatch(prev, &columns)));
            }
        }
        prev_columns = Some(columns.clone());
        let sink = resolver.resolve(index)?;
        info!("result set {}: {} columns", index, columns.len());
        write_result_set(rows.as_mut(), sink, no_header)?;
        index += 1;
    }
    Ok(())
}
