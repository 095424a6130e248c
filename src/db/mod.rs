mod odbc;

use std::error::Error;
use std::fmt;

pub use crate::db::odbc::*;
use crate::DynError;

#[derive(Debug, Clone)]
pub struct DbError(String);

impl DbError {
    pub fn connect(redacted_conn_str: &str, cause: &dyn Error) -> DbError {
        DbError(format!(
            "Error connecting to database ({}): {}",
            redacted_conn_str, cause
        ))
    }

    pub fn execute(statement: &str, redacted_conn_str: &str, cause: &dyn Error) -> DbError {
        DbError(format!(
            "Error executing statement ({}) on ({}): {}",
            statement, redacted_conn_str, cause
        ))
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Database error: {}", self.0)
    }
}

impl Error for DbError {}

/// One result set, read row by row. All column values are opaque text as
/// rendered by the driver, None for NULL.
pub trait RowsCursor {
    fn columns(&mut self) -> Result<Vec<String>, DynError>;

    /// Reads the next row into `row`, which must have one cell per column.
    /// The cell buffers are reused across calls. Returns false at the end
    /// of the result set.
    fn fetch_row(&mut self, row: &mut [Option<Vec<u8>>]) -> Result<bool, DynError>;
}

/// The sequence of result sets produced by one query execution.
pub trait ResultSets {
    fn next_result_set(&mut self) -> Result<Option<Box<dyn RowsCursor + '_>>, DynError>;
}
