use log::debug;
use odbc_api::handles::StatementImpl;
use odbc_api::{Connection, Cursor, CursorImpl, ResultSetMetadata};

use crate::db::{DbError, ResultSets, RowsCursor};
use crate::DynError;

/// Splits a query into statements on semicolons, ignoring semicolons inside
/// single-quoted, double-quoted or backtick-quoted literals. Blank statements
/// (e.g. from a trailing semicolon) are dropped.
pub fn split_statements(query: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in query.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match quote {
            Some(q) => {
                if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                current.push(c);
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    current.push(c);
                }
                ';' => {
                    let stmt = current.trim();
                    if !stmt.is_empty() {
                        statements.push(stmt.to_string());
                    }
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }
    let stmt = current.trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
    statements
}

/// Executes the statements of a (possibly multi-statement) query one at a
/// time over a single ODBC connection. Each statement that produces a cursor
/// yields one result set; statements without one (e.g. INSERT) are skipped
/// and do not consume a result set number.
pub struct OdbcResultSets<'c, 'env> {
    conn: &'c Connection<'env>,
    redacted_conn_str: String,
    statements: std::vec::IntoIter<String>,
}

impl<'c, 'env> OdbcResultSets<'c, 'env> {
    pub fn new(conn: &'c Connection<'env>, query: &str, redacted_conn_str: &str) -> Self {
        Self {
            conn,
            redacted_conn_str: redacted_conn_str.to_string(),
            statements: split_statements(query).into_iter(),
        }
    }
}

impl<'c, 'env> ResultSets for OdbcResultSets<'c, 'env> {
    fn next_result_set(&mut self) -> Result<Option<Box<dyn RowsCursor + '_>>, DynError> {
        for statement in self.statements.by_ref() {
            match self.conn.execute(&statement, ()) {
                Ok(Some(cursor)) => return Ok(Some(Box::new(OdbcRows { cursor }))),
                Ok(None) => {
                    debug!("statement produced no result set: {}", statement);
                }
                Err(e) => {
                    return Err(Box::new(DbError::execute(
                        &statement,
                        &self.redacted_conn_str,
                        &e,
                    )))
                }
            }
        }
        Ok(None)
    }
}

pub struct OdbcRows<'c> {
    cursor: CursorImpl<StatementImpl<'c>>,
}

impl<'c> RowsCursor for OdbcRows<'c> {
    fn columns(&mut self) -> Result<Vec<String>, DynError> {
        let names = self.cursor.column_names()?.collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn fetch_row(&mut self, row: &mut [Option<Vec<u8>>]) -> Result<bool, DynError> {
        let mut odbc_row = match self.cursor.next_row()? {
            Some(r) => r,
            None => return Ok(false),
        };
        for (i, cell) in row.iter_mut().enumerate() {
            // reuse the cell's allocation from the previous row
            let mut buf = match cell.take() {
                Some(mut v) => {
                    v.clear();
                    v
                }
                None => Vec::new(),
            };
            let is_not_null = odbc_row.get_text((i + 1) as u16, &mut buf)?;
            *cell = if is_not_null { Some(buf) } else { None };
        }
        Ok(true)
    }
}
