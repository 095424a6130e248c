use crate::db::RowsCursor;
use crate::output::Sink;
use crate::DynError;

/// Streams one result set into the sink as CSV (comma-separated, quoted with
/// doubled double-quotes where needed, LF record terminator). The sink is
/// closed exactly once, on success and on error alike. Output flushed before
/// an error stays in place.
pub fn write_result_set(
    rows: &mut dyn RowsCursor,
    mut sink: Sink,
    no_header: bool,
) -> Result<(), DynError> {
    let res = stream_rows(rows, &mut sink, no_header);
    let close_res = sink.close();
    res?;
    close_res?;
    Ok(())
}

fn stream_rows(rows: &mut dyn RowsCursor, sink: &mut Sink, no_header: bool) -> Result<(), DynError> {
    let columns = rows.columns()?;
    let mut writer = csv::Writer::from_writer(sink);
    if !no_header {
        writer.write_record(&columns)?;
    }
    // one reusable cell buffer per column, NULL cells render as empty fields
    let mut row_buf: Vec<Option<Vec<u8>>> = vec![None; columns.len()];
    while rows.fetch_row(&mut row_buf)? {
        writer.write_record(row_buf.iter().map(|cell| cell.as_deref().unwrap_or_default()))?;
    }
    writer.flush()?;
    Ok(())
}
