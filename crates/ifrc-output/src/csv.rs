//! CSV resources with an HXL hashtag row under the header.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use ifrc_model::Row;
use ifrc_model::row::{cell_text, column_names};

use crate::error::{AssembleError, Result};

/// Writes `rows` as a table to any writer and returns the data row count.
///
/// Columns come from `columns`; a row missing a column gets an empty cell.
/// The second line carries the HXL tag of each column, empty for columns
/// without one.
pub fn write_table<W: Write>(
    writer: W,
    columns: &[String],
    rows: &[Row],
    hxltags: &BTreeMap<String, String>,
) -> std::result::Result<usize, ::csv::Error> {
    let mut csv = ::csv::WriterBuilder::new().from_writer(writer);
    csv.write_record(columns)?;
    csv.write_record(
        columns
            .iter()
            .map(|column| hxltags.get(column).map_or("", String::as_str)),
    )?;
    for row in rows {
        csv.write_record(
            columns
                .iter()
                .map(|column| row.get(column).map(cell_text).unwrap_or_default()),
        )?;
    }
    csv.flush()?;
    Ok(rows.len())
}

/// Writes a resource file, creating its folder; nothing is written for an
/// empty row set.
///
/// The column order is the key order of the first row.
pub fn write_resource(
    path: &Path,
    rows: &[Row],
    hxltags: &BTreeMap<String, String>,
) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    let columns = column_names(rows);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| AssembleError::io(parent, e))?;
    }
    let file = fs::File::create(path).map_err(|e| AssembleError::io(path, e))?;
    let written = write_table(std::io::BufWriter::new(file), &columns, rows, hxltags)
        .map_err(|e| AssembleError::csv(path, e))?;
    tracing::debug!(path = %path.display(), rows = written, "wrote resource");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_rows_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        assert_eq!(write_resource(&path, &[], &BTreeMap::new()).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn creates_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let mut row = Row::new();
        row.insert("a".to_string(), json!(1));
        let tags = BTreeMap::from([("a".to_string(), "#value".to_string())]);
        assert_eq!(write_resource(&path, &[row], &tags).unwrap(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\n#value\n1\n");
    }
}
