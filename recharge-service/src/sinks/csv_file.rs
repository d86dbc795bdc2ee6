use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use recharge_client::Table;

use crate::pipeline::PipelineError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write `table` as comma-delimited UTF-8 with a BOM and one header row,
/// replacing any existing file.
pub fn write_table(path: &Path, table: &Table, artifact: &'static str) -> Result<(), PipelineError> {
    let sink_err = |message: String| PipelineError::Sink {
        artifact,
        path: path.to_path_buf(),
        message,
    };

    let file = File::create(path).map_err(|e| sink_err(format!("failed to create file: {e}")))?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM)
        .map_err(|e| sink_err(format!("failed to write BOM: {e}")))?;

    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(table.headers())
        .map_err(|e| sink_err(format!("failed to write header: {e}")))?;
    for row in table.rows() {
        wtr.write_record(row)
            .map_err(|e| sink_err(format!("failed to write record: {e}")))?;
    }
    wtr.flush().map_err(|e| sink_err(format!("failed to flush: {e}")))?;

    tracing::debug!(artifact, path = %path.display(), rows = table.len(), "artifact written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::table_file::read_delimited;

    #[test]
    fn writes_bom_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = Table::new(["Site", "Cost (£)"]);
        table.push_row(vec!["Unit 1, rear".into(), "12.5".into()]);
        write_table(&path, &table, "test").unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let back = read_delimited(&path).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn unwritable_path_is_a_sink_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_table(&path, &Table::new(["a"]), "test").unwrap_err();
        assert!(matches!(err, PipelineError::Sink { artifact: "test", .. }));
    }
}
