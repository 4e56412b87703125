//! CSV export of a loaded transaction table

use fuelstat_core::error::Result;
use fuelstat_core::types::TransactionTable;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write every column of the table, header first
pub fn write_csv<W: Write>(table: &TransactionTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.columns())?;

    for row in table.rows() {
        csv_writer.write_record(table.columns().iter().map(|c| row.column_text(c)))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export to a file, creating or truncating it
pub fn export_to_path(table: &TransactionTable, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv(table, file)?;
    info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}
