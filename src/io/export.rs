//! CSV and JSON export of cashflow results, series and chart layouts.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::chart::ChartLayout;
use crate::series::TimeSeries;
use crate::sim::types::CashflowResult;

/// Column header of the ledger CSV.
const LEDGER_HEADER: &str = "generator,year,income,replacement_cost,maintenance_cost,net";

/// Exports every generator's ledger to a CSV file at the given path.
///
/// Year 0 carries the capital cost as a negative net; years 1 onward
/// follow the projected ledger. Output is deterministic for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_ledger_csv(result: &CashflowResult, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_ledger_csv(result, io::BufWriter::new(file))
}

/// Writes every generator's ledger as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_ledger_csv(result: &CashflowResult, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(LEDGER_HEADER.split(','))?;

    for g in &result.generators {
        wtr.write_record(&[
            g.name.clone(),
            "0".to_string(),
            format!("{:.2}", 0.0),
            format!("{:.2}", 0.0),
            format!("{:.2}", 0.0),
            format!("{:.2}", -g.capital_cost),
        ])?;
        for e in &g.yearly_ledger {
            wtr.write_record(&[
                g.name.clone(),
                e.year.to_string(),
                format!("{:.2}", e.income),
                format!("{:.2}", e.replacement_cost),
                format!("{:.2}", e.maintenance_cost),
                format!("{:.2}", e.net),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Writes series side by side: the seven header fields, then the values.
///
/// Shorter columns are padded with empty cells.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_series_csv(series: &[&TimeSeries], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(false).from_writer(writer);
    let headers: Vec<[String; 7]> = series.iter().map(|s| s.header().fields()).collect();

    for row in 0..7 {
        wtr.write_record(headers.iter().map(|h| h[row].as_str()))?;
    }
    let rows = series.iter().map(|s| s.len()).max().unwrap_or(0);
    for row in 0..rows {
        wtr.write_record(
            series
                .iter()
                .map(|s| s.values.get(row).map_or_else(String::new, |v| format!("{v:.2}"))),
        )?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports series to a CSV file; see [`write_series_csv`].
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_series_csv(series: &[&TimeSeries], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_series_csv(series, io::BufWriter::new(file))
}

/// Writes the chart layout as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_layout_json(layout: &ChartLayout, writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, layout).map_err(io::Error::from)
}

/// Exports the chart layout to a JSON file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_layout_json(layout: &ChartLayout, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut buf = io::BufWriter::new(file);
    write_layout_json(layout, &mut buf)?;
    buf.flush()
}
