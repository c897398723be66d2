//! Streaming parser for comma-delimited simulation result tables.
//!
//! The header row is classified once into a column plan; every data row is
//! then read through that plan, so column positions are discovered rather
//! than assumed.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::series::{
    GeneratorSeries, IntervalKind, RunPeriodContext, SeriesLabel, TimeSeries, Unit,
};

/// Header text of the facility demand column.
pub const DEMAND_MARKER: &str = "Whole Building:Facility Total Electric Demand Power";
/// Header text of the facility net purchased electricity column.
pub const NET_PURCHASED_MARKER: &str = "Whole Building:Facility Net Purchased Electric Energy";
/// Header text of a per-generator production column.
pub const GENERATOR_MARKER: &str =
    "DISTRIBUTIONSYSTEM:Electric Load Center Produced Electric Energy";

/// Errors raised while reading a result table.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(
        "no generation system outputs found in the result table header; \
         expected facility demand, net purchased electricity or generator production columns"
    )]
    NoRecognizedColumns,
    #[error("result table has no {0} column")]
    MissingColumn(&'static str),
    #[error("column {column} (`{header}`) declares unsupported reporting interval `{label}`")]
    UnsupportedInterval {
        column: usize,
        header: String,
        label: String,
    },
    #[error("generator `{0}` appears in more than one result column")]
    DuplicateGenerator(String),
    #[error("malformed numeric field at line {line}, column {column}: `{value}`")]
    MalformedRow {
        line: u64,
        column: usize,
        value: String,
    },
    #[error("failed to read result table: {0}")]
    Csv(#[from] csv::Error),
}

/// Semantic classification of one header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Demand,
    NetPurchased,
    GeneratorProduction(String),
    Unrecognized,
}

impl ColumnKind {
    /// Classifies a header cell by its marker text.
    ///
    /// # Examples
    ///
    /// ```
    /// use gen_cashflow::parse::ColumnKind;
    ///
    /// let kind = ColumnKind::classify(
    ///     "ROOF PV:DISTRIBUTIONSYSTEM:Electric Load Center Produced Electric Energy [J](Hourly)",
    /// );
    /// assert_eq!(kind, ColumnKind::GeneratorProduction("ROOF PV".to_string()));
    /// ```
    pub fn classify(cell: &str) -> Self {
        if cell.contains(NET_PURCHASED_MARKER) {
            ColumnKind::NetPurchased
        } else if cell.contains(DEMAND_MARKER) {
            ColumnKind::Demand
        } else if cell.contains(GENERATOR_MARKER) {
            let name = cell.split(':').next().unwrap_or_default().trim();
            ColumnKind::GeneratorProduction(name.to_string())
        } else {
            ColumnKind::Unrecognized
        }
    }

    /// Unit the simulation engine reports this column in.
    fn source_unit(&self) -> Unit {
        match self {
            ColumnKind::Demand => Unit::Watts,
            _ => Unit::Joules,
        }
    }
}

/// Text inside the last parenthesized group of a header cell, e.g. `Hourly`.
pub fn interval_label(cell: &str) -> Option<&str> {
    let (_, tail) = cell.rsplit_once('(')?;
    let (label, _) = tail.split_once(')')?;
    Some(label.trim())
}

/// Where a planned column's values accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Demand,
    NetPurchased,
    Generator(usize),
}

#[derive(Debug, Clone)]
struct PlannedColumn {
    index: usize,
    unit: Unit,
    interval: IntervalKind,
    slot: Slot,
}

/// Column index → destination mapping derived from the header row.
#[derive(Debug, Default)]
struct ColumnPlan {
    columns: Vec<PlannedColumn>,
    demand: Option<IntervalKind>,
    net_purchased: Option<IntervalKind>,
    generators: Vec<(String, IntervalKind)>,
}

impl ColumnPlan {
    fn from_header(header: &csv::StringRecord) -> Result<Self, ParseError> {
        let mut plan = ColumnPlan::default();

        for (index, cell) in header.iter().enumerate() {
            let kind = ColumnKind::classify(cell);
            if kind == ColumnKind::Unrecognized {
                continue;
            }

            let label = interval_label(cell).unwrap_or_default();
            let interval =
                IntervalKind::from_label(label).ok_or_else(|| ParseError::UnsupportedInterval {
                    column: index,
                    header: cell.to_string(),
                    label: label.to_string(),
                })?;

            let unit = kind.source_unit();
            let slot = match kind {
                ColumnKind::Demand => {
                    plan.demand = Some(interval);
                    Slot::Demand
                }
                ColumnKind::NetPurchased => {
                    plan.net_purchased = Some(interval);
                    Slot::NetPurchased
                }
                ColumnKind::GeneratorProduction(name) => {
                    if plan.generators.iter().any(|(n, _)| *n == name) {
                        return Err(ParseError::DuplicateGenerator(name));
                    }
                    plan.generators.push((name, interval));
                    Slot::Generator(plan.generators.len() - 1)
                }
                ColumnKind::Unrecognized => continue,
            };

            debug!(column = index, header = cell, %interval, "classified result column");
            plan.columns.push(PlannedColumn {
                index,
                unit,
                interval,
                slot,
            });
        }

        if plan.columns.is_empty() {
            return Err(ParseError::NoRecognizedColumns);
        }
        Ok(plan)
    }
}

/// Series recovered from one result table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResults {
    pub demand: TimeSeries,
    pub net_purchased: TimeSeries,
    /// One series per generator, in header order.
    pub generators: Vec<GeneratorSeries>,
}

impl ParsedResults {
    /// Every series, demand and net purchased first.
    pub fn all_series(&self) -> impl Iterator<Item = &TimeSeries> {
        [&self.demand, &self.net_purchased]
            .into_iter()
            .chain(self.generators.iter().map(|g| &g.series))
    }
}

/// Reads result tables into normalized kWh series tagged with a run-period context.
#[derive(Debug, Clone, Default)]
pub struct ResultTableParser {
    context: RunPeriodContext,
}

impl ResultTableParser {
    /// Creates a parser that attaches `context` to every series it produces.
    pub fn new(context: RunPeriodContext) -> Self {
        Self { context }
    }

    /// Opens and parses the result table at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Csv`] if the file cannot be opened, otherwise the
    /// errors of [`ResultTableParser::parse`].
    pub fn parse_path(&self, path: &Path) -> Result<ParsedResults, ParseError> {
        let file = File::open(path).map_err(csv::Error::from)?;
        self.parse(BufReader::new(file))
    }

    /// Parses a result table in a single forward pass.
    ///
    /// Empty cells are skipped (tables mixing reporting frequencies leave them
    /// blank); the first non-numeric cell aborts the parse.
    ///
    /// # Errors
    ///
    /// * [`ParseError::NoRecognizedColumns`] if no header cell matches a marker
    /// * [`ParseError::MissingColumn`] if demand or net purchased is absent
    /// * [`ParseError::UnsupportedInterval`] for an unknown interval label
    /// * [`ParseError::MalformedRow`] for the first non-numeric field
    pub fn parse<R: Read>(&self, reader: R) -> Result<ParsedResults, ParseError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let plan = ColumnPlan::from_header(rdr.headers()?)?;
        let demand_interval = plan.demand.ok_or(ParseError::MissingColumn("facility demand"))?;
        let net_interval = plan
            .net_purchased
            .ok_or(ParseError::MissingColumn("net purchased electricity"))?;

        let mut demand = TimeSeries::new(SeriesLabel::Demand, demand_interval, self.context.clone());
        let mut net_purchased =
            TimeSeries::new(SeriesLabel::NetPurchased, net_interval, self.context.clone());
        let mut generators: Vec<GeneratorSeries> = plan
            .generators
            .iter()
            .map(|(name, interval)| GeneratorSeries::new(name.clone(), *interval, self.context.clone()))
            .collect();

        let mut rows = 0_usize;
        let mut record = csv::StringRecord::new();
        while rdr.read_record(&mut record)? {
            let line = record.position().map_or(0, csv::Position::line);
            for column in &plan.columns {
                let raw = match record.get(column.index) {
                    Some(raw) if !raw.is_empty() => raw,
                    _ => continue,
                };
                let value: f64 = raw.parse().map_err(|_| ParseError::MalformedRow {
                    line,
                    column: column.index,
                    value: raw.to_string(),
                })?;
                let kwh = column.unit.to_kwh(value, column.interval);

                let target = match column.slot {
                    Slot::Demand => &mut demand,
                    Slot::NetPurchased => &mut net_purchased,
                    Slot::Generator(i) => &mut generators[i].series,
                };
                target.values.push(kwh);
            }
            rows += 1;
        }

        info!(
            rows,
            generators = generators.len(),
            interval = %demand_interval,
            "parsed result table"
        );

        Ok(ParsedResults {
            demand,
            net_purchased,
            generators,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMAND_HOURLY: &str = "Whole Building:Facility Total Electric Demand Power [W](Hourly)";
    const NET_HOURLY: &str = "Whole Building:Facility Net Purchased Electric Energy [J](Hourly)";

    fn parser() -> ResultTableParser {
        ResultTableParser::new(RunPeriodContext::annual("Test"))
    }

    #[test]
    fn classify_recognizes_all_markers() {
        assert_eq!(ColumnKind::classify(DEMAND_HOURLY), ColumnKind::Demand);
        assert_eq!(ColumnKind::classify(NET_HOURLY), ColumnKind::NetPurchased);
        assert_eq!(
            ColumnKind::classify("Date/Time"),
            ColumnKind::Unrecognized
        );
    }

    #[test]
    fn interval_label_reads_last_parentheses() {
        assert_eq!(interval_label(DEMAND_HOURLY), Some("Hourly"));
        assert_eq!(interval_label("A (x) [W](Monthly)"), Some("Monthly"));
        assert_eq!(interval_label("no interval"), None);
    }

    #[test]
    fn demand_and_net_only_yields_no_generators() {
        let csv = format!("Date/Time,{DEMAND_HOURLY},{NET_HOURLY}\n 01/01 01:00,1000,3600000\n 01/01 02:00,2000,7200000\n");
        let parsed = parser().parse(csv.as_bytes()).expect("parse should succeed");
        assert_eq!(parsed.demand.values, vec![1.0, 2.0]);
        assert_eq!(parsed.net_purchased.values, vec![1.0, 2.0]);
        assert!(parsed.generators.is_empty());
    }

    #[test]
    fn column_order_is_discovered() {
        let csv = format!(
            "{NET_HOURLY},PV:{GENERATOR_MARKER} [J](Hourly),Date/Time,{DEMAND_HOURLY}\n7200000,3600000,x,1000\n"
        );
        let parsed = parser().parse(csv.as_bytes()).expect("parse should succeed");
        assert_eq!(parsed.demand.values, vec![1.0]);
        assert_eq!(parsed.net_purchased.values, vec![2.0]);
        assert_eq!(parsed.generators[0].name, "PV");
        assert_eq!(parsed.generators[0].production(), &[1.0]);
    }

    #[test]
    fn no_markers_is_an_error() {
        let err = parser().parse("Date/Time,Other\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::NoRecognizedColumns));
    }

    #[test]
    fn missing_demand_is_reported() {
        let csv = format!("{NET_HOURLY}\n1\n");
        let err = parser().parse(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn("facility demand")));
    }

    #[test]
    fn malformed_field_reports_line() {
        let csv = format!("{DEMAND_HOURLY},{NET_HOURLY}\n1000,1\n1000,abc\n");
        let err = parser().parse(csv.as_bytes()).unwrap_err();
        match err {
            ParseError::MalformedRow { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, 1);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unsupported_interval_is_rejected() {
        let csv = "Whole Building:Facility Total Electric Demand Power [W](TimeStep)\n1\n";
        let err = parser().parse(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedInterval { column: 0, .. }));
    }

    #[test]
    fn header_only_yields_empty_series() {
        let csv = format!("{DEMAND_HOURLY},{NET_HOURLY}\n");
        let parsed = parser().parse(csv.as_bytes()).expect("parse should succeed");
        assert!(parsed.demand.is_empty());
        assert!(parsed.net_purchased.is_empty());
    }

    #[test]
    fn empty_cells_are_skipped() {
        let csv = format!("{DEMAND_HOURLY},{NET_HOURLY}\n1000,\n1000,3600000\n");
        let parsed = parser().parse(csv.as_bytes()).expect("parse should succeed");
        assert_eq!(parsed.demand.len(), 2);
        assert_eq!(parsed.net_purchased.values, vec![1.0]);
    }

    #[test]
    fn duplicate_generator_is_rejected() {
        let csv = format!(
            "{DEMAND_HOURLY},{NET_HOURLY},PV:{GENERATOR_MARKER} [J](Hourly),PV:{GENERATOR_MARKER} [J](Hourly)\n"
        );
        let err = parser().parse(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateGenerator(name) if name == "PV"));
    }

    #[test]
    fn provenance_is_attached_to_every_series() {
        let csv = format!("{DEMAND_HOURLY},{NET_HOURLY},PV:{GENERATOR_MARKER} [J](Hourly)\n1,1,1\n");
        let parsed = parser().parse(csv.as_bytes()).expect("parse should succeed");
        assert!(parsed.all_series().all(|s| s.provenance.location == "Test"));
        assert_eq!(parsed.all_series().count(), 3);
    }
}
