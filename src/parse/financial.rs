//! Extraction of generator financial data embedded in descriptor files.
//!
//! Financial lines carry one of a few marker tokens. They are cleaned,
//! grouped into blocks that start at a `generation system name` line, and
//! decoded into [`GeneratorFinancialProfile`]s.

use std::io::{self, BufRead};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::io::lines::lossy_lines;
use crate::profile::{FinancialLineItem, GeneratorFinancialProfile, MaintenanceCost};

/// Tokens identifying a financial line.
pub const FINANCIAL_MARKERS: [&str; 5] = [
    "!!!!Y",
    "!!!X",
    "!!!Z",
    "!- Battery replacement time",
    "!- Inverter replacement time",
];

const MARKER_TOKENS: [&str; 3] = ["!!!!Y", "!!!X", "!!!Z"];
const BLOCK_HEADER: &str = "generation system name";
const REPLACEMENT_MARKER: &str = "replacement time = ";
const MAINTENANCE_MARKER: &str = "annual maintenance cost";
const SEPARATOR: &str = " - ";

/// Errors raised while reading financial data.
#[derive(Debug, Error)]
pub enum FinancialError {
    #[error("no generation system financial data found in the descriptor")]
    NoFinancialData,
    #[error("malformed financial line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
    #[error("failed to read descriptor: {0}")]
    Io(#[from] io::Error),
}

/// One decoded financial line.
#[derive(Debug, Clone, PartialEq)]
pub enum FinancialLine {
    /// Opens the block of the named generator.
    BlockHeader(String),
    Recurring {
        item_name: String,
        cost: f64,
        replacement_years: f64,
    },
    Capital {
        item_name: String,
        cost: f64,
    },
    Maintenance(f64),
    /// A field annotation with no cost attached.
    Annotation,
}

/// Whether `line` carries one of the financial markers.
pub fn is_financial(line: &str) -> bool {
    FINANCIAL_MARKERS.iter().any(|m| line.contains(m))
}

/// Strips marker tokens and decorative characters.
///
/// # Examples
///
/// ```
/// use gen_cashflow::parse::financial::clean_line;
///
/// assert_eq!(clean_line("  !!!X [Solar panels - 4500]\n"), "Solar panels - 4500");
/// ```
pub fn clean_line(line: &str) -> String {
    let mut text = line.to_string();
    for token in MARKER_TOKENS {
        text = text.replace(token, "");
    }
    text.chars()
        .filter(|c| !matches!(c, '!' | '[' | ']' | '\r' | '\n'))
        .collect::<String>()
        .trim()
        .to_string()
}

fn parse_number(text: &str, line: usize, what: &str) -> Result<f64, FinancialError> {
    let text = text.trim();
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FinancialError::MalformedLine {
            line,
            reason: format!("{what} `{text}` is not a number"),
        })
}

fn split_name_cost(text: &str, line: usize) -> Result<Option<(String, f64)>, FinancialError> {
    let Some((name, cost)) = text.rsplit_once(SEPARATOR) else {
        return Ok(None);
    };
    let cost = parse_number(cost, line, "cost")?;
    Ok(Some((name.trim().to_string(), cost)))
}

/// Decodes one cleaned line.
///
/// `raw` is the line before cleaning; `line` its 1-based number in the file.
pub fn classify_line(raw: &str, cleaned: &str, line: usize) -> Result<FinancialLine, FinancialError> {
    if cleaned.contains(BLOCK_HEADER) {
        let name = match cleaned.rsplit_once(SEPARATOR) {
            Some((_, name)) => name,
            None => cleaned
                .split_once(BLOCK_HEADER)
                .map_or("", |(_, rest)| rest),
        };
        return Ok(FinancialLine::BlockHeader(name.trim().to_string()));
    }

    if let Some((left, right)) = cleaned.split_once(REPLACEMENT_MARKER) {
        // `name - cost` leads; anything after it (`- Battery` from a field
        // annotation) is ignored.
        let mut fields = left.trim().split(SEPARATOR);
        let (Some(item_name), Some(cost)) = (fields.next(), fields.next()) else {
            return Err(FinancialError::MalformedLine {
                line,
                reason: format!("replacement item `{}` has no `name - cost` pair", left.trim()),
            });
        };
        let item_name = item_name.trim().to_string();
        let cost = parse_number(cost, line, "cost")?;
        let years = right
            .trim()
            .trim_end_matches("years")
            .trim_end_matches("year");
        let replacement_years = parse_number(years, line, "replacement time")?;
        if replacement_years <= 0.0 {
            return Err(FinancialError::MalformedLine {
                line,
                reason: format!("replacement time must be positive, got {replacement_years}"),
            });
        }
        return Ok(FinancialLine::Recurring {
            item_name,
            cost,
            replacement_years,
        });
    }

    if cleaned.contains(MAINTENANCE_MARKER) {
        return match split_name_cost(cleaned, line)? {
            Some((_, cost)) => Ok(FinancialLine::Maintenance(cost)),
            None => Err(FinancialError::MalformedLine {
                line,
                reason: "maintenance cost has no value".to_string(),
            }),
        };
    }

    // IDF field annotations (`5; !- Battery replacement time`) carry no cost.
    if raw.contains("!- ") {
        return Ok(FinancialLine::Annotation);
    }

    match split_name_cost(cleaned, line)? {
        Some((item_name, cost)) => Ok(FinancialLine::Capital { item_name, cost }),
        None => Ok(FinancialLine::Annotation),
    }
}

fn apply_line(profile: &mut GeneratorFinancialProfile, decoded: FinancialLine, line: usize) {
    let generator_name = profile.generator_name.clone();
    match decoded {
        FinancialLine::Recurring {
            item_name,
            cost,
            replacement_years,
        } => profile.items.push(FinancialLineItem {
            generator_name,
            item_name,
            cost,
            replacement_years: Some(replacement_years),
        }),
        FinancialLine::Capital { item_name, cost } => profile.items.push(FinancialLineItem {
            generator_name,
            item_name,
            cost,
            replacement_years: None,
        }),
        FinancialLine::Maintenance(annual_cost) => {
            if profile.maintenance.is_some() {
                warn!(generator = %generator_name, line, "duplicate maintenance cost, keeping the last one");
            }
            profile.maintenance = Some(MaintenanceCost {
                generator_name,
                annual_cost,
            });
        }
        FinancialLine::BlockHeader(_) | FinancialLine::Annotation => {}
    }
}

/// Groups descriptor financial lines into per-generator profiles.
#[derive(Debug, Default, Clone, Copy)]
pub struct FinancialBlockParser;

impl FinancialBlockParser {
    /// Parses descriptor lines; an empty result is valid (no financial data).
    ///
    /// # Errors
    ///
    /// Returns [`FinancialError::MalformedLine`] for a financial line whose
    /// cost or replacement time is not a number.
    pub fn parse<I, S>(lines: I) -> Result<Vec<GeneratorFinancialProfile>, FinancialError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::parse_stream(lines.into_iter().map(Ok::<S, io::Error>))
    }

    /// Parses a fallible line stream in one forward pass.
    ///
    /// # Errors
    ///
    /// Returns [`FinancialError::Io`] for the first failed read, otherwise as
    /// [`FinancialBlockParser::parse`].
    pub fn parse_stream<I, S>(lines: I) -> Result<Vec<GeneratorFinancialProfile>, FinancialError>
    where
        I: IntoIterator<Item = io::Result<S>>,
        S: AsRef<str>,
    {
        let mut profiles: Vec<GeneratorFinancialProfile> = Vec::new();
        let mut retained = 0_usize;

        for (i, raw) in lines.into_iter().enumerate() {
            let raw = raw?;
            let raw = raw.as_ref();
            if !is_financial(raw) {
                continue;
            }
            retained += 1;
            let line = i + 1;
            let cleaned = clean_line(raw);
            match classify_line(raw, &cleaned, line)? {
                FinancialLine::BlockHeader(name) => {
                    debug!(generator = %name, line, "financial block");
                    profiles.push(GeneratorFinancialProfile::new(name));
                }
                FinancialLine::Annotation => debug!(line, "annotation line skipped"),
                decoded => match profiles.last_mut() {
                    Some(profile) => apply_line(profile, decoded, line),
                    None => debug!(line, "financial line outside any generator block, skipped"),
                },
            }
        }

        info!(
            lines = retained,
            generators = profiles.len(),
            "parsed financial data"
        );
        Ok(profiles)
    }

    /// Like [`FinancialBlockParser::parse`] but at least one block must exist.
    ///
    /// # Errors
    ///
    /// Returns [`FinancialError::NoFinancialData`] if no block was found.
    pub fn parse_required<I, S>(lines: I) -> Result<Vec<GeneratorFinancialProfile>, FinancialError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        require_blocks(Self::parse(lines)?)
    }

    /// Parses a descriptor streamed from `reader`, line by line.
    ///
    /// Bytes that are not valid UTF-8 are replaced, so object names in other
    /// encodings do not stop the parse.
    ///
    /// # Errors
    ///
    /// Returns [`FinancialError::Io`] on read failure, otherwise as
    /// [`FinancialBlockParser::parse`]; with `required`, also
    /// [`FinancialError::NoFinancialData`].
    pub fn parse_reader<R: BufRead>(
        reader: R,
        required: bool,
    ) -> Result<Vec<GeneratorFinancialProfile>, FinancialError> {
        let profiles = Self::parse_stream(lossy_lines(reader))?;
        if required {
            require_blocks(profiles)
        } else {
            Ok(profiles)
        }
    }
}

fn require_blocks(
    profiles: Vec<GeneratorFinancialProfile>,
) -> Result<Vec<GeneratorFinancialProfile>, FinancialError> {
    if profiles.is_empty() {
        return Err(FinancialError::NoFinancialData);
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = "\
Version,8.2;
  !!!!Y Honeybee generation system name - ROOF PV
  !!!X [Solar panels - 4500]
  !!!Z [Inverter - 800 replacement time = 10 years]
  !!!X [Honeybee system annual maintenance cost - 120]
Building, Demo;
  !!!!Y Honeybee generation system name - WIND
  !!!X [Turbine - 9000]
  !!!Z [Battery - 1500 replacement time = 5 years]
";

    #[test]
    fn groups_lines_per_generator() {
        let profiles = FinancialBlockParser::parse(DESCRIPTOR.lines()).expect("parse should succeed");
        assert_eq!(profiles.len(), 2);

        let pv = &profiles[0];
        assert_eq!(pv.generator_name, "ROOF PV");
        assert_eq!(pv.capital_total(), 4500.0);
        assert_eq!(pv.annual_maintenance(), 120.0);
        assert_eq!(pv.items[1].replacement_years, Some(10.0));
        assert_eq!(pv.items[1].item_name, "Inverter");

        let wind = &profiles[1];
        assert_eq!(wind.generator_name, "WIND");
        assert!(wind.maintenance.is_none());
        assert_eq!(wind.replacement_cost(5), 1500.0);
    }

    #[test]
    fn non_financial_lines_are_dropped() {
        assert!(!is_financial("Building, Demo;"));
        assert!(is_financial("!!!X [a - 1]"));
        assert!(is_financial("  5;  !- Battery replacement time"));
    }

    #[test]
    fn annotation_lines_are_skipped() {
        let lines = [
            "!!!!Y generation system name - PV",
            "    5;                       !- Battery replacement time",
        ];
        let profiles = FinancialBlockParser::parse(lines).expect("parse should succeed");
        assert!(profiles[0].items.is_empty());
    }

    #[test]
    fn no_blocks_is_empty_unless_required() {
        let lines = ["Version,8.2;", "Building, Demo;"];
        assert!(FinancialBlockParser::parse(lines).expect("parse should succeed").is_empty());
        assert!(matches!(
            FinancialBlockParser::parse_required(lines),
            Err(FinancialError::NoFinancialData)
        ));
    }

    #[test]
    fn malformed_cost_reports_line_number() {
        let lines = ["!!!!Y generation system name - PV", "!!!X [Panels - lots]"];
        match FinancialBlockParser::parse(lines) {
            Err(FinancialError::MalformedLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn zero_replacement_time_is_rejected() {
        let lines = [
            "!!!!Y generation system name - PV",
            "!!!Z [Battery - 10 replacement time = 0 years]",
        ];
        assert!(matches!(
            FinancialBlockParser::parse(lines),
            Err(FinancialError::MalformedLine { line: 2, .. })
        ));
    }

    #[test]
    fn lines_before_first_block_are_ignored() {
        let lines = ["!!!X [Orphan - 5]", "!!!!Y generation system name - PV", "!!!X [Panels - 10]"];
        let profiles = FinancialBlockParser::parse(lines).expect("parse should succeed");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].capital_total(), 10.0);
    }

    #[test]
    fn annotated_replacement_lines_keep_leading_cost() {
        let lines = [
            "!!!!Y Honeybee generation system name - PV",
            "  BATT - 1500 !- Battery replacement time = 5 years",
            "  INV - 900 !- Inverter replacement time = 10 years",
        ];
        let profiles = FinancialBlockParser::parse(lines).expect("parse should succeed");
        let items = &profiles[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_name, "BATT");
        assert_eq!(items[0].cost, 1500.0);
        assert_eq!(items[0].replacement_years, Some(5.0));
        assert_eq!(items[1].item_name, "INV");
        assert_eq!(items[1].replacement_years, Some(10.0));
        assert_eq!(profiles[0].replacement_cost(10), 2400.0);
    }

    #[test]
    fn non_utf8_bytes_do_not_stop_the_reader() {
        let descriptor: &[u8] = b"Site:Location,Z\xfcrich;\n\
!!!!Y Honeybee generation system name - PV\n\
!!!X [Panels - 4500]\n";
        let profiles = FinancialBlockParser::parse_reader(descriptor, true).expect("parse should succeed");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].capital_total(), 4500.0);
    }

    #[test]
    fn read_failure_is_reported() {
        let lines = [
            Ok("!!!!Y Honeybee generation system name - PV".to_string()),
            Err(io::Error::other("disk gone")),
        ];
        assert!(matches!(
            FinancialBlockParser::parse_stream(lines),
            Err(FinancialError::Io(_))
        ));
    }

    #[test]
    fn reader_input_matches_line_input() {
        let from_reader =
            FinancialBlockParser::parse_reader(DESCRIPTOR.as_bytes(), true).expect("parse should succeed");
        let from_lines = FinancialBlockParser::parse(DESCRIPTOR.lines()).expect("parse should succeed");
        assert_eq!(from_reader, from_lines);
    }
}
