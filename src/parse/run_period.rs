//! Location and run-period metadata from `.eio` / descriptor lines.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::io::lines::lossy_lines;
use crate::series::context::{CalendarPoint, RunPeriodContext};

const LOCATION_MARKER: &str = "Site:Location,";
const RUN_PERIOD_MARKER: &str = "WeatherFileRunPeriod";

fn parse_month_day(field: Option<&str>, hour: u32) -> Option<CalendarPoint> {
    let (month, day) = field?.trim().split_once('/')?;
    let month = month.trim().parse::<u32>().ok()?;
    let day = day.trim().parse::<u32>().ok()?;
    Some(CalendarPoint::new(month, day, hour))
}

/// Reads the run context from `lines`; later occurrences win.
///
/// Values that cannot be read are logged and left unset, so the result is
/// always usable.
///
/// # Examples
///
/// ```
/// use gen_cashflow::parse::read_run_period;
///
/// let ctx = read_run_period([
///     "Site:Location,PERTH INTL AP_WA_AUS WMO#=946100,-31.93,115.95,8.00,20.00",
///     "WeatherFileRunPeriod,1,Annual,01/01,12/31",
/// ]);
/// assert_eq!(ctx.location, "PERTH INTL AP_WA_AUS");
/// assert!(ctx.is_full_year());
/// ```
pub fn read_run_period<I, S>(lines: I) -> RunPeriodContext
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ctx = RunPeriodContext::default();
    for (i, line) in lines.into_iter().enumerate() {
        apply_line(&mut ctx, i + 1, line.as_ref());
    }
    ctx
}

fn apply_line(ctx: &mut RunPeriodContext, line_no: usize, line: &str) {
    if line.contains(LOCATION_MARKER) {
        match line.split(',').nth(1) {
            Some(field) => {
                let location = field.split("WMO").next().unwrap_or(field).trim();
                ctx.location = location.to_string();
                debug!(line = line_no, %location, "site location");
            }
            None => warn!(line = line_no, "site location line has no name field"),
        }
    } else if line.contains(RUN_PERIOD_MARKER) {
        let fields: Vec<&str> = line.split(',').collect();
        let start = parse_month_day(fields.get(3).copied(), 1);
        let end = parse_month_day(fields.get(4).copied(), 24);
        if start.is_none() || end.is_none() {
            warn!(line = line_no, "unreadable run period dates");
        }
        ctx.start = start;
        ctx.end = end;
    }
}

/// Whether any metadata was found.
pub fn has_metadata(ctx: &RunPeriodContext) -> bool {
    *ctx != RunPeriodContext::default()
}

/// Reads the run context from `reader` in one pass, replacing bytes that are
/// not valid UTF-8.
///
/// # Errors
///
/// Returns the first read error.
pub fn read_run_period_reader<R: BufRead>(reader: R) -> io::Result<RunPeriodContext> {
    let mut ctx = RunPeriodContext::default();
    for (i, line) in lossy_lines(reader).enumerate() {
        apply_line(&mut ctx, i + 1, &line?);
    }
    Ok(ctx)
}

/// Reads the run context from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn read_run_period_file(path: impl AsRef<Path>) -> io::Result<RunPeriodContext> {
    read_run_period_reader(BufReader::new(File::open(path)?))
}
