use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::models::Transaction;

pub const REQUIRED_COLUMNS: [&str; 4] = ["Date", "Description", "Category", "Amount"];

/// The loaded transaction table. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?\$?(?:\d{1,3}(?:,\d{3})+|\d+)?(?:\.\d+)?$").expect("valid amount regex")
    })
}

/// Parse a signed amount. Accepts thousands separators, a leading `$` and
/// accounting-style parentheses for negatives. Returns `None` for anything else.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return parse_amount(inner).map(|v| -v.abs());
    }
    if !s.chars().any(|c| c.is_ascii_digit()) || !amount_pattern().is_match(s) {
        return None;
    }
    s.replace([',', '$'], "").parse().ok()
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(any(feature = "xlsx", test))]
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial.trunc() as i64))
}

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Columns {
    date: usize,
    description: usize,
    category: usize,
    amount: usize,
}

impl Columns {
    fn locate<'a>(header: impl IntoIterator<Item = &'a str>) -> std::result::Result<Self, LedgerError> {
        let names: Vec<String> = header
            .into_iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
            .collect();
        let find = |col: &str| names.iter().position(|n| n == &col.to_ascii_lowercase());

        let found: Vec<Option<usize>> = REQUIRED_COLUMNS.iter().map(|c| find(*c)).collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&found)
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LedgerError::MissingColumns { missing });
        }
        let idx = |i: usize| found[i].unwrap_or_default();
        Ok(Self {
            date: idx(0),
            description: idx(1),
            category: idx(2),
            amount: idx(3),
        })
    }
}

fn build_transaction(
    line: usize,
    date: NaiveDate,
    description: &str,
    category: &str,
    amount: f64,
) -> std::result::Result<Transaction, LedgerError> {
    let category = category.trim();
    if category.is_empty() {
        return Err(LedgerError::EmptyCategory { line });
    }
    Ok(Transaction {
        date,
        description: description.trim().to_string(),
        category: category.to_string(),
        amount,
    })
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Parse a CSV ledger. The header row must name all four required columns;
/// extra columns are ignored and order is free.
pub fn parse_csv<R: Read>(reader: R) -> Result<Ledger> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(LedgerError::from)?.clone();
    let cols = Columns::locate(headers.iter())?;

    let mut transactions = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(LedgerError::from)?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(i + 2);
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let date = parse_date(field(cols.date)).ok_or_else(|| LedgerError::InvalidDate {
            line,
            value: field(cols.date).to_string(),
        })?;
        let amount = parse_amount(field(cols.amount)).ok_or_else(|| LedgerError::InvalidAmount {
            line,
            value: field(cols.amount).to_string(),
        })?;
        transactions.push(build_transaction(
            line,
            date,
            field(cols.description),
            field(cols.category),
            amount,
        )?);
    }
    debug!(rows = transactions.len(), "parsed csv ledger");
    Ok(Ledger::new(transactions))
}

#[cfg(feature = "xlsx")]
fn parse_xlsx(file_path: &Path) -> Result<Ledger> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(file_path)
        .map_err(|e| LedgerError::Spreadsheet(format!("Failed to open workbook: {e}")))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LedgerError::Spreadsheet("Workbook has no sheets".into()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| LedgerError::Spreadsheet(format!("Failed to read sheet {sheet}: {e}")))?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(|c| c.to_string()).collect(),
        None => {
            let missing = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
            return Err(LedgerError::MissingColumns { missing }.into());
        }
    };
    let cols = Columns::locate(header.iter().map(String::as_str))?;

    let text = |cell: Option<&Data>| cell.map(|c| c.to_string()).unwrap_or_default();

    let mut transactions = Vec::new();
    for (i, row) in rows.enumerate() {
        let line = i + 2;
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let date_cell = row.get(cols.date);
        let date = match date_cell {
            Some(Data::DateTime(dt)) => excel_serial_to_date(dt.as_f64()),
            Some(Data::Float(f)) => excel_serial_to_date(*f),
            Some(Data::Int(n)) => excel_serial_to_date(*n as f64),
            Some(Data::String(s)) | Some(Data::DateTimeIso(s)) => parse_date(s),
            _ => None,
        }
        .ok_or_else(|| LedgerError::InvalidDate {
            line,
            value: text(date_cell),
        })?;

        let amount_cell = row.get(cols.amount);
        let amount = match amount_cell {
            Some(Data::Float(f)) => Some(*f),
            Some(Data::Int(n)) => Some(*n as f64),
            Some(Data::String(s)) => parse_amount(s),
            _ => None,
        }
        .ok_or_else(|| LedgerError::InvalidAmount {
            line,
            value: text(amount_cell),
        })?;

        transactions.push(build_transaction(
            line,
            date,
            &text(row.get(cols.description)),
            &text(row.get(cols.category)),
            amount,
        )?);
    }
    debug!(rows = transactions.len(), sheet = %sheet, "parsed workbook ledger");
    Ok(Ledger::new(transactions))
}

/// Load a ledger from disk, picking the reader from the file extension.
pub fn load_ledger(file_path: &Path) -> Result<Ledger> {
    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let ledger = match ext.as_str() {
        "csv" | "txt" => parse_csv(std::io::BufReader::new(std::fs::File::open(file_path)?))?,
        #[cfg(feature = "xlsx")]
        "xlsx" | "xls" => parse_xlsx(file_path)?,
        other => return Err(LedgerError::UnsupportedFormat(format!(".{other}")).into()),
    };
    info!(path = %file_path.display(), rows = ledger.len(), "loaded ledger");
    Ok(ledger)
}
