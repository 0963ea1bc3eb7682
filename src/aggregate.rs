use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::ledger::Ledger;
use crate::models::{CategoryTotal, Transaction, WeekdayCategoryTotal, INCOME_CATEGORY, WEEKDAYS};

// ---------------------------------------------------------------------------
// Category totals
// ---------------------------------------------------------------------------

/// Per-category sum of absolute amounts over every row, sorted by category name.
pub fn category_totals(ledger: &Ledger) -> Vec<CategoryTotal> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for t in &ledger.transactions {
        *sums.entry(t.category.as_str()).or_default() += t.amount.abs();
    }
    sums.into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect()
}

/// Category totals with the income category removed (the spending chart).
pub fn spending_totals(totals: &[CategoryTotal]) -> Vec<CategoryTotal> {
    totals
        .iter()
        .filter(|t| t.category != INCOME_CATEGORY)
        .cloned()
        .collect()
}

/// Per-(weekday, category) absolute sum of spending rows, Monday first and
/// then by category name. Income rows never contribute.
pub fn weekday_totals(ledger: &Ledger) -> Vec<WeekdayCategoryTotal> {
    let mut sums: BTreeMap<(u32, &str), f64> = BTreeMap::new();
    for t in ledger.transactions.iter().filter(|t| !t.is_income()) {
        let day = t.date.weekday().num_days_from_monday();
        *sums.entry((day, t.category.as_str())).or_default() += t.amount.abs();
    }
    sums.into_iter()
        .map(|((day, category), total)| WeekdayCategoryTotal {
            weekday: WEEKDAYS[day as usize],
            category: category.to_string(),
            total,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Spending breakdown
// ---------------------------------------------------------------------------

pub struct CategoryShare {
    pub category: String,
    pub total: f64,
    pub pct: f64,
}

/// Share of total spending per category, largest first.
pub fn spending_shares(spending: &[CategoryTotal]) -> Vec<CategoryShare> {
    let grand: f64 = spending.iter().map(|t| t.total).sum();
    let mut shares: Vec<CategoryShare> = spending
        .iter()
        .map(|t| CategoryShare {
            category: t.category.clone(),
            total: t.total,
            pct: if grand > 0.0 { t.total / grand * 100.0 } else { 0.0 },
        })
        .collect();
    shares.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    shares
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// Dense weekday x category matrix for the heatmap view.
pub struct HeatmapGrid {
    pub categories: Vec<String>,
    /// `cells[row][col]`: row follows `categories`, col is Monday..Sunday.
    pub cells: Vec<[f64; 7]>,
    pub max: f64,
}

impl HeatmapGrid {
    pub fn from_totals(totals: &[WeekdayCategoryTotal]) -> Self {
        let mut rows: BTreeMap<&str, [f64; 7]> = BTreeMap::new();
        for t in totals {
            let col = t.weekday.num_days_from_monday() as usize;
            rows.entry(t.category.as_str()).or_insert([0.0; 7])[col] += t.total;
        }
        let max = rows
            .values()
            .flat_map(|r| r.iter().copied())
            .fold(0.0_f64, f64::max);
        let (categories, cells) = rows
            .into_iter()
            .map(|(name, row)| (name.to_string(), row))
            .unzip();
        Self {
            categories,
            cells,
            max,
        }
    }

    /// Cell intensity in 0.0..=1.0, for shading.
    pub fn intensity(&self, row: usize, col: usize) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map(|v| v / self.max)
            .unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Ledger summary
// ---------------------------------------------------------------------------

pub struct LedgerSummary {
    pub count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub inflows: f64,
    pub outflows: f64,
    pub net: f64,
}

pub fn ledger_summary(ledger: &Ledger) -> LedgerSummary {
    let inflows: f64 = ledger
        .transactions
        .iter()
        .filter(|t| t.amount > 0.0)
        .map(|t| t.amount)
        .sum();
    let outflows: f64 = ledger
        .transactions
        .iter()
        .filter(|t| t.amount < 0.0)
        .map(|t| t.amount)
        .sum();
    LedgerSummary {
        count: ledger.len(),
        first_date: ledger.transactions.iter().map(|t| t.date).min(),
        last_date: ledger.transactions.iter().map(|t| t.date).max(),
        inflows,
        outflows,
        net: inflows + outflows,
    }
}

// ---------------------------------------------------------------------------
// Prompt text renderers
// ---------------------------------------------------------------------------

/// Plain two-column table of category totals, as sent to the advisor.
pub fn summary_table(totals: &[CategoryTotal]) -> String {
    let cat_width = totals
        .iter()
        .map(|t| t.category.chars().count())
        .max()
        .unwrap_or(0)
        .max("Category".len());
    let amounts: Vec<String> = totals.iter().map(|t| format!("{:.2}", t.total)).collect();
    let amt_width = amounts.iter().map(String::len).max().unwrap_or(0).max("Amount".len());

    let mut out = format!("{:<cat_width$}  {:>amt_width$}", "Category", "Amount");
    for (t, amt) in totals.iter().zip(&amounts) {
        out.push('\n');
        out.push_str(&format!("{:<cat_width$}  {:>amt_width$}", t.category, amt));
    }
    out
}

/// Plain Date / Description / Amount table of every row, as sent to the advisor.
pub fn transactions_table(transactions: &[Transaction]) -> String {
    let desc_width = transactions
        .iter()
        .map(|t| t.description.chars().count())
        .max()
        .unwrap_or(0)
        .max("Description".len());
    let amounts: Vec<String> = transactions.iter().map(|t| format!("{:.2}", t.amount)).collect();
    let amt_width = amounts.iter().map(String::len).max().unwrap_or(0).max("Amount".len());

    let mut out = format!(
        "{:<10}  {:<desc_width$}  {:>amt_width$}",
        "Date", "Description", "Amount"
    );
    for (t, amt) in transactions.iter().zip(&amounts) {
        out.push('\n');
        out.push_str(&format!(
            "{:<10}  {:<desc_width$}  {:>amt_width$}",
            t.date.format("%Y-%m-%d"),
            t.description,
            amt
        ));
    }
    out
}
