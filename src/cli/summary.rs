use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::aggregate::{self, HeatmapGrid};
use crate::fmt::{bar, compact_money, money};
use crate::ledger::{load_ledger, Ledger};
use crate::models::{weekday_label, WEEKDAYS};

const BAR_WIDTH: usize = 20;

/// Print everything the dashboard shows without contacting the advisor.
pub fn run(file: &Path) -> anyhow::Result<()> {
    let ledger = load_ledger(file).with_context(|| format!("Could not load {}", file.display()))?;
    if ledger.is_empty() {
        println!("No transactions in {}.", file.display());
        return Ok(());
    }

    print_overview(file, &ledger);
    print_transactions(&ledger);
    print_category_totals(&ledger);
    print_spending(&ledger);
    print_heatmap(&HeatmapGrid::from_totals(&aggregate::weekday_totals(&ledger)));
    Ok(())
}

fn print_overview(file: &Path, ledger: &Ledger) {
    let summary = aggregate::ledger_summary(ledger);
    let mut table = Table::new();
    table.add_row(vec![Cell::new("File"), Cell::new(file.display())]);
    table.add_row(vec![Cell::new("Transactions"), Cell::new(summary.count)]);
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        table.add_row(vec![Cell::new("Period"), Cell::new(format!("{first} to {last}"))]);
    }
    table.add_row(vec![Cell::new("Money in"), Cell::new(money(summary.inflows).green())]);
    table.add_row(vec![Cell::new("Money out"), Cell::new(money(summary.outflows).red())]);
    let net = if summary.net >= 0.0 {
        money(summary.net).green().bold()
    } else {
        money(summary.net).red().bold()
    };
    table.add_row(vec![Cell::new("Net".bold()), Cell::new(net)]);
    println!("Overview\n{table}");
}

fn print_transactions(ledger: &Ledger) {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Category", "Amount"]);
    for t in &ledger.transactions {
        let amount = if t.amount < 0.0 {
            money(t.amount).red()
        } else {
            money(t.amount).green()
        };
        table.add_row(vec![
            Cell::new(t.date),
            Cell::new(&t.description),
            Cell::new(&t.category),
            Cell::new(amount).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("\nTransactions\n{table}");
}

fn print_category_totals(ledger: &Ledger) {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Total"]);
    for t in aggregate::category_totals(ledger) {
        table.add_row(vec![
            Cell::new(&t.category),
            Cell::new(money(t.total)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("\nCategory Totals\n{table}");
}

fn print_spending(ledger: &Ledger) {
    let totals = aggregate::category_totals(ledger);
    let shares = aggregate::spending_shares(&aggregate::spending_totals(&totals));
    if shares.is_empty() {
        println!("\nNo spending to break down.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "%", ""]);
    for s in &shares {
        table.add_row(vec![
            Cell::new(&s.category),
            Cell::new(money(s.total)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", s.pct)).set_alignment(CellAlignment::Right),
            Cell::new(bar(s.pct / 100.0, BAR_WIDTH).red()),
        ]);
    }
    println!("\nSpending Breakdown\n{table}");
}

fn print_heatmap(grid: &HeatmapGrid) {
    if grid.is_empty() {
        return;
    }
    let mut header = vec!["Category"];
    header.extend(WEEKDAYS.iter().map(|d| weekday_label(*d)));

    let mut table = Table::new();
    table.set_header(header);
    for (row, category) in grid.categories.iter().enumerate() {
        let mut cells = vec![Cell::new(category)];
        for col in 0..WEEKDAYS.len() {
            let value = grid.cells[row][col];
            let label = if value > 0.0 {
                compact_money(value)
            } else {
                "·".to_string()
            };
            let (r, g, b) = heat_rgb(grid.intensity(row, col));
            cells.push(Cell::new(label.truecolor(r, g, b)).set_alignment(CellAlignment::Right));
        }
        table.add_row(cells);
    }
    println!("\nSpending by Day of Week\n{table}");
}

/// Foreground shade for a heatmap cell: grey for little spending, red at the maximum.
fn heat_rgb(intensity: f64) -> (u8, u8, u8) {
    let t = intensity.clamp(0.0, 1.0);
    let lerp = |from: f64, to: f64| (from + (to - from) * t).round() as u8;
    (lerp(150.0, 235.0), lerp(150.0, 60.0), lerp(150.0, 60.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_rgb_gradient() {
        assert_eq!(heat_rgb(0.0), (150, 150, 150));
        assert_eq!(heat_rgb(1.0), (235, 60, 60));
        assert_eq!(heat_rgb(-1.0), heat_rgb(0.0));
    }
}
