use std::path::Path;

use anyhow::bail;
use colored::Colorize;

use super::{connect, load_session, open_session, parse_deal_form, parse_goal_form, today};
use crate::session::PanelState;

pub fn advice(file: &Path, model: Option<&str>) -> anyhow::Result<()> {
    let mut session = open_session(file, model)?;
    let state = session.general_advice()?;
    print_panel("AI Financial Advice", state);
    finish(&[state])
}

pub fn subscriptions(file: &Path, model: Option<&str>) -> anyhow::Result<()> {
    let mut session = open_session(file, model)?;
    let found = session.subscriptions()?.clone();
    print_panel("Subscriptions", &found);
    let savings = session.subscription_savings()?;
    print_panel("Potential Savings", savings);
    finish(&[&found, savings])
}

pub fn goal(file: &Path, amount: &str, by: &str, model: Option<&str>) -> anyhow::Result<()> {
    let client = connect(model)?;
    let today = today();
    let goal = parse_goal_form(amount, by, today)?;
    let mut session = load_session(client, file)?;
    let state = session.analyze_goal(&goal, today)?;
    print_panel("Savings Goal", state);
    finish(&[state])
}

pub fn deals(file: &Path, occupation: &str, age: &str, model: Option<&str>) -> anyhow::Result<()> {
    let client = connect(model)?;
    let request = parse_deal_form(occupation, age)?;
    let mut session = load_session(client, file)?;
    let state = session.find_deals(&request)?;
    print_panel("Deals & Discounts", state);
    finish(&[state])
}

fn print_panel(title: &str, state: &PanelState) {
    println!("{}", title.bold());
    match state {
        PanelState::Ready(text) => println!("{text}\n"),
        PanelState::Failed(reason) => println!("{}\n", format!("Could not get advice: {reason}").red()),
        PanelState::NotRequested => println!("{}\n", "(not requested)".dimmed()),
    }
}

/// A failed panel is shown in place, then reflected in the exit status.
fn finish(states: &[&PanelState]) -> anyhow::Result<()> {
    let failed = states
        .iter()
        .filter(|s| matches!(s, PanelState::Failed(_)))
        .count();
    if failed > 0 {
        bail!("{failed} advisory request(s) failed");
    }
    Ok(())
}
