pub mod advise;
pub mod dashboard;
pub mod summary;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

use crate::advisor::ChatClient;
use crate::error::FormError;
use crate::ledger::{parse_amount, parse_date};
use crate::models::{DealRequest, SavingsGoal};
use crate::session::Session;
use crate::settings::{load_settings, AdvisorConfig};

#[derive(Parser)]
#[command(
    name = "budget-buddy",
    version,
    about = "See where your money goes and get AI budgeting advice."
)]
pub struct Cli {
    /// Transaction file to open in the dashboard (CSV with Date, Description, Category, Amount)
    pub file: Option<PathBuf>,

    /// Model to use for advice (overrides settings and BUDGET_BUDDY_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive dashboard.
    Dashboard {
        /// Transaction file to load on start
        file: Option<PathBuf>,
    },
    /// Print transactions, category totals and the weekday heatmap (no AI calls).
    Summary {
        /// Transaction file (CSV or XLSX)
        file: PathBuf,
    },
    /// Ask for general money-saving advice based on category totals.
    Advice {
        file: PathBuf,
    },
    /// Detect subscriptions and estimate what cancelling them would save.
    Subscriptions {
        file: PathBuf,
    },
    /// Check whether a savings goal is feasible.
    Goal {
        file: PathBuf,
        /// Amount to save, e.g. 2500
        #[arg(long)]
        amount: String,
        /// Target date: YYYY-MM-DD
        #[arg(long)]
        by: String,
    },
    /// Find deals and discounts for your occupation and age.
    Deals {
        file: PathBuf,
        /// Your occupation
        #[arg(long, default_value = "")]
        occupation: String,
        /// Your age in years
        #[arg(long)]
        age: String,
    },
    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

impl Cli {
    /// Parse the process arguments, exiting with a usage error on bad input.
    pub fn parse_args() -> Self {
        let cli = Self::parse();
        if let Err(e) = cli.check() {
            e.exit();
        }
        cli
    }

    /// The bare FILE form only opens the dashboard, so it cannot be
    /// combined with a subcommand.
    pub fn check(&self) -> Result<(), clap::Error> {
        if self.file.is_some() && self.command.is_some() {
            return Err(Self::command().error(
                ErrorKind::ArgumentConflict,
                "a FILE before the subcommand is not allowed; pass it after the subcommand",
            ));
        }
        Ok(())
    }

    /// Whether this invocation takes over the terminal.
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Dashboard { .. }))
    }
}

/// Build the advisory client from settings and the environment. Called before
/// anything is loaded or drawn so a missing credential stops the run early.
pub(crate) fn connect(model: Option<&str>) -> anyhow::Result<ChatClient> {
    let settings = load_settings();
    let config = AdvisorConfig::from_env(&settings, model)?;
    Ok(ChatClient::new(config)?)
}

pub(crate) fn open_session(file: &Path, model: Option<&str>) -> anyhow::Result<Session<ChatClient>> {
    load_session(connect(model)?, file)
}

pub(crate) fn load_session(client: ChatClient, file: &Path) -> anyhow::Result<Session<ChatClient>> {
    let mut session = Session::new(client);
    session
        .load_file(file)
        .with_context(|| format!("Could not load {}", file.display()))?;
    Ok(session)
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Validate the savings goal form. Nothing is sent when this fails.
pub(crate) fn parse_goal_form(amount: &str, target: &str, today: NaiveDate) -> Result<SavingsGoal, FormError> {
    let value = parse_amount(amount).ok_or_else(|| FormError::Unparsable {
        field: "Goal amount",
        value: amount.trim().to_string(),
    })?;
    let date = parse_date(target).ok_or_else(|| FormError::Unparsable {
        field: "Target date",
        value: target.trim().to_string(),
    })?;
    SavingsGoal::new(value, date, today)
}

/// Validate the deal finder form. Nothing is sent when this fails.
pub(crate) fn parse_deal_form(occupation: &str, age: &str) -> Result<DealRequest, FormError> {
    let years = age.trim().parse::<u32>().map_err(|_| FormError::Unparsable {
        field: "Age",
        value: age.trim().to_string(),
    })?;
    DealRequest::new(occupation, years)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_goal_form_accepts_dollar_amounts() {
        let goal = parse_goal_form("$2,500", "2025-12-31", date(2025, 1, 15)).unwrap();
        assert_eq!(goal.amount(), 2500.0);
        assert_eq!(goal.target_date(), date(2025, 12, 31));
    }

    #[test]
    fn test_goal_form_errors() {
        let today = date(2025, 1, 15);
        assert_eq!(
            parse_goal_form("0", "2025-12-31", today).unwrap_err(),
            FormError::NonPositiveGoal
        );
        assert!(matches!(
            parse_goal_form("lots", "2025-12-31", today),
            Err(FormError::Unparsable { field: "Goal amount", .. })
        ));
        assert!(matches!(
            parse_goal_form("100", "someday", today),
            Err(FormError::Unparsable { field: "Target date", .. })
        ));
        assert!(matches!(
            parse_goal_form("100", "2024-12-31", today),
            Err(FormError::TargetDateInPast(_))
        ));
    }

    #[test]
    fn test_deal_form() {
        let req = parse_deal_form("  Nurse ", "34").unwrap();
        assert_eq!(req.occupation(), "Nurse");
        assert_eq!(req.age(), 34);

        assert_eq!(parse_deal_form("Nurse", "0").unwrap_err(), FormError::NonPositiveAge);
        assert!(matches!(
            parse_deal_form("Nurse", "-3"),
            Err(FormError::Unparsable { field: "Age", .. })
        ));
        assert!(matches!(
            parse_deal_form("Nurse", "121"),
            Err(FormError::AgeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_bare_file_opens_dashboard() {
        let cli = Cli::try_parse_from(["budget-buddy", "spending.csv"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.is_interactive());

        let cli = Cli::try_parse_from(["budget-buddy", "-v", "summary", "spending.csv"]).unwrap();
        assert!(!cli.is_interactive());
        assert_eq!(cli.verbose, 1);
        assert!(cli.file.is_none());
        assert!(matches!(cli.command, Some(Commands::Summary { ref file }) if file == Path::new("spending.csv")));
    }

    #[test]
    fn test_global_flags_before_subcommand() {
        let cli = Cli::try_parse_from(["budget-buddy", "--model", "llama-3.1-8b-instant", "advice", "spending.csv"])
            .unwrap();
        assert!(cli.check().is_ok());
        assert_eq!(cli.model.as_deref(), Some("llama-3.1-8b-instant"));
        assert!(matches!(cli.command, Some(Commands::Advice { ref file }) if file == Path::new("spending.csv")));

        let cli = Cli::try_parse_from(["budget-buddy", "advice", "spending.csv", "--model", "m", "-vv"]).unwrap();
        assert_eq!(cli.model.as_deref(), Some("m"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_bare_file_with_subcommand_is_rejected() {
        let cli = Cli::try_parse_from(["budget-buddy", "jan.csv", "summary", "feb.csv"]).unwrap();
        let err = cli.check().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }
}
