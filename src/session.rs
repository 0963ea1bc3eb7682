use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::advisor::{Advisor, ChatMessage};
use crate::aggregate::{self, CategoryShare, HeatmapGrid, LedgerSummary};
use crate::error::{BuddyError, Result};
use crate::ledger::{self, Ledger};
use crate::models::{CategoryTotal, DealRequest, Panel, SavingsGoal};
use crate::prompts;

/// Aggregates computed once per loaded file.
pub struct DashboardData {
    pub source: PathBuf,
    pub summary: LedgerSummary,
    pub category_totals: Vec<CategoryTotal>,
    pub spending: Vec<CategoryShare>,
    pub heatmap: HeatmapGrid,
}

impl DashboardData {
    fn build(source: PathBuf, ledger: &Ledger) -> Self {
        let category_totals = aggregate::category_totals(ledger);
        let spending = aggregate::spending_shares(&aggregate::spending_totals(&category_totals));
        let heatmap = HeatmapGrid::from_totals(&aggregate::weekday_totals(ledger));
        Self {
            source,
            summary: aggregate::ledger_summary(ledger),
            category_totals,
            spending,
            heatmap,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    NotRequested,
    Ready(String),
    Failed(String),
}

impl PanelState {
    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

struct Loaded {
    ledger: Ledger,
    data: DashboardData,
    /// Prompt inputs, derived once so every panel reads the same text.
    summary_text: String,
    transactions_text: String,
    panels: HashMap<Panel, PanelState>,
}

/// One interactive session: the advisory client plus whichever ledger is
/// currently open. Each method is the handler for one user action and issues
/// only the advisory call that action needs.
pub struct Session<A: Advisor> {
    advisor: A,
    loaded: Option<Loaded>,
}

const NOT_REQUESTED: PanelState = PanelState::NotRequested;

impl<A: Advisor> Session<A> {
    pub fn new(advisor: A) -> Self {
        Self {
            advisor,
            loaded: None,
        }
    }

    pub fn advisor(&self) -> &A {
        &self.advisor
    }

    /// File selected: parse, aggregate, and reset every advisory panel. A file
    /// that fails validation leaves the previously loaded ledger in place.
    pub fn load_file(&mut self, path: &Path) -> Result<&DashboardData> {
        let ledger = ledger::load_ledger(path)?;
        Ok(self.load_ledger(path.to_path_buf(), ledger))
    }

    pub fn load_ledger(&mut self, source: PathBuf, ledger: Ledger) -> &DashboardData {
        let data = DashboardData::build(source, &ledger);
        let summary_text = aggregate::summary_table(&data.category_totals);
        let transactions_text = aggregate::transactions_table(&ledger.transactions);
        info!(
            source = %data.source.display(),
            rows = ledger.len(),
            categories = data.category_totals.len(),
            "ledger loaded"
        );
        let loaded = self.loaded.insert(Loaded {
            ledger,
            data,
            summary_text,
            transactions_text,
            panels: HashMap::new(),
        });
        &loaded.data
    }

    pub fn data(&self) -> Option<&DashboardData> {
        self.loaded.as_ref().map(|l| &l.data)
    }

    pub fn ledger(&self) -> Option<&Ledger> {
        self.loaded.as_ref().map(|l| &l.ledger)
    }

    pub fn panel(&self, panel: Panel) -> &PanelState {
        self.loaded
            .as_ref()
            .and_then(|l| l.panels.get(&panel))
            .unwrap_or(&NOT_REQUESTED)
    }

    /// Forget a panel's result so the next request issues a fresh call.
    pub fn reset_panel(&mut self, panel: Panel) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.panels.remove(&panel);
        }
    }

    pub fn general_advice(&mut self) -> Result<&PanelState> {
        self.fetch_once(Panel::Advice, |l| prompts::general_advice(&l.summary_text))
    }

    pub fn subscriptions(&mut self) -> Result<&PanelState> {
        self.fetch_once(Panel::Subscriptions, |l| {
            prompts::subscription_list(&l.transactions_text)
        })
    }

    pub fn subscription_savings(&mut self) -> Result<&PanelState> {
        self.fetch_once(Panel::SubscriptionSavings, |l| {
            prompts::subscription_savings(&l.transactions_text)
        })
    }

    /// Savings goal form submitted. Always issues one call.
    pub fn analyze_goal(&mut self, goal: &SavingsGoal, today: NaiveDate) -> Result<&PanelState> {
        self.fetch(Panel::Goal, |l| {
            prompts::goal_feasibility(&l.summary_text, goal, today)
        })
    }

    /// Deal finder form submitted. Always issues one call.
    pub fn find_deals(&mut self, request: &DealRequest) -> Result<&PanelState> {
        self.fetch(Panel::Deals, |l| {
            prompts::deal_finder(&l.transactions_text, request)
        })
    }

    fn fetch_once(
        &mut self,
        panel: Panel,
        build: impl FnOnce(&Loaded) -> Vec<ChatMessage>,
    ) -> Result<&PanelState> {
        let already = self
            .loaded
            .as_ref()
            .is_some_and(|l| l.panels.contains_key(&panel));
        if already {
            return Ok(self.panel(panel));
        }
        self.fetch(panel, build)
    }

    fn fetch(
        &mut self,
        panel: Panel,
        build: impl FnOnce(&Loaded) -> Vec<ChatMessage>,
    ) -> Result<&PanelState> {
        let loaded = self.loaded.as_mut().ok_or(BuddyError::NoLedgerLoaded)?;
        let messages = build(&*loaded);
        let state = match self.advisor.complete(&messages) {
            Ok(text) => PanelState::Ready(text),
            Err(e) => {
                warn!(%panel, error = %e, "advisory call failed");
                PanelState::Failed(e.to_string())
            }
        };
        loaded.panels.insert(panel, state);
        Ok(loaded.panels.get(&panel).unwrap_or(&NOT_REQUESTED))
    }
}
