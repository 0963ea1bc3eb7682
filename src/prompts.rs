//! Advisory prompt templates.
//!
//! Every function here is pure interpolation: aggregate or row text in,
//! ordered chat messages out. Form validation happens when the request types
//! in [`crate::models`] are constructed, so a template can never be built from
//! a rejected form.

use chrono::NaiveDate;

use crate::advisor::ChatMessage;
use crate::models::{DealRequest, SavingsGoal};

const COACH_SYSTEM: &str = "You are a smart financial coach. Analyze transactions and give \
practical, money-saving advice in a kind way that helps the user feel secure.";

const SUBSCRIPTION_SYSTEM: &str =
    "You are a financial assistant. Identify recurring or subscription-like charges.";

const SAVINGS_SYSTEM: &str =
    "You are a financial assistant. Summarize savings potential from subscriptions.";

const GOAL_SYSTEM: &str =
    "You are a smart financial coach. Help users adjust their budget to meet savings goals.";

pub fn general_advice(summary_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(COACH_SYSTEM),
        ChatMessage::user(format!(
            "Here is my spending summary by category:
{summary_text}

Please suggest ways I can reduce spending, especially on non-essential categories \
(like coffee, dining, shopping, subscriptions).
Focus on practical tips, but don't cut out necessities like rent or utilities. \
Keep it concise, and stay kind and non-judgemental.
Please make me also feel secure that I'm sharing my income with you."
        )),
    ]
}

pub fn subscription_list(transactions_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SUBSCRIPTION_SYSTEM),
        ChatMessage::user(format!(
            "Here are my transactions:

{transactions_text}

Step 1 → Extract a clear list of recurring subscriptions, free trials that became paid, \
or gray charges.
Format ONLY as a neat markdown table with two columns: Merchant | Est. Monthly Cost. \
Don't name the table.

Rent and utility bills don't count as subscriptions.
If there are no clear subscriptions, do not create a table. Mention that there are no \
subscriptions provided at the time!"
        )),
    ]
}

pub fn subscription_savings(transactions_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SAVINGS_SYSTEM),
        ChatMessage::user(format!(
            "Here are my transactions:

{transactions_text}
Based on the subscriptions found in my transactions, write a short analysis:
Don't list out all the subscriptions and their price.
1. Monthly and yearly savings if cancelled or reduced.
2. Highlight which subscriptions started out as free trials but are now being charged \
fully. List the name of the service and when the free trial started. Only follow this \
step if there are subscriptions that started as free trials.
Keep it concise, kind, and practical."
        )),
    ]
}

pub fn goal_feasibility(summary_text: &str, goal: &SavingsGoal, today: NaiveDate) -> Vec<ChatMessage> {
    let amount = format_goal_amount(goal.amount());
    let target = goal.target_date().format("%Y-%m-%d");
    let today = today.format("%Y-%m-%d");
    vec![
        ChatMessage::system(GOAL_SYSTEM),
        ChatMessage::user(format!(
            "Here is my spending summary by category:
{summary_text}

I want to save **${amount}** by **{target}** and today is {today}.

1. Is this savings goal feasible based on my current spending?
2. Suggest specific adjustments by category (monthly), focusing on reducing non-essentials first.
3. Show how much I should aim to save each month to reach the goal.

Keep your response concise and kind. Please make me also feel secure that I'm sharing \
my income with you."
        )),
    ]
}

pub fn deal_finder(transactions_text: &str, request: &DealRequest) -> Vec<ChatMessage> {
    let occupation = if request.occupation().is_empty() {
        "not specified"
    } else {
        request.occupation()
    };
    let age = request.age();
    vec![
        ChatMessage::system(GOAL_SYSTEM),
        ChatMessage::user(format!(
            "Here are my transactions:
{transactions_text}
My occupation is {occupation} and I am {age} years old. Please suggest if there are any \
deals or discounts for my occupation and/or age and provide links or resources if \
available to where I can find more information on that.
Then if I'm not using certain deals currently, point out specific deals I can save on \
based on what I already pay for with the newfound information of my age and occupation. \
If I am using those deals, don't point it out."
        )),
    ]
}

/// Whole-dollar goals print without decimals, anything else with cents.
fn format_goal_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::Role;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_general_advice_embeds_summary() {
        let msgs = general_advice("Category  Amount\nCoffee      8.00");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[1].role, Role::User);
        assert!(msgs[1].content.contains("Coffee      8.00"));
        assert!(msgs[1].content.contains("don't cut out necessities"));
    }

    #[test]
    fn test_subscription_templates_embed_rows() {
        let rows = "Date        Description  Amount\n2025-01-03  Netflix      -15.49";
        for msgs in [subscription_list(rows), subscription_savings(rows)] {
            assert_eq!(msgs[0].role, Role::System);
            assert!(msgs[1].content.contains("Netflix      -15.49"));
        }
        assert!(subscription_list(rows)[1].content.contains("Merchant | Est. Monthly Cost"));
        assert!(subscription_savings(rows)[1].content.contains("Monthly and yearly savings"));
    }

    #[test]
    fn test_goal_prompt_interpolates_goal_and_dates() {
        let today = date(2025, 1, 15);
        let goal = SavingsGoal::new(2500.0, date(2025, 12, 31), today).unwrap();
        let msgs = goal_feasibility("Category  Amount", &goal, today);
        let user = &msgs[1].content;
        assert!(user.contains("I want to save **$2500** by **2025-12-31** and today is 2025-01-15."));
    }

    #[test]
    fn test_goal_prompt_keeps_cents() {
        let today = date(2025, 1, 15);
        let goal = SavingsGoal::new(99.5, date(2025, 2, 1), today).unwrap();
        let msgs = goal_feasibility("", &goal, today);
        assert!(msgs[1].content.contains("**$99.50**"));
    }

    #[test]
    fn test_deal_prompt_interpolates_profile() {
        let req = DealRequest::new("Nurse", 29).unwrap();
        let msgs = deal_finder("rows", &req);
        assert!(msgs[1].content.contains("My occupation is Nurse and I am 29 years old."));
    }

    #[test]
    fn test_deal_prompt_blank_occupation() {
        let req = DealRequest::new("   ", 67).unwrap();
        let msgs = deal_finder("rows", &req);
        assert!(msgs[1].content.contains("My occupation is not specified and I am 67 years old."));
    }

    #[test]
    fn test_templates_are_deterministic() {
        assert_eq!(general_advice("x"), general_advice("x"));
        assert_eq!(subscription_list("x"), subscription_list("x"));
    }
}
