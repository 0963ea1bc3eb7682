use std::fmt;

use chrono::{NaiveDate, Weekday};

use crate::error::FormError;

/// Category label excluded from every spending-only view.
pub const INCOME_CATEGORY: &str = "Income";

/// Oldest age the deal finder form accepts.
pub const MAX_AGE: u32 = 120;

/// One row of the uploaded ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    /// Negative for money out, positive for money in.
    pub amount: f64,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.category == INCOME_CATEGORY
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Days of the week in display order, Monday first.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayCategoryTotal {
    pub weekday: Weekday,
    pub category: String,
    pub total: f64,
}

/// Validated savings goal form input.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsGoal {
    amount: f64,
    target_date: NaiveDate,
}

impl SavingsGoal {
    pub fn new(amount: f64, target_date: NaiveDate, today: NaiveDate) -> Result<Self, FormError> {
        // `!(amount > 0.0)` also rejects NaN
        if !(amount > 0.0) {
            return Err(FormError::NonPositiveGoal);
        }
        if target_date < today {
            return Err(FormError::TargetDateInPast(target_date));
        }
        Ok(Self {
            amount,
            target_date,
        })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn target_date(&self) -> NaiveDate {
        self.target_date
    }
}

/// Validated deal finder form input.
#[derive(Debug, Clone, PartialEq)]
pub struct DealRequest {
    occupation: String,
    age: u32,
}

impl DealRequest {
    pub fn new(occupation: &str, age: u32) -> Result<Self, FormError> {
        if age == 0 {
            return Err(FormError::NonPositiveAge);
        }
        if age > MAX_AGE {
            return Err(FormError::AgeOutOfRange { max: MAX_AGE });
        }
        Ok(Self {
            occupation: occupation.trim().to_string(),
            age,
        })
    }

    pub fn occupation(&self) -> &str {
        &self.occupation
    }

    pub fn age(&self) -> u32 {
        self.age
    }
}

/// Which advisory panel a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Advice,
    Subscriptions,
    SubscriptionSavings,
    Goal,
    Deals,
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Advice => "advice",
            Self::Subscriptions => "subscriptions",
            Self::SubscriptionSavings => "subscription savings",
            Self::Goal => "savings goal",
            Self::Deals => "deals",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_goal_rejects_non_positive_amounts() {
        let today = d(2025, 1, 1);
        assert_eq!(
            SavingsGoal::new(0.0, d(2025, 6, 1), today),
            Err(FormError::NonPositiveGoal)
        );
        assert_eq!(
            SavingsGoal::new(-100.0, d(2025, 6, 1), today),
            Err(FormError::NonPositiveGoal)
        );
        assert_eq!(
            SavingsGoal::new(f64::NAN, d(2025, 6, 1), today),
            Err(FormError::NonPositiveGoal)
        );
    }

    #[test]
    fn test_goal_rejects_past_target() {
        let today = d(2025, 3, 1);
        assert_eq!(
            SavingsGoal::new(500.0, d(2025, 2, 28), today),
            Err(FormError::TargetDateInPast(d(2025, 2, 28)))
        );
        let goal = SavingsGoal::new(500.0, today, today).unwrap();
        assert_eq!(goal.amount(), 500.0);
    }

    #[test]
    fn test_deal_request_age_bounds() {
        assert_eq!(DealRequest::new("Nurse", 0), Err(FormError::NonPositiveAge));
        assert_eq!(
            DealRequest::new("Nurse", 121),
            Err(FormError::AgeOutOfRange { max: 120 })
        );
        let req = DealRequest::new("  Nurse ", 34).unwrap();
        assert_eq!(req.occupation(), "Nurse");
        assert_eq!(req.age(), 34);
    }

    #[test]
    fn test_weekday_labels_in_order() {
        let labels: Vec<&str> = WEEKDAYS.iter().map(|d| weekday_label(*d)).collect();
        assert_eq!(
            labels,
            ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        );
    }
}
