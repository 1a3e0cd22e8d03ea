//! Calendar-month billing periods and the counter keys derived from them.

use crate::AccountId;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    /// The period containing `now`.
    pub fn containing(now: DateTime<Utc>) -> Self {
        Self {
            year: now.year(),
            month: now.month(),
        }
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1 through 12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// `YYYY-MM` label used in counter keys.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// The following month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Midnight UTC on the first day of this period.
    ///
    /// Returns `None` only for years outside chrono's representable range.
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        Utc.from_local_datetime(&midnight).single()
    }

    /// When usage for this period stops counting: the start of the next period.
    pub fn resets_at(&self) -> Option<DateTime<Utc>> {
        self.next().starts_at()
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Counter store key for one account in one billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UsageKey {
    account: AccountId,
    period: BillingPeriod,
}

impl UsageKey {
    /// Key for `account` in `period`.
    pub fn new(account: AccountId, period: BillingPeriod) -> Self {
        Self { account, period }
    }

    /// Owning account.
    pub fn account(&self) -> AccountId {
        self.account
    }

    /// Billing period.
    pub fn period(&self) -> BillingPeriod {
        self.period
    }
}

impl std::fmt::Display for UsageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "usage:{}:{}", self.account, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 13, 30, 0).unwrap()
    }

    #[test]
    fn label_is_zero_padded() {
        assert_eq!(BillingPeriod::containing(at(2025, 3, 9)).label(), "2025-03");
    }

    #[test]
    fn december_rolls_into_january() {
        let period = BillingPeriod::containing(at(2024, 12, 31));
        assert_eq!(period.next().label(), "2025-01");
        assert_eq!(period.resets_at(), Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn key_display_matches_counter_layout() {
        let key = UsageKey::new(AccountId::new(42), BillingPeriod::containing(at(2025, 11, 2)));
        assert_eq!(key.to_string(), "usage:42:2025-11");
    }
}
