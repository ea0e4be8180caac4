use std::fmt;

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::helpers::serialize_decimal_as_number;

/// Trailing windows used for subtotals. Each window contains the
/// previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Day,
    Week,
    Month,
    Year,
}

impl Window {
    pub const ALL: [Window; 4] =
        [Window::Day, Window::Week, Window::Month, Window::Year];

    const DAY: i64 = 24 * 60 * 60;

    pub fn threshold_secs(&self) -> i64 {
        match self {
            Window::Day => Self::DAY,
            Window::Week => 7 * Self::DAY,
            Window::Month => 30 * Self::DAY,
            Window::Year => 365 * Self::DAY,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Window::Day => "1d",
            Window::Week => "7d",
            Window::Month => "30d",
            Window::Year => "365d",
        }
    }

    pub fn contains_age(&self, age_secs: f64) -> bool {
        age_secs <= self.threshold_secs() as f64
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WindowTotals {
    #[serde(rename = "1d", serialize_with = "serialize_decimal_as_number")]
    pub day: BigDecimal,
    #[serde(rename = "7d", serialize_with = "serialize_decimal_as_number")]
    pub week: BigDecimal,
    #[serde(rename = "30d", serialize_with = "serialize_decimal_as_number")]
    pub month: BigDecimal,
    #[serde(
        rename = "365d",
        serialize_with = "serialize_decimal_as_number"
    )]
    pub year: BigDecimal,
}

impl WindowTotals {
    pub fn get(&self, window: Window) -> &BigDecimal {
        match window {
            Window::Day => &self.day,
            Window::Week => &self.week,
            Window::Month => &self.month,
            Window::Year => &self.year,
        }
    }

    pub fn add(&mut self, window: Window, value: &BigDecimal) {
        let total = match window {
            Window::Day => &mut self.day,
            Window::Week => &mut self.week,
            Window::Month => &mut self.month,
            Window::Year => &mut self.year,
        };
        *total += value;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentEntry {
    pub time: i64,
    #[serde(serialize_with = "serialize_decimal_as_number")]
    pub amount: BigDecimal,
    pub asset: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count: usize,
    #[serde(serialize_with = "serialize_decimal_as_number")]
    pub total_rollover_usd: BigDecimal,
    pub totals_by_window: WindowTotals,
    pub recent: Vec<RecentEntry>,
}

/// Summary plus how the history behind it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub summary: Summary,
    pub pages: usize,
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_windows_are_nested() {
        let thresholds: Vec<i64> =
            Window::ALL.iter().map(Window::threshold_secs).collect();
        assert_eq!(thresholds, vec![86400, 604800, 2592000, 31536000]);
        assert!(thresholds.windows(2).all(|w| w[0] < w[1]));

        assert!(Window::Day.contains_age(86400.0));
        assert!(!Window::Day.contains_age(86400.5));
        assert!(Window::Day.contains_age(-10.0));
    }

    #[test]
    fn test_summary_json_shape() {
        let mut totals = WindowTotals::default();
        totals.add(Window::Week, &BigDecimal::from_str("1.5").unwrap());
        totals.add(Window::Year, &BigDecimal::from_str("1.5").unwrap());

        let summary = Summary {
            count: 1,
            total_rollover_usd: BigDecimal::from_str("1.5").unwrap(),
            totals_by_window: totals,
            recent: vec![RecentEntry {
                time: 1688464484,
                amount: BigDecimal::from_str("1.5").unwrap(),
                asset: String::from("ZUSD"),
            }],
        };

        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({
                "count": 1,
                "totalRolloverUsd": 1.5,
                "totalsByWindow": { "1d": 0.0, "7d": 1.5, "30d": 0.0, "365d": 1.5 },
                "recent": [{ "time": 1688464484, "amount": 1.5, "asset": "ZUSD" }]
            })
        );
    }

    #[test]
    fn test_window_labels_match_json_keys() {
        let totals = serde_json::to_value(WindowTotals::default()).unwrap();

        for window in Window::ALL {
            assert!(totals.get(window.to_string()).is_some());
        }
        assert_eq!(format!("{}", Window::Month), "30d");
    }
}
