use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};

use crate::{
    model::{RecentEntry, Summary, Window, WindowTotals},
    types::LedgerEntry,
};

pub const ROLLOVER_TYPE: &str = "rollover";
pub const ALLOWED_ASSETS: [&str; 3] = ["USD", "ZUSD", "ZUSD.F"];
pub const RECENT_LIMIT: usize = 30;

pub fn is_rollover_usd(entry: &LedgerEntry) -> bool {
    entry.r#type == ROLLOVER_TYPE
        && ALLOWED_ASSETS.contains(&entry.asset.as_str())
}

/// The charge is carried by `amount` or, on some accounts, by `fee`.
/// The first non-zero one wins; they are never added together.
pub fn effective_value(entry: &LedgerEntry) -> BigDecimal {
    let non_zero = |value: &Option<BigDecimal>| {
        value.as_ref().filter(|v| !v.is_zero()).cloned()
    };

    non_zero(&entry.amount)
        .or_else(|| non_zero(&entry.fee))
        .unwrap_or_default()
}

/// Reduces a fetched history to its summary as seen at `now`.
pub fn aggregate(entries: &[LedgerEntry], now: DateTime<Utc>) -> Summary {
    let mut rollovers: Vec<&LedgerEntry> =
        entries.iter().filter(|e| is_rollover_usd(e)).collect();

    // stable, so equal times keep fetch order
    rollovers.sort_by(|a, b| b.time.total_cmp(&a.time));

    let now_secs = now.timestamp_millis() as f64 / 1000.0;
    let mut total = BigDecimal::zero();
    let mut totals_by_window = WindowTotals::default();
    let mut recent = Vec::with_capacity(rollovers.len().min(RECENT_LIMIT));

    for (index, entry) in rollovers.iter().enumerate() {
        let value = effective_value(entry);
        let age = now_secs - entry.time;

        for window in Window::ALL {
            if window.contains_age(age) {
                totals_by_window.add(window, &value);
            }
        }

        if index < RECENT_LIMIT {
            recent.push(RecentEntry {
                time: entry.time.trunc() as i64,
                amount: value.clone(),
                asset: entry.asset.to_owned(),
            });
        }

        total += value;
    }

    Summary {
        count: rollovers.len(),
        total_rollover_usd: total,
        totals_by_window,
        recent,
    }
}
