use std::{fmt::Display, str::FromStr};

use chrono::Duration;
use recon_common::{MicroUnits, MATCH_TOLERANCE};
use serde::{Deserialize, Serialize};

use crate::db_types::{GateTransaction, LocalTransaction};

pub const DEFAULT_MATCH_WINDOW_MINUTES: i64 = 30;
pub const DEFAULT_LOOKBACK_DAYS: i64 = 90;

/// Which pair of amounts is compared when matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchCurrency {
    /// The local fiat total against the gate's fiat (RUB) amount.
    #[default]
    Fiat,
    /// The local crypto amount against the gate's stablecoin (USDT) amount.
    Stable,
}

impl FromStr for MatchCurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fiat" | "rub" => Ok(Self::Fiat),
            "stable" | "usdt" => Ok(Self::Stable),
            other => Err(format!("'{other}' is not a match currency. Use 'fiat' or 'stable'")),
        }
    }
}

impl Display for MatchCurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fiat => write!(f, "fiat"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSettings {
    /// The largest allowed gap between local completion and gate approval (inclusive).
    pub window: Duration,
    /// Amounts must differ by strictly less than this.
    pub tolerance: MicroUnits,
    /// Local transactions completed longer ago than this are not considered.
    pub lookback: Duration,
    pub currency: MatchCurrency,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            window: Duration::minutes(DEFAULT_MATCH_WINDOW_MINUTES),
            tolerance: MATCH_TOLERANCE,
            lookback: Duration::days(DEFAULT_LOOKBACK_DAYS),
            currency: MatchCurrency::default(),
        }
    }
}

/// A gate transaction that satisfies both matching criteria for some local transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedCandidate {
    pub gate_tx_id: i64,
    /// Absolute gap between local completion and gate approval.
    pub time_difference: Duration,
}

impl RankedCandidate {
    /// The gap in minutes, rounded to the nearest whole minute (half a minute rounds up).
    pub fn minutes(&self) -> i64 {
        let ms = self.time_difference.num_milliseconds().abs();
        (ms + 30_000) / 60_000
    }
}

impl MatchSettings {
    pub fn local_amount(&self, local: &LocalTransaction) -> MicroUnits {
        match self.currency {
            MatchCurrency::Fiat => local.total_fiat,
            MatchCurrency::Stable => local.amount,
        }
    }

    pub fn gate_amount(&self, gate: &GateTransaction) -> MicroUnits {
        match self.currency {
            MatchCurrency::Fiat => gate.amount_fiat,
            MatchCurrency::Stable => gate.amount_stable,
        }
    }

    /// Returns the absolute time gap if `gate` matches `local`, i.e. the gate transaction is approved, was approved
    /// within the window of the local completion time, and the amounts agree within tolerance.
    pub fn is_match(&self, local: &LocalTransaction, gate: &GateTransaction) -> Option<Duration> {
        let approved_at = gate.approved_at?;
        let delta = approved_at - local.completed_at;
        let delta = if delta < Duration::zero() { -delta } else { delta };
        let amounts_agree = self.local_amount(local).is_within(self.gate_amount(gate), self.tolerance);
        (delta <= self.window && amounts_agree).then_some(delta)
    }

    /// Every matching candidate for `local`, closest in time first. Ties go to the lowest gate row id.
    pub fn rank_candidates(&self, local: &LocalTransaction, candidates: &[GateTransaction]) -> Vec<RankedCandidate> {
        let mut ranked = candidates
            .iter()
            .filter_map(|gate| {
                self.is_match(local, gate).map(|time_difference| RankedCandidate { gate_tx_id: gate.id, time_difference })
            })
            .collect::<Vec<RankedCandidate>>();
        ranked.sort_by_key(|c| (c.time_difference, c.gate_tx_id));
        ranked
    }
}

#[cfg(test)]
mod test {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn local(total: &str, completed_at: DateTime<Utc>) -> LocalTransaction {
        LocalTransaction {
            id: 1,
            user_id: 1,
            order_id: "L1".into(),
            status: Some("completed".into()),
            amount: "16.25".parse().unwrap(),
            total_fiat: total.parse().unwrap(),
            buyer_name: None,
            method: None,
            completed_at,
            processed: false,
            created_at: completed_at,
        }
    }

    fn gate(id: i64, amount: &str, approved_at: Option<DateTime<Utc>>) -> GateTransaction {
        GateTransaction {
            id,
            transaction_id: format!("G{id}"),
            payment_method_id: None,
            wallet: None,
            amount_fiat: amount.parse().unwrap(),
            amount_stable: "16.25".parse().unwrap(),
            total_fiat: amount.parse().unwrap(),
            total_stable: MicroUnits::default(),
            status: 7,
            bank_name: None,
            bank_code: None,
            bank_label: None,
            payment_method: None,
            course: None,
            success_count: None,
            success_rate: None,
            approved_at,
            expired_at: None,
            created_at: None,
            updated_at: None,
            trader_id: None,
            trader_name: None,
            attachments: None,
            recorded_at: t0(),
        }
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let settings = MatchSettings::default();
        let l = local("1500.00", t0());
        let on_edge = gate(1, "1500.00", Some(t0() + Duration::minutes(30)));
        assert_eq!(settings.is_match(&l, &on_edge), Some(Duration::minutes(30)));
        let before = gate(2, "1500.00", Some(t0() - Duration::minutes(30)));
        assert_eq!(settings.is_match(&l, &before), Some(Duration::minutes(30)));
        let outside = gate(3, "1500.00", Some(t0() + Duration::minutes(30) + Duration::seconds(1)));
        assert_eq!(settings.is_match(&l, &outside), None);
    }

    #[test]
    fn tolerance_boundary_is_exclusive() {
        let settings = MatchSettings::default();
        let g = gate(1, "1500.00", Some(t0()));
        assert!(settings.is_match(&local("1500.0099", t0()), &g).is_some());
        assert!(settings.is_match(&local("1499.9901", t0()), &g).is_some());
        assert!(settings.is_match(&local("1500.01", t0()), &g).is_none());
        assert!(settings.is_match(&local("1499.99", t0()), &g).is_none());
    }

    #[test]
    fn unapproved_transactions_never_match() {
        let settings = MatchSettings::default();
        assert!(settings.is_match(&local("1500.00", t0()), &gate(1, "1500.00", None)).is_none());
    }

    #[test]
    fn stable_currency_compares_crypto_amounts() {
        let settings = MatchSettings { currency: MatchCurrency::Stable, ..Default::default() };
        let l = local("999.00", t0());
        assert!(settings.is_match(&l, &gate(1, "1500.00", Some(t0()))).is_some());
    }

    #[test]
    fn candidates_are_ranked_by_time_then_id() {
        let settings = MatchSettings::default();
        let l = local("1500.00", t0());
        let candidates = vec![
            gate(7, "1500.00", Some(t0() + Duration::minutes(20))),
            gate(5, "1500.00", Some(t0() - Duration::minutes(5))),
            gate(3, "1500.00", Some(t0() + Duration::minutes(5))),
            gate(4, "1600.00", Some(t0())),
            gate(9, "1500.00", Some(t0() + Duration::hours(2))),
        ];
        let ranked = settings.rank_candidates(&l, &candidates).iter().map(|c| c.gate_tx_id).collect::<Vec<i64>>();
        assert_eq!(ranked, vec![3, 5, 7]);
    }

    #[test]
    fn minutes_are_rounded() {
        let c = |secs| RankedCandidate { gate_tx_id: 1, time_difference: Duration::seconds(secs) };
        assert_eq!(c(0).minutes(), 0);
        assert_eq!(c(29).minutes(), 0);
        assert_eq!(c(30).minutes(), 1);
        assert_eq!(c(899).minutes(), 15);
        assert_eq!(c(1800).minutes(), 30);
    }

    #[test]
    fn currency_from_str() {
        assert_eq!("USDT".parse::<MatchCurrency>().unwrap(), MatchCurrency::Stable);
        assert_eq!(" fiat ".parse::<MatchCurrency>().unwrap(), MatchCurrency::Fiat);
        assert!("btc".parse::<MatchCurrency>().is_err());
    }
}
