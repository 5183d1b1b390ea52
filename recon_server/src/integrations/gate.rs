use gate_tools::{GateApi, PayoutRecord};
use log::*;
use recon_engine::{
    db_types::{GateSession, NewGateTransaction},
    PayoutFeed,
};

/// The live gate, as seen by the ingestion pipeline.
#[derive(Clone)]
pub struct GatePayoutFeed {
    api: GateApi,
}

impl GatePayoutFeed {
    pub fn new(api: GateApi) -> Self {
        Self { api }
    }
}

impl PayoutFeed for GatePayoutFeed {
    async fn validate(&self, session: &GateSession) -> bool {
        trace!("🌐️ Validating gate session #{} for user {}", session.id, session.user_id);
        self.api.validate(session.credential.reveal()).await
    }

    async fn fetch_all(&self, session: &GateSession) -> Vec<NewGateTransaction> {
        let records = self.api.fetch_all_records(session.credential.reveal()).await;
        debug!("🌐️ Gate session #{} has {} payout(s)", session.id, records.len());
        records.into_iter().map(new_gate_transaction_from_payout).collect()
    }
}

pub fn new_gate_transaction_from_payout(record: PayoutRecord) -> NewGateTransaction {
    NewGateTransaction {
        transaction_id: record.transaction_id,
        payment_method_id: record.payment_method_id,
        wallet: record.wallet,
        amount_fiat: record.amount_fiat,
        amount_stable: record.amount_stable,
        total_fiat: record.total_fiat,
        total_stable: record.total_stable,
        status: record.status,
        bank_name: record.bank_name,
        bank_code: record.bank_code,
        bank_label: record.bank_label,
        payment_method: record.payment_method,
        course: record.course,
        success_count: record.success_count,
        success_rate: record.success_rate,
        approved_at: record.approved_at,
        expired_at: record.expired_at,
        created_at: record.created_at,
        updated_at: record.updated_at,
        trader_id: record.trader_id,
        trader_name: record.trader_name,
        attachments: record.attachments.map(|v| v.to_string()),
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn payout_conversion() {
        let payout = json!({
            "id": 9012,
            "status": 7,
            "amount": { "trader": { "643": "1500.00", "000001": 16.25 } },
            "total": { "trader": { "643": 1512.5 } },
            "bank": { "name": "sber", "label": "Sberbank" },
            "approved_at": "2024-03-01T10:15:00Z",
            "attachments": [{ "file": "receipt.pdf" }]
        });
        let record = PayoutRecord::from_json(&payout).unwrap();
        let tx = new_gate_transaction_from_payout(record);
        assert_eq!(tx.transaction_id, "9012");
        assert_eq!(tx.status, 7);
        assert_eq!(tx.amount_fiat.value(), 1_500_000_000);
        assert_eq!(tx.amount_stable.value(), 16_250_000);
        assert_eq!(tx.total_fiat.value(), 1_512_500_000);
        assert_eq!(tx.total_stable.value(), 0);
        assert_eq!(tx.bank_label.as_deref(), Some("Sberbank"));
        assert_eq!(tx.approved_at, Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap()));
        assert_eq!(tx.attachments.as_deref(), Some(r#"[{"file":"receipt.pdf"}]"#));
        assert!(tx.trader_id.is_none());
    }
}
