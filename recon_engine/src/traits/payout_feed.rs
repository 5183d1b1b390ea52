use crate::db_types::{GateSession, NewGateTransaction};

/// A source of gate payouts for a session.
///
/// Neither method fails: transport problems are the feed's to log, and are reported as an invalid session or an
/// empty (or short) listing respectively.
#[allow(async_fn_in_trait)]
pub trait PayoutFeed {
    /// True only if the gate currently accepts the session's credential.
    async fn validate(&self, session: &GateSession) -> bool;

    /// Every payout visible to the session, normalised.
    async fn fetch_all(&self, session: &GateSession) -> Vec<NewGateTransaction>;
}
