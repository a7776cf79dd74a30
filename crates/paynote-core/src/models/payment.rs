use serde::{Deserialize, Serialize};

/// Canonical payment record, built once per inbound event.
///
/// All fields hold trimmed free-form text. `date` is expected in `DD/MM/YYYY` but is not
/// guaranteed to parse; `amount` is passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub date: String,
    pub amount: String,
    pub bank: String,
    pub company: String,
    pub cost_center: String,
}

impl PaymentRecord {
    /// A record is processed only when both `date` and `amount` carry a value.
    pub fn is_eligible(&self) -> bool {
        !self.date.trim().is_empty() && !self.amount.trim().is_empty()
    }
}
