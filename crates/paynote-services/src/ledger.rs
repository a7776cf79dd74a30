//! Audit rows in the ledger spreadsheet.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use paynote_core::constants::{
    LEDGER_FIRST_COLUMN, LEDGER_HEADER, LEDGER_LAST_COLUMN, LEDGER_TIMESTAMP_FORMAT,
};
use paynote_core::PaymentRecord;
use paynote_storage::{Spreadsheet, StoreResult};
use std::sync::Arc;

/// Tab name as it must appear in an A1 range; names with anything but letters, digits
/// and `_` are quoted.
fn a1_tab(tab: &str) -> String {
    if tab.chars().all(|c| c.is_alphanumeric() || c == '_') {
        tab.to_string()
    } else {
        format!("'{}'", tab.replace('\'', "''"))
    }
}

#[derive(Clone)]
pub struct LedgerWriter {
    ledger: Arc<dyn Spreadsheet>,
    tab: String,
    timezone: Tz,
}

impl LedgerWriter {
    pub fn new(ledger: Arc<dyn Spreadsheet>, tab: String, timezone: Tz) -> Self {
        Self {
            ledger,
            tab,
            timezone,
        }
    }

    /// First row, `A1:G1`.
    pub fn header_range(&self) -> String {
        format!(
            "{}!{}1:{}1",
            a1_tab(&self.tab),
            LEDGER_FIRST_COLUMN,
            LEDGER_LAST_COLUMN
        )
    }

    /// Whole table, `A:G`.
    pub fn table_range(&self) -> String {
        format!(
            "{}!{}:{}",
            a1_tab(&self.tab),
            LEDGER_FIRST_COLUMN,
            LEDGER_LAST_COLUMN
        )
    }

    /// Write the header row when the first row is empty. Returns whether it was written.
    ///
    /// A first row holding anything else is left alone.
    #[tracing::instrument(skip(self), fields(tab = %self.tab))]
    pub async fn ensure_header(&self) -> StoreResult<bool> {
        let range = self.header_range();
        let existing = self.ledger.read_range(&range).await?;
        if existing.iter().any(|row| !row.is_empty()) {
            return Ok(false);
        }

        let header = LEDGER_HEADER.iter().map(|h| h.to_string()).collect();
        self.ledger.write_range(&range, vec![header]).await?;
        tracing::info!("Ledger header written");
        Ok(true)
    }

    /// Row for `record`, stamped with `now` in the ledger timezone.
    pub fn row_for(&self, record: &PaymentRecord, link: &str, now: DateTime<Utc>) -> Vec<String> {
        vec![
            record.date.clone(),
            record.amount.clone(),
            record.bank.clone(),
            record.company.clone(),
            record.cost_center.clone(),
            link.to_string(),
            now.with_timezone(&self.timezone)
                .format(LEDGER_TIMESTAMP_FORMAT)
                .to_string(),
        ]
    }

    /// Append one row after the last row of the table. Repeated calls append repeated rows.
    #[tracing::instrument(skip(self, record, link), fields(tab = %self.tab))]
    pub async fn append_row(&self, record: &PaymentRecord, link: &str) -> StoreResult<()> {
        let row = self.row_for(record, link, Utc::now());
        self.ledger.append_row(&self.table_range(), row).await?;
        tracing::info!(date = %record.date, company = %record.company, "Ledger row appended");
        Ok(())
    }
}
