//! Folder names derived from a payment record.
//!
//! Layout: `root / YYYY-MM / YYYY-MM-DD_AMOUNT_BANK_COMPANY_CL`. Both names are pure
//! functions of the record, except that the month falls back to today's month when the
//! record's date does not parse.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use paynote_core::constants::{MONTH_FOLDER_FORMAT, RECORD_DATE_FORMAT};
use paynote_core::PaymentRecord;

/// Characters that are not allowed in folder names.
const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Replace each forbidden character with `_` and trim.
pub fn sanitize_folder_name(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// `DD/MM/YYYY`, surrounding whitespace ignored.
pub fn parse_record_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), RECORD_DATE_FORMAT).ok()
}

#[derive(Debug, Clone, Copy)]
pub struct FolderNamer {
    timezone: Tz,
}

impl FolderNamer {
    /// `timezone` decides what "today" is for the month fallback.
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    pub fn month_folder_name(&self, record: &PaymentRecord) -> String {
        self.month_folder_name_at(record, self.today())
    }

    /// Month folder name with an explicit fallback date.
    pub fn month_folder_name_at(&self, record: &PaymentRecord, today: NaiveDate) -> String {
        parse_record_date(&record.date)
            .unwrap_or(today)
            .format(MONTH_FOLDER_FORMAT)
            .to_string()
    }

    pub fn entry_folder_name(&self, record: &PaymentRecord) -> String {
        let date = match parse_record_date(&record.date) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => record.date.replace('/', "-"),
        };
        let amount: String = record
            .amount
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let mut parts = vec![date, amount];
        parts.extend(
            [&record.bank, &record.company, &record.cost_center]
                .into_iter()
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(String::from),
        );

        sanitize_folder_name(&parts.join("_"))
    }
}
