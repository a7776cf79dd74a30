//! Operator tooling for Paynote.

use chrono::NaiveDate;
use chrono_tz::Tz;
use paynote_core::PaymentRecord;
use paynote_services::{extract, is_eligible, FolderNamer};
use serde::Serialize;

/// What the service would do with a message, without touching any backend.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    pub record: PaymentRecord,
    pub eligible: bool,
    pub month_folder: String,
    pub entry_folder: String,
}

/// Extract a message and derive its folder names. `today` is the month fallback for
/// unparseable dates.
pub fn parse_report(text: &str, timezone: Tz, today: NaiveDate) -> ParseReport {
    let record = extract(text);
    let namer = FolderNamer::new(timezone);
    ParseReport {
        eligible: is_eligible(&record),
        month_folder: namer.month_folder_name_at(&record, today),
        entry_folder: namer.entry_folder_name(&record),
        record,
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    #[test]
    fn test_report_for_complete_message() {
        let report = parse_report(
            "DATA: 04/02/2025\nVALOR: R$ 1.500,00\nBANCO: Itau",
            chrono_tz::America::Sao_Paulo,
            today(),
        );
        assert!(report.eligible);
        assert_eq!(report.month_folder, "2025-02");
        assert_eq!(report.entry_folder, "2025-02-04_R$1.500,00_Itau");
    }

    #[test]
    fn test_report_for_unparseable_date() {
        let report = parse_report(
            "DATA: amanha\nVALOR: 10",
            chrono_tz::America::Sao_Paulo,
            today(),
        );
        assert!(report.eligible);
        assert_eq!(report.month_folder, "2025-06");
        assert_eq!(report.entry_folder, "amanha_10");
    }

    #[test]
    fn test_report_serializes_record() {
        let report = parse_report("VALOR: 10", chrono_tz::UTC, today());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["eligible"], false);
        assert_eq!(value["record"]["amount"], "10");
    }
}
