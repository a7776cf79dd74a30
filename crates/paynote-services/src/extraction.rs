//! Payment record extraction from chat text and from modal form values.

use chrono::NaiveDate;
use paynote_core::constants::{form, FORM_DATE_FORMAT, RECORD_DATE_FORMAT};
use paynote_core::{PaymentRecord, StructuredForm};
use regex::Regex;
use std::sync::LazyLock;

/// Field labels recognized in free text, in record order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Date,
    Amount,
    Bank,
    Company,
    CostCenter,
}

impl Label {
    const ALL: [Label; 5] = [
        Label::Date,
        Label::Amount,
        Label::Bank,
        Label::Company,
        Label::CostCenter,
    ];

    fn keyword(self) -> &'static str {
        match self {
            Label::Date => "DATA",
            Label::Amount => "VALOR",
            Label::Bank => "BANCO",
            Label::Company => "EMPRESA",
            Label::CostCenter => "CL",
        }
    }
}

/// `LABEL: value` or `LABEL - value`, case-insensitive, value up to the end of the line.
static LABEL_PATTERNS: LazyLock<Vec<(Label, Regex)>> = LazyLock::new(|| {
    Label::ALL
        .iter()
        .map(|label| {
            let pattern = format!(r"(?im)\b{}[ \t]*[:\-][ \t]*(.+)$", label.keyword());
            let regex = Regex::new(&pattern).expect("label pattern is a valid regex");
            (*label, regex)
        })
        .collect()
});

/// Decode the HTML entities Slack applies to message text.
pub fn unescape_slack_text(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn first_value(text: &str, label: Label) -> String {
    LABEL_PATTERNS
        .iter()
        .find(|(l, _)| *l == label)
        .and_then(|(_, regex)| regex.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Build a record from a free-text message. Missing labels yield empty fields.
pub fn extract(raw_text: &str) -> PaymentRecord {
    let text = unescape_slack_text(raw_text);
    PaymentRecord {
        date: first_value(&text, Label::Date),
        amount: first_value(&text, Label::Amount),
        bank: first_value(&text, Label::Bank),
        company: first_value(&text, Label::Company),
        cost_center: first_value(&text, Label::CostCenter),
    }
}

/// `YYYY-MM-DD` to `DD/MM/YYYY`; anything else is returned unchanged.
pub fn form_date_to_record_date(value: &str) -> String {
    let value = value.trim();
    match NaiveDate::parse_from_str(value, FORM_DATE_FORMAT) {
        Ok(date) => date.format(RECORD_DATE_FORMAT).to_string(),
        Err(_) => value.to_string(),
    }
}

/// Build a record from the modal's input values.
pub fn extract_from_structured(values: &StructuredForm) -> PaymentRecord {
    PaymentRecord {
        date: form_date_to_record_date(values.get(form::DATE_INPUT)),
        amount: values.get(form::AMOUNT_INPUT).trim().to_string(),
        bank: values.get(form::BANK_INPUT).trim().to_string(),
        company: values.get(form::COMPANY_INPUT).trim().to_string(),
        cost_center: values.get(form::COST_CENTER_INPUT).trim().to_string(),
    }
}

pub fn is_eligible(record: &PaymentRecord) -> bool {
    record.is_eligible()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_full_message() {
        let record = extract(
            "DATA: 04/02/2025\nVALOR: R$ 1.500,00\nBANCO: Itau\nEMPRESA: Empresa XYZ\nCL: CC001",
        );
        assert_eq!(
            record,
            PaymentRecord {
                date: "04/02/2025".into(),
                amount: "R$ 1.500,00".into(),
                bank: "Itau".into(),
                company: "Empresa XYZ".into(),
                cost_center: "CC001".into(),
            }
        );
        assert!(is_eligible(&record));
    }

    #[test]
    fn test_labels_are_case_insensitive_and_accept_dash() {
        let record = extract("data - 04/02/2025\nValor -R$ 10\nbanco:Nubank");
        assert_eq!(record.date, "04/02/2025");
        assert_eq!(record.amount, "R$ 10");
        assert_eq!(record.bank, "Nubank");
    }

    #[test]
    fn test_first_match_wins() {
        let record = extract("VALOR: 10\nVALOR: 20");
        assert_eq!(record.amount, "10");
    }

    #[test]
    fn test_missing_labels_are_empty() {
        let record = extract("DATA: 04/02/2025\nBANCO: Itau");
        assert_eq!(record.amount, "");
        assert_eq!(record.company, "");
        assert!(!is_eligible(&record));
    }

    #[test]
    fn test_value_stops_at_end_of_line() {
        let record = extract("Pagamento feito\nDATA: 04/02/2025   \r\nVALOR: 5\nobs: nada");
        assert_eq!(record.date, "04/02/2025");
        assert_eq!(record.amount, "5");
    }

    #[test]
    fn test_label_inside_word_is_ignored() {
        let record = extract("CICLO: 3\nCL: CC9");
        assert_eq!(record.cost_center, "CC9");
    }

    #[test]
    fn test_slack_entities_are_decoded() {
        let record = extract("DATA: 04/02/2025\nVALOR: 10\nEMPRESA: A &amp; B &lt;Ltda&gt;");
        assert_eq!(record.company, "A & B <Ltda>");
    }

    #[test]
    fn test_structured_date_conversion() {
        let values: StructuredForm = [
            (form::DATE_INPUT, "2025-03-15"),
            (form::AMOUNT_INPUT, " R$ 99 "),
            (form::BANK_INPUT, "Itau"),
        ]
        .into_iter()
        .collect();

        let record = extract_from_structured(&values);
        assert_eq!(record.date, "15/03/2025");
        assert_eq!(record.amount, "R$ 99");
        assert_eq!(record.bank, "Itau");
        assert_eq!(record.company, "");
        assert_eq!(record.cost_center, "");
    }

    #[test]
    fn test_structured_date_kept_when_unparseable() {
        assert_eq!(form_date_to_record_date("15/03/2025"), "15/03/2025");
        assert_eq!(form_date_to_record_date("amanha"), "amanha");
        assert_eq!(form_date_to_record_date(""), "");
    }
}
