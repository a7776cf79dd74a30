//! Block Kit payloads: the payment modal and the modal submission summary.

use paynote_core::constants::{form, MODAL_CALLBACK_ID};
use paynote_core::PaymentRecord;
use serde_json::{json, Value};

fn plain_text(text: &str) -> Value {
    json!({ "type": "plain_text", "text": text })
}

fn text_input(block_id: &str, action_id: &str, label: &str, optional: bool) -> Value {
    json!({
        "type": "input",
        "block_id": block_id,
        "optional": optional,
        "label": plain_text(label),
        "element": {
            "type": "plain_text_input",
            "action_id": action_id,
        },
    })
}

/// Modal opened by the slash command. `channel_id` is kept in `private_metadata` so the
/// submission summary can be posted back where the command was typed.
pub fn payment_modal(channel_id: &str) -> Value {
    json!({
        "type": "modal",
        "callback_id": MODAL_CALLBACK_ID,
        "private_metadata": channel_id,
        "title": plain_text("Novo lancamento"),
        "submit": plain_text("Registrar"),
        "close": plain_text("Cancelar"),
        "blocks": [
            {
                "type": "input",
                "block_id": form::DATE_BLOCK,
                "label": plain_text("Data"),
                "element": {
                    "type": "datepicker",
                    "action_id": form::DATE_INPUT,
                },
            },
            text_input(form::AMOUNT_BLOCK, form::AMOUNT_INPUT, "Valor", false),
            text_input(form::BANK_BLOCK, form::BANK_INPUT, "Banco", true),
            text_input(form::COMPANY_BLOCK, form::COMPANY_INPUT, "Empresa", true),
            text_input(form::COST_CENTER_BLOCK, form::COST_CENTER_INPUT, "CL", true),
            {
                "type": "input",
                "block_id": form::FILES_BLOCK,
                "optional": true,
                "label": plain_text("Comprovantes"),
                "element": {
                    "type": "file_input",
                    "action_id": form::FILES_INPUT,
                    "max_files": 10,
                },
            },
        ],
    })
}

fn field(label: &str, value: &str) -> Value {
    let value = if value.is_empty() { "-" } else { value };
    json!({ "type": "mrkdwn", "text": format!("*{}:*\n{}", label, value) })
}

/// Channel message summarizing a successful modal submission.
pub fn submission_summary(
    user_id: &str,
    record: &PaymentRecord,
    file_count: usize,
    link: &str,
) -> Value {
    let files = if file_count > 0 {
        format!("{} arquivo(s) salvos", file_count)
    } else {
        "Nenhum comprovante anexado".to_string()
    };

    json!([
        {
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*Lancamento registrado!* por <@{}>", user_id),
            },
        },
        {
            "type": "section",
            "fields": [
                field("Data", &record.date),
                field("Valor", &record.amount),
                field("Banco", &record.bank),
                field("Empresa", &record.company),
                field("CL", &record.cost_center),
            ],
        },
        {
            "type": "context",
            "elements": [
                { "type": "mrkdwn", "text": files },
            ],
        },
        {
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("Pasta: {}", link),
            },
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_carries_channel_and_inputs() {
        let view = payment_modal("C123");
        assert_eq!(view["callback_id"], MODAL_CALLBACK_ID);
        assert_eq!(view["private_metadata"], "C123");

        let action_ids: Vec<&str> = view["blocks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["element"]["action_id"].as_str().unwrap())
            .collect();
        assert_eq!(
            action_ids,
            vec![
                form::DATE_INPUT,
                form::AMOUNT_INPUT,
                form::BANK_INPUT,
                form::COMPANY_INPUT,
                form::COST_CENTER_INPUT,
                form::FILES_INPUT,
            ]
        );
    }

    #[test]
    fn test_summary_lists_fields() {
        let record = PaymentRecord {
            date: "15/03/2025".into(),
            amount: "R$99".into(),
            bank: "Itau".into(),
            company: String::new(),
            cost_center: "CC1".into(),
        };
        let blocks = submission_summary("U1", &record, 2, "https://drive/x");
        let rendered = blocks.to_string();
        assert!(rendered.contains("<@U1>"));
        assert!(rendered.contains("15/03/2025"));
        assert!(rendered.contains("*Empresa:*\\n-"));
        assert!(rendered.contains("2 arquivo(s) salvos"));
        assert!(rendered.contains("Pasta: https://drive/x"));
    }

    #[test]
    fn test_summary_without_files() {
        let blocks = submission_summary("U1", &PaymentRecord::default(), 0, "link");
        assert!(blocks.to_string().contains("Nenhum comprovante anexado"));
    }
}
