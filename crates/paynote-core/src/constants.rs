//! Fixed names shared by the inbound surfaces, the ledger and the notifications.

/// Ledger header row, in column order.
pub const LEDGER_HEADER: [&str; 7] = [
    "DATA",
    "VALOR",
    "BANCO",
    "EMPRESA",
    "CL",
    "LINK PASTA",
    "REGISTRADO EM",
];

/// Ledger columns span A..G.
pub const LEDGER_FIRST_COLUMN: &str = "A";
pub const LEDGER_LAST_COLUMN: &str = "G";

/// Display format of `PaymentRecord::date`.
pub const RECORD_DATE_FORMAT: &str = "%d/%m/%Y";
/// Format produced by the modal date picker.
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";
/// Format of the month folder name.
pub const MONTH_FOLDER_FORMAT: &str = "%Y-%m";
/// Format of the `REGISTRADO EM` ledger column.
pub const LEDGER_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Callback id of the payment modal.
pub const MODAL_CALLBACK_ID: &str = "payment_submission";

/// Modal input keys (block id, action id).
pub mod form {
    pub const DATE_BLOCK: &str = "date_block";
    pub const DATE_INPUT: &str = "date_input";
    pub const AMOUNT_BLOCK: &str = "amount_block";
    pub const AMOUNT_INPUT: &str = "amount_input";
    pub const BANK_BLOCK: &str = "bank_block";
    pub const BANK_INPUT: &str = "bank_input";
    pub const COMPANY_BLOCK: &str = "company_block";
    pub const COMPANY_INPUT: &str = "company_input";
    pub const COST_CENTER_BLOCK: &str = "cost_center_block";
    pub const COST_CENTER_INPUT: &str = "cost_center_input";
    pub const FILES_BLOCK: &str = "files_block";
    pub const FILES_INPUT: &str = "files_input";
}

/// Reactions added to the original message.
pub const REACTION_SUCCESS: &str = "white_check_mark";
pub const REACTION_FAILURE: &str = "x";

/// Fallbacks for attachment metadata the platform did not send.
pub const DEFAULT_ATTACHMENT_NAME: &str = "arquivo";
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";
