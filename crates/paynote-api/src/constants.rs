//! HTTP-level constants

/// Slack sets this on redelivered events
pub const SLACK_RETRY_HEADER: &str = "X-Slack-Retry-Num";

/// Largest request body accepted on any route
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;

pub const HEALTH_MESSAGE: &str = "Slackbot Contas a Pagar esta rodando";
