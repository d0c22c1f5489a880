use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("body is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("body is not form-encoded: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
}

/// Key/value pairs of a form-encoded body, in wire order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormParams(Vec<(String, String)>);

impl FormParams {
    /// First value sent for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }
}

/// The slash-command fields Slack posts. Every field is optional on the
/// wire and defaults to empty; none of them influence the reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub user_id: String,
    pub channel_id: String,
    pub team_id: String,
}

impl SlashCommandPayload {
    pub fn from_params(params: &FormParams) -> Self {
        let field = |key: &str| params.get(key).unwrap_or_default().to_owned();
        Self {
            command: field("command"),
            text: field("text"),
            user_id: field("user_id"),
            channel_id: field("channel_id"),
            team_id: field("team_id"),
        }
    }
}

pub fn decode_body(body: &str, is_base64_encoded: bool) -> Result<String, PayloadError> {
    if !is_base64_encoded {
        return Ok(body.to_owned());
    }

    let bytes = STANDARD.decode(body.trim())?;
    Ok(String::from_utf8(bytes)?)
}

pub fn parse_form(body: &str) -> Result<FormParams, PayloadError> {
    let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(body)?;
    Ok(FormParams(pairs))
}

/// Decodes and parses a webhook body in one step.
pub fn parse_slash_command(
    body: &str,
    is_base64_encoded: bool,
) -> Result<SlashCommandPayload, PayloadError> {
    let decoded = decode_body(body, is_base64_encoded)?;
    let params = parse_form(&decoded)?;
    Ok(SlashCommandPayload::from_params(&params))
}
