use serde::{Deserialize, Serialize};

/// Message payload understood by the email carrier.
///
/// Recipients come from the message itself. Either `body` (plain text) or
/// `html_body` should be set; if both are provided the email is sent as a
/// multipart message.
///
/// # Examples
///
/// ```
/// use courier_email::EmailPayload;
///
/// let json = serde_json::json!({
///     "subject": "Hello",
///     "body": "Plain text body"
/// });
/// let payload: EmailPayload = serde_json::from_value(json).unwrap();
/// assert_eq!(payload.subject, "Hello");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailPayload {
    /// Email subject line.
    pub subject: String,

    /// Plain-text email body. Optional if `html_body` is provided.
    #[serde(default)]
    pub body: Option<String>,

    /// HTML email body. Optional if `body` is provided.
    #[serde(default)]
    pub html_body: Option<String>,

    /// Optional reply-to address.
    #[serde(default)]
    pub reply_to: Option<String>,
}
