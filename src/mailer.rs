use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

/// Outbound verification mail. Callers treat delivery as fire-and-forget:
/// errors are logged and discarded, never surfaced as a request failure.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, to: &str, verification_url: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct SendgridMailer {
    client: reqwest::Client,
    api_key: String,
    sender: String,
}

impl SendgridMailer {
    pub fn new(api_key: &str, sender: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            sender: sender.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for SendgridMailer {
    async fn send_verification(&self, to: &str, verification_url: &str) -> anyhow::Result<()> {
        let body = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.sender },
            "subject": "Please confirm your email",
            "content": [
                {
                    "type": "text/plain",
                    "value": format!(
                        "Click on the link to verify your account: {verification_url}"
                    ),
                },
                {
                    "type": "text/html",
                    "value": format!(
                        "<p>Click on the link to verify your account:</p>\
                         <a href=\"{verification_url}\">{verification_url}</a>"
                    ),
                },
            ],
        });

        self.client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("sendgrid send")?
            .error_for_status()
            .context("sendgrid response")?;
        Ok(())
    }
}
