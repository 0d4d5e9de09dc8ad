//! Contact-form email delivery through the Resend API

use crate::Result;
use crate::upstream::client::Client;
use core::time::Duration;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const LOG_TARGET: &str = "    mailer";

/// A validated contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    reply_to: &'a str,
    subject: String,
    html: String,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Sends contact-form submissions to the site owner.
#[derive(Debug, Clone)]
pub struct Mailer {
    client: Client,
    from: Arc<str>,
    to: Arc<[String]>,
}

impl Mailer {
    pub fn new(api_url: &str, api_key: Option<&str>, from: &str, to: &[String], timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::new(api_key, api_url, timeout)?,
            from: Arc::from(from),
            to: Arc::from(to),
        })
    }

    /// Deliver the message, returning the provider's message id.
    pub async fn send(&self, message: &ContactMessage) -> Result<String> {
        let request = SendEmailRequest {
            from: &self.from,
            to: &self.to,
            reply_to: &message.email,
            subject: format!("[Portfolio Contact] {}", message.subject),
            html: render_html(message),
        };

        let url = self.client.url_for(["emails"])?;
        let resp = self.client.post_json(url, &request).await.into_result("sending contact email")?;
        let sent: SendEmailResponse = resp.json().await.into_app_err("parsing email provider response")?;

        log::info!(target: LOG_TARGET, "Contact email queued with id {}", sent.id);
        Ok(sent.id)
    }
}

fn render_html(message: &ContactMessage) -> String {
    let name = html_escape(&message.name);
    let email = html_escape(&message.email);
    let subject = html_escape(&message.subject);
    let body = html_escape(&message.message);

    format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">New Contact Form Submission</h2>
  <div style="background: #f5f5f5; padding: 20px; border-radius: 8px;">
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> {email}</p>
    <p><strong>Subject:</strong> {subject}</p>
    <p><strong>Message:</strong></p>
    <div style="background: white; padding: 15px; border-radius: 4px; white-space: pre-wrap;">{body}</div>
  </div>
  <p style="color: #666; font-size: 12px; margin-top: 20px;">
    This email was sent from your portfolio contact form.
  </p>
</div>
"#
    )
}

fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Hello".into(),
            message: "Line one\nLine two".into(),
        }
    }

    #[test]
    fn test_html_escape_all_special_chars() {
        assert_eq!(html_escape("<>&\"'"), "&lt;&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn test_html_escape_plain() {
        assert_eq!(html_escape("hello world"), "hello world");
    }

    #[test]
    fn test_render_html_contains_fields() {
        let html = render_html(&message());
        assert!(html.contains("<strong>Name:</strong> Ada"));
        assert!(html.contains("<strong>Email:</strong> ada@example.com"));
        assert!(html.contains("<strong>Subject:</strong> Hello"));
        assert!(html.contains("Line one\nLine two"));
    }

    #[test]
    fn test_render_html_escapes_user_input() {
        let mut msg = message();
        msg.message = "<script>alert(1)</script>".into();
        let html = render_html(&msg);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_request_serialization() {
        let to = vec!["owner@example.com".to_string()];
        let request = SendEmailRequest {
            from: "Contact Form <portfolio@example.com>",
            to: &to,
            reply_to: "ada@example.com",
            subject: "[Portfolio Contact] Hello".into(),
            html: "<p>hi</p>".into(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["to"][0], "owner@example.com");
        assert_eq!(json["reply_to"], "ada@example.com");
        assert_eq!(json["subject"], "[Portfolio Contact] Hello");
    }
}
