//! Email templates.

use chrono::{DateTime, Utc};

/// Rendered subject and bodies of one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

const STYLE: &str = r#"
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; background: #f5f5f5; }
        .container { max-width: 600px; margin: 0 auto; padding: 40px 20px; }
        .card { background: white; border-radius: 8px; padding: 40px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        h1 { color: #1a1a1a; margin-top: 0; font-size: 24px; }
        .button { display: inline-block; padding: 12px 24px; background: #2563eb; color: white; border-radius: 6px; text-decoration: none; }
        .expires { color: #666; font-size: 14px; }
        .footer { margin-top: 32px; padding-top: 20px; border-top: 1px solid #eee; color: #888; font-size: 12px; }
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>{STYLE}</style>
</head>
<body>
    <div class="container">
        <div class="card">
            <h1>{title}</h1>
{body}
        </div>
    </div>
</body>
</html>"#
    )
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl EmailContent {
    pub fn invitation(display_name: Option<&str>, link: &str, expires_at: DateTime<Utc>) -> Self {
        let greeting = match display_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => format!("Hello {name},"),
            None => "Hello,".to_string(),
        };
        let expires = expires_at.format("%d %b %Y %H:%M UTC").to_string();

        let text = format!(
            r#"{greeting}

You have been invited to submit company, applicant and inventor details for your patent filing.

Open the secure form here:
{link}

This link expires on {expires}. Anyone with the link can fill in the form, so please do not forward it.

--
IP Intake"#
        );

        let html = page(
            "Patent filing details requested",
            &format!(
                r#"            <p>{}</p>
            <p>You have been invited to submit company, applicant and inventor details for your patent filing.</p>
            <p><a class="button" href="{}">Open the form</a></p>
            <p class="expires">This link expires on {}.</p>
            <div class="footer">
                <p>Anyone with the link can fill in the form, so please do not forward it.</p>
            </div>"#,
                escape(&greeting),
                escape(link),
                expires
            ),
        );

        Self {
            subject: "Action needed: patent filing details".to_string(),
            text,
            html,
        }
    }

    pub fn reminder() -> Self {
        let text = r#"Hello,

This is your daily reminder to log today's work hours before you sign off.

--
IP Intake"#
            .to_string();

        let html = page(
            "Log today's work hours",
            r#"            <p>This is your daily reminder to log today's work hours before you sign off.</p>"#,
        );

        Self {
            subject: "Reminder: log your work hours".to_string(),
            text,
            html,
        }
    }
}
