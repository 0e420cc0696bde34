//! Campaign email templates.
//!
//! Pure functions from (address, token) to a complete HTML document. Each
//! template embeds a click-tracked call-to-action link and a 1x1 open-pixel
//! against the external tracking endpoints; rendering never fails and never
//! performs I/O.

use crate::config::CONFIG;

/// The three outbound campaign templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Invite,
    Launch,
    Conversion,
}

impl Template {
    pub fn subject(&self) -> &'static str {
        match self {
            Template::Invite => "Your early access invite is here",
            Template::Launch => "We're live - your early access is ready",
            Template::Conversion => "Still thinking it over? Here's what you're missing",
        }
    }
}

/// Render a complete HTML document for the given template and recipient.
pub fn render(template: Template, email: &str, token: &str) -> String {
    let click_url = click_tracking_url(token);
    let pixel_url = open_tracking_url(token);

    let (headline, body, cta) = match template {
        Template::Invite => (
            "You're invited",
            "You asked for early access to our electrician training platform. \
             Your personal invite is ready - claim it below before it expires.",
            "Claim your invite",
        ),
        Template::Launch => (
            "We're live",
            "The platform is now open. Your early access place is reserved \
             and waiting - jump in and start your first module today.",
            "Start learning",
        ),
        Template::Conversion => (
            "Your place is still waiting",
            "You had a look around but never finished signing up. Courses, \
             calculators and mock exams are all included - pick up where you \
             left off.",
            "Finish signing up",
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{subject}</title>
</head>
<body style="margin:0;padding:0;background-color:#f4f4f5;font-family:Arial,Helvetica,sans-serif;">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0">
<tr><td align="center" style="padding:32px 16px;">
<table role="presentation" width="600" cellpadding="0" cellspacing="0" style="background-color:#ffffff;border-radius:8px;overflow:hidden;">
<tr><td style="background-color:#facc15;padding:24px 32px;">
<h1 style="margin:0;font-size:22px;color:#18181b;">{headline}</h1>
</td></tr>
<tr><td style="padding:32px;">
<p style="margin:0 0 24px;font-size:15px;line-height:1.6;color:#3f3f46;">{body}</p>
<table role="presentation" cellpadding="0" cellspacing="0">
<tr><td style="background-color:#18181b;border-radius:6px;">
<a href="{click_url}" style="display:inline-block;padding:12px 28px;font-size:15px;color:#facc15;text-decoration:none;font-weight:bold;">{cta}</a>
</td></tr>
</table>
<p style="margin:24px 0 0;font-size:12px;color:#a1a1aa;">This invite was sent to {email}. If it wasn't meant for you, you can ignore it.</p>
</td></tr>
</table>
<img src="{pixel_url}" width="1" height="1" alt="" style="display:block;border:0;">
</td></tr>
</table>
</body>
</html>"#,
        subject = template.subject(),
        headline = headline,
        body = body,
        cta = cta,
        click_url = click_url,
        pixel_url = pixel_url,
        email = email,
    )
}

fn click_tracking_url(token: &str) -> String {
    format!(
        "{}/track/click?token={}",
        CONFIG.mail.tracking_base_url,
        urlencoding::encode(token)
    )
}

fn open_tracking_url(token: &str) -> String {
    format!(
        "{}/track/open?token={}",
        CONFIG.mail.tracking_base_url,
        urlencoding::encode(token)
    )
}
