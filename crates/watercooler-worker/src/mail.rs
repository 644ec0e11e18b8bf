use crate::util::escape_html;

/// A rendered transactional email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Render the claim-link email for `startup_names`.
pub fn claim_email(
    to: &str,
    site_url: &str,
    verify_url: &str,
    startup_names: &[String],
    ttl_hours: i64,
) -> EmailMessage {
    let plural = if startup_names.len() == 1 { "" } else { "s" };
    let subject = format!("Claim your startup{plural} on Watercooler");
    let expiry = match ttl_hours {
        1 => "1 hour".to_string(),
        h => format!("{h} hours"),
    };

    let items: String = startup_names
        .iter()
        .map(|name| format!("<li><strong>{}</strong></li>", escape_html(name)))
        .collect();
    let link = escape_html(verify_url);
    let site = escape_html(site_url);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
  <head><meta charset="utf-8"></head>
  <body style="font-family: system-ui, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1 style="font-size: 24px;">Claim your startup{plural}</h1>
    <p>We found the following startup{plural} associated with your email:</p>
    <ul>{items}</ul>
    <p>To claim and manage your startup{plural}, verify your email address with the link below.</p>
    <p><strong>This link expires in {expiry}.</strong></p>
    <p><a href="{link}" style="display: inline-block; background: #111827; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px;">Verify email &amp; claim</a></p>
    <p style="color: #6b7280; font-size: 14px;">If the button doesn't work, paste this link into your browser:<br>{link}</p>
    <p style="color: #9ca3af; font-size: 12px;">Sent by <a href="{site}">Watercooler</a>, a public directory of early-stage startups.</p>
  </body>
</html>"#
    );

    let mut text = format!(
        "We found the following startup{plural} associated with your email:\n\n"
    );
    for name in startup_names {
        text.push_str("  - ");
        text.push_str(name);
        text.push('\n');
    }
    text.push_str(&format!(
        "\nVerify your email and claim your startup{plural}:\n{verify_url}\n\nThis link expires in {expiry}.\n"
    ));

    EmailMessage {
        to: to.to_string(),
        subject,
        html,
        text,
    }
}
