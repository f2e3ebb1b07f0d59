use anyhow::{anyhow, Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use std::path::PathBuf;

use super::{NotificationBatch, Notifier};
use crate::config::{load_recipients, NotifyConfig};

const ASSIST_BASE_URL: &str = "https://chatgpt.com/";
/// Longest assistant link we emit; longer query strings get rejected upstream.
const ASSIST_URL_MAX: usize = 8121;
const DEFAULT_SMTP_PORT: u16 = 587;

/// One HTML email per cycle listing every new post.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients_file: PathBuf,
    subject_prefix: String,
    summary_prompt: String,
    translation_prompt: String,
}

impl EmailNotifier {
    /// `Ok(None)` when `SMTP_HOST` is unset (email disabled).
    pub fn from_env(cfg: &NotifyConfig) -> Result<Option<Self>> {
        let Ok(host) = std::env::var("SMTP_HOST") else {
            return Ok(None);
        };
        let user = std::env::var("SMTP_USER").context("SMTP_USER missing")?;
        let pass = std::env::var("SMTP_PASS").context("SMTP_PASS missing")?;
        let port = match std::env::var("SMTP_PORT") {
            Ok(p) => p.trim().parse::<u16>().context("invalid SMTP_PORT")?,
            Err(_) => DEFAULT_SMTP_PORT,
        };
        let from_addr = std::env::var("NOTIFY_EMAIL_FROM").unwrap_or_else(|_| user.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .context("invalid SMTP_HOST")?
            .port(port)
            .credentials(Credentials::new(user, pass))
            .build();
        let from: Mailbox = from_addr.parse().context("invalid NOTIFY_EMAIL_FROM")?;

        Ok(Some(Self {
            mailer,
            from,
            recipients_file: cfg.recipients_file.clone(),
            subject_prefix: cfg.subject_prefix.clone(),
            summary_prompt: cfg.summary_prompt.clone(),
            translation_prompt: cfg.translation_prompt.clone(),
        }))
    }

    fn build_message(&self, batch: &NotificationBatch) -> Result<Message> {
        let recipients = load_recipients(&self.recipients_file);
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(render_subject(&self.subject_prefix, batch))
            .header(header::ContentType::TEXT_HTML);

        let mut valid = 0usize;
        for r in &recipients {
            match r.parse::<Mailbox>() {
                Ok(mb) => {
                    builder = builder.to(mb);
                    valid += 1;
                }
                Err(e) => tracing::warn!(target: "notify", recipient = %r, error = %e, "skipping invalid recipient"),
            }
        }
        if valid == 0 {
            return Err(anyhow!("no valid recipients"));
        }

        let assist = assist_text(batch);
        let summary_url = assist_link(&self.summary_prompt, &assist);
        let translation_url = assist_link(&self.translation_prompt, &assist);
        let body = render_html(batch, &summary_url, &translation_url);

        builder.body(body).context("build email")
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, batch: &NotificationBatch) -> Result<()> {
        let msg = self.build_message(batch)?;
        self.mailer.send(msg).await.context("send email")?;
        tracing::info!(target: "notify", count = batch.count, "notification email sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}

pub fn render_subject(prefix: &str, batch: &NotificationBatch) -> String {
    format!("{prefix} - {}", batch.generated_at.format("%Y-%m-%d %H:%M"))
}

/// Plain-text digest of all posts, fed to the assistant links.
pub fn assist_text(batch: &NotificationBatch) -> String {
    let mut out = String::new();
    for p in &batch.posts {
        out.push_str(&format!(
            "Date: {}\nContent: {}\n\n",
            p.published_or_unknown(),
            p.content
        ));
    }
    out
}

/// Assistant deep link with `prompt` + `text` as the query, capped in length.
pub fn assist_link(prompt: &str, text: &str) -> String {
    let q = format!("{prompt}\n{text}");
    let url = match reqwest::Url::parse_with_params(ASSIST_BASE_URL, &[("q", q.as_str())]) {
        Ok(u) => u.to_string(),
        Err(_) => ASSIST_BASE_URL.to_string(),
    };
    // encoded URLs are ASCII, so byte truncation stays on a char boundary
    if url.len() > ASSIST_URL_MAX {
        url[..ASSIST_URL_MAX].to_string()
    } else {
        url
    }
}

pub fn render_html(batch: &NotificationBatch, summary_url: &str, translation_url: &str) -> String {
    use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

    let mut body = String::new();
    body.push_str("<html>\n<body>\n");
    body.push_str("<h2>New posts on the monitored timeline</h2>\n");
    body.push_str(&format!(
        "<p><a href=\"{}\" target=\"_blank\">Summarize</a> &middot; \
         <a href=\"{}\" target=\"_blank\">Translate</a></p>\n",
        attr(summary_url),
        attr(translation_url)
    ));
    body.push_str(&format!("<p>Found {} new post(s):</p>\n", batch.count));

    for (i, p) in batch.posts.iter().enumerate() {
        body.push_str(&format!(
            "<div style=\"margin-bottom: 20px; padding: 10px; border: 1px solid #ddd; border-radius: 5px;\">\n\
             <h3>Post {}</h3>\n\
             <p><strong>Published:</strong> {}</p>\n\
             <blockquote style=\"background-color: #f9f9f9; padding: 10px; border-left: 4px solid #ccc;\">{}</blockquote>\n\
             </div>\n",
            i + 1,
            text(&p.published_or_unknown()),
            text(&p.content)
        ));
    }

    body.push_str(&format!(
        "<p><a href=\"{}\">View the full timeline</a></p>\n</body>\n</html>\n",
        attr(&batch.profile_url)
    ));
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Candidate;
    use chrono::{TimeZone, Utc};

    fn batch() -> NotificationBatch {
        let at = Utc.with_ymd_and_hms(2025, 4, 10, 10, 1, 0).unwrap();
        let posts = vec![
            Candidate {
                identifier: "a".into(),
                content: "Tariffs <now> & forever".into(),
                observed_at: at,
                source_tag: "initial".into(),
                published: Some("Apr 10".into()),
            },
            Candidate {
                identifier: "b".into(),
                content: "Second post".into(),
                observed_at: at,
                source_tag: "scroll_1".into(),
                published: None,
            },
        ];
        NotificationBatch::new(posts, at, "https://example.test/@someone")
    }

    #[test]
    fn subject_has_minute_timestamp() {
        assert_eq!(render_subject("New posts", &batch()), "New posts - 2025-04-10 10:01");
    }

    #[test]
    fn html_escapes_post_content() {
        let html = render_html(&batch(), "https://x.test/?q=1", "https://x.test/?q=2");
        assert!(html.contains("Tariffs &lt;now&gt; &amp; forever"));
        assert!(!html.contains("<now>"));
        assert!(html.contains("Post 2"));
        assert!(html.contains("<strong>Published:</strong> unknown"));
        assert!(html.contains("Found 2 new post(s)"));
        assert!(html.contains("https://example.test/@someone"));
    }

    #[test]
    fn assist_text_lists_every_post() {
        let t = assist_text(&batch());
        assert!(t.contains("Date: Apr 10\nContent: Tariffs <now> & forever"));
        assert!(t.contains("Date: unknown\nContent: Second post"));
    }

    #[test]
    fn assist_link_is_encoded_and_capped() {
        let short = assist_link("Summarize:", "a b&c");
        assert!(short.starts_with("https://chatgpt.com/?q="));
        assert!(!short.contains(' '));
        assert!(!short.contains("b&c"));

        let long = assist_link("Summarize:", &"word ".repeat(5_000));
        assert_eq!(long.len(), ASSIST_URL_MAX);
    }
}
