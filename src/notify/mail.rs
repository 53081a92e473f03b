use crate::config::MailSettings;
use crate::domain::model::{today_stamp, ScreenReport};
use crate::domain::ports::Notifier;
use crate::utils::error::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Sends the run summary over an authenticated STARTTLS relay. Constructed
/// without settings it degrades to a logged skip, mirroring a run without
/// mail credentials.
pub struct SmtpNotifier {
    settings: Option<MailSettings>,
}

impl SmtpNotifier {
    pub fn new(settings: Option<MailSettings>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, report: &ScreenReport, csv_name: &str) -> Result<()> {
        let settings = match &self.settings {
            Some(s) => s,
            None => {
                tracing::info!("メール設定がないため送信をスキップしました");
                return Ok(());
            }
        };

        tracing::info!("メール送信準備中...");
        let message = build_message(settings, report, csv_name)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .build();

        mailer.send(message).await?;
        tracing::info!("メール送信完了");
        Ok(())
    }
}

pub(crate) fn build_message(
    settings: &MailSettings,
    report: &ScreenReport,
    csv_name: &str,
) -> Result<Message> {
    let from: Mailbox = settings.user.parse()?;
    let to: Mailbox = settings.to.parse()?;
    let subject = format!("{}{}", settings.subject_prefix, today_stamp());

    let mut body = String::from("本日のスクリーニング結果です。\n\n");
    if report.rows.is_empty() {
        body.push_str("該当銘柄はありませんでした。");
    } else {
        body.push_str(&report.preview(5));
        body.push_str("\n\n※全データは添付CSVを参照");
    }

    let builder = Message::builder().from(from).to(to).subject(subject);

    let message = if report.rows.is_empty() {
        builder.singlepart(SinglePart::plain(body))?
    } else {
        let content_type = ContentType::parse("text/csv")?;
        let attachment = Attachment::new(csv_name.to_string()).body(report.csv_bytes(), content_type);
        builder.multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body))
                .singlepart(attachment),
        )?
    };

    Ok(message)
}
