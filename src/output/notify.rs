//! Notification decisions and the tracing-backed notifier

use crate::config::OptionsConfig;
use crate::output::traits::{NotificationEvent, Notifier, OutputResult};

/// Decides which notification, if any, an invocation emits
///
/// | Fleet | Flag | Sent when |
/// |-------|------|-----------|
/// | incomplete | `email-each-run` | errors > 0 or `email-non-errors` |
/// | complete | `email-on-completion` | errors > 0 or `email-non-errors` |
///
/// # Arguments
///
/// * `options` - The audit options
/// * `did_complete` - Whether the whole fleet is now checked
/// * `num_errors` - Error rows of the whole cycle when `did_complete`,
///   otherwise the errors found by this invocation
/// * `report_location` - Where the report was written
pub fn decide_notification(
    options: &OptionsConfig,
    did_complete: bool,
    num_errors: u64,
    report_location: &str,
) -> Option<NotificationEvent> {
    let worth_sending = num_errors > 0 || options.email_non_errors;
    if !worth_sending {
        return None;
    }

    if did_complete && options.email_on_completion {
        return Some(NotificationEvent::Final {
            num_errors,
            report_location: report_location.to_string(),
        });
    }

    if !did_complete && options.email_each_run {
        return Some(NotificationEvent::Intermediate {
            num_errors,
            report_location: report_location.to_string(),
        });
    }

    None
}

/// Writes notifications to the log instead of sending mail
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &NotificationEvent, recipients: &[String]) -> OutputResult<()> {
        if recipients.is_empty() {
            tracing::info!("{}", event);
        } else {
            tracing::info!("{} (to {})", event, recipients.join(", "));
        }
        Ok(())
    }
}
