//! Moderator-facing texts.

use super::state::ReviewMode;
use crate::triage::QueueKind;

pub const HELP: &str = "To review the next user report, type `review`. \
To review messages flagged by the automatic scan, type `detected review`. \
Add classifier assistance with `automate review` (user reports) or `claude review` (flagged messages). \
To stop the review process, type `cancel`.";

pub const NO_REPORTS: &str = "No reports to review.";

pub const NO_AUTOMATED_REPORTS: &str = "No automated reports to review.";

pub const CHECK_URGENCY: &str =
    "Does this report represent an immediate threat? Please respond with 'yes' or 'no'.";

pub const REPORT_AUTHORITIES: &str = "This has been flagged as an immediate threat. A template for reporting to the FBI will be provided. Do you want to proceed with reporting to authorities? (yes/no)";

pub const REPORT_AUTHORITIES_INVALID: &str =
    "Please answer 'yes' to report to authorities or 'no' to close this report without escalation.";

pub const AUTHORITIES_SUBMITTED: &str =
    "Report has been submitted to authorities. Thank you for your diligence.";

pub const NO_ESCALATION: &str = "No action to report to authorities.";

pub const SUSPENSION_MENU: &str = "No immediate threat detected. Please determine the appropriate suspension duration: (1) 1 day, (2) 7 days, (3) 30 days, (4) Indefinite, (5) No suspension";

pub const SUSPENSION_INVALID: &str = "Invalid option. Please choose from (1) 1 day, (2) 7 days, (3) 30 days, (4) Indefinite, (5) No suspension";

pub const NO_SUSPENSION: &str = "No suspension applied.";

/// Shown for an `Immediate threat` verdict.
pub const ESCALATED: &str =
    "Immediate threat detected. This report has been escalated to the authorities.";

pub const ANOTHER_INVALID: &str = "Please answer 'yes' to review the next report or 'no' to finish.";

pub const NO_MORE_REPORTS: &str = "No more reports to review.";

pub const COMPLETED: &str = "Review process completed.";

pub const CANCELLED: &str = "Review process cancelled.";

pub fn empty_queue(source: QueueKind) -> &'static str {
    match source {
        QueueKind::Manual => NO_REPORTS,
        QueueKind::Automated => NO_AUTOMATED_REPORTS,
    }
}

pub fn reviewing(summary: &str) -> String {
    format!("Reviewing the following report:\n{summary}")
}

/// Reply when the classifier gave nothing usable and the moderator takes over.
pub fn classifier_fallback(detail: &str) -> String {
    format!(
        "The classifier could not decide on this report ({detail}). Please review it manually."
    )
}

pub fn offer_another(remaining: usize) -> String {
    if remaining == 1 {
        "There is 1 more report in this queue. Would you like to review another? (yes/no)"
            .to_string()
    } else {
        format!(
            "There are {remaining} more reports in this queue. Would you like to review another? (yes/no)"
        )
    }
}

/// Closing line for an assisted review that leaves work in the queue.
pub fn remaining_after_assisted(remaining: usize, mode: ReviewMode) -> String {
    let noun = if remaining == 1 { "report remains" } else { "reports remain" };
    format!(
        "{remaining} {noun} in this queue. Send `{}` to review the next one.",
        mode.keyword()
    )
}
