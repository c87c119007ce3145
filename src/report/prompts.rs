//! Reporter-facing texts.

use crate::triage::AbuseCategory;

pub const HELP: &str = "Thank you for requesting help from the moderation bot.\n\
To begin a user content report, use the `report` command.\n\
Use the `cancel` command to cancel the report process.";

pub const ABUSE_TYPE_MENU: &str = "Thank you for beginning your report! Please answer the following questions regarding the nature of the content you are reporting.\n\n\
What is the nature of the content that you are attempting to report? Select your choice from the options below.\n\n\
Online harassment/cyberbullying (1)\n\
Nude/explicit photos of unconsenting parties, including minors (2)\n\
Online terrorist recruitment (3)\n\
Other (4)";

pub const ABUSE_TYPE_INVALID: &str =
    "Please reply with one of the options (1), (2), (3) or (4), or say `cancel` to cancel.";

pub const ADDITIONAL_CONTEXT_PROMPT: &str = "Please describe what happened, including who was involved and links to any messages, and our moderation team will follow up.";

pub const ADDITIONAL_CONTEXT_SUBMITTED: &str =
    "Thank you for your report. Our moderation team will review the information you provided.";

pub const GROUP_ID_PROMPT: &str = "Which organization is this content associated with?\n\n\
`known: <name>` if you know the organization\n\
`usa` for an unidentified domestic group\n\
`intl` for an unidentified international group\n\
`unknown` if you are not sure";

pub const GROUP_ID_INVALID: &str = "Sorry, I didn't understand that. Reply `known: <name>`, `usa`, `intl` or `unknown`, or say `cancel` to cancel.";

pub const CONTEXT_PROMPT: &str = "Please paste the link to the message you are reporting, followed by any context you can share about it.";

pub const THREAT_LEVEL_PROMPT: &str =
    "Does this post represent an immediate threat to anyone's safety? (y/n)";

pub const THREAT_LEVEL_INVALID: &str = "Please answer `y` or `n`, or say `cancel` to cancel.";

pub const LOCATION_PROMPT: &str = "If you know where the group is and roughly how many people are involved, reply in the form `(location, size)`, for example `(Chicago, 12)`. Otherwise reply `unknown`.";

pub const LOCATION_INVALID: &str = "Please reply in the form `(location, size)` with a whole number for the size, or `unknown`.";

pub const LOOP_PROMPT: &str =
    "Would you like to report another post from the same organization? (y/n)";

pub const LOOP_INVALID: &str = "Please answer `y` or `n`, or say `cancel` to cancel.";

pub const CANCELLED: &str = "Report cancelled.";

pub const FOUND_MESSAGE: &str = "I found this message:";

/// The post-category menu.
pub fn category_menu() -> String {
    let mut lines = vec!["What kind of content is this post? Select your choice from the options below.\n".to_string()];
    for (i, category) in AbuseCategory::ALL.iter().enumerate() {
        lines.push(format!("{} ({})", category.label(), i + 1));
    }
    lines.join("\n")
}

pub fn category_invalid() -> String {
    format!(
        "Please reply with a number from 1 to 5.\n\n{}",
        category_menu()
    )
}

/// Quote of the resolved message.
pub fn quote_message(author: &str, content: &str) -> String {
    format!("```{author}: {content}```")
}

pub fn submitted(count: usize) -> String {
    if count == 1 {
        "Thank you. Your report has been submitted to our moderation team.".to_string()
    } else {
        format!("Thank you. Your report covering {count} posts has been submitted to our moderation team.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_menu_lists_all_options() {
        let menu = category_menu();
        for n in 1..=5 {
            assert!(menu.contains(&format!("({n})")));
        }
        assert!(menu.contains("Direct threat of violence (4)"));
    }

    #[test]
    fn submitted_pluralizes() {
        assert!(submitted(1).contains("Your report has been submitted"));
        assert!(submitted(3).contains("3 posts"));
    }
}
