//! Labelled evaluation datasets.
//!
//! One example per line: `<message> <yes|no> <category>`. The message may
//! contain spaces; the last two words are the flag and the category tag
//! (`graphic`, `logistical`, `propaganda`, `threat`, `other` or `invalid`).
//! Blank lines are skipped.

use std::path::Path;

use crate::error::EvalError;
use crate::triage::AbuseCategory;

/// The category an example is labelled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentLabel {
    Category(AbuseCategory),
    /// Not terrorist content.
    Invalid,
}

impl ContentLabel {
    /// Every label, in confusion-matrix order.
    pub const ALL: [ContentLabel; 6] = [
        Self::Category(AbuseCategory::Imagery),
        Self::Category(AbuseCategory::Coordination),
        Self::Category(AbuseCategory::Propaganda),
        Self::Category(AbuseCategory::Threat),
        Self::Category(AbuseCategory::Other),
        Self::Invalid,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        let label = match tag {
            "graphic" => Self::Category(AbuseCategory::Imagery),
            "logistical" => Self::Category(AbuseCategory::Coordination),
            "propaganda" => Self::Category(AbuseCategory::Propaganda),
            "threat" => Self::Category(AbuseCategory::Threat),
            "other" => Self::Category(AbuseCategory::Other),
            "invalid" => Self::Invalid,
            _ => return None,
        };
        Some(label)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Category(AbuseCategory::Imagery) => "graphic",
            Self::Category(AbuseCategory::Coordination) => "logistical",
            Self::Category(AbuseCategory::Propaganda) => "propaganda",
            Self::Category(AbuseCategory::Threat) => "threat",
            Self::Category(AbuseCategory::Other) => "other",
            Self::Invalid => "invalid",
        }
    }

    /// Position in `ALL`.
    pub fn index(&self) -> usize {
        match self {
            Self::Category(AbuseCategory::Imagery) => 0,
            Self::Category(AbuseCategory::Coordination) => 1,
            Self::Category(AbuseCategory::Propaganda) => 2,
            Self::Category(AbuseCategory::Threat) => 3,
            Self::Category(AbuseCategory::Other) => 4,
            Self::Invalid => 5,
        }
    }

    pub fn tags() -> Vec<&'static str> {
        Self::ALL.iter().map(ContentLabel::tag).collect()
    }
}

/// One labelled message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub message: String,
    pub flagged: bool,
    pub label: ContentLabel,
}

/// Parse one non-blank dataset line. `line_no` is 1-based, for errors.
pub fn parse_line(line_no: usize, line: &str) -> Result<Example, EvalError> {
    let invalid = |reason: String| EvalError::InvalidLine {
        line: line_no,
        reason,
    };

    let words: Vec<&str> = line.split_whitespace().collect();
    let [message @ .., flag, tag] = words.as_slice() else {
        return Err(invalid("expected `<message> <yes|no> <category>`".into()));
    };
    if message.is_empty() {
        return Err(invalid("missing message text".into()));
    }

    let flagged = match flag.to_lowercase().as_str() {
        "yes" => true,
        "no" => false,
        other => return Err(invalid(format!("flag must be `yes` or `no`, got `{other}`"))),
    };
    let label = ContentLabel::from_tag(&tag.to_lowercase())
        .ok_or_else(|| invalid(format!("unknown category `{tag}`")))?;

    Ok(Example {
        message: message.join(" "),
        flagged,
        label,
    })
}

/// Parse a whole dataset.
pub fn parse_dataset(text: &str) -> Result<Vec<Example>, EvalError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_line(i + 1, line))
        .collect()
}

/// Read and parse a dataset file. An empty dataset is an error.
pub async fn load_dataset(path: &Path) -> Result<Vec<Example>, EvalError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| EvalError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let examples = parse_dataset(&text)?;
    if examples.is_empty() {
        return Err(EvalError::EmptyDataset);
    }
    Ok(examples)
}
