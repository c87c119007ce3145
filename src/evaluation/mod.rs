//! Classifier evaluation against a labelled dataset.
//!
//! Each example is sent to the classifier with the categorization
//! instructions. The answer (`<yes|no> <category>`) is compared with the
//! label, and the run is summarized as weighted F1 plus a confusion matrix,
//! once for the yes/no flag and once for the category.

pub mod dataset;
pub mod metrics;

pub use dataset::{ContentLabel, Example, load_dataset, parse_dataset};
pub use metrics::ConfusionMatrix;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classifier::{ClassifierGateway, prompts};
use crate::error::{EvalError, LlmError};

const FLAG_LABELS: [&str; 2] = ["no", "yes"];

/// What the classifier said about one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub flagged: bool,
    pub label: ContentLabel,
}

impl Prediction {
    /// Stand-in for answers that could not be parsed.
    pub const UNFLAGGED: Prediction = Prediction {
        flagged: false,
        label: ContentLabel::Invalid,
    };

    /// Parse `<yes|no> <category>`. Trailing words and punctuation are
    /// ignored; anything else is `None`.
    pub fn parse(answer: &str) -> Option<Self> {
        let mut words = answer.split_whitespace().map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        });
        let flagged = match words.next()?.as_str() {
            "yes" => true,
            "no" => false,
            _ => return None,
        };
        let label = ContentLabel::from_tag(&words.next()?)?;
        Some(Self { flagged, label })
    }
}

/// Scores for one evaluation run.
#[derive(Debug, Clone)]
pub struct EvalReport {
    pub examples: usize,
    /// Answers that could not be parsed and were scored as `no invalid`.
    pub unparsed: usize,
    pub flags: ConfusionMatrix,
    pub categories: ConfusionMatrix,
}

impl EvalReport {
    fn new() -> Self {
        Self {
            examples: 0,
            unparsed: 0,
            flags: ConfusionMatrix::new(FLAG_LABELS.to_vec()),
            categories: ConfusionMatrix::new(ContentLabel::tags()),
        }
    }

    fn record(&mut self, example: &Example, prediction: &Prediction) {
        self.examples += 1;
        self.flags
            .record(usize::from(example.flagged), usize::from(prediction.flagged));
        self.categories
            .record(example.label.index(), prediction.label.index());
    }

    pub fn flag_f1(&self) -> f64 {
        self.flags.weighted_f1()
    }

    pub fn category_f1(&self) -> f64 {
        self.categories.weighted_f1()
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Examples: {} ({} unparseable answers)",
            self.examples, self.unparsed
        )?;
        writeln!(f, "Flag weighted F1: {:.3}", self.flag_f1())?;
        writeln!(f, "Category weighted F1: {:.3}", self.category_f1())?;
        writeln!(f, "\nFlag confusion matrix (rows: truth, columns: predicted)")?;
        write!(f, "{}", self.flags)?;
        writeln!(f, "\nCategory confusion matrix (rows: truth, columns: predicted)")?;
        write!(f, "{}", self.categories)
    }
}

/// Runs a classifier over labelled examples.
pub struct Evaluator {
    classifier: Arc<dyn ClassifierGateway>,
}

impl Evaluator {
    pub fn new(classifier: Arc<dyn ClassifierGateway>) -> Self {
        Self { classifier }
    }

    /// Ask the classifier about one message. `None` when the answer does not
    /// follow the expected format.
    pub async fn predict(&self, message: &str) -> Result<Option<Prediction>, LlmError> {
        let answer = self
            .classifier
            .classify(
                prompts::MODERATOR_CONTEXT,
                message,
                prompts::CATEGORIZE_INSTRUCTIONS,
            )
            .await?;
        let prediction = Prediction::parse(&answer);
        if prediction.is_none() {
            warn!(answer = %answer, "Unparseable categorization answer");
        }
        Ok(prediction)
    }

    /// Score every example. A classifier failure aborts the run.
    pub async fn evaluate(&self, examples: &[Example]) -> Result<EvalReport, EvalError> {
        if examples.is_empty() {
            return Err(EvalError::EmptyDataset);
        }

        let mut report = EvalReport::new();
        for (index, example) in examples.iter().enumerate() {
            let prediction = self
                .predict(&example.message)
                .await
                .map_err(|source| EvalError::Classifier { index, source })?;
            let prediction = prediction.unwrap_or_else(|| {
                report.unparsed += 1;
                Prediction::UNFLAGGED
            });
            debug!(
                index,
                expected = example.label.tag(),
                predicted = prediction.label.tag(),
                "Scored example"
            );
            report.record(example, &prediction);
        }

        info!(
            examples = report.examples,
            unparsed = report.unparsed,
            flag_f1 = report.flag_f1(),
            category_f1 = report.category_f1(),
            "Evaluation finished"
        );
        Ok(report)
    }
}
