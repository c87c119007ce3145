//! Confusion matrices and weighted F1.
//!
//! Weighted F1 is the per-class F1 averaged with each class weighted by its
//! true support. A precision or recall of 0/0 counts as 0.

use std::fmt;

/// Counts of (true class, predicted class) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    labels: Vec<&'static str>,
    /// `counts[truth][predicted]`
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(labels: Vec<&'static str>) -> Self {
        let n = labels.len();
        Self {
            labels,
            counts: vec![vec![0; n]; n],
        }
    }

    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }

    pub fn record(&mut self, truth: usize, predicted: usize) {
        self.counts[truth][predicted] += 1;
    }

    pub fn count(&self, truth: usize, predicted: usize) -> usize {
        self.counts[truth][predicted]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Examples whose true class is `class`.
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    fn predicted(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }

    pub fn f1(&self, class: usize) -> f64 {
        let tp = self.counts[class][class] as f64;
        let predicted = self.predicted(class) as f64;
        let support = self.support(class) as f64;
        let precision = if predicted > 0.0 { tp / predicted } else { 0.0 };
        let recall = if support > 0.0 { tp / support } else { 0.0 };
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }

    pub fn weighted_f1(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let weighted: f64 = (0..self.labels.len())
            .map(|class| self.support(class) as f64 * self.f1(class))
            .sum();
        weighted / total as f64
    }
}

/// Rows are true classes, columns are predictions.
impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|l| l.len())
            .chain(self.counts.iter().flatten().map(|c| c.to_string().len()))
            .max()
            .unwrap_or(1);

        write!(f, "{:>width$}", "")?;
        for label in &self.labels {
            write!(f, " {label:>width$}")?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{label:>width$}")?;
            for count in row {
                write!(f, " {count:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(labels: &[&'static str], pairs: &[(usize, usize)]) -> ConfusionMatrix {
        let mut m = ConfusionMatrix::new(labels.to_vec());
        for &(truth, predicted) in pairs {
            m.record(truth, predicted);
        }
        m
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn weighted_f1_of_multiclass_predictions() {
        // truth [0, 1, 2, 0, 1, 2], predicted [0, 2, 1, 0, 0, 1]
        let m = matrix(
            &["a", "b", "c"],
            &[(0, 0), (1, 2), (2, 1), (0, 0), (1, 0), (2, 1)],
        );
        assert!(close(m.f1(0), 0.8));
        assert!(close(m.f1(1), 0.0));
        assert!(close(m.weighted_f1(), 0.8 / 3.0));
        assert_eq!(m.count(2, 1), 2);
    }

    #[test]
    fn weighted_f1_of_binary_flags() {
        // truth [yes, yes, no, no], predicted [yes, no, no, no]
        let m = matrix(&["no", "yes"], &[(1, 1), (1, 0), (0, 0), (0, 0)]);
        assert!(close(m.f1(1), 2.0 / 3.0));
        assert!(close(m.f1(0), 0.8));
        assert!(close(m.weighted_f1(), (2.0 * 2.0 / 3.0 + 2.0 * 0.8) / 4.0));
    }

    #[test]
    fn classes_never_seen_do_not_count() {
        let m = matrix(&["a", "b", "c"], &[(0, 0), (0, 0)]);
        assert_eq!(m.support(2), 0);
        assert!(close(m.weighted_f1(), 1.0));
    }

    #[test]
    fn empty_matrix_scores_zero() {
        assert_eq!(ConfusionMatrix::new(vec!["no", "yes"]).weighted_f1(), 0.0);
    }

    #[test]
    fn display_lists_labels_and_counts() {
        let m = matrix(&["no", "yes"], &[(1, 1), (1, 0), (0, 0)]);
        let rendered = m.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("no yes"));
        assert!(lines[1].trim_start().starts_with("no"));
        assert!(lines[2].ends_with("  1   1"));
    }
}
