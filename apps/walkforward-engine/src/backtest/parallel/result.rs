//! Outcome types for a grid evaluation.

use crate::error::SimulationError;

use super::progress::Progress;

/// Outcome of one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome<T> {
    /// The job returned a value.
    Completed(T),
    /// The job failed with a simulation error.
    Failed(SimulationError),
    /// The job was not started because the run was cancelled.
    Skipped,
}

impl<T> CandidateOutcome<T> {
    /// Value of a completed candidate.
    #[must_use]
    pub const fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// Check if the candidate failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcomes of a grid run, in the order of the input candidates.
#[derive(Debug, Clone)]
pub struct GridRun<T> {
    /// One outcome per candidate, by grid index.
    pub outcomes: Vec<CandidateOutcome<T>>,
    /// Whether any candidate was skipped due to cancellation.
    pub cancelled: bool,
    /// Final counters.
    pub progress: Progress,
}

impl<T> GridRun<T> {
    /// Completed candidates with their grid index.
    pub fn completed(&self) -> impl Iterator<Item = (usize, &T)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.completed().map(|v| (i, v)))
    }

    /// Number of failed candidates.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// Number of candidates that ran (completed or failed).
    #[must_use]
    pub fn evaluated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o, CandidateOutcome::Skipped))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let run = GridRun {
            outcomes: vec![
                CandidateOutcome::Completed(1),
                CandidateOutcome::Failed(SimulationError::ShortNotAllowed {
                    strategy: "s".to_string(),
                    bar_index: 0,
                }),
                CandidateOutcome::Completed(3),
                CandidateOutcome::Skipped,
            ],
            cancelled: true,
            progress: Progress {
                total: 4,
                completed: 3,
                failed: 1,
                elapsed_ms: 0,
            },
        };

        assert_eq!(run.failed_count(), 1);
        assert_eq!(run.evaluated_count(), 3);
        let completed: Vec<_> = run.completed().collect();
        assert_eq!(completed, vec![(0, &1), (2, &3)]);
    }
}
