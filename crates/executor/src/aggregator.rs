use reclaim_primitives::{ExecutionResult, SkippedTransaction, TxOutcome};

/// Reduces per-transaction outcomes to a run-level [ExecutionResult](ExecutionResult)
#[derive(Clone, Debug, Default)]
pub struct ResultAggregator {
    outcomes: Vec<TxOutcome>,
    skipped: Vec<SkippedTransaction>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates a complete list of outcomes
    pub fn aggregate(outcomes: Vec<TxOutcome>) -> ExecutionResult {
        Self { outcomes, skipped: vec![] }.finish()
    }

    pub fn record(&mut self, outcome: TxOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn skip(&mut self, skipped: SkippedTransaction) {
        self.skipped.push(skipped);
    }

    pub fn finish(self) -> ExecutionResult {
        let attempted = self.outcomes.len();
        let succeeded = self.outcomes.iter().filter(|o| o.is_success()).count();
        ExecutionResult {
            attempted,
            succeeded,
            success: succeeded > 0,
            outcomes: self.outcomes,
            skipped: self.skipped,
        }
    }
}
