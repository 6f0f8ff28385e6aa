use super::error::EngineError;
use crate::core::contact::{ContactEvaluator, ContactExpression};
use crate::core::models::residue::Residue;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

/// A fixed-size pool of contact evaluators.
///
/// Each worker thread owns one [`ContactEvaluator`]; all of them share the
/// same parsed expression. The pool lives for one model pass and its threads
/// are released when it is dropped. Without the `parallel` feature work runs
/// sequentially on the calling thread with a single evaluator.
pub struct EvaluatorPool<'e> {
    expression: &'e ContactExpression,
    workers: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl<'e> EvaluatorPool<'e> {
    pub fn new(expression: &'e ContactExpression, workers: usize) -> Result<Self, EngineError> {
        let workers = workers.max(1);
        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("descs-eval-{}", i))
            .build()
            .map_err(|e| EngineError::WorkerPool(e.to_string()))?;
        debug!(workers, "Evaluator pool ready.");
        Ok(Self {
            expression,
            workers,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Applies `f` to every item with the evaluator of the worker that picked
    /// it up. Results keep the order of `items`.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&mut ContactEvaluator<'e>, &T) -> R + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        {
            let expression = self.expression;
            self.pool.install(|| {
                items
                    .par_iter()
                    .map_init(|| expression.evaluator(), |evaluator, item| f(evaluator, item))
                    .collect()
            })
        }
        #[cfg(not(feature = "parallel"))]
        {
            let mut evaluator = self.expression.evaluator();
            items.iter().map(|item| f(&mut evaluator, item)).collect()
        }
    }

    /// Evaluates the contact predicate for many residue pairs concurrently.
    pub fn evaluate_pairs(&self, pairs: &[(&Residue, &Residue)]) -> Vec<bool> {
        self.map(pairs, |evaluator, (a, b)| evaluator.evaluate(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::MoleculeType;
    use crate::engine::test_support::helix_chain;

    #[test]
    fn pool_results_match_sequential_evaluation_in_order() {
        let chain = helix_chain('A', 1, 20, &[]);
        let residues = chain.residues();
        let pairs: Vec<(&Residue, &Residue)> = residues
            .iter()
            .enumerate()
            .flat_map(|(i, a)| residues[i + 1..].iter().map(move |b| (a, b)))
            .collect();
        let expression = ContactExpression::parse("DIST:CA;CA < 6.5", MoleculeType::Protein).unwrap();
        let expected: Vec<bool> = pairs.iter().map(|(a, b)| expression.evaluate(a, b)).collect();

        for workers in [1, 2, 4] {
            let pool = EvaluatorPool::new(&expression, workers).unwrap();
            assert_eq!(pool.workers(), workers);
            assert_eq!(pool.evaluate_pairs(&pairs), expected);
        }
        assert!(expected.iter().any(|&c| c) && expected.iter().any(|&c| !c));
    }

    #[test]
    fn zero_workers_is_clamped_to_one() {
        let expression = ContactExpression::parse("1 < 2", MoleculeType::Protein).unwrap();
        let pool = EvaluatorPool::new(&expression, 0).unwrap();
        assert_eq!(pool.workers(), 1);
        assert_eq!(pool.map(&[1, 2, 3], |_, x| x * 2), vec![2, 4, 6]);
    }
}
