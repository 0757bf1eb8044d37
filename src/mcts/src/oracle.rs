//! The value/policy oracle the search consults for every expanded leaf.

use pocket_core::{ACTION_COUNT, Encoding};
use thiserror::Error;

/// A batched evaluator of encoded cube states, typically a trained network.
///
/// For a batch of `N` encodings it must return `N` policy rows of
/// [`ACTION_COUNT`] non-negative probabilities summing to one, in catalog
/// order, and `N` finite values. The search treats the oracle as a pure
/// function of its input.
pub trait Oracle {
    fn evaluate(&mut self, batch: &[Encoding]) -> OracleOutput;
}

impl<F: FnMut(&[Encoding]) -> OracleOutput> Oracle for F {
    fn evaluate(&mut self, batch: &[Encoding]) -> OracleOutput {
        self(batch)
    }
}

/// The response to one oracle batch, aligned with the request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OracleOutput {
    pub policies: Vec<Vec<f32>>,
    pub values: Vec<f32>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleContractError {
    #[error("Oracle returned {actual} policies for a batch of {expected} states")]
    PolicyCount { expected: usize, actual: usize },
    #[error("Oracle returned {actual} values for a batch of {expected} states")]
    ValueCount { expected: usize, actual: usize },
    #[error("Policy {row} has {actual} entries, expected 12")]
    PolicyLength { row: usize, actual: usize },
    #[error("Policy {row} has invalid probability {probability} for action {action}")]
    InvalidProbability {
        row: usize,
        action: usize,
        probability: f32,
    },
    #[error("Policy {row} sums to {sum}, expected 1")]
    PolicySum { row: usize, sum: f32 },
    #[error("Value {row} is not finite: {value}")]
    NonFiniteValue { row: usize, value: f32 },
}

impl OracleOutput {
    /// Check that this is a well-formed response to a batch of `batch_size`
    /// states, allowing policy rows to deviate from a sum of one by
    /// `tolerance`.
    ///
    /// # Errors
    ///
    /// The first contract violation found. See `OracleContractError`.
    pub fn validate(&self, batch_size: usize, tolerance: f32) -> Result<(), OracleContractError> {
        if self.policies.len() != batch_size {
            return Err(OracleContractError::PolicyCount {
                expected: batch_size,
                actual: self.policies.len(),
            });
        }
        if self.values.len() != batch_size {
            return Err(OracleContractError::ValueCount {
                expected: batch_size,
                actual: self.values.len(),
            });
        }
        for (row, policy) in self.policies.iter().enumerate() {
            if policy.len() != ACTION_COUNT {
                return Err(OracleContractError::PolicyLength {
                    row,
                    actual: policy.len(),
                });
            }
            if let Some((action, &probability)) = policy
                .iter()
                .enumerate()
                .find(|(_, p)| !p.is_finite() || **p < 0.0)
            {
                return Err(OracleContractError::InvalidProbability {
                    row,
                    action,
                    probability,
                });
            }
            let sum = policy.iter().sum::<f32>();
            if (sum - 1.0).abs() > tolerance {
                return Err(OracleContractError::PolicySum { row, sum });
            }
        }
        if let Some((row, &value)) = self.values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OracleContractError::NonFiniteValue { row, value });
        }
        Ok(())
    }

    /// The policy of row `row` as a fixed-width array. Only meaningful after
    /// a successful [`OracleOutput::validate`].
    pub(crate) fn policy_row(&self, row: usize) -> [f32; ACTION_COUNT] {
        let mut out = [0.0; ACTION_COUNT];
        out.copy_from_slice(&self.policies[row]);
        out
    }
}

/// Uniform priors and a value of zero for every state. Without an informed
/// oracle the search degrades into a breadth-biased random exploration.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformOracle;

impl Oracle for UniformOracle {
    fn evaluate(&mut self, batch: &[Encoding]) -> OracleOutput {
        // The catalog has 12 entries, so this cast is exact
        #[allow(clippy::cast_precision_loss)]
        let probability = 1.0 / ACTION_COUNT as f32;
        OracleOutput {
            policies: vec![vec![probability; ACTION_COUNT]; batch.len()],
            values: vec![0.0; batch.len()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_core::CubeState;

    fn batch(n: usize) -> Vec<Encoding> {
        vec![CubeState::SOLVED.encode(); n]
    }

    #[test]
    fn uniform_policies_sum_to_one() {
        let output = UniformOracle.evaluate(&batch(5));
        assert_eq!(output.policies.len(), 5);
        assert_eq!(output.values, vec![0.0; 5]);
        for policy in &output.policies {
            assert!((policy.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        }
        assert_eq!(output.validate(5, 1e-6), Ok(()));
    }

    #[test]
    fn closures_are_oracles() {
        let mut calls = 0;
        let mut oracle = |batch: &[Encoding]| {
            calls += 1;
            UniformOracle.evaluate(batch)
        };
        oracle.evaluate(&batch(2));
        oracle.evaluate(&batch(3));
        assert_eq!(calls, 2);
    }

    #[test]
    fn wrong_batch_size() {
        let output = UniformOracle.evaluate(&batch(2));
        assert_eq!(
            output.validate(3, 1e-4),
            Err(OracleContractError::PolicyCount {
                expected: 3,
                actual: 2
            })
        );

        let mut output = UniformOracle.evaluate(&batch(3));
        output.values.pop();
        assert_eq!(
            output.validate(3, 1e-4),
            Err(OracleContractError::ValueCount {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn wrong_policy_length() {
        let mut output = UniformOracle.evaluate(&batch(2));
        output.policies[1].push(0.0);
        assert_eq!(
            output.validate(2, 1e-4),
            Err(OracleContractError::PolicyLength { row: 1, actual: 13 })
        );
    }

    #[test]
    fn malformed_probabilities() {
        let mut output = UniformOracle.evaluate(&batch(1));
        output.policies[0][4] = -0.5;
        assert!(matches!(
            output.validate(1, 1e-4),
            Err(OracleContractError::InvalidProbability {
                row: 0,
                action: 4,
                ..
            })
        ));

        let mut output = UniformOracle.evaluate(&batch(1));
        output.policies[0][0] = f32::NAN;
        assert!(matches!(
            output.validate(1, 1e-4),
            Err(OracleContractError::InvalidProbability { action: 0, .. })
        ));

        let mut output = UniformOracle.evaluate(&batch(1));
        output.policies[0] = vec![0.5; ACTION_COUNT];
        assert!(matches!(
            output.validate(1, 1e-4),
            Err(OracleContractError::PolicySum { row: 0, .. })
        ));

        let mut output = UniformOracle.evaluate(&batch(2));
        output.values[1] = f32::INFINITY;
        assert!(matches!(
            output.validate(2, 1e-4),
            Err(OracleContractError::NonFiniteValue { row: 1, .. })
        ));
    }
}
