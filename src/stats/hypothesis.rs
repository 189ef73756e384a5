//! Significance of observed motif counts under the null model.

use serde::Serialize;
use tracing::debug;

use super::binomial;
use crate::model::Pathway;
use crate::motif::Motif;
use crate::{Error, Result};

/// How a p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TestMethod {
    /// Exact two-sided binomial test.
    Exact,
    /// Continuity-corrected normal approximation, used above the exact limit.
    NormalApproximation,
    /// Upper tail of a simulated null distribution.
    MonteCarlo { iterations: usize },
}

impl TestMethod {
    pub fn name(&self) -> &'static str {
        match self {
            TestMethod::Exact => "exact",
            TestMethod::NormalApproximation => "normal",
            TestMethod::MonteCarlo { .. } => "monte_carlo",
        }
    }
}

/// Outcome of comparing an observed count with its null distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinomialTest {
    pub observed: u64,
    pub trials: u64,
    /// Per-trial motif probability under the null model.
    pub probability: f64,
    pub expected: f64,
    pub p_value: f64,
    pub method: TestMethod,
    pub alpha: f64,
    pub reject: bool,
}

/// Runs binomial (or simulated) tests at a fixed significance level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypothesisTester {
    alpha: f64,
    exact_limit: u64,
}

impl Default for HypothesisTester {
    fn default() -> Self {
        Self {
            alpha: Self::DEFAULT_ALPHA,
            exact_limit: Self::DEFAULT_EXACT_LIMIT,
        }
    }
}

impl HypothesisTester {
    pub const DEFAULT_ALPHA: f64 = 0.05;
    /// Above this many trials the normal approximation replaces the exact test.
    pub const DEFAULT_EXACT_LIMIT: u64 = 100_000;

    pub fn new(alpha: f64, exact_limit: u64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(Error::InvalidArgument(format!("alpha {alpha} must lie in (0, 1)")));
        }
        Ok(Self { alpha, exact_limit })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn exact_limit(&self) -> u64 {
        self.exact_limit
    }

    fn check(observed: u64, trials: u64, probability: f64) -> Result<()> {
        if trials == 0 {
            return Err(Error::InsufficientData {
                subject: "binomial test".into(),
            });
        }
        if observed > trials {
            return Err(Error::InvalidArgument(format!(
                "observed count {observed} exceeds {trials} trials"
            )));
        }
        if !(probability > 0.0 && probability < 1.0) {
            return Err(Error::NullModelDegenerate { probability });
        }
        Ok(())
    }

    /// Two-sided test of `observed` successes in `trials` against
    /// `probability`.
    pub fn test(&self, observed: u64, trials: u64, probability: f64) -> Result<BinomialTest> {
        Self::check(observed, trials, probability)?;

        let (p_value, method) = if trials <= self.exact_limit {
            (binomial::exact_two_sided(observed, trials, probability), TestMethod::Exact)
        } else {
            debug!(trials, limit = self.exact_limit, "normal approximation replaces exact binomial test");
            (binomial::normal_two_sided(observed, trials, probability), TestMethod::NormalApproximation)
        };

        Ok(self.finish(observed, trials, probability, p_value, method))
    }

    /// Upper-tail test against simulated null counts:
    /// `(1 + #{sample >= observed}) / (1 + samples)`.
    pub fn test_simulated(
        &self,
        observed: u64,
        trials: u64,
        probability: f64,
        samples: &[u64],
    ) -> Result<BinomialTest> {
        Self::check(observed, trials, probability)?;
        if samples.is_empty() {
            return Err(Error::InvalidArgument("no simulated samples".into()));
        }

        let extreme = samples.iter().filter(|&&s| s >= observed).count();
        let p_value = (1 + extreme) as f64 / (1 + samples.len()) as f64;
        let method = TestMethod::MonteCarlo { iterations: samples.len() };
        Ok(self.finish(observed, trials, probability, p_value, method))
    }

    fn finish(
        &self,
        observed: u64,
        trials: u64,
        probability: f64,
        p_value: f64,
        method: TestMethod,
    ) -> BinomialTest {
        let p_value = p_value.clamp(f64::MIN_POSITIVE, 1.0);
        BinomialTest {
            observed,
            trials,
            probability,
            expected: trials as f64 * probability,
            p_value,
            method,
            alpha: self.alpha,
            reject: p_value < self.alpha,
        }
    }
}

// ============================================================================
// TestResult
// ============================================================================

/// Why a result carries no p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum UndefinedReason {
    /// No testable subsets for the motif.
    InsufficientData,
    /// Null probability of 0 or 1.
    DegenerateNullModel { probability: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Outcome {
    Tested {
        p_value: f64,
        method: TestMethod,
        alpha: f64,
        reject: bool,
    },
    Undefined { reason: UndefinedReason },
}

/// One reported motif test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub motif: Motif,
    pub pathway: Pathway,
    pub observed: u64,
    pub trials: u64,
    /// Expected count under the null, when the null model defines one.
    pub expected: Option<f64>,
    pub outcome: Outcome,
}

impl TestResult {
    pub fn tested(motif: Motif, pathway: Pathway, test: &BinomialTest) -> Self {
        Self {
            motif,
            pathway,
            observed: test.observed,
            trials: test.trials,
            expected: Some(test.expected),
            outcome: Outcome::Tested {
                p_value: test.p_value,
                method: test.method,
                alpha: test.alpha,
                reject: test.reject,
            },
        }
    }

    /// Turn a test attempt into a result row. Insufficient data and a
    /// degenerate null become `Outcome::Undefined`; other errors propagate.
    pub fn from_attempt(
        motif: Motif,
        pathway: Pathway,
        observed: u64,
        trials: u64,
        expected: Option<f64>,
        attempt: Result<BinomialTest>,
    ) -> Result<Self> {
        let reason = match attempt {
            Ok(test) => return Ok(Self::tested(motif, pathway, &test)),
            Err(Error::InsufficientData { .. }) => UndefinedReason::InsufficientData,
            Err(Error::NullModelDegenerate { probability }) => {
                UndefinedReason::DegenerateNullModel { probability }
            }
            Err(other) => return Err(other),
        };
        Ok(Self {
            motif,
            pathway,
            observed,
            trials,
            expected,
            outcome: Outcome::Undefined { reason },
        })
    }

    pub fn p_value(&self) -> Option<f64> {
        match self.outcome {
            Outcome::Tested { p_value, .. } => Some(p_value),
            Outcome::Undefined { .. } => None,
        }
    }

    /// `None` when significance is undefined.
    pub fn is_significant(&self) -> Option<bool> {
        match self.outcome {
            Outcome::Tested { reject, .. } => Some(reject),
            Outcome::Undefined { .. } => None,
        }
    }

    pub fn method(&self) -> Option<TestMethod> {
        match self.outcome {
            Outcome::Tested { method, .. } => Some(method),
            Outcome::Undefined { .. } => None,
        }
    }
}
