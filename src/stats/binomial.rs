//! Binomial and normal distribution helpers.
//!
//! Everything is computed in log space so that exact tests stay finite for
//! tens of thousands of trials.

use crate::{Error, Result};

/// Relative tolerance when comparing probabilities of outcomes for the
/// two-sided exact test.
const RELATIVE_TOLERANCE: f64 = 1.0 + 1e-7;

/// Lanczos coefficients, g = 7.
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function for `x > 0`.
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // reflection
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut sum = LANCZOS[0];
    for (i, c) in LANCZOS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + 7.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// `ln P(X = k)` for `X ~ Binomial(n, p)`.
pub fn ln_pmf(k: u64, n: u64, p: f64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    match p {
        p if p <= 0.0 => if k == 0 { 0.0 } else { f64::NEG_INFINITY },
        p if p >= 1.0 => if k == n { 0.0 } else { f64::NEG_INFINITY },
        p => ln_choose(n, k) + k as f64 * p.ln() + (n - k) as f64 * (-p).ln_1p(),
    }
}

pub fn pmf(k: u64, n: u64, p: f64) -> f64 {
    ln_pmf(k, n, p).exp()
}

/// Two-sided exact p-value: total probability of every outcome no more
/// likely than the observed one. Requires `0 < p < 1` and `k <= n`.
pub fn exact_two_sided(k: u64, n: u64, p: f64) -> f64 {
    let threshold = ln_pmf(k, n, p) + RELATIVE_TOLERANCE.ln();
    let total: f64 = (0..=n)
        .map(|i| ln_pmf(i, n, p))
        .filter(|&lp| lp <= threshold)
        .map(f64::exp)
        .sum();
    total.min(1.0)
}

/// Two-sided p-value from the normal approximation with continuity
/// correction.
pub fn normal_two_sided(k: u64, n: u64, p: f64) -> f64 {
    let mean = n as f64 * p;
    let sd = (n as f64 * p * (1.0 - p)).sqrt();
    let z = ((k as f64 - mean).abs() - 0.5).max(0.0) / sd;
    erfc(z / std::f64::consts::SQRT_2).min(1.0)
}

/// Complementary error function, fractional error below 1.2e-7.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard normal quantile (Acklam's rational approximation).
pub fn normal_quantile(q: f64) -> Result<f64> {
    if !(q > 0.0 && q < 1.0) {
        return Err(Error::InvalidArgument(format!("quantile {q} must lie in (0, 1)")));
    }

    const A: [f64; 6] = [
        -3.969_683_028_665_376e1, 2.209_460_984_245_205e2, -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2, -3.066_479_806_614_716e1, 2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1, 1.615_858_368_580_409e2, -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1, -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3, -3.223_964_580_411_365e-1, -2.400_758_277_161_838,
        -2.549_732_539_343_734, 4.374_664_141_464_968, 2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3, 3.224_671_290_700_398e-1, 2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const LOW: f64 = 0.024_25;

    let tail = |r: f64| {
        (((((C[0] * r + C[1]) * r + C[2]) * r + C[3]) * r + C[4]) * r + C[5])
            / ((((D[0] * r + D[1]) * r + D[2]) * r + D[3]) * r + 1.0)
    };

    let x = if q < LOW {
        tail((-2.0 * q.ln()).sqrt())
    } else if q <= 1.0 - LOW {
        let s = q - 0.5;
        let r = s * s;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * s
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - q).ln()).sqrt())
    };
    Ok(x)
}

/// Half-width of the normal-approximation confidence interval of a binomial
/// proportion: `z * sqrt(p (1 - p) / n)` with `z` the `quantile` of the
/// standard normal (0.975 for a two-tailed 95% interval).
pub fn normal_interval(trials: u64, proportion: f64, quantile: f64) -> Result<f64> {
    if trials == 0 {
        return Err(Error::InvalidArgument("confidence interval needs at least one trial".into()));
    }
    if !(0.0..=1.0).contains(&proportion) {
        return Err(Error::InvalidArgument(format!(
            "proportion {proportion} must lie between zero and one"
        )));
    }
    let z = normal_quantile(quantile)?;
    Ok(z * (proportion * (1.0 - proportion) / trials as f64).sqrt())
}
