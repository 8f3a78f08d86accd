//! Pluggable compatibility scoring for candidate sentence pairs.
//!
//! A strategy maps a (source text, target text) pair to a score where
//! higher is better; the aligner sums an ordered list of strategies and
//! never inspects concrete types. The default is the Gale-Church
//! length-ratio score: log-probability that two sentences of the observed
//! character lengths are mutual translations, under a Gaussian model of the
//! per-character expansion between the two languages.

/// Scores the compatibility of two candidate sub-segments. Pure function of
/// its inputs; higher is better.
pub trait ScoringStrategy: Send + Sync {
    fn score(&self, source: &str, target: &str) -> f64;
}

/// Sum of all strategies' scores for one candidate pair.
pub fn combined_score(strategies: &[Box<dyn ScoringStrategy>], source: &str, target: &str) -> f64 {
    strategies.iter().map(|s| s.score(source, target)).sum()
}

/// Gale-Church sentence-length scoring.
///
/// `expansion` is the expected target-per-source character ratio between the
/// language pair (1.0 when unknown); `variance` the per-character variance
/// of that ratio. The classic parameters from the original paper are kept
/// as defaults.
#[derive(Debug, Clone)]
pub struct GaleChurchScorer {
    pub expansion: f64,
    pub variance: f64,
}

impl Default for GaleChurchScorer {
    fn default() -> Self {
        Self {
            expansion: 1.0,
            variance: 6.8,
        }
    }
}

impl ScoringStrategy for GaleChurchScorer {
    fn score(&self, source: &str, target: &str) -> f64 {
        let ls = source.chars().count() as f64;
        let lt = target.chars().count() as f64;
        if ls == 0.0 && lt == 0.0 {
            return 0.0;
        }

        // Standardized difference of observed vs expected target length
        let delta = (lt - ls * self.expansion) / (ls.max(1.0) * self.variance).sqrt();

        // Two-sided tail probability of the standardized difference
        let prob = 2.0 * (1.0 - normal_cdf(delta.abs()));
        prob.max(f64::MIN_POSITIVE).ln()
    }
}

/// Standard normal CDF via the Abramowitz-Stegun erf approximation
/// (7.1.26, max absolute error ~1.5e-7).
fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_cdf_reference_points() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-6);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((normal_cdf(-1.96) - 0.025).abs() < 1e-3);
    }

    #[test]
    fn equal_lengths_score_near_zero() {
        let gc = GaleChurchScorer::default();
        let score = gc.score("abcdef", "uvwxyz");
        assert!(score.abs() < 1e-6, "score was {score}");
    }

    #[test]
    fn similar_lengths_beat_dissimilar() {
        let gc = GaleChurchScorer::default();
        let close = gc.score("Hello.", "Bonjour.");
        let far = gc.score("Hello.", "Bonjour, je suis tellement heureux de vous voir ici.");
        assert!(close > far);
    }

    #[test]
    fn empty_pair_is_neutral() {
        let gc = GaleChurchScorer::default();
        assert_eq!(gc.score("", ""), 0.0);
    }

    #[test]
    fn strategies_sum() {
        struct Constant(f64);
        impl ScoringStrategy for Constant {
            fn score(&self, _: &str, _: &str) -> f64 {
                self.0
            }
        }
        let strategies: Vec<Box<dyn ScoringStrategy>> =
            vec![Box::new(Constant(1.5)), Box::new(Constant(-0.5))];
        assert_eq!(combined_score(&strategies, "a", "b"), 1.0);
    }
}
