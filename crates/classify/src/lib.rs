//! Classification binning for choropleth maps.
//!
//! Turns a numeric series into an ordered sequence of bin edges using a
//! named scheme. The break computation itself sits behind the
//! [`Classifier`] trait so the numeric backend can be swapped without
//! touching callers; the [`Binner`] registry resolves a scheme to its
//! provider at call time.

mod breaks;
mod scheme;

pub use breaks::{Classifier, EqualInterval, FisherJenks, Quantiles};
pub use scheme::Scheme;

use std::collections::HashMap;

use tracing::debug;

/// Class counts accepted by classifier-backed schemes.
pub const CLASS_RANGE: std::ops::RangeInclusive<usize> = 2..=9;

/// Errors produced while binning a series.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error(
        "unsupported scheme '{0}'; valid schemes: equal_interval, quantiles, fisher_jenks, user_defined"
    )]
    UnsupportedScheme(String),

    #[error("class count {0} is outside the supported range 2..=9")]
    InvalidClassCount(usize),

    #[error("no classifier available for scheme '{0}'")]
    Unavailable(Scheme),

    #[error("scheme 'user_defined' requires explicit bin edges")]
    MissingUserBins,

    #[error("value series has no finite entries")]
    EmptySeries,

    #[error("classifier produced non-increasing break values")]
    NonIncreasingBreaks,
}

/// Registry of break classifiers keyed by scheme.
pub struct Binner {
    providers: HashMap<Scheme, Box<dyn Classifier>>,
}

impl Default for Binner {
    fn default() -> Self {
        let mut binner = Self::empty();
        binner.register(Scheme::EqualInterval, Box::new(EqualInterval));
        binner.register(Scheme::Quantiles, Box::new(Quantiles));
        binner.register(Scheme::FisherJenks, Box::new(FisherJenks));
        binner
    }
}

impl Binner {
    /// A registry with no providers; every classifier-backed scheme is
    /// unavailable until registered.
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    pub fn register(&mut self, scheme: Scheme, provider: Box<dyn Classifier>) {
        self.providers.insert(scheme, provider);
    }

    /// Compute ordered bin edges for `values`.
    ///
    /// For [`Scheme::UserDefined`] the caller's bins are returned verbatim.
    /// For every other scheme the provider computes `k` upper boundaries
    /// and the observed series minimum becomes the implicit lower bound of
    /// the first interval, yielding `k + 1` edges.
    pub fn bin_edges(
        &self,
        values: &[f64],
        scheme: Scheme,
        k: usize,
        user_bins: Option<&[f64]>,
    ) -> Result<Vec<f64>, ClassifyError> {
        if scheme == Scheme::UserDefined {
            return user_bins
                .map(<[f64]>::to_vec)
                .ok_or(ClassifyError::MissingUserBins);
        }
        if !CLASS_RANGE.contains(&k) {
            return Err(ClassifyError::InvalidClassCount(k));
        }
        let provider = self
            .providers
            .get(&scheme)
            .ok_or(ClassifyError::Unavailable(scheme))?;

        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Err(ClassifyError::EmptySeries);
        }
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);

        let mut edges = Vec::with_capacity(k + 1);
        edges.push(min);
        edges.extend(provider.breaks(&finite, k));

        if !edges.windows(2).all(|w| w[0] < w[1]) {
            return Err(ClassifyError::NonIncreasingBreaks);
        }
        debug!(scheme = %scheme, k, ?edges, "computed bin edges");
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defined_bins_pass_through_verbatim() {
        let bins = vec![0.0, 7.5, 42.0, 100.0];
        let edges = Binner::default()
            .bin_edges(&[1.0, 2.0, 3.0], Scheme::UserDefined, 5, Some(&bins))
            .unwrap();
        assert_eq!(edges, bins);
    }

    #[test]
    fn test_user_defined_requires_bins() {
        let err = Binner::default()
            .bin_edges(&[1.0, 2.0], Scheme::UserDefined, 5, None)
            .unwrap_err();
        assert!(matches!(err, ClassifyError::MissingUserBins));
    }

    #[test]
    fn test_scheme_edges_start_at_series_minimum() {
        let values = vec![5.0, 25.0, 10.0, 18.0];
        for scheme in [Scheme::EqualInterval, Scheme::Quantiles, Scheme::FisherJenks] {
            let edges = Binner::default()
                .bin_edges(&values, scheme, 3, None)
                .unwrap();
            assert_eq!(edges.len(), 4, "{scheme}");
            assert_eq!(edges[0], 5.0, "{scheme}");
            assert!(edges.windows(2).all(|w| w[0] < w[1]), "{scheme}");
        }
    }

    #[test]
    fn test_class_count_bounds() {
        let values = vec![1.0, 2.0, 3.0];
        for k in [0, 1, 10] {
            let err = Binner::default()
                .bin_edges(&values, Scheme::EqualInterval, k, None)
                .unwrap_err();
            assert!(matches!(err, ClassifyError::InvalidClassCount(got) if got == k));
        }
    }

    #[test]
    fn test_missing_provider_is_unavailable() {
        let err = Binner::empty()
            .bin_edges(&[1.0, 2.0, 3.0], Scheme::Quantiles, 2, None)
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Unavailable(Scheme::Quantiles)));
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let values = vec![f64::NAN, 5.0, 25.0, f64::INFINITY];
        let edges = Binner::default()
            .bin_edges(&values, Scheme::EqualInterval, 2, None)
            .unwrap();
        assert_eq!(edges, vec![5.0, 15.0, 25.0]);
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let err = Binner::default()
            .bin_edges(&[f64::NAN], Scheme::Quantiles, 2, None)
            .unwrap_err();
        assert!(matches!(err, ClassifyError::EmptySeries));
    }

    #[test]
    fn test_constant_series_is_degenerate() {
        let err = Binner::default()
            .bin_edges(&[3.0, 3.0, 3.0], Scheme::EqualInterval, 2, None)
            .unwrap_err();
        assert!(matches!(err, ClassifyError::NonIncreasingBreaks));
    }
}
