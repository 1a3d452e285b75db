//! Indicator bands over a pace series.
//!
//! Two envelopes are drawn around the series:
//! - Bollinger: rolling mean of the last N samples, +/- rolling stddev(N) x k
//! - Keltner: exponential mean with span S, +/- rolling stddev(S) x k
//!
//! Both are recomputed from the full series on every call. Series hold tens
//! of samples per game, so there is no incremental state to keep in sync.

use crate::error::IndicatorConfigError;
use serde::Serialize;

pub const DEFAULT_BAND_LENGTH: usize = 5;
pub const DEFAULT_BAND_MULTIPLIER: f64 = 2.0;

/// Window length and width multiplier for one band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandConfig {
    length: usize,
    multiplier: f64,
}

impl BandConfig {
    pub fn new(
        band: &'static str,
        length: usize,
        multiplier: f64,
    ) -> Result<Self, IndicatorConfigError> {
        if length == 0 {
            return Err(IndicatorConfigError::ZeroLength { band });
        }
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(IndicatorConfigError::InvalidMultiplier {
                band,
                value: multiplier,
            });
        }
        Ok(Self { length, multiplier })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_BAND_LENGTH,
            multiplier: DEFAULT_BAND_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorConfig {
    pub bollinger: BandConfig,
    pub keltner: BandConfig,
}

impl IndicatorConfig {
    pub fn new(
        bb_length: usize,
        bb_std: f64,
        kc_length: usize,
        kc_mult: f64,
    ) -> Result<Self, IndicatorConfigError> {
        Ok(Self {
            bollinger: BandConfig::new("bollinger", bb_length, bb_std)?,
            keltner: BandConfig::new("keltner", kc_length, kc_mult)?,
        })
    }
}

/// One index of a band. `None` where the window is not filled yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BandPoint {
    pub mid: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorBands {
    pub bollinger: Vec<BandPoint>,
    pub keltner: Vec<BandPoint>,
}

impl IndicatorBands {
    pub fn last_bollinger(&self) -> Option<&BandPoint> {
        self.bollinger.last()
    }

    pub fn last_keltner(&self) -> Option<&BandPoint> {
        self.keltner.last()
    }
}

/// Mean of each trailing window of `length` samples
pub fn rolling_mean(values: &[f64], length: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| trailing_window(values, i, length).map(|w| w.iter().sum::<f64>() / w.len() as f64))
        .collect()
}

/// Sample standard deviation (n - 1) of each trailing window.
///
/// A window of one sample has no spread estimate, so `length == 1` yields
/// `None` everywhere.
pub fn rolling_std(values: &[f64], length: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let window = trailing_window(values, i, length)?;
            if window.len() < 2 {
                return None;
            }
            let n = window.len() as f64;
            let mean = window.iter().sum::<f64>() / n;
            let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some(variance.max(0.0).sqrt())
        })
        .collect()
}

/// Exponential moving average without bias adjustment.
///
/// `alpha = 2 / (span + 1)`; the first value seeds the average and each
/// index only depends on samples at or before it.
pub fn exponential_mean(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &value in values {
        let next = match prev {
            Some(p) => alpha * value + (1.0 - alpha) * p,
            None => value,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

pub fn bollinger_bands(values: &[f64], config: &BandConfig) -> Vec<BandPoint> {
    let mids = rolling_mean(values, config.length);
    let stds = rolling_std(values, config.length);
    mids.into_iter()
        .zip(stds)
        .map(|(mid, std)| envelope(mid, std, config.multiplier))
        .collect()
}

pub fn keltner_channels(values: &[f64], config: &BandConfig) -> Vec<BandPoint> {
    let mids = exponential_mean(values, config.length);
    let stds = rolling_std(values, config.length);
    mids.into_iter()
        .zip(stds)
        .map(|(mid, std)| envelope(Some(mid), std, config.multiplier))
        .collect()
}

pub fn compute_bands(values: &[f64], config: &IndicatorConfig) -> IndicatorBands {
    IndicatorBands {
        bollinger: bollinger_bands(values, &config.bollinger),
        keltner: keltner_channels(values, &config.keltner),
    }
}

#[inline]
fn trailing_window(values: &[f64], index: usize, length: usize) -> Option<&[f64]> {
    if length == 0 || index + 1 < length {
        return None;
    }
    Some(&values[index + 1 - length..=index])
}

#[inline]
fn envelope(mid: Option<f64>, std: Option<f64>, multiplier: f64) -> BandPoint {
    match (mid, std) {
        (Some(mid), Some(std)) => {
            let half_width = std * multiplier;
            BandPoint {
                mid: Some(mid),
                upper: Some(mid + half_width),
                lower: Some(mid - half_width),
            }
        }
        (mid, _) => BandPoint {
            mid,
            upper: None,
            lower: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES: [f64; 8] = [98.0, 101.5, 99.2, 104.8, 102.1, 97.3, 100.0, 103.6];

    #[test]
    fn test_config_validation() {
        assert!(IndicatorConfig::new(5, 2.0, 5, 2.0).is_ok());
        assert_eq!(
            BandConfig::new("bollinger", 0, 2.0),
            Err(IndicatorConfigError::ZeroLength { band: "bollinger" })
        );
        assert!(matches!(
            BandConfig::new("keltner", 5, -0.5),
            Err(IndicatorConfigError::InvalidMultiplier { band: "keltner", .. })
        ));
        assert!(BandConfig::new("keltner", 5, f64::NAN).is_err());
        assert!(BandConfig::new("keltner", 5, 0.0).is_ok());
    }

    #[test]
    fn test_rolling_mean_undefined_until_window_filled() {
        let means = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(means, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_rolling_std_matches_sample_std() {
        let stds = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        // sample variance of this classic set is 32/7
        let expected = (32.0f64 / 7.0).sqrt();
        assert!((stds[7].unwrap() - expected).abs() < 1e-12);
        assert!(stds[..7].iter().all(Option::is_none));
    }

    #[test]
    fn test_single_sample_window_has_no_width() {
        assert!(rolling_std(&SERIES, 1).iter().all(Option::is_none));
        let bands = bollinger_bands(&SERIES, &BandConfig::new("bollinger", 1, 2.0).unwrap());
        assert_eq!(bands[3].mid, Some(104.8));
        assert_eq!(bands[3].upper, None);
    }

    #[test]
    fn test_exponential_mean_without_adjustment() {
        // span 3 -> alpha 0.5
        let ema = exponential_mean(&[10.0, 20.0, 30.0], 3);
        assert_eq!(ema, vec![10.0, 15.0, 22.5]);
    }

    #[test]
    fn test_exponential_mean_uses_only_past_samples() {
        let short = exponential_mean(&SERIES[..4], 5);
        let full = exponential_mean(&SERIES, 5);
        assert_eq!(short[..], full[..4]);
    }

    #[test]
    fn test_keltner_mid_defined_before_width() {
        let bands = keltner_channels(&SERIES, &BandConfig::default());
        assert_eq!(bands[0].mid, Some(98.0));
        assert!(bands[3].upper.is_none());
        assert!(bands[4].upper.is_some());
    }

    #[test]
    fn test_bands_ordered_wherever_defined() {
        for multiplier in [0.0, 0.5, 2.0, 3.5] {
            for length in 1..=SERIES.len() {
                let band = BandConfig::new("test", length, multiplier).unwrap();
                let config = IndicatorConfig {
                    bollinger: band,
                    keltner: band,
                };
                let bands = compute_bands(&SERIES, &config);
                for point in bands.bollinger.iter().chain(bands.keltner.iter()) {
                    if let (Some(lower), Some(mid), Some(upper)) = (point.lower, point.mid, point.upper) {
                        assert!(upper >= mid && mid >= lower);
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_series() {
        let bands = compute_bands(&[], &IndicatorConfig::default());
        assert!(bands.bollinger.is_empty());
        assert!(bands.keltner.is_empty());
        assert!(bands.last_bollinger().is_none());
    }
}
