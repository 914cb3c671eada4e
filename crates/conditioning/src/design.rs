//! Chebyshev type II filter design.
//!
//! Analog prototype (poles and zeros normalized to the stopband edge) followed
//! by a bilinear frequency transform to a digital high-pass or band-pass
//! response. Every conjugate pole/zero pair becomes one biquad section; an odd
//! order adds a first-order section (high-pass) or a real-pole biquad
//! (band-pass).

use std::f64::consts::PI;

use contracts::{ContractError, FilterConfig, FilterKind};
use num_complex::Complex64;

/// Guard band keeping transformed edges strictly inside (0, π)
const EDGE_EPSILON: f64 = 1e-8;

/// One second-order section, `a0` normalized to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    /// Numerator `b0, b1, b2`
    pub b: [f64; 3],
    /// Denominator `a1, a2`
    pub a: [f64; 2],
}

impl Biquad {
    /// Build a section from one or two poles and one or two zeros.
    ///
    /// Two roots are expected to be either a conjugate pair or both real.
    fn from_roots(poles: &[Complex64], zeros: &[Complex64]) -> Self {
        let a = polynomial(poles);
        Self {
            b: polynomial(zeros),
            a: [a[1], a[2]],
        }
    }

    /// Complex response at `z^-1 = e^{-jw}`
    pub fn response(&self, w: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -w);
        let z2 = z1 * z1;
        let num = self.b[0] + self.b[1] * z1 + self.b[2] * z2;
        let den = 1.0 + self.a[0] * z1 + self.a[1] * z2;
        num / den
    }
}

/// Monic polynomial coefficients `[1, c1, c2]` for up to two roots
fn polynomial(roots: &[Complex64]) -> [f64; 3] {
    match roots {
        [r] => [1.0, -r.re, 0.0],
        [r1, r2] => [1.0, -(r1 + r2).re, (r1 * r2).re],
        _ => [1.0, 0.0, 0.0],
    }
}

/// Designed filter: an ordered cascade of biquads
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDesign {
    kind: FilterKind,
    order: usize,
    sample_rate_hz: f64,
    sections: Vec<Biquad>,
}

impl FilterDesign {
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Prototype order; also the length of the start-up transient in samples
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Complex response of the whole cascade at normalized angular frequency `w`
    pub fn response(&self, w: f64) -> Complex64 {
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * s.response(w))
    }

    /// Magnitude response in dB at `freq_hz`
    pub fn gain_db(&self, freq_hz: f64) -> f64 {
        let w = 2.0 * PI * freq_hz / self.sample_rate_hz;
        20.0 * self.response(w).norm().log10()
    }

    /// Scale the first section so that `|H(e^{jw})| == gain`
    fn normalize(&mut self, w: f64, gain: f64) {
        let magnitude = self.response(w).norm();
        if magnitude > 0.0 && magnitude.is_finite() {
            if let Some(first) = self.sections.first_mut() {
                let scale = gain / magnitude;
                first.b.iter_mut().for_each(|c| *c *= scale);
            }
        }
    }
}

/// Analog Chebyshev type II prototype, stopband edge at 1 rad/s
struct AnalogPrototype {
    /// Conjugate pole/zero pairs, one representative each
    pairs: Vec<(Complex64, Complex64)>,
    /// Real pole of odd orders; its zero lies at infinity
    real_pole: Option<Complex64>,
}

impl AnalogPrototype {
    fn chebyshev2(order: usize, stopband_db: f64) -> Self {
        let n = order as f64;
        let eps = (1.0 / (10f64.powf(stopband_db / 10.0) - 1.0)).sqrt();
        let v0 = (1.0 / eps).asinh() / n;
        let sh = -v0.sinh();
        let ch = v0.cosh();
        let fnh = PI / (2.0 * n);

        let pairs = (0..order / 2)
            .map(|i| {
                let k = (2 * i + 1) as f64;
                let a = sh * ((k - n) * fnh).cos();
                let b = ch * ((k - n) * fnh).sin();
                let d2 = a * a + b * b;
                let pole = Complex64::new(a / d2, b / d2);
                let zero = Complex64::new(0.0, 1.0 / (k * fnh).cos());
                (pole, zero)
            })
            .collect();

        let real_pole = (order % 2 == 1).then(|| Complex64::new(1.0 / sh, 0.0));

        Self { pairs, real_pole }
    }
}

/// Design the digital filter described by `config` at `sample_rate_hz`
pub fn design(config: &FilterConfig, sample_rate_hz: f64) -> Result<FilterDesign, ContractError> {
    check_parameters(config, sample_rate_hz)?;

    let prototype = AnalogPrototype::chebyshev2(config.order, config.stopband_db);
    let design = match config.kind {
        FilterKind::HighPass => high_pass(&prototype, config, sample_rate_hz),
        FilterKind::BandPass => band_pass(&prototype, config, sample_rate_hz),
    };

    tracing::debug!(
        kind = ?design.kind,
        order = design.order,
        sections = design.sections.len(),
        "Chebyshev II filter designed"
    );

    Ok(design)
}

fn check_parameters(config: &FilterConfig, sample_rate_hz: f64) -> Result<(), ContractError> {
    if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
        return Err(ContractError::config_validation(
            "collection.sample_rate_hz",
            format!("sample rate must be > 0, got {sample_rate_hz}"),
        ));
    }
    if config.order == 0 {
        return Err(ContractError::config_validation(
            "filter.order",
            "order must be > 0",
        ));
    }
    if !(config.stopband_db.is_finite() && config.stopband_db > 0.0) {
        return Err(ContractError::config_validation(
            "filter.stopband_db",
            format!("stopband attenuation must be > 0, got {}", config.stopband_db),
        ));
    }

    let nyquist = sample_rate_hz / 2.0;
    if !(config.cutoff_hz > 0.0 && config.cutoff_hz < nyquist) {
        return Err(ContractError::config_validation(
            "filter.cutoff_hz",
            format!(
                "cutoff must lie in (0, {nyquist}) Hz, got {}",
                config.cutoff_hz
            ),
        ));
    }
    if config.kind == FilterKind::BandPass
        && !(config.band_high_hz > config.cutoff_hz && config.band_high_hz < nyquist)
    {
        return Err(ContractError::config_validation(
            "filter.band_high_hz",
            format!(
                "upper band edge must lie in ({}, {nyquist}) Hz, got {}",
                config.cutoff_hz, config.band_high_hz
            ),
        ));
    }
    Ok(())
}

fn high_pass(prototype: &AnalogPrototype, config: &FilterConfig, fs: f64) -> FilterDesign {
    let f = 1.0 / (PI * config.cutoff_hz / fs).tan();
    let transform = |c: Option<Complex64>| match c {
        None => Complex64::new(1.0, 0.0),
        Some(c) => {
            let c = c * f;
            -(1.0 + c) / (1.0 - c)
        }
    };

    let mut sections: Vec<Biquad> = prototype
        .pairs
        .iter()
        .map(|&(pole, zero)| {
            let p = transform(Some(pole));
            let z = transform(Some(zero));
            Biquad::from_roots(&[p, p.conj()], &[z, z.conj()])
        })
        .collect();

    if let Some(pole) = prototype.real_pole {
        sections.push(Biquad::from_roots(&[transform(Some(pole))], &[transform(None)]));
    }

    let mut design = FilterDesign {
        kind: FilterKind::HighPass,
        order: config.order,
        sample_rate_hz: fs,
        sections,
    };
    design.normalize(PI, 1.0);
    design
}

fn band_pass(prototype: &AnalogPrototype, config: &FilterConfig, fs: f64) -> FilterDesign {
    let wc2 = (2.0 * PI * config.cutoff_hz / fs).max(EDGE_EPSILON);
    let wc = (2.0 * PI * config.band_high_hz / fs).min(PI - EDGE_EPSILON);

    let a = ((wc + wc2) * 0.5).cos() / ((wc - wc2) * 0.5).cos();
    let b = 1.0 / ((wc - wc2) * 0.5).tan();
    let a2 = a * a;
    let b2 = b * b;
    let ab_2 = 2.0 * a * b;

    // each analog root maps to two digital roots
    let transform = |c: Option<Complex64>| -> (Complex64, Complex64) {
        let Some(c) = c else {
            return (Complex64::new(-1.0, 0.0), Complex64::new(1.0, 0.0));
        };
        let c = (1.0 + c) / (1.0 - c);
        let k = 4.0 * (b2 * (a2 - 1.0) + 1.0);
        let mut v = k * c + 8.0 * (b2 * (a2 - 1.0) - 1.0);
        v = (v * c + k).sqrt();
        let u = -v + ab_2 * c + ab_2;
        let v = v + ab_2 * c + ab_2;
        let d = 2.0 * (b - 1.0) * c + 2.0 * (1.0 + b);
        (u / d, v / d)
    };

    let mut sections = Vec::with_capacity(config.order);
    for &(pole, zero) in &prototype.pairs {
        let (p1, p2) = transform(Some(pole));
        let (z1, z2) = transform(Some(zero));
        sections.push(Biquad::from_roots(&[p1, p1.conj()], &[z1, z1.conj()]));
        sections.push(Biquad::from_roots(&[p2, p2.conj()], &[z2, z2.conj()]));
    }
    if let Some(pole) = prototype.real_pole {
        let (p1, p2) = transform(Some(pole));
        let (z1, z2) = transform(None);
        sections.push(Biquad::from_roots(&[p1, p2], &[z1, z2]));
    }

    let mut design = FilterDesign {
        kind: FilterKind::BandPass,
        order: config.order,
        sample_rate_hz: fs,
        sections,
    };
    let center = 2.0 * ((wc * 0.5).tan() * (wc2 * 0.5).tan()).sqrt().atan();
    design.normalize(center, 1.0);
    design
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_config() -> FilterConfig {
        FilterConfig::default()
    }

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_reference_high_pass_sections() {
        let design = design(&reference_config(), 50.0).unwrap();
        let sections = design.sections();
        assert_eq!(sections.len(), 3);

        let expected = [
            (
                [0.9629117352999739, -1.922385858220157, 0.9629117352999734],
                [-1.981591676444312, 0.9856771499649221],
            ),
            (
                [1.0, -1.998635621815542, 1.0],
                [-1.9610372543216605, 0.962911740827308],
            ),
            ([1.0, -1.0, 0.0], [-0.976903776055788, 0.0]),
        ];
        for (section, (b, a)) in sections.iter().zip(expected) {
            for (x, y) in section.b.iter().zip(b) {
                assert_close(*x, y, 1e-9);
            }
            for (x, y) in section.a.iter().zip(a) {
                assert_close(*x, y, 1e-9);
            }
        }
    }

    #[test]
    fn test_high_pass_magnitude_response() {
        let design = design(&reference_config(), 50.0).unwrap();
        // stopband edge sits exactly at the configured attenuation
        assert_close(design.gain_db(0.5), -10.0, 0.01);
        assert!(design.gain_db(0.1) < -10.0);
        assert_close(design.gain_db(1.0), 0.0, 0.01);
        assert_close(design.gain_db(25.0), 0.0, 1e-9);
    }

    #[test]
    fn test_band_pass_magnitude_response() {
        let config = FilterConfig {
            kind: FilterKind::BandPass,
            ..FilterConfig::default()
        };
        let design = design(&config, 50.0).unwrap();
        assert_eq!(design.sections().len(), 5);
        assert_close(design.gain_db(0.5), -10.0, 0.01);
        assert_close(design.gain_db(11.5), -10.0, 0.01);
        assert_close(design.gain_db(2.4), 0.0, 0.01);
        assert_close(design.gain_db(5.0), 0.0, 0.01);
        assert!(design.gain_db(0.1) < -10.0);
        assert!(design.gain_db(24.9) < -10.0);
    }

    #[test]
    fn test_poles_inside_unit_circle() {
        for kind in [FilterKind::HighPass, FilterKind::BandPass] {
            for order in 1..=8 {
                let config = FilterConfig {
                    kind,
                    order,
                    ..FilterConfig::default()
                };
                let design = design(&config, 50.0).unwrap();
                for s in design.sections() {
                    // |a2| < 1 and |a1| < 1 + a2 (stability triangle)
                    assert!(s.a[1].abs() < 1.0, "{kind:?} order {order}: {s:?}");
                    assert!(s.a[0].abs() < 1.0 + s.a[1], "{kind:?} order {order}: {s:?}");
                }
            }
        }
    }

    #[test]
    fn test_rejects_cutoff_above_nyquist() {
        let config = FilterConfig {
            cutoff_hz: 30.0,
            ..FilterConfig::default()
        };
        let err = design(&config, 50.0).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn test_rejects_inverted_band() {
        let config = FilterConfig {
            kind: FilterKind::BandPass,
            cutoff_hz: 5.0,
            band_high_hz: 4.0,
            ..FilterConfig::default()
        };
        assert!(design(&config, 50.0).is_err());
    }
}
