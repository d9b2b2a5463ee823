//! Thin-film interference on a reflective base.
//!
//! Light hitting a film of thickness `d` and index `n1` lying on a base of
//! index `n2` is reflected partly at the air/film interface and partly at the
//! film/base interface. The two (and all higher order) reflections interfere:
//!
//! - **Phase difference**: `delta = 4 * PI * n1 * d * cos(theta_1) / lambda`
//! - **Airy sum**: `R = |r01 + r12 e^(i delta)|^2 / |1 + r01 r12 e^(i delta)|^2`
//!
//! where `r01` and `r12` are the Fresnel amplitude coefficients of the two
//! interfaces. With real indices the sum reduces to
//! `(r01^2 + r12^2 + 2 r01 r12 cos delta) / (1 + r01^2 r12^2 + 2 r01 r12 cos delta)`.
//!
//! The formula is hidden behind [`InterferenceModel`] so the lookup table does
//! not depend on a particular derivation.

use std::f64::consts::PI;

/// Physical constants and numeric guards.
pub mod constants {
    /// Refractive index of air
    pub const REFRACTIVE_INDEX_AIR: f64 = 1.0;
    /// Smallest refractive index accepted for the film or the base
    pub const MIN_REFRACTIVE_INDEX: f64 = 1.0;
    /// Incidence cosines are clamped above this to keep grazing angles finite
    pub const MIN_COS_THETA: f64 = 1e-4;
}

/// Visible spectrum sampling used by [`SpectralAiry`].
pub mod spectrum {
    /// First sampled wavelength in nanometers
    pub const START_NM: f64 = 380.0;
    /// Last sampled wavelength in nanometers
    pub const END_NM: f64 = 780.0;
    /// Sampling step in nanometers
    pub const STEP_NM: f64 = 10.0;
}

/// Standard wavelengths used by [`RgbAiry`].
pub mod wavelengths {
    /// Red wavelength in nanometers
    pub const RED_NM: f64 = 650.0;
    /// Green wavelength in nanometers
    pub const GREEN_NM: f64 = 532.0;
    /// Blue wavelength in nanometers
    pub const BLUE_NM: f64 = 450.0;
}

/// RGB color representation with values in range [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RgbColor {
    /// Red component (0.0 to 1.0)
    pub red: f64,
    /// Green component (0.0 to 1.0)
    pub green: f64,
    /// Blue component (0.0 to 1.0)
    pub blue: f64,
}

impl RgbColor {
    /// Create a new RGB color, clamping values to valid range.
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red: red.clamp(0.0, 1.0),
            green: green.clamp(0.0, 1.0),
            blue: blue.clamp(0.0, 1.0),
        }
    }

    /// Convert to an f32 array (useful for graphics APIs).
    pub fn to_f32_array(&self) -> [f32; 3] {
        [self.red as f32, self.green as f32, self.blue as f32]
    }

    /// Component-wise square root.
    pub fn sqrt(&self) -> Self {
        Self::new(self.red.sqrt(), self.green.sqrt(), self.blue.sqrt())
    }
}

/// Air / film / base stack evaluated by an [`InterferenceModel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilmStack {
    /// Film thickness in nanometers
    pub thickness_nm: f64,
    /// Refractive index of the film
    pub refractive_index_film: f64,
    /// Refractive index of the base material
    pub refractive_index_base: f64,
}

impl FilmStack {
    /// Create a stack from raw values.
    pub fn new(thickness_nm: f64, refractive_index_film: f64, refractive_index_base: f64) -> Self {
        Self {
            thickness_nm,
            refractive_index_film,
            refractive_index_base,
        }
    }

    /// Clamp the stack into the physically meaningful domain: thickness is
    /// non-negative and indices are at least [`constants::MIN_REFRACTIVE_INDEX`].
    pub fn sanitized(&self) -> Self {
        let index = |n: f64| {
            if n.is_finite() {
                n.max(constants::MIN_REFRACTIVE_INDEX)
            } else {
                constants::MIN_REFRACTIVE_INDEX
            }
        };
        let thickness_nm = if self.thickness_nm.is_finite() {
            self.thickness_nm.max(0.0)
        } else {
            0.0
        };
        Self {
            thickness_nm,
            refractive_index_film: index(self.refractive_index_film),
            refractive_index_base: index(self.refractive_index_base),
        }
    }
}

/// Fresnel amplitude reflection coefficients for both polarizations.
#[derive(Debug, Clone, Copy)]
pub struct FresnelAmplitudes {
    /// s-polarized (perpendicular) amplitude coefficient
    pub s: f64,
    /// p-polarized (parallel) amplitude coefficient
    pub p: f64,
}

/// Cosine of the refracted angle from Snell's law, `n_i sin(theta_i) = n_t sin(theta_t)`.
///
/// Returns 0.0 past the critical angle.
pub fn refracted_cos(cos_theta_incident: f64, n_incident: f64, n_transmitted: f64) -> f64 {
    let cos_i = cos_theta_incident.clamp(-1.0, 1.0);
    let sin_i = (1.0 - cos_i * cos_i).max(0.0).sqrt();
    let sin_t = (n_incident / n_transmitted) * sin_i;
    if sin_t >= 1.0 {
        return 0.0;
    }
    (1.0 - sin_t * sin_t).sqrt()
}

/// Fresnel amplitude coefficients at an interface.
pub fn fresnel_amplitudes(
    cos_theta_incident: f64,
    cos_theta_transmitted: f64,
    n_incident: f64,
    n_transmitted: f64,
) -> FresnelAmplitudes {
    let ni_cos_i = n_incident * cos_theta_incident;
    let nt_cos_t = n_transmitted * cos_theta_transmitted;
    let nt_cos_i = n_transmitted * cos_theta_incident;
    let ni_cos_t = n_incident * cos_theta_transmitted;

    FresnelAmplitudes {
        s: (ni_cos_i - nt_cos_t) / (ni_cos_i + nt_cos_t).max(f64::EPSILON),
        p: (nt_cos_i - ni_cos_t) / (nt_cos_i + ni_cos_t).max(f64::EPSILON),
    }
}

/// Airy reflectance of a single film for one polarization.
fn airy_reflectance(r01: f64, r12: f64, cos_delta: f64) -> f64 {
    let cross = 2.0 * r01 * r12 * cos_delta;
    let numerator = r01 * r01 + r12 * r12 + cross;
    let denominator = 1.0 + r01 * r01 * r12 * r12 + cross;
    (numerator / denominator.max(f64::EPSILON)).clamp(0.0, 1.0)
}

/// Unpolarized reflectance of the stack at one wavelength.
///
/// The stack is sanitized first, so any input is accepted.
pub fn stack_reflectance(film: &FilmStack, cos_theta: f64, wavelength_nm: f64) -> f64 {
    let film = film.sanitized();
    let n0 = constants::REFRACTIVE_INDEX_AIR;
    let n1 = film.refractive_index_film;
    let n2 = film.refractive_index_base;

    let cos0 = cos_theta.clamp(constants::MIN_COS_THETA, 1.0);
    let cos1 = refracted_cos(cos0, n0, n1);
    // Snell's invariant: n0 sin0 = n1 sin1 = n2 sin2
    let cos2 = refracted_cos(cos0, n0, n2);

    let top = fresnel_amplitudes(cos0, cos1, n0, n1);
    let bottom = fresnel_amplitudes(cos1, cos2, n1, n2);

    let delta = 4.0 * PI * n1 * film.thickness_nm * cos1 / wavelength_nm;
    let cos_delta = delta.cos();

    let r_s = airy_reflectance(top.s, bottom.s, cos_delta);
    let r_p = airy_reflectance(top.p, bottom.p, cos_delta);
    (r_s + r_p) * 0.5
}

/// A model mapping a film stack and incidence angle to a reflected color.
pub trait InterferenceModel: Send + Sync + std::fmt::Debug {
    /// Linear RGB reflectance of `film` at incidence cosine `cos_theta`.
    fn reflectance(&self, film: &FilmStack, cos_theta: f64) -> RgbColor;
}

/// Airy reflectance integrated over the visible spectrum.
#[derive(Debug, Clone)]
pub struct SpectralAiry {
    /// (wavelength, CIE x, y, z) samples
    samples: Vec<(f64, [f64; 3])>,
    /// Sum of the y samples, the luminance of a perfect reflector
    luminance_norm: f64,
}

impl SpectralAiry {
    /// Build the model with the default 380-780 nm sampling.
    pub fn new() -> Self {
        let count = ((spectrum::END_NM - spectrum::START_NM) / spectrum::STEP_NM).round() as usize + 1;
        let samples: Vec<(f64, [f64; 3])> = (0..count)
            .map(|i| {
                let wavelength = spectrum::START_NM + i as f64 * spectrum::STEP_NM;
                (wavelength, cie_color_matching(wavelength))
            })
            .collect();
        let luminance_norm = samples.iter().map(|(_, cie)| cie[1]).sum();
        Self {
            samples,
            luminance_norm,
        }
    }

    /// Number of spectral samples.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Default for SpectralAiry {
    fn default() -> Self {
        Self::new()
    }
}

impl InterferenceModel for SpectralAiry {
    fn reflectance(&self, film: &FilmStack, cos_theta: f64) -> RgbColor {
        let mut xyz = [0.0f64; 3];
        for (wavelength, cie) in &self.samples {
            let reflectance = stack_reflectance(film, cos_theta, *wavelength);
            xyz[0] += cie[0] * reflectance;
            xyz[1] += cie[1] * reflectance;
            xyz[2] += cie[2] * reflectance;
        }
        for component in &mut xyz {
            *component /= self.luminance_norm;
        }
        let rgb = xyz_to_linear_srgb(xyz);
        RgbColor::new(rgb[0], rgb[1], rgb[2])
    }
}

/// Airy reflectance at three fixed wavelengths, one per channel.
#[derive(Debug, Clone, Copy)]
pub struct RgbAiry {
    /// Red, green and blue wavelengths in nanometers
    pub wavelengths_nm: [f64; 3],
}

impl Default for RgbAiry {
    fn default() -> Self {
        Self {
            wavelengths_nm: [wavelengths::RED_NM, wavelengths::GREEN_NM, wavelengths::BLUE_NM],
        }
    }
}

impl InterferenceModel for RgbAiry {
    fn reflectance(&self, film: &FilmStack, cos_theta: f64) -> RgbColor {
        let [red, green, blue] = self
            .wavelengths_nm
            .map(|wavelength| stack_reflectance(film, cos_theta, wavelength));
        RgbColor::new(red, green, blue)
    }
}

/// CIE 1931 color matching functions (Gaussian approximation)
fn cie_color_matching(wavelength: f64) -> [f64; 3] {
    let x = 1.056 * gaussian(wavelength, 599.8, 37.9)
        + 0.362 * gaussian(wavelength, 442.0, 16.0)
        - 0.065 * gaussian(wavelength, 501.1, 20.4);

    let y = 0.821 * gaussian(wavelength, 568.8, 46.9)
        + 0.286 * gaussian(wavelength, 530.9, 31.1);

    let z = 1.217 * gaussian(wavelength, 437.0, 11.8)
        + 0.681 * gaussian(wavelength, 459.0, 26.0);

    [x.max(0.0), y.max(0.0), z.max(0.0)]
}

#[inline]
fn gaussian(x: f64, mean: f64, sigma: f64) -> f64 {
    let t = (x - mean) / sigma;
    (-0.5 * t * t).exp()
}

/// Convert XYZ to linear sRGB (D65)
fn xyz_to_linear_srgb(xyz: [f64; 3]) -> [f64; 3] {
    let r = 3.2404542 * xyz[0] - 1.5371385 * xyz[1] - 0.4985314 * xyz[2];
    let g = -0.9692660 * xyz[0] + 1.8760108 * xyz[1] + 0.0415560 * xyz[2];
    let b = 0.0556434 * xyz[0] - 0.2040259 * xyz[1] + 1.0572252 * xyz[2];
    [r, g, b]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn bare_reflectance(n: f64) -> f64 {
        ((1.0 - n) / (1.0 + n)).powi(2)
    }

    #[test]
    fn test_rgb_color_clamping() {
        let color = RgbColor::new(1.5, -0.5, 0.5);
        assert_eq!(color, RgbColor::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn test_snells_law_normal_incidence() {
        assert!((refracted_cos(1.0, 1.0, 1.33) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_snells_law_ratio() {
        let cos_incident = (2.0_f64).sqrt() / 2.0;
        let cos_transmitted = refracted_cos(cos_incident, 1.0, 1.5);
        let sin_incident = (1.0 - cos_incident.powi(2)).sqrt();
        let sin_transmitted = (1.0 - cos_transmitted.powi(2)).sqrt();
        assert!((sin_incident / sin_transmitted - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_total_internal_reflection_returns_zero() {
        // Leaving glass into air at grazing incidence
        assert_eq!(refracted_cos(0.1, 1.5, 1.0), 0.0);
    }

    #[test]
    fn test_zero_thickness_matches_bare_base() {
        // With no film, the stack reflects like the base alone
        let film = FilmStack::new(0.0, 2.0, 3.0);
        let reflectance = stack_reflectance(&film, 1.0, 550.0);
        assert!((reflectance - bare_reflectance(3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_matching_indices_hide_the_film() {
        // A film with the base's index is indistinguishable from the base
        let film = FilmStack::new(400.0, 1.5, 1.5);
        let reflectance = stack_reflectance(&film, 1.0, 600.0);
        assert!((reflectance - bare_reflectance(1.5)).abs() < 1e-9);
    }

    #[test]
    fn test_grazing_incidence_reflects_almost_everything() {
        let film = FilmStack::new(380.0, 2.0, 3.0);
        let reflectance = stack_reflectance(&film, 0.0, 550.0);
        assert!(reflectance > 0.99, "grazing reflectance {}", reflectance);
    }

    #[test]
    fn test_reflectance_varies_with_wavelength() {
        let film = FilmStack::new(380.0, 2.0, 3.0);
        let red = stack_reflectance(&film, 1.0, 650.0);
        let blue = stack_reflectance(&film, 1.0, 450.0);
        assert!((red - blue).abs() > 0.01);
    }

    #[test]
    fn test_invalid_stack_is_sanitized() {
        let film = FilmStack::new(-50.0, 0.0, f64::NAN).sanitized();
        assert_eq!(film.thickness_nm, 0.0);
        assert_eq!(film.refractive_index_film, constants::MIN_REFRACTIVE_INDEX);
        assert_eq!(film.refractive_index_base, constants::MIN_REFRACTIVE_INDEX);

        let reflectance = stack_reflectance(&FilmStack::new(-1.0, -3.0, 0.0), 0.5, 500.0);
        assert!(reflectance.is_finite());
    }

    #[test]
    fn test_spectral_sample_count() {
        assert_eq!(SpectralAiry::new().sample_count(), 41);
    }

    #[test]
    fn test_spectral_model_in_range_and_finite() {
        let model = SpectralAiry::new();
        for thickness in [0.0, 100.0, 380.0, 1000.0] {
            for cos_theta in [0.0, 0.25, 0.5, 1.0] {
                let color = model.reflectance(&FilmStack::new(thickness, 2.0, 3.0), cos_theta);
                for channel in [color.red, color.green, color.blue] {
                    assert!(channel.is_finite());
                    assert!((0.0..=1.0).contains(&channel));
                }
            }
        }
    }

    #[test]
    fn test_spectral_color_varies_with_thickness() {
        let model = SpectralAiry::new();
        let thin = model.reflectance(&FilmStack::new(150.0, 1.5, 2.0), 1.0);
        let thick = model.reflectance(&FilmStack::new(450.0, 1.5, 2.0), 1.0);
        let difference = (thin.red - thick.red).abs()
            + (thin.green - thick.green).abs()
            + (thin.blue - thick.blue).abs();
        assert!(difference > 0.005, "difference {}", difference);
    }

    #[test]
    fn test_rgb_model_matches_per_channel_reflectance() {
        let model = RgbAiry::default();
        let film = FilmStack::new(300.0, 1.33, 1.5);
        let color = model.reflectance(&film, 0.8);
        assert!((color.red - stack_reflectance(&film, 0.8, wavelengths::RED_NM)).abs() < EPSILON);
        assert!((color.blue - stack_reflectance(&film, 0.8, wavelengths::BLUE_NM)).abs() < EPSILON);
    }
}
