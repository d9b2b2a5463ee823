//! Iridescence lookup table
//!
//! Pre-computes the thin-film reflection color for every view angle so the
//! fragment shader only does a single texture fetch. The table is indexed by
//! `cos(theta)` between the surface normal and the view direction, from
//! grazing (`0.0`) to normal incidence (`1.0`), and is uploaded as an
//! `N x 1` texture.
//!
//! Samples are stored amplitude-like (square root of the linear reflected
//! color); the shader squares them back to intensity.

use rayon::prelude::*;
use std::sync::Arc;

use crate::config::ThinFilmParameters;
use crate::physics::interference::{FilmStack, InterferenceModel, SpectralAiry};

/// Smallest supported table size
pub const MIN_LOOK_UP_SIZE: u32 = 2;

/// Largest supported table size (texture width limit on every backend)
pub const MAX_LOOK_UP_SIZE: u32 = 4096;

/// Default number of table entries
pub const DEFAULT_LOOK_UP_SIZE: u32 = 64;

/// Thin-film lookup provider
///
/// Holds the three film parameters and the table derived from them. Every
/// setter that changes a value regenerates the table and bumps
/// [`revision`](Self::revision), which the renderer uses to re-upload.
#[derive(Debug, Clone)]
pub struct IridescenceLookUp {
    parameters: ThinFilmParameters,
    size: u32,
    model: Arc<dyn InterferenceModel>,
    table: Vec<[f32; 3]>,
    revision: u64,
}

impl IridescenceLookUp {
    /// Create a provider with the default spectral model and generate its table.
    pub fn new(parameters: ThinFilmParameters, size: u32) -> Self {
        Self::with_model(parameters, size, Arc::new(SpectralAiry::new()))
    }

    /// Create a provider with a custom interference model.
    pub fn with_model(
        parameters: ThinFilmParameters,
        size: u32,
        model: Arc<dyn InterferenceModel>,
    ) -> Self {
        let mut look_up = Self {
            parameters,
            size: size.clamp(MIN_LOOK_UP_SIZE, MAX_LOOK_UP_SIZE),
            model,
            table: Vec::new(),
            revision: 0,
        };
        look_up.regenerate();
        look_up
    }

    /// Film thickness in nanometers
    pub fn film_thickness(&self) -> f64 {
        self.parameters.film_thickness_nm
    }

    /// Set the film thickness in nanometers
    pub fn set_film_thickness(&mut self, thickness_nm: f64) {
        if let Some(value) = self.accept("film thickness", self.parameters.film_thickness_nm, thickness_nm) {
            self.parameters.film_thickness_nm = value;
            self.regenerate();
        }
    }

    /// Refractive index of the film
    pub fn refractive_index_film(&self) -> f64 {
        self.parameters.refractive_index_film
    }

    /// Set the refractive index of the film
    pub fn set_refractive_index_film(&mut self, index: f64) {
        if let Some(value) = self.accept("film refractive index", self.parameters.refractive_index_film, index) {
            self.parameters.refractive_index_film = value;
            self.regenerate();
        }
    }

    /// Refractive index of the base material
    pub fn refractive_index_base(&self) -> f64 {
        self.parameters.refractive_index_base
    }

    /// Set the refractive index of the base material
    pub fn set_refractive_index_base(&mut self, index: f64) {
        if let Some(value) = self.accept("base refractive index", self.parameters.refractive_index_base, index) {
            self.parameters.refractive_index_base = value;
            self.regenerate();
        }
    }

    /// All three parameters
    pub fn parameters(&self) -> ThinFilmParameters {
        self.parameters
    }

    /// Replace all three parameters, regenerating once if anything changed.
    pub fn set_parameters(&mut self, parameters: ThinFilmParameters) {
        let finite = parameters.film_thickness_nm.is_finite()
            && parameters.refractive_index_film.is_finite()
            && parameters.refractive_index_base.is_finite();
        if !finite {
            log::warn!("Ignoring non-finite thin-film parameters {:?}", parameters);
            return;
        }
        if parameters != self.parameters {
            self.parameters = parameters;
            self.regenerate();
        }
    }

    /// Returns the value to store, or `None` when the update should be skipped.
    fn accept(&self, name: &str, current: f64, value: f64) -> Option<f64> {
        if !value.is_finite() {
            log::warn!("Ignoring non-finite {}: {}", name, value);
            return None;
        }
        (value != current).then_some(value)
    }

    /// Recompute the table from the current parameters.
    pub fn regenerate(&mut self) {
        let film = FilmStack::new(
            self.parameters.film_thickness_nm,
            self.parameters.refractive_index_film,
            self.parameters.refractive_index_base,
        );
        let last = (self.size - 1) as f64;
        let model = self.model.as_ref();

        self.table = (0..self.size)
            .into_par_iter()
            .map(|index| {
                let cos_theta = index as f64 / last;
                model.reflectance(&film, cos_theta).sqrt().to_f32_array()
            })
            .collect();
        self.revision += 1;

        log::debug!(
            "Regenerated iridescence table: {} nm, n_film {}, n_base {} (revision {})",
            self.parameters.film_thickness_nm,
            self.parameters.refractive_index_film,
            self.parameters.refractive_index_base,
            self.revision
        );
    }

    /// Number of table entries
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Incremented on every regeneration
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current table, index `i` holds `cos(theta) = i / (size - 1)`
    pub fn table(&self) -> &[[f32; 3]] {
        &self.table
    }

    /// Sample the table at normalized coordinate `u` with linear filtering and
    /// clamp-to-edge addressing, matching GPU sampling of the uploaded texture.
    pub fn sample(&self, u: f32) -> [f32; 3] {
        self.filter(u, |rgb| rgb)
    }

    /// Like [`sample`](Self::sample), but over the 8-bit texels produced by
    /// [`to_rgba8`](Self::to_rgba8). This is the value the GPU reads.
    pub fn sample_texels(&self, u: f32) -> [f32; 3] {
        self.filter(u, |rgb| rgb.map(|v| f32::from(unorm8(v)) / 255.0))
    }

    fn filter(&self, u: f32, texel: impl Fn([f32; 3]) -> [f32; 3]) -> [f32; 3] {
        let count = self.table.len();
        let u = if u.is_finite() { u.clamp(0.0, 1.0) } else { 0.0 };
        let x = (u * count as f32 - 0.5).clamp(0.0, (count - 1) as f32);
        let i0 = x.floor() as usize;
        let i1 = (i0 + 1).min(count - 1);
        let t = x - i0 as f32;

        let a = texel(self.table[i0]);
        let b = texel(self.table[i1]);
        [
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
        ]
    }

    /// Table as RGBA8 texels for texture upload
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.table.len() * 4);
        for rgb in &self.table {
            data.extend(rgb.map(unorm8));
            data.push(255);
        }
        data
    }
}

fn unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Default for IridescenceLookUp {
    fn default() -> Self {
        Self::new(ThinFilmParameters::default(), DEFAULT_LOOK_UP_SIZE)
    }
}

/// GPU copy of an [`IridescenceLookUp`] table
pub struct LookUpTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    revision: u64,
}

impl LookUpTexture {
    /// Create and fill the texture
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, look_up: &IridescenceLookUp) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Iridescence LUT Texture"),
            size: wgpu::Extent3d {
                width: look_up.size(),
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut lut_texture = Self {
            texture,
            view,
            width: look_up.size(),
            revision: 0,
        };
        lut_texture.write(queue, look_up);
        lut_texture
    }

    /// Whether `look_up` differs from what was last uploaded
    pub fn is_stale(&self, look_up: &IridescenceLookUp) -> bool {
        self.revision != look_up.revision()
    }

    /// Whether the table size changed, which needs a new texture (and bind group)
    pub fn needs_resize(&self, look_up: &IridescenceLookUp) -> bool {
        self.width != look_up.size()
    }

    /// Upload the current table. The size must match the texture.
    pub fn write(&mut self, queue: &wgpu::Queue, look_up: &IridescenceLookUp) {
        debug_assert_eq!(self.width, look_up.size());
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &look_up.to_rgba8(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: self.width,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        self.revision = look_up.revision();
    }

    /// View bound as `iridescence_look_up` in the shader
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::interference::RgbAiry;

    fn table_difference(a: &[[f32; 3]], b: &[[f32; 3]]) -> f32 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x[0] - y[0]).abs() + (x[1] - y[1]).abs() + (x[2] - y[2]).abs())
            .sum()
    }

    #[test]
    fn test_table_has_requested_size() {
        let look_up = IridescenceLookUp::new(ThinFilmParameters::default(), 32);
        assert_eq!(look_up.table().len(), 32);
        assert_eq!(look_up.to_rgba8().len(), 32 * 4);
    }

    #[test]
    fn test_size_is_clamped() {
        assert_eq!(IridescenceLookUp::new(ThinFilmParameters::default(), 0).size(), MIN_LOOK_UP_SIZE);
        assert_eq!(
            IridescenceLookUp::new(ThinFilmParameters::default(), 100_000).size(),
            MAX_LOOK_UP_SIZE
        );
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut look_up = IridescenceLookUp::default();
        let first: Vec<[u32; 3]> = look_up.table().iter().map(|c| c.map(f32::to_bits)).collect();
        look_up.regenerate();
        let second: Vec<[u32; 3]> = look_up.table().iter().map(|c| c.map(f32::to_bits)).collect();
        assert_eq!(first, second);

        let other = IridescenceLookUp::default();
        assert_eq!(look_up.to_rgba8(), other.to_rgba8());
    }

    #[test]
    fn test_normal_and_grazing_samples_differ() {
        for thickness in [100.0, 380.0, 700.0, 1000.0] {
            let look_up = IridescenceLookUp::new(
                ThinFilmParameters {
                    film_thickness_nm: thickness,
                    ..ThinFilmParameters::default()
                },
                DEFAULT_LOOK_UP_SIZE,
            );
            let normal = look_up.sample(0.99);
            let grazing = look_up.sample(0.0);
            let difference = (normal[0] - grazing[0]).abs()
                + (normal[1] - grazing[1]).abs()
                + (normal[2] - grazing[2]).abs();
            assert!(difference > 0.01, "thickness {} gave identical samples", thickness);
        }
    }

    #[test]
    fn test_each_parameter_change_updates_table() {
        let mut look_up = IridescenceLookUp::default();

        let before = look_up.table().to_vec();
        look_up.set_film_thickness(520.0);
        assert!(table_difference(&before, look_up.table()) > 1e-4);

        let before = look_up.table().to_vec();
        look_up.set_refractive_index_film(1.4);
        assert!(table_difference(&before, look_up.table()) > 1e-4);

        let before = look_up.table().to_vec();
        look_up.set_refractive_index_base(1.8);
        assert!(table_difference(&before, look_up.table()) > 1e-4);
    }

    #[test]
    fn test_revision_tracks_changes() {
        let mut look_up = IridescenceLookUp::default();
        let initial = look_up.revision();

        look_up.set_film_thickness(look_up.film_thickness());
        assert_eq!(look_up.revision(), initial, "Same value must not regenerate");

        look_up.set_film_thickness(600.0);
        assert_eq!(look_up.revision(), initial + 1);

        look_up.set_parameters(look_up.parameters());
        assert_eq!(look_up.revision(), initial + 1);
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let mut look_up = IridescenceLookUp::default();
        let parameters = look_up.parameters();
        look_up.set_film_thickness(f64::NAN);
        look_up.set_refractive_index_film(f64::INFINITY);
        look_up.set_parameters(ThinFilmParameters {
            refractive_index_base: f64::NAN,
            ..parameters
        });
        assert_eq!(look_up.parameters(), parameters);
    }

    #[test]
    fn test_out_of_range_values_do_not_crash() {
        let mut look_up = IridescenceLookUp::default();
        look_up.set_refractive_index_film(-2.0);
        look_up.set_refractive_index_base(0.0);
        look_up.set_film_thickness(-10.0);
        assert!(look_up.table().iter().flatten().all(|value| value.is_finite()));
    }

    #[test]
    fn test_sample_endpoints_hit_table_edges() {
        let look_up = IridescenceLookUp::default();
        assert_eq!(look_up.sample(0.0), look_up.table()[0]);
        assert_eq!(look_up.sample(1.0), *look_up.table().last().unwrap());
        assert_eq!(look_up.sample(-3.0), look_up.table()[0]);
        assert_eq!(look_up.sample(f32::NAN), look_up.table()[0]);
    }

    #[test]
    fn test_texel_samples_match_upload() {
        let look_up = IridescenceLookUp::new(ThinFilmParameters::default(), 16);
        let texels = look_up.to_rgba8();
        let first = look_up.sample_texels(0.0);
        let last = look_up.sample_texels(1.0);
        for channel in 0..3 {
            assert_eq!(first[channel], f32::from(texels[channel]) / 255.0);
            assert_eq!(last[channel], f32::from(texels[15 * 4 + channel]) / 255.0);
        }
        let exact = look_up.sample(0.4);
        let quantized = look_up.sample_texels(0.4);
        for channel in 0..3 {
            assert!((exact[channel] - quantized[channel]).abs() <= 0.5 / 255.0 + 1e-6);
        }
    }

    #[test]
    fn test_sample_interpolates_between_texels() {
        let look_up = IridescenceLookUp::new(ThinFilmParameters::default(), 4);
        // Texel centers at 0.125, 0.375; halfway between is 0.25
        let a = look_up.table()[0];
        let b = look_up.table()[1];
        let mid = look_up.sample(0.25);
        for channel in 0..3 {
            assert!((mid[channel] - (a[channel] + b[channel]) * 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_custom_model_is_used() {
        let spectral = IridescenceLookUp::default();
        let rgb = IridescenceLookUp::with_model(
            ThinFilmParameters::default(),
            DEFAULT_LOOK_UP_SIZE,
            Arc::new(RgbAiry::default()),
        );
        assert!(table_difference(spectral.table(), rgb.table()) > 1e-3);
    }
}
