//! Environment cube maps
//!
//! Irradiance and radiance probes are loaded once from six JPEG faces and
//! shared read-only between materials. [`CubeMap`] is the CPU copy (used for
//! upload and for CPU-side shading); [`CubeTexture`] is the GPU copy.

use glam::{Vec2, Vec3, Vec4};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Cube face in wgpu / GL layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All faces in layer order
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Texture array layer of this face
    pub fn layer(self) -> usize {
        self as usize
    }

    /// File name of this face inside a probe directory
    pub fn file_name(self) -> &'static str {
        match self {
            CubeFace::PositiveX => "posX.jpg",
            CubeFace::NegativeX => "negX.jpg",
            CubeFace::PositiveY => "posY.jpg",
            CubeFace::NegativeY => "negY.jpg",
            CubeFace::PositiveZ => "posZ.jpg",
            CubeFace::NegativeZ => "negZ.jpg",
        }
    }
}

/// Select the face hit by `direction` and the face coordinates in [0, 1].
///
/// Follows the GL cube map selection rules that wgpu shares; `uv.y = 0` is the
/// first row of the face image. A zero direction maps to the center of +Z.
pub fn face_coordinates(direction: Vec3) -> (CubeFace, Vec2) {
    let abs = direction.abs();
    let (face, sc, tc, major) = if abs.x >= abs.y && abs.x >= abs.z {
        if direction.x >= 0.0 {
            (CubeFace::PositiveX, -direction.z, -direction.y, abs.x)
        } else {
            (CubeFace::NegativeX, direction.z, -direction.y, abs.x)
        }
    } else if abs.y >= abs.z {
        if direction.y >= 0.0 {
            (CubeFace::PositiveY, direction.x, direction.z, abs.y)
        } else {
            (CubeFace::NegativeY, direction.x, -direction.z, abs.y)
        }
    } else if direction.z >= 0.0 {
        (CubeFace::PositiveZ, direction.x, -direction.y, abs.z)
    } else {
        (CubeFace::NegativeZ, -direction.x, -direction.y, abs.z)
    };

    if major <= f32::EPSILON {
        return (CubeFace::PositiveZ, Vec2::splat(0.5));
    }
    let uv = Vec2::new(sc / major, tc / major) * 0.5 + Vec2::splat(0.5);
    (face, uv.clamp(Vec2::ZERO, Vec2::ONE))
}

/// Six square RGBA8 faces of equal size
#[derive(Debug, Clone)]
pub struct CubeMap {
    size: u32,
    faces: [RgbaImage; 6],
}

impl CubeMap {
    /// Load `posX.jpg`, `negX.jpg`, `posY.jpg`, `negY.jpg`, `posZ.jpg` and
    /// `negZ.jpg` from `directory`.
    ///
    /// Any missing or undecodable face is an error; faces are never
    /// substituted.
    pub fn load<P: AsRef<Path>>(directory: P) -> Result<Self, EnvironmentError> {
        let directory = directory.as_ref();
        let mut faces = Vec::with_capacity(6);
        for face in CubeFace::ALL {
            let path = directory.join(face.file_name());
            let image = image::open(&path)
                .map_err(|error| EnvironmentError::Load {
                    path: path.clone(),
                    error,
                })?
                .to_rgba8();
            faces.push((path, image));
        }
        let cube_map = Self::from_labeled_faces(faces)?;
        log::info!(
            "Loaded cube map {} ({}x{} per face)",
            directory.display(),
            cube_map.size,
            cube_map.size
        );
        Ok(cube_map)
    }

    /// Build a cube map from in-memory faces in layer order.
    pub fn from_faces(faces: [RgbaImage; 6]) -> Result<Self, EnvironmentError> {
        let labeled = CubeFace::ALL
            .into_iter()
            .zip(faces)
            .map(|(face, image)| (PathBuf::from(face.file_name()), image))
            .collect();
        Self::from_labeled_faces(labeled)
    }

    fn from_labeled_faces(faces: Vec<(PathBuf, RgbaImage)>) -> Result<Self, EnvironmentError> {
        let mut size = None;
        let mut images = Vec::with_capacity(6);
        for (path, image) in faces {
            let (width, height) = image.dimensions();
            if width != height || width == 0 {
                return Err(EnvironmentError::NotSquare {
                    path,
                    width,
                    height,
                });
            }
            match size {
                None => size = Some(width),
                Some(expected) if expected != width => {
                    return Err(EnvironmentError::SizeMismatch {
                        path,
                        expected,
                        actual: width,
                    });
                }
                Some(_) => {}
            }
            images.push(image);
        }

        let faces: [RgbaImage; 6] = images
            .try_into()
            .map_err(|images: Vec<RgbaImage>| EnvironmentError::FaceCount(images.len()))?;
        Ok(Self {
            size: size.unwrap_or(0),
            faces,
        })
    }

    /// A cube map with every face filled with `rgba`.
    pub fn solid(size: u32, rgba: [u8; 4]) -> Self {
        let size = size.max(1);
        Self {
            size,
            faces: std::array::from_fn(|_| RgbaImage::from_pixel(size, size, image::Rgba(rgba))),
        }
    }

    /// Fill one face with `rgba`.
    pub fn fill_face(&mut self, face: CubeFace, rgba: [u8; 4]) {
        for pixel in self.faces[face.layer()].pixels_mut() {
            *pixel = image::Rgba(rgba);
        }
    }

    /// Edge length of each face in pixels
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Image of one face
    pub fn face(&self, face: CubeFace) -> &RgbaImage {
        &self.faces[face.layer()]
    }

    /// Sample along `direction` with bilinear filtering inside the face,
    /// returning normalized RGBA.
    pub fn sample(&self, direction: Vec3) -> Vec4 {
        let (face, uv) = face_coordinates(direction);
        let image = &self.faces[face.layer()];
        let max = (self.size - 1) as f32;

        let x = (uv.x * self.size as f32 - 0.5).clamp(0.0, max);
        let y = (uv.y * self.size as f32 - 0.5).clamp(0.0, max);
        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.size - 1);
        let y1 = (y0 + 1).min(self.size - 1);
        let tx = x - x0 as f32;
        let ty = y - y0 as f32;

        let texel = |px: u32, py: u32| {
            let [r, g, b, a] = image.get_pixel(px, py).0;
            Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
        };
        let top = texel(x0, y0).lerp(texel(x1, y0), tx);
        let bottom = texel(x0, y1).lerp(texel(x1, y1), tx);
        top.lerp(bottom, ty)
    }
}

/// GPU cube texture and its cube view
pub struct CubeTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl CubeTexture {
    /// Upload all six faces of `cube_map`.
    ///
    /// Faces use a linear (non-sRGB) format: the shaders square samples
    /// themselves to approximate gamma decoding.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, cube_map: &CubeMap, label: &str) -> Self {
        let size = cube_map.size();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for face in CubeFace::ALL {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: face.layer() as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                cube_map.face(face).as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(size * 4),
                    rows_per_image: Some(size),
                },
                wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        Self {
            _texture: texture,
            view,
        }
    }

    /// Cube view for binding
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// Errors raised while building a cube map
#[derive(Debug)]
pub enum EnvironmentError {
    /// A face file is missing or cannot be decoded
    Load {
        path: PathBuf,
        error: image::ImageError,
    },
    /// A face is not square
    NotSquare {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    /// A face differs in size from the first face
    SizeMismatch {
        path: PathBuf,
        expected: u32,
        actual: u32,
    },
    /// Not exactly six faces were supplied
    FaceCount(usize),
}

impl std::fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvironmentError::Load { path, error } => {
                write!(f, "Failed to load cube face '{}': {}", path.display(), error)
            }
            EnvironmentError::NotSquare { path, width, height } => {
                write!(f, "Cube face '{}' is not square: {}x{}", path.display(), width, height)
            }
            EnvironmentError::SizeMismatch {
                path,
                expected,
                actual,
            } => write!(
                f,
                "Cube face '{}' is {}px wide, expected {}px",
                path.display(),
                actual,
                expected
            ),
            EnvironmentError::FaceCount(count) => {
                write!(f, "A cube map needs 6 faces, got {}", count)
            }
        }
    }
}

impl std::error::Error for EnvironmentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnvironmentError::Load { error, .. } => Some(error),
            _ => None,
        }
    }
}
