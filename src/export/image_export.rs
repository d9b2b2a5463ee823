//! Screenshot export

use std::path::{Path, PathBuf};

/// Errors that can occur during export
#[derive(Debug)]
pub enum ExportError {
    /// Pixel data does not describe a valid image
    BufferCreation(String),
    /// Reading the frame back from the GPU failed
    Readback(String),
    /// Failed to write the image file
    SaveError {
        path: PathBuf,
        error: image::ImageError,
    },
    /// Zero-sized image
    InvalidDimensions { width: u32, height: u32 },
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::BufferCreation(msg) => write!(f, "Failed to create image buffer: {}", msg),
            ExportError::Readback(msg) => write!(f, "Failed to read frame from GPU: {}", msg),
            ExportError::SaveError { path, error } => {
                write!(f, "Failed to save image '{}': {}", path.display(), error)
            }
            ExportError::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions: {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::SaveError { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Write tightly packed RGBA pixels to a PNG file.
pub fn export_frame<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<(), ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::InvalidDimensions { width, height });
    }

    let expected_len = width as usize * height as usize * 4;
    if data.len() != expected_len {
        return Err(ExportError::BufferCreation(format!(
            "Data length {} doesn't match expected {} ({}x{}x4)",
            data.len(),
            expected_len,
            width,
            height
        )));
    }

    let image_buffer = image::RgbaImage::from_raw(width, height, data.to_vec()).ok_or_else(|| {
        ExportError::BufferCreation("Failed to create image buffer from raw data".to_string())
    })?;

    let path = path.as_ref();
    image_buffer.save(path).map_err(|error| ExportError::SaveError {
        path: path.to_path_buf(),
        error,
    })
}

/// Row pitch of a `width` pixel RGBA8 texture copy, aligned for wgpu.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * 4).div_ceil(align) * align
}

/// Drop the per-row alignment padding of a texture readback.
pub fn strip_row_padding(data: &[u8], width: u32, height: u32, padded_bytes_per_row: u32) -> Vec<u8> {
    let row_bytes = width as usize * 4;
    data.chunks(padded_bytes_per_row as usize)
        .take(height as usize)
        .flat_map(|row| &row[..row_bytes.min(row.len())])
        .copied()
        .collect()
}

/// Whether pixels read from `format` are stored blue first.
pub fn is_bgra(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    )
}

/// Whether `format` reads back as four 8-bit channels, RGBA or BGRA.
pub fn is_rgba8_readable(format: wgpu::TextureFormat) -> bool {
    is_bgra(format)
        || matches!(
            format,
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb
        )
}

/// Swap the red and blue channels in place.
pub fn bgra_to_rgba(pixels: &mut [u8]) {
    for chunk in pixels.chunks_exact_mut(4) {
        chunk.swap(0, 2);
    }
}

/// First `<directory>/thin_film_NNNN.png` that does not exist yet.
pub fn next_screenshot_path<P: AsRef<Path>>(directory: P) -> PathBuf {
    let directory = directory.as_ref();
    let mut index = 0u32;
    loop {
        let candidate = directory.join(format!("thin_film_{:04}.png", index));
        if !candidate.exists() || index == u32::MAX {
            return candidate;
        }
        index += 1;
    }
}

/// Copy a `width` x `height` RGBA8 or BGRA8 texture into CPU memory as RGBA.
pub fn read_texture_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::InvalidDimensions { width, height });
    }
    if !is_rgba8_readable(texture.format()) {
        return Err(ExportError::Readback(format!(
            "Unsupported texture format {:?}",
            texture.format()
        )));
    }

    let bytes_per_row = padded_bytes_per_row(width);
    let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Screenshot Staging Buffer"),
        size: bytes_per_row as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Screenshot Encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let buffer_slice = staging_buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::Maintain::Wait);

    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(ExportError::Readback(e.to_string())),
        Err(e) => return Err(ExportError::Readback(e.to_string())),
    }

    let mut pixels = {
        let data = buffer_slice.get_mapped_range();
        strip_row_padding(&data, width, height, bytes_per_row)
    };
    staging_buffer.unmap();

    if is_bgra(texture.format()) {
        bgra_to_rgba(&mut pixels);
    }
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_export_frame() {
        let red_pixel = [255u8, 0, 0, 255];
        let data: Vec<u8> = red_pixel.iter().cycle().take(16).copied().collect();

        let path = std::env::temp_dir().join("thin_film_test_export.png");
        export_frame(&path, 2, 2, &data).unwrap();

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!(saved.dimensions(), (2, 2));
        assert_eq!(saved.get_pixel(1, 1).0, red_pixel);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_invalid_dimensions() {
        let result = export_frame(std::env::temp_dir().join("unused.png"), 0, 100, &[]);
        assert!(matches!(result, Err(ExportError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_wrong_data_length() {
        let result = export_frame(std::env::temp_dir().join("unused.png"), 10, 10, &[0u8; 100]);
        assert!(matches!(result, Err(ExportError::BufferCreation(_))));
    }

    #[test]
    fn test_save_error_names_path() {
        let path = std::env::temp_dir()
            .join("thin_film_no_such_dir")
            .join("nested")
            .join("frame.png");
        let result = export_frame(&path, 1, 1, &[0, 0, 0, 255]);
        match result {
            Err(ExportError::SaveError { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("Expected a save error, got {:?}", other),
        }
    }

    #[test]
    fn test_padded_bytes_per_row() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(1), 256);
    }

    #[test]
    fn test_strip_row_padding() {
        // 2x2 image, rows padded to 12 bytes
        let data = [
            1, 2, 3, 4, 5, 6, 7, 8, 0, 0, 0, 0, //
            9, 10, 11, 12, 13, 14, 15, 16, 0, 0, 0, 0,
        ];
        let pixels = strip_row_padding(&data, 2, 2, 12);
        assert_eq!(pixels, (1..=16).collect::<Vec<u8>>());
    }

    #[test]
    fn test_bgra_to_rgba() {
        let mut pixels = [10, 20, 30, 255, 1, 2, 3, 4];
        bgra_to_rgba(&mut pixels);
        assert_eq!(pixels, [30, 20, 10, 255, 3, 2, 1, 4]);
        assert!(is_bgra(wgpu::TextureFormat::Bgra8Unorm));
        assert!(!is_bgra(wgpu::TextureFormat::Rgba8Unorm));
    }

    #[test]
    fn test_readable_formats() {
        assert!(is_rgba8_readable(wgpu::TextureFormat::Rgba8Unorm));
        assert!(is_rgba8_readable(wgpu::TextureFormat::Bgra8UnormSrgb));
        assert!(!is_rgba8_readable(wgpu::TextureFormat::Rgba16Float));
        assert!(!is_rgba8_readable(wgpu::TextureFormat::Rgb10a2Unorm));
    }

    #[test]
    fn test_next_screenshot_path_skips_existing() {
        let directory = std::env::temp_dir().join("thin_film_screenshot_names");
        let _ = fs::remove_dir_all(&directory);
        fs::create_dir_all(&directory).unwrap();

        let first = next_screenshot_path(&directory);
        assert!(first.ends_with("thin_film_0000.png"));
        fs::write(&first, b"taken").unwrap();
        assert!(next_screenshot_path(&directory).ends_with("thin_film_0001.png"));

        let _ = fs::remove_dir_all(&directory);
    }
}
