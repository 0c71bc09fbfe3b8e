//! Wall texture loading.

use crate::renderer::pipeline_builder::BindGroupLayoutBuilder;
use std::path::Path;

/// Edge length of the generated fallback texture.
pub const FALLBACK_SIZE: u32 = 64;

/// Loads `path` as RGBA, or generates a brick pattern when the file is missing or unreadable.
pub fn load_or_fallback(path: &Path) -> image::RgbaImage {
    match image::open(path) {
        Ok(img) => {
            log::info!("Loaded wall texture {}", path.display());
            img.to_rgba8()
        }
        Err(e) => {
            log::warn!(
                "Failed to load wall texture {}: {}, using generated bricks",
                path.display(),
                e
            );
            brick_pattern(FALLBACK_SIZE)
        }
    }
}

/// Light grey bricks with darker mortar. Rows of bricks are offset by half a brick.
pub fn brick_pattern(size: u32) -> image::RgbaImage {
    let brick_height = (size / 4).max(2);
    let brick_width = (size / 2).max(2);
    image::RgbaImage::from_fn(size, size, |x, y| {
        let row = y / brick_height;
        let shifted = x + (row % 2) * brick_width / 2;
        let mortar = y % brick_height == 0 || shifted % brick_width == 0;
        if mortar {
            image::Rgba([120, 115, 110, 255])
        } else {
            // Slight per-brick variation so the wall does not look flat.
            let shade = 215 + ((shifted / brick_width + row * 3) % 4) as u8 * 10;
            image::Rgba([shade, shade - 8, shade - 16, 255])
        }
    })
}

/// GPU copy of the wall texture plus its sampler, bound as group 1 of the room pipeline.
pub struct WallTexture {
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl WallTexture {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, img: &image::RgbaImage) -> Self {
        let dimensions = img.dimensions();
        let texture_size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Wall Texture"),
            size: texture_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            img,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: Some(dimensions.1),
            },
            texture_size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Wall Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = BindGroupLayoutBuilder::new(device)
            .with_label("Wall Texture Layout")
            .with_texture(0, wgpu::ShaderStages::FRAGMENT)
            .with_sampler(1, wgpu::ShaderStages::FRAGMENT)
            .build();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Wall Texture Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            bind_group_layout,
            bind_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_bricks() {
        let img = load_or_fallback(Path::new("no/such/texture.png"));
        assert_eq!(img.dimensions(), (FALLBACK_SIZE, FALLBACK_SIZE));
        assert_eq!(img, brick_pattern(FALLBACK_SIZE));
    }

    #[test]
    fn bricks_have_mortar_lines() {
        let img = brick_pattern(64);
        assert_eq!(img.get_pixel(5, 0).0, [120, 115, 110, 255]);
        assert_ne!(img.get_pixel(5, 5).0, [120, 115, 110, 255]);
        assert!(img.pixels().all(|p| p.0[3] == 255));
    }
}
