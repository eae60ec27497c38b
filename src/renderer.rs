use eframe::egui::{Color32, ColorImage};
use image::RgbaImage;

pub fn render_rgba(image: &RgbaImage) -> ColorImage {
    let (width_px, height_px) = image.dimensions();
    let pixels = image
        .pixels()
        .map(|pixel| {
            let [r, g, b, a] = pixel.0;
            Color32::from_rgba_unmultiplied(r, g, b, a)
        })
        .collect();

    ColorImage {
        size: [width_px as usize, height_px as usize],
        pixels,
    }
}

/// Largest size with the image's aspect ratio that fits in `available`.
pub fn fit_size(image_size: [usize; 2], available: [f32; 2]) -> [f32; 2] {
    let width = image_size[0].max(1) as f32;
    let height = image_size[1].max(1) as f32;
    let scale = (available[0] / width).min(available[1] / height).max(0.0);
    [width * scale, height * scale]
}
