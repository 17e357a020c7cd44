use image::{Rgba, RgbaImage};

const GAUSSIAN: [[u32; 3]; 3] = [[1, 2, 1], [2, 4, 2], [1, 2, 1]];
const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Luma replicated into RGB. Alpha is untouched.
pub fn grayscale(img: &RgbaImage) -> RgbaImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        let [r, g, b, a] = px.0;
        let gray = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64)
            .round()
            .min(255.0) as u8;
        *px = Rgba([gray, gray, gray, a]);
    }
    out
}

/// 3x3 Gaussian blur over each color channel. The 1-pixel border keeps its input value.
pub fn blur(img: &RgbaImage) -> RgbaImage {
    let mut out = img.clone();
    let (width, height) = img.dimensions();
    if width < 3 || height < 3 {
        return out;
    }
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sum = [0u32; 3];
            for (dy, row) in GAUSSIAN.iter().enumerate() {
                for (dx, weight) in row.iter().enumerate() {
                    let px = img.get_pixel(x + dx as u32 - 1, y + dy as u32 - 1);
                    for c in 0..3 {
                        sum[c] += weight * px.0[c] as u32;
                    }
                }
            }
            let px = out.get_pixel_mut(x, y);
            for c in 0..3 {
                px.0[c] = (sum[c] as f64 / 16.0).round() as u8;
            }
        }
    }
    out
}

/// Gradient magnitude of the red channel (so run `grayscale` first), clamped to 255. The 1-pixel
/// border becomes black. Alpha is untouched.
pub fn sobel(img: &RgbaImage) -> RgbaImage {
    let (width, height) = img.dimensions();
    let mut out = img.clone();
    for px in out.pixels_mut() {
        px.0[0] = 0;
        px.0[1] = 0;
        px.0[2] = 0;
    }
    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut gx = 0;
            let mut gy = 0;
            for dy in 0..3 {
                for dx in 0..3 {
                    let value = img.get_pixel(x + dx - 1, y + dy - 1).0[0] as i32;
                    gx += SOBEL_X[dy as usize][dx as usize] * value;
                    gy += SOBEL_Y[dy as usize][dx as usize] * value;
                }
            }
            let magnitude = ((gx * gx + gy * gy) as f64).sqrt().round().min(255.0) as u8;
            let px = out.get_pixel_mut(x, y);
            px.0[0] = magnitude;
            px.0[1] = magnitude;
            px.0[2] = magnitude;
        }
    }
    out
}
