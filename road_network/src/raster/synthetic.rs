use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

const BACKGROUND: (u8, u8) = (60, 80);
const STREET: u8 = 230;
const STREET_WIDTH: u32 = 4;

/// Stands in for aerial imagery: a dim, slightly noisy background crossed by a bright street
/// grid. The same seed always gives the same image.
pub fn synthesize_image(width: u32, height: u32, seed: u64) -> RgbaImage {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let mut img = RgbaImage::from_fn(width, height, |_, _| {
        let v = rng.gen_range(BACKGROUND.0..=BACKGROUND.1);
        Rgba([v, v, v, 255])
    });

    // Streets every quarter of the image, with a random jitter so different seeds differ
    let spacing_x = (width / 4).max(1);
    let spacing_y = (height / 4).max(1);
    let jitter_x = rng.gen_range(0..=spacing_x / 4);
    let jitter_y = rng.gen_range(0..=spacing_y / 4);

    for (x, y, px) in img.enumerate_pixels_mut() {
        let on_vertical = (x + jitter_x) % spacing_x < STREET_WIDTH && x >= STREET_WIDTH;
        let on_horizontal = (y + jitter_y) % spacing_y < STREET_WIDTH && y >= STREET_WIDTH;
        if on_vertical || on_horizontal {
            *px = Rgba([STREET, STREET, STREET, 255]);
        }
    }
    img
}
