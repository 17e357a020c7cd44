use image::RgbaImage;

/// A binary image. Foreground pixels are candidate road pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Mask {
        Mask {
            width,
            height,
            pixels: vec![false; num_pixels(width, height)],
        }
    }

    /// Foreground iff the red channel is strictly above the threshold.
    pub fn binarize(img: &RgbaImage, threshold: f64) -> Mask {
        let (width, height) = img.dimensions();
        Mask {
            width,
            height,
            pixels: img.pixels().map(|px| px.0[0] as f64 > threshold).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.pixels[self.idx(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let idx = self.idx(x, y);
        self.pixels[idx] = value;
    }

    pub fn count(&self) -> usize {
        self.pixels.iter().filter(|x| **x).count()
    }

    /// How many of the 8 surrounding pixels are foreground
    pub fn neighbors(&self, x: u32, y: u32) -> usize {
        let mut count = 0;
        for dy in -1_i64..=1 {
            for dx in -1_i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                if nx >= 0 && ny >= 0 && self.get(nx as u32, ny as u32) {
                    count += 1;
                }
            }
        }
        count
    }

    /// A crude thinning pass, not a real skeletonization: an interior foreground pixel survives
    /// only if 2 to 6 of its neighbors are also foreground. Isolated pixels, line ends, and the
    /// middle of thick blobs all disappear. Border pixels are always dropped. Later road
    /// classification depends on this exact output, so don't swap in a smarter algorithm.
    pub fn skeletonize(&self) -> Mask {
        let mut out = Mask::new(self.width, self.height);
        if self.width < 3 || self.height < 3 {
            return out;
        }
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                if self.get(x, y) && (2..=6).contains(&self.neighbors(x, y)) {
                    out.set(x, y, true);
                }
            }
        }
        out
    }

    fn idx(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Multiplies in usize, since the product of two u32 dimensions can overflow u32
fn num_pixels(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
