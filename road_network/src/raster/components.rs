use crate::raster::mask::Mask;

/// Components smaller than this are noise.
pub const MIN_COMPONENT_PIXELS: usize = 6;

/// 8-connected groups of foreground pixels, found by flood filling from each unvisited pixel in
/// row-major order. Pixels within a component are in the order the fill reached them.
pub fn connected_components(mask: &Mask) -> Vec<Vec<(u32, u32)>> {
    let (width, height) = (mask.width(), mask.height());
    let mut visited = Mask::new(width, height);
    let mut components = Vec::new();
    let mut noise = 0;

    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) || visited.get(x, y) {
                continue;
            }

            let mut component = Vec::new();
            let mut stack = vec![(x, y)];
            visited.set(x, y, true);
            while let Some((cx, cy)) = stack.pop() {
                component.push((cx, cy));
                for dy in -1_i64..=1 {
                    for dx in -1_i64..=1 {
                        let (nx, ny) = (cx as i64 + dx, cy as i64 + dy);
                        if nx < 0 || ny < 0 {
                            continue;
                        }
                        let (nx, ny) = (nx as u32, ny as u32);
                        if mask.get(nx, ny) && !visited.get(nx, ny) {
                            visited.set(nx, ny, true);
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            if component.len() < MIN_COMPONENT_PIXELS {
                noise += 1;
            } else {
                components.push(component);
            }
        }
    }
    debug!(
        "{} connected components, ignoring {} tiny ones",
        components.len(),
        noise
    );
    components
}
