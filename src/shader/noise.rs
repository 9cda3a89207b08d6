//! Hash and noise functions for procedural grain.

/// Integer hash function using bit manipulation.
#[inline]
pub fn hash(mut x: u32) -> u32 {
    x = x.wrapping_mul(0x45d9f3b);
    x ^= x >> 16;
    x = x.wrapping_mul(0x45d9f3b);
    x ^= x >> 16;
    x
}

/// Hash a lattice point to a float in [0, 1].
#[inline]
pub fn hash2_f32(x: u32, y: u32, seed: u32) -> f32 {
    let n = hash(
        seed.wrapping_add(x.wrapping_mul(374761393))
            .wrapping_add(y.wrapping_mul(668265263)),
    );
    (n as f32) / (u32::MAX as f32)
}

/// Tileable 2D value noise.
///
/// Lattice coordinates wrap modulo `period`, so the field repeats exactly
/// every `period` units on both axes. Returns a value in [0, 1].
pub fn tile_noise(x: f32, y: f32, period: u32, seed: u32) -> f32 {
    let period = period.max(1) as i64;
    let xi = x.floor() as i64;
    let yi = y.floor() as i64;
    let xf = x - x.floor();
    let yf = y - y.floor();

    let u = xf * xf * (3.0 - 2.0 * xf);
    let v = yf * yf * (3.0 - 2.0 * yf);

    let h = |ix: i64, iy: i64| -> f32 {
        hash2_f32(
            ix.rem_euclid(period) as u32,
            iy.rem_euclid(period) as u32,
            seed,
        )
    };

    let n00 = h(xi, yi);
    let n10 = h(xi + 1, yi);
    let n01 = h(xi, yi + 1);
    let n11 = h(xi + 1, yi + 1);

    let nx0 = n00 * (1.0 - u) + n10 * u;
    let nx1 = n01 * (1.0 - u) + n11 * u;
    nx0 * (1.0 - v) + nx1 * v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash(42), hash(42));
        assert_ne!(hash(42), hash(43));
    }

    #[test]
    fn test_tile_noise_range() {
        for y in 0..40 {
            for x in 0..40 {
                let v = tile_noise(x as f32 * 0.37, y as f32 * 0.37, 8, 7);
                assert!((0.0..=1.0).contains(&v), "out of range: {}", v);
            }
        }
    }

    #[test]
    fn test_tile_noise_wraps() {
        for (x, y) in [(0.25, 0.5), (3.7, 1.1), (7.9, 6.2)] {
            let a = tile_noise(x, y, 8, 3);
            let b = tile_noise(x + 8.0, y, 8, 3);
            let c = tile_noise(x, y + 16.0, 8, 3);
            assert!((a - b).abs() < 1e-5);
            assert!((a - c).abs() < 1e-5);
        }
    }
}
