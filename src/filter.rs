//! Separable Gaussian smoothing of a single channel.
//!
//! Boundary handling clamps to the nearest edge pixel.

use image::{ImageBuffer, Luma};

use crate::Channel;

/// Kernel half-width in standard deviations.
const WIDTH: f32 = 4.0;

/// Largest accepted standard deviation. Its kernel already spans 400 pixels
/// on either side of the center.
pub const MAX_SIGMA: f32 = 100.0;

/// Half of a normalized Gaussian kernel; `mask[0]` is the center tap.
fn gaussian_mask(sigma: f32) -> Vec<f32> {
    let len = (sigma * WIDTH).ceil() as usize + 1;
    let mut mask: Vec<f32> = (0..len)
        .map(|i| {
            let t = i as f32 / sigma;
            (-0.5 * t * t).exp()
        })
        .collect();

    // The mask is mirrored around the center, so the tails count twice.
    let sum = 2.0 * mask[1..].iter().sum::<f32>() + mask[0];
    for m in &mut mask {
        *m /= sum;
    }
    mask
}

/// Convolve along one axis. `get(i)` reads the i-th sample of a line of `n`.
fn convolve_line(
    mask: &[f32],
    n: u32,
    get: impl Fn(u32) -> f32,
    mut put: impl FnMut(u32, f32),
) {
    let last = n as i64 - 1;
    for i in 0..n {
        let mut acc = mask[0] * get(i);
        for (k, m) in mask.iter().enumerate().skip(1) {
            let lo = (i as i64 - k as i64).clamp(0, last) as u32;
            let hi = (i as i64 + k as i64).clamp(0, last) as u32;
            acc += m * (get(lo) + get(hi));
        }
        put(i, acc);
    }
}

/// Smooth `src` with a Gaussian of standard deviation `sigma`.
///
/// `sigma == 0` returns an unfiltered copy. `sigma` must lie in
/// `0.0..=MAX_SIGMA`.
pub fn smooth(src: &Channel, sigma: f32) -> Channel {
    if sigma <= 0.0 {
        return src.clone();
    }
    let mask = gaussian_mask(sigma);
    let (width, height) = src.dimensions();

    let mut rows: Channel = ImageBuffer::new(width, height);
    for y in 0..height {
        convolve_line(
            &mask,
            width,
            |x| src.get_pixel(x, y).0[0],
            |x, v| rows.put_pixel(x, y, Luma([v])),
        );
    }

    let mut out: Channel = ImageBuffer::new(width, height);
    for x in 0..width {
        convolve_line(
            &mask,
            height,
            |y| rows.get_pixel(x, y).0[0],
            |y, v| out.put_pixel(x, y, Luma([v])),
        );
    }
    out
}
