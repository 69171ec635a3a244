// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the energy of an image
//!
//! The energy of a pixel is how much visual information would be lost
//! by removing it.  Here that is the gradient strength: the sum of the
//! absolute horizontal and vertical responses of a 3×3 Sobel operator,
//! computed independently for every channel.  A grayscale image gets
//! one energy per pixel, a color image gets three.

use crate::plane::Plane;
use image::{GenericImageView, GrayImage, Luma, Pixel, Primitive};
use itertools::iproduct;

/// Per-pixel, per-channel energy.  Never negative.
pub type EnergyMap = Plane<f64>;

const SMOOTH: [f64; 3] = [1.0, 2.0, 1.0];
const DERIVE: [f64; 3] = [-1.0, 0.0, 1.0];

// Border pixels borrow from their mirror image, not counting the edge
// itself twice: -1 reads 1, n reads n - 2.
fn reflect(i: i64, n: i64) -> u32 {
    if n == 1 {
        return 0;
    }
    let r = if i < 0 {
        -i
    } else if i >= n {
        2 * n - 2 - i
    } else {
        i
    };
    r as u32
}

// Every channel of every pixel, widened to f64.
pub(crate) fn samples<I, P, S>(image: &I) -> Plane<f64>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let (width, height) = image.dimensions();
    let mut samples = Plane::new(width, height, u32::from(P::CHANNEL_COUNT));
    for (y, x) in iproduct!(0..height, 0..width) {
        let pixel = image.get_pixel(x, y);
        for (cell, c) in samples[(x, y)].iter_mut().zip(pixel.channels()) {
            *cell = <f64 as num_traits::NumCast>::from(*c).unwrap_or(0.0);
        }
    }
    samples
}

/// Compute the energy of every pixel in an image.  Generic on the
/// image type; the returned map has as many channels as the pixel
/// type does.  Pure: calling it twice on the same image gives the same
/// map, bit for bit.
pub fn calculate_energy<I, P, S>(image: &I) -> EnergyMap
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let source = samples(image);
    let (width, height) = source.dimensions();
    let (w, h) = (i64::from(width), i64::from(height));
    let mut emap = EnergyMap::new(width, height, source.channels);

    for (y, x) in iproduct!(0..height, 0..width) {
        let (xi, yi) = (i64::from(x), i64::from(y));
        for c in 0..source.channels as usize {
            let (mut gx, mut gy) = (0.0, 0.0);
            for (dy, dx) in iproduct!(0..3usize, 0..3usize) {
                let sx = reflect(xi + dx as i64 - 1, w);
                let sy = reflect(yi + dy as i64 - 1, h);
                let s = source[(sx, sy)][c];
                gx += SMOOTH[dy] * DERIVE[dx] * s;
                gy += DERIVE[dy] * SMOOTH[dx] * s;
            }
            emap[(x, y)][c] = gx.abs() + gy.abs();
        }
    }
    emap
}

/// Render an energy map as an 8-bit grayscale image, channel energies
/// summed per pixel and scaled so the strongest pixel is white.
pub fn energy_to_image(energy: &EnergyMap) -> GrayImage {
    let (width, height) = energy.dimensions();
    let totals: Vec<f64> = energy
        .as_slice()
        .chunks(energy.channels as usize)
        .map(|cell| cell.iter().sum())
        .collect();
    let factor = totals.iter().cloned().fold(0.0, f64::max);

    GrayImage::from_fn(width, height, |x, y| {
        let total = totals[(y as usize) * (width as usize) + (x as usize)];
        if factor > 0.0 {
            Luma([(total * 255.0 / factor).round().min(255.0) as u8])
        } else {
            Luma([0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    // A hard vertical edge down the right-hand column.
    const STEP_DATA: [u8; 9] = [0, 0, 9, 0, 0, 9, 0, 0, 9];

    #[test]
    fn energy_generator_works() {
        let buf: ImageBuffer<Luma<u8>, _> = ImageBuffer::from_raw(3, 3, &STEP_DATA[..]).unwrap();
        let energy = calculate_energy(&buf);
        assert_eq!(energy.channels, 1);
        assert_eq!(
            energy.as_slice(),
            &[0.0, 36.0, 0.0, 0.0, 36.0, 0.0, 0.0, 36.0, 0.0]
        );
    }

    #[test]
    fn flat_images_have_no_energy() {
        let buf: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(4, 3, Rgb([40, 80, 120]));
        let energy = calculate_energy(&buf);
        assert_eq!(energy.channels, 3);
        assert!(energy.as_slice().iter().all(|e| *e == 0.0));
    }

    #[test]
    fn energy_is_rederived_identically() {
        let buf: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(5, 4, |x, y| Rgb([(x * 37) as u8, (y * 53) as u8, (x * y) as u8]));
        assert_eq!(calculate_energy(&buf), calculate_energy(&buf));
    }

    #[test]
    fn replicated_color_matches_grayscale_per_channel() {
        let gray: ImageBuffer<Luma<u8>, _> = ImageBuffer::from_raw(3, 3, &STEP_DATA[..]).unwrap();
        let color: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(3, 3, |x, y| Rgb([gray.get_pixel(x, y)[0]; 3]));
        let (ge, ce) = (calculate_energy(&gray), calculate_energy(&color));
        for (y, x) in iproduct!(0..3, 0..3) {
            assert!(ce[(x, y)].iter().all(|c| *c == ge[(x, y)][0]));
        }
    }

    #[test]
    fn single_row_images_have_only_horizontal_energy() {
        let buf: ImageBuffer<Luma<u8>, _> = ImageBuffer::from_raw(3, 1, vec![0u8, 0, 9]).unwrap();
        let energy = calculate_energy(&buf);
        assert_eq!(energy.as_slice(), &[0.0, 36.0, 0.0]);
    }

    #[test]
    fn energy_image_scales_to_the_brightest_pixel() {
        let energy = EnergyMap::from_raw(3, 1, 1, vec![0.0, 50.0, 100.0]).unwrap();
        let rendered = energy_to_image(&energy);
        assert_eq!(rendered.into_raw(), vec![0, 128, 255]);
    }
}
