// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Adjustments to the raw energy map
//!
//! Two optional passes sit between the energy calculation and the
//! seam search.  Preservation makes a marked rectangle too expensive
//! to cross whenever any way around exists.  Dominant-color bias
//! rescales the energy into z-scores and adds a small share of each
//! pixel's (also z-scored) squared distance from the source image's
//! dominant color.

use crate::config::Region;
use crate::energy::{samples, EnergyMap};
use crate::plane::Plane;
use image::{GenericImageView, Pixel, Primitive};
use itertools::iproduct;

/// One flag per pixel; true means "keep this".  Shrinks in lockstep
/// with the image it was built for.
pub type PreservationMask = Plane<bool>;

/// Mark every pixel of `region` in a fresh `width` × `height` mask.
/// Any part of the region outside the mask is ignored.
pub fn preservation_mask(width: u32, height: u32, region: &Region) -> PreservationMask {
    let mut mask = PreservationMask::new(width, height, 1);
    for (y, x) in iproduct!(0..height, 0..width) {
        mask[(x, y)][0] = region.contains(x, y);
    }
    mask
}

/// Add `penalty` to every channel of every preserved pixel.
pub fn apply_preservation(
    mut energy: EnergyMap,
    mask: &PreservationMask,
    penalty: f64,
) -> EnergyMap {
    debug_assert_eq!(energy.dimensions(), mask.dimensions());
    let (width, height) = energy.dimensions();
    for (y, x) in iproduct!(0..height, 0..width) {
        if mask[(x, y)][0] {
            energy[(x, y)].iter_mut().for_each(|e| *e += penalty);
        }
    }
    energy
}

/// Rescale every channel independently to zero mean and unit
/// (population) standard deviation.  A single-channel plane is thus
/// normalized over the whole map.  A channel with no spread at all
/// becomes all zeros.
pub fn zscore(mut plane: Plane<f64>) -> Plane<f64> {
    let channels = plane.channels as usize;
    let count = (plane.width as usize * plane.height as usize) as f64;
    if count == 0.0 {
        return plane;
    }

    for c in 0..channels {
        let mean = plane.as_slice().iter().skip(c).step_by(channels).sum::<f64>() / count;
        let variance = plane
            .as_slice()
            .iter()
            .skip(c)
            .step_by(channels)
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / count;
        let deviation = variance.sqrt();
        for v in plane.as_mut_slice().iter_mut().skip(c).step_by(channels) {
            *v = if deviation > 0.0 {
                (*v - mean) / deviation
            } else {
                0.0
            };
        }
    }
    plane
}

/// Squared per-channel distance of every pixel from `dominant`.
pub fn color_distance<I, P, S>(image: &I, dominant: [u8; 3]) -> Plane<f64>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let mut distance = samples(image);
    let channels = distance.channels as usize;
    for (i, v) in distance.as_mut_slice().iter_mut().enumerate() {
        let d = *v - f64::from(dominant[(i % channels) % 3]);
        *v = d * d;
    }
    distance
}

/// Replace the energy map with `z(energy) + weight × z(distance)`, where
/// distance is each pixel's squared distance from the dominant color.
pub fn apply_dominant_bias<I, P, S>(
    energy: EnergyMap,
    image: &I,
    dominant: [u8; 3],
    weight: f64,
) -> Plane<f64>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let mut biased = zscore(energy);
    let distance = zscore(color_distance(image, dominant));
    biased
        .as_mut_slice()
        .iter_mut()
        .zip(distance.as_slice())
        .for_each(|(e, d)| *e += weight * d);
    biased
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PRESERVATION_PENALTY;
    use image::{ImageBuffer, Rgb};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn preservation_penalizes_only_the_region() {
        let mask = preservation_mask(4, 3, &Region::new(1, 2, 1, 2));
        let energy = EnergyMap::from_raw(4, 3, 3, vec![1.0; 36]).unwrap();
        let biased = apply_preservation(energy, &mask, PRESERVATION_PENALTY);
        for (y, x) in iproduct!(0..3, 0..4) {
            let expected = if (1..=2).contains(&x) && (1..=2).contains(&y) {
                1.0 + PRESERVATION_PENALTY
            } else {
                1.0
            };
            assert!(biased[(x, y)].iter().all(|e| *e == expected), "at {:?}", (x, y));
        }
    }

    #[test]
    fn mask_follows_the_seam() {
        let mask = preservation_mask(3, 2, &Region::new(2, 2, 0, 1));
        let narrowed = mask.without_seam(&[0, 1]);
        assert_eq!(narrowed.as_slice(), &[false, true, false, true]);
    }

    #[test]
    fn zscore_of_a_single_channel() {
        let plane = Plane::from_raw(2, 2, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let normal = zscore(plane);
        let deviation = 1.25f64.sqrt();
        let expected = [-1.5 / deviation, -0.5 / deviation, 0.5 / deviation, 1.5 / deviation];
        for (got, want) in normal.as_slice().iter().zip(expected.iter()) {
            assert!(close(*got, *want), "{} != {}", got, want);
        }
    }

    #[test]
    fn zscore_treats_channels_independently() {
        // Channel 0 is flat, channel 1 is 0/10, channel 2 is 5/7.
        let plane = Plane::from_raw(2, 1, 3, vec![3.0, 0.0, 5.0, 3.0, 10.0, 7.0]).unwrap();
        let normal = zscore(plane);
        assert_eq!(&normal[(0, 0)][..1], &[0.0]);
        assert!(close(normal[(0, 0)][1], -1.0));
        assert!(close(normal[(1, 0)][1], 1.0));
        assert!(close(normal[(0, 0)][2], -1.0));
        assert!(close(normal[(1, 0)][2], 1.0));
    }

    #[test]
    fn pixels_near_the_dominant_color_cost_least() {
        let image: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(3, 1, |x, _| match x {
            0 => Rgb([200, 10, 10]),
            1 => Rgb([20, 20, 20]),
            _ => Rgb([90, 90, 250]),
        });
        let flat = EnergyMap::new(3, 1, 3);
        let biased = apply_dominant_bias(flat, &image, [20, 20, 20], 0.1);
        let norms: Vec<f64> = (0..3)
            .map(|x| biased[(x, 0)].iter().sum::<f64>())
            .collect();
        assert!(norms[1] < norms[0]);
        assert!(norms[1] < norms[2]);
    }

    #[test]
    fn bias_is_normalized_energy_plus_weighted_normalized_distance() {
        let image: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_fn(5, 4, |x, y| {
            Rgb([(x * 50) as u8, (y * 60 + x * 7) as u8, ((x * y * 13) % 256) as u8])
        });
        let energy = crate::energy::calculate_energy(&image);
        let dominant = [60, 30, 90];
        let normal_energy = zscore(energy.clone());
        let normal_distance = zscore(color_distance(&image, dominant));

        let mut results = Vec::new();
        for weight in &[0.1, 2.5] {
            let biased = apply_dominant_bias(energy.clone(), &image, dominant, *weight);
            assert_eq!(biased.dimensions(), (5, 4));
            for ((got, e), d) in biased
                .as_slice()
                .iter()
                .zip(normal_energy.as_slice())
                .zip(normal_distance.as_slice())
            {
                assert!(close(*got, e + weight * d), "{} != {} + {} × {}", got, e, weight, d);
            }
            results.push(biased);
        }
        assert_ne!(results[0], results[1]);
        assert_ne!(normal_energy, energy);
    }

    #[test]
    fn distance_is_squared_per_channel() {
        let image: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(1, 1, Rgb([10, 20, 30]));
        let distance = color_distance(&image, [13, 20, 25]);
        assert_eq!(&distance[(0, 0)], &[9.0, 0.0, 25.0]);
    }
}
