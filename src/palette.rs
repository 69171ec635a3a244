// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Dominant color extraction
//!
//! ColorThief's modified median cut quantizer.  Sampled pixels are
//! dropped into a 5-bit-per-channel histogram; the box enclosing them
//! is repeatedly cut across its longest axis, first choosing the most
//! populous box, then the box with the largest population × volume.
//! The dominant color is the average color of the box that ranks
//! highest by population × volume once the palette is full.

use crate::errors::{CarveError, Result};
use image::RgbImage;
use log::debug;
use std::path::Path;

/// Anything that can summarize a stored image as a single color.
pub trait DominantColor {
    fn dominant_color(&self, source: &Path) -> Result<[u8; 3]>;
}

const SIGBITS: u32 = 5;
const RSHIFT: u32 = 8 - SIGBITS;
const SIDE: usize = 1 << SIGBITS;
const WHITE: u8 = 250;

// Share of the palette built by cutting the most populous box.
const POPULATION_PHASE: f64 = 0.75;

fn hist_index(r: usize, g: usize, b: usize) -> usize {
    (r << (2 * SIGBITS)) | (g << SIGBITS) | b
}

/// An inclusive box in quantized color space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColorBox {
    lo: [usize; 3],
    hi: [usize; 3],
    population: u64,
}

impl ColorBox {
    // The smallest box around every populated cell inside `lo..=hi`,
    // or None if there aren't any.
    fn fit(lo: [usize; 3], hi: [usize; 3], histogram: &[u64]) -> Option<ColorBox> {
        let mut tight_lo = [SIDE; 3];
        let mut tight_hi = [0; 3];
        let mut population = 0;
        for r in lo[0]..=hi[0] {
            for g in lo[1]..=hi[1] {
                for b in lo[2]..=hi[2] {
                    let count = histogram[hist_index(r, g, b)];
                    if count == 0 {
                        continue;
                    }
                    population += count;
                    for (axis, v) in [r, g, b].iter().enumerate() {
                        tight_lo[axis] = tight_lo[axis].min(*v);
                        tight_hi[axis] = tight_hi[axis].max(*v);
                    }
                }
            }
        }
        if population == 0 {
            None
        } else {
            Some(ColorBox {
                lo: tight_lo,
                hi: tight_hi,
                population,
            })
        }
    }

    fn volume(&self) -> u64 {
        (0..3).map(|a| (self.hi[a] - self.lo[a] + 1) as u64).product()
    }

    fn priority(&self) -> u64 {
        self.population * self.volume()
    }

    fn average(&self, histogram: &[u64]) -> [u8; 3] {
        let mult = f64::from(1u32 << RSHIFT);
        let mut sums = [0.0f64; 3];
        for r in self.lo[0]..=self.hi[0] {
            for g in self.lo[1]..=self.hi[1] {
                for b in self.lo[2]..=self.hi[2] {
                    let count = histogram[hist_index(r, g, b)] as f64;
                    for (axis, v) in [r, g, b].iter().enumerate() {
                        sums[axis] += count * (*v as f64 + 0.5) * mult;
                    }
                }
            }
        }
        let total = self.population as f64;
        let mut color = [0u8; 3];
        for (axis, c) in color.iter_mut().enumerate() {
            let mean = if total > 0.0 {
                sums[axis] / total
            } else {
                (self.lo[axis] + self.hi[axis] + 1) as f64 * mult / 2.0
            };
            *c = mean.min(255.0) as u8;
        }
        color
    }

    // Population of every slice across `axis`, lowest first.
    fn slices(&self, axis: usize, histogram: &[u64]) -> Vec<u64> {
        (self.lo[axis]..=self.hi[axis])
            .map(|slice| {
                let (mut lo, mut hi) = (self.lo, self.hi);
                lo[axis] = slice;
                hi[axis] = slice;
                ColorBox::fit(lo, hi, histogram).map_or(0, |b| b.population)
            })
            .collect()
    }

    // Cut along the longest axis.  The cut starts at the slice that
    // takes the running population past half, then moves halfway into
    // the longer side, then slides until neither half is empty.  The
    // halves keep the parent's bounds on the other two axes.  None if
    // no such cut exists.
    fn split(&self, histogram: &[u64]) -> Option<(ColorBox, ColorBox)> {
        if self.volume() == 1 {
            return None;
        }
        let axis = (0..3)
            .max_by_key(|a| (self.hi[*a] - self.lo[*a], 3 - *a))
            .unwrap_or(0);
        let (lo, hi) = (self.lo[axis] as i64, self.hi[axis] as i64);

        let mut partial = Vec::new();
        let mut running = 0;
        for count in self.slices(axis, histogram) {
            running += count;
            partial.push(running);
        }
        let total = running;
        let at = |i: i64| partial[(i - lo) as usize];

        let median = (lo..=hi).find(|i| at(*i) * 2 > total)?;
        let (left, right) = (median - lo, hi - median);
        let mut cut = if left <= right {
            (hi - 1).min(median + right / 2)
        } else {
            lo.max((median as f64 - 1.0 - left as f64 / 2.0) as i64)
        };
        while at(cut) == 0 {
            cut += 1;
        }
        while total - at(cut) == 0 && cut > lo && at(cut - 1) != 0 {
            cut -= 1;
        }
        if cut >= hi || total == at(cut) {
            return None;
        }

        let cut = cut as usize;
        let mut first = *self;
        first.hi[axis] = cut;
        first.population = at(cut as i64);
        let mut second = *self;
        second.lo[axis] = cut + 1;
        second.population = total - first.population;
        Some((first, second))
    }
}

/// ColorThief-style dominant color finder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedianCut {
    /// How many boxes to cut the color space into.
    pub palette_size: usize,
    /// Sample every `quality`th pixel; 1 looks at all of them.
    pub quality: usize,
}

impl Default for MedianCut {
    fn default() -> Self {
        MedianCut {
            palette_size: 5,
            quality: 1,
        }
    }
}

impl MedianCut {
    pub fn new(palette_size: usize, quality: usize) -> Self {
        MedianCut {
            palette_size: palette_size.max(1),
            quality: quality.max(1),
        }
    }

    fn histogram(&self, image: &RgbImage) -> Vec<u64> {
        let sampled: Vec<[u8; 3]> = image
            .pixels()
            .step_by(self.quality)
            .map(|p| p.0)
            .collect();
        let colored = sampled.iter().any(|p| p.iter().any(|c| *c <= WHITE));

        let mut histogram = vec![0; SIDE * SIDE * SIDE];
        for p in sampled.iter() {
            // Near-white pixels are background more often than not.
            // Only when nothing else is left do they count.
            if colored && p.iter().all(|c| *c > WHITE) {
                continue;
            }
            let [r, g, b] = *p;
            histogram[hist_index(
                (r >> RSHIFT) as usize,
                (g >> RSHIFT) as usize,
                (b >> RSHIFT) as usize,
            )] += 1;
        }
        histogram
    }

    /// The palette, best first, as (color, population) pairs.
    pub fn palette(&self, image: &RgbImage) -> Vec<([u8; 3], u64)> {
        let histogram = self.histogram(image);
        let whole = match ColorBox::fit([0; 3], [SIDE - 1; 3], &histogram) {
            Some(b) => b,
            None => return Vec::new(),
        };

        let mut boxes = vec![whole];
        let population_target = ((self.palette_size as f64) * POPULATION_PHASE).ceil() as usize;
        self.cut(&mut boxes, population_target, &histogram, |b| b.population);
        self.cut(&mut boxes, self.palette_size, &histogram, ColorBox::priority);

        boxes.sort_by(|a, b| b.priority().cmp(&a.priority()));
        boxes
            .iter()
            .map(|b| (b.average(&histogram), b.population))
            .collect()
    }

    // Keep cutting the highest-ranked splittable box until there are
    // `target` boxes or nothing left to cut.
    fn cut<F>(&self, boxes: &mut Vec<ColorBox>, target: usize, histogram: &[u64], rank: F)
    where
        F: Fn(&ColorBox) -> u64,
    {
        let mut whole = vec![false; boxes.len()];
        while boxes.len() < target {
            let candidate = boxes
                .iter()
                .enumerate()
                .filter(|(i, b)| !whole[*i] && b.volume() > 1)
                .max_by_key(|(i, b)| (rank(*b), std::cmp::Reverse(*i)))
                .map(|(i, _)| i);
            let index = match candidate {
                Some(i) => i,
                None => break,
            };
            match boxes[index].split(histogram) {
                Some((first, second)) => {
                    boxes[index] = first;
                    boxes.push(second);
                    whole.push(false);
                }
                None => whole[index] = true,
            }
        }
    }

    /// The single most representative color of an image.
    pub fn dominant_of(&self, image: &RgbImage) -> Option<[u8; 3]> {
        self.palette(image).first().map(|(color, _)| *color)
    }
}

impl DominantColor for MedianCut {
    fn dominant_color(&self, source: &Path) -> Result<[u8; 3]> {
        let image = image::open(source)
            .map_err(|e| CarveError::image(source, e))?
            .to_rgb8();
        let color = self.dominant_of(&image).ok_or_else(|| {
            CarveError::config(format!("{:?} has no pixels to take a color from", source))
        })?;
        debug!("dominant color of {:?} is {:?}", source, color);
        Ok(color)
    }
}
