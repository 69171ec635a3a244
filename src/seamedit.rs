// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Extract, draw, and remove a seam
//!
//! A seam is a list of x-coordinates, one per row from the top down,
//! where neighbouring rows never differ by more than one column.

use crate::pixel::{Frame, SeamPixel};
use crate::seamfinder::CostTable;
use image::{GenericImageView, ImageBuffer, Pixel, Primitive};

/// Walk the backpointers up from `origin` in the bottom row, and
/// return the seam top to bottom.
pub fn trace_seam(table: &CostTable, origin: u32) -> Vec<u32> {
    let (_, height) = table.dimensions();
    let mut seam_col = origin;
    (0..height)
        .rev()
        .fold(Vec::<u32>::with_capacity(height as usize), |mut acc, y| {
            acc.push(seam_col);
            if y > 0 {
                seam_col = table.parent(seam_col, y);
            }
            acc
        })
        .into_iter()
        .rev()
        .collect()
}

/// A copy of `image` one column narrower, with the pixel at
/// `(seam[y], y)` taken out of every row.  Row order and channel
/// layout are untouched.
pub fn remove_vertical_seam<I, P, S>(image: &I, seam: &[u32]) -> ImageBuffer<P, Vec<S>>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S> + 'static,
    S: Primitive + 'static,
{
    let (width, height) = image.dimensions();
    debug_assert_eq!(seam.len(), height as usize);
    ImageBuffer::from_fn(width - 1, height, |x, y| {
        let source_x = if x < seam[y as usize] { x } else { x + 1 };
        image.get_pixel(source_x, y)
    })
}

/// A copy of `frame` with the seam painted over: red for color, black
/// for grayscale.
pub fn draw_seam<P: SeamPixel>(frame: &Frame<P>, seam: &[u32]) -> Frame<P> {
    let mut marked = frame.clone();
    let marker = P::seam_marker();
    for (y, x) in seam.iter().enumerate() {
        marked.put_pixel(*x, y as u32, marker);
    }
    marked
}
