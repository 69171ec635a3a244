// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Find the least-cost vertical seam
//!
//! The classic dynamic program: the first row of the cost table is the
//! cost map's first row, and every later cell adds its own cost to the
//! cheapest of the two or three cells touching it in the row above,
//! remembering which one that was.  Cells may hold one value or one
//! per channel; candidates are ranked by the magnitude of their
//! accumulated cost vector, and on an exact tie the leftmost wins.
//!
//! Each row depends only on the row above, but the cells of one row
//! are independent of each other.  With the `threaded` feature a row
//! is cut into spans of columns and the spans are filled concurrently.

use crate::errors::{CarveError, Result};
use crate::plane::Plane;
use std::ops::RangeInclusive;

/// The accumulated cost of the cheapest seam ending at each cell, and
/// for every cell below the first row, the column in the row above
/// that seam came through.
#[derive(Debug, Clone)]
pub struct CostTable {
    pub costs: Plane<f64>,
    pub parents: Plane<u32>,
}

/// The ranking magnitude of an accumulated cost cell.  Squared, unless
/// the `square_root` feature asks for the true Euclidean norm; the two
/// order cells identically.
#[cfg(not(feature = "square_root"))]
#[inline]
pub fn magnitude(cell: &[f64]) -> f64 {
    cell.iter().map(|c| c * c).sum()
}

#[cfg(feature = "square_root")]
#[inline]
pub fn magnitude(cell: &[f64]) -> f64 {
    cell.iter().map(|c| c * c).sum::<f64>().sqrt()
}

/// The columns of the row above that can feed column `x`: two at
/// either edge, three everywhere else.
pub fn candidates(x: u32, width: u32) -> RangeInclusive<u32> {
    let first = if x == 0 { 0 } else { x - 1 };
    let last = if x + 1 >= width { x } else { x + 1 };
    first..=last
}

// The candidate with the smallest magnitude; only a strictly smaller
// one displaces an earlier pick, so ties go left.
fn least(columns: RangeInclusive<u32>, row: &[f64], channels: usize) -> u32 {
    let first = *columns.start();
    let cell = |x: u32| &row[x as usize * channels..(x as usize + 1) * channels];
    let (mut best, mut best_magnitude) = (first, magnitude(cell(first)));
    for x in columns.skip(1) {
        let m = magnitude(cell(x));
        if m < best_magnitude {
            best = x;
            best_magnitude = m;
        }
    }
    best
}

// Fill one contiguous span of a row.  `current` starts out holding
// this row's own costs and ends up holding the accumulated ones.
fn fill_span(
    above: &[f64],
    current: &mut [f64],
    parents: &mut [u32],
    first_column: u32,
    width: u32,
    channels: usize,
) {
    for (i, (cell, parent)) in current
        .chunks_mut(channels)
        .zip(parents.iter_mut())
        .enumerate()
    {
        let x = first_column + i as u32;
        let from = least(candidates(x, width), above, channels);
        let origin = from as usize * channels;
        for (c, v) in cell.iter_mut().zip(&above[origin..origin + channels]) {
            *c += *v;
        }
        *parent = from;
    }
}

#[cfg(not(feature = "threaded"))]
fn fill_row(above: &[f64], current: &mut [f64], parents: &mut [u32], width: u32, channels: usize) {
    fill_span(above, current, parents, 0, width, channels);
}

#[cfg(feature = "threaded")]
fn fill_row(above: &[f64], current: &mut [f64], parents: &mut [u32], width: u32, channels: usize) {
    let workers = num_cpus::get().max(1);
    let span = ((width as usize + workers - 1) / workers).max(1);
    let outcome = crossbeam::scope(|s| {
        for (n, (costs, parents)) in current
            .chunks_mut(span * channels)
            .zip(parents.chunks_mut(span))
            .enumerate()
        {
            let first_column = (n * span) as u32;
            s.spawn(move |_| fill_span(above, costs, parents, first_column, width, channels));
        }
    });
    if let Err(panic) = outcome {
        std::panic::resume_unwind(panic);
    }
}

impl CostTable {
    /// Build the cost table and backpointers for a cost map.
    pub fn new(cost_map: &Plane<f64>) -> Self {
        let (width, height) = cost_map.dimensions();
        let channels = cost_map.channels as usize;
        let mut costs = cost_map.clone();
        let mut parents = Plane::new(width, height, 1);

        for y in 1..height {
            let (above, current) = costs.split_rows_mut(y);
            fill_row(above, current, parents.row_mut(y), width, channels);
        }
        CostTable { costs, parents }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.costs.dimensions()
    }

    /// The bottom-row column where the cheapest seam ends.
    pub fn seam_origin(&self) -> u32 {
        let (width, height) = self.dimensions();
        least(
            0..=width.saturating_sub(1),
            self.costs.row(height - 1),
            self.costs.channels as usize,
        )
    }

    /// The column `x`, row `y` seam came through in row `y - 1`.
    pub fn parent(&self, x: u32, y: u32) -> u32 {
        self.parents[(x, y)][0]
    }
}

/// Search a cost map for its cheapest seam, returning the filled table
/// and the column the seam ends at in the bottom row.
pub fn search(cost_map: &Plane<f64>) -> Result<(CostTable, u32)> {
    let (width, height) = cost_map.dimensions();
    if width < 2 || height == 0 {
        return Err(CarveError::Degenerate { width });
    }
    let table = CostTable::new(cost_map);
    let origin = table.seam_origin();
    Ok((table, origin))
}
