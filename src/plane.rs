// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Addressable two-dimensional fields
//!
//! Every intermediate product of a carve (the energy map, the
//! cumulative cost table, the backpointers, the preservation mask)
//! is a width × height grid of cells, where a cell is one value per
//! channel.  Grayscale work has one channel per cell, color work has
//! three.  Indexing a plane by `(x, y)` yields the cell as a slice,
//! so the algorithms never have to ask how many channels they hold.

use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, PartialEq)]
pub struct Plane<T: Default + Copy> {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    data: Vec<T>,
}

impl<T: Default + Copy> Plane<T> {
    /// A plane of default-valued cells.
    pub fn new(width: u32, height: u32, channels: u32) -> Self {
        Plane {
            width,
            height,
            channels,
            data: vec![T::default(); width as usize * height as usize * channels as usize],
        }
    }

    /// Wrap an existing row-major buffer.  Returns `None` if the
    /// buffer length does not match the dimensions.
    pub fn from_raw(width: u32, height: u32, channels: u32, data: Vec<T>) -> Option<Self> {
        if data.len() != width as usize * height as usize * channels as usize {
            return None;
        }
        Some(Plane {
            width,
            height,
            channels,
            data,
        })
    }

    // Keep the index math in exactly one place.
    fn get_index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * self.channels as usize
    }

    fn row_len(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// All the cells of row `y`, flattened.
    pub fn row(&self, y: u32) -> &[T] {
        let start = self.get_index(0, y);
        &self.data[start..start + self.row_len()]
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [T] {
        let start = self.get_index(0, y);
        let len = self.row_len();
        &mut self.data[start..start + len]
    }

    /// Row `y - 1` for reading alongside row `y` for writing.  The
    /// dynamic program only ever looks one row up.
    pub(crate) fn split_rows_mut(&mut self, y: u32) -> (&[T], &mut [T]) {
        let len = self.row_len();
        let start = self.get_index(0, y);
        let (above, rest) = self.data.split_at_mut(start);
        (&above[start - len..], &mut rest[..len])
    }

    /// A copy of this plane one column narrower, with the cell at
    /// `(seam[y], y)` dropped from every row.
    pub fn without_seam(&self, seam: &[u32]) -> Plane<T> {
        debug_assert_eq!(seam.len(), self.height as usize);
        let channels = self.channels as usize;
        let mut data = Vec::with_capacity(self.data.len() - self.height as usize * channels);
        for (y, &skip) in seam.iter().enumerate() {
            let row = self.row(y as u32);
            let cut = skip as usize * channels;
            data.extend_from_slice(&row[..cut]);
            data.extend_from_slice(&row[cut + channels..]);
        }
        Plane {
            width: self.width - 1,
            height: self.height,
            channels: self.channels,
            data,
        }
    }
}

impl<T: Default + Copy> Index<(u32, u32)> for Plane<T> {
    type Output = [T];

    /// The cell at a pixel address.
    fn index(&self, (x, y): (u32, u32)) -> &[T] {
        let index = self.get_index(x, y);
        &self.data[index..index + self.channels as usize]
    }
}

impl<T: Default + Copy> IndexMut<(u32, u32)> for Plane<T> {
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut [T] {
        let index = self.get_index(x, y);
        let channels = self.channels as usize;
        &mut self.data[index..index + channels]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_channel_slices() {
        let plane = Plane::from_raw(2, 2, 3, (0..12).collect::<Vec<u32>>()).unwrap();
        assert_eq!(&plane[(0, 0)], &[0, 1, 2]);
        assert_eq!(&plane[(1, 0)], &[3, 4, 5]);
        assert_eq!(&plane[(0, 1)], &[6, 7, 8]);
        assert_eq!(plane.row(1), &[6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn from_raw_rejects_mismatched_lengths() {
        assert!(Plane::from_raw(3, 3, 1, vec![0u8; 8]).is_none());
    }

    #[test]
    fn seam_removal_keeps_rows_aligned() {
        let plane = Plane::from_raw(3, 3, 1, (0..9).collect::<Vec<u32>>()).unwrap();
        let narrowed = plane.without_seam(&[0, 1, 2]);
        assert_eq!(narrowed.dimensions(), (2, 3));
        assert_eq!(narrowed.as_slice(), &[1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn split_rows_sees_the_row_above() {
        let mut plane = Plane::from_raw(2, 3, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let (above, current) = plane.split_rows_mut(2);
        assert_eq!(above, &[3, 4]);
        current[0] = above[1];
        assert_eq!(&plane[(0, 2)], &[4]);
    }
}
