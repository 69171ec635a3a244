// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The two pixel types a carve runs over.
//!
//! A run is either single-channel 8-bit grayscale or three-channel
//! 8-bit RGB, fixed for its whole length.  The few places where the two
//! genuinely differ (how a removed seam is painted, how the frame is
//! handed to an encoder) live behind this trait so that the carver
//! itself can stay generic.

use image::{DynamicImage, ImageBuffer, Luma, Pixel, Rgb};

/// The frame type threaded through every iteration of a carve.
pub type Frame<P> = ImageBuffer<P, Vec<u8>>;

pub trait SeamPixel: Pixel<Subpixel = u8> + 'static {
    /// True for three-channel color pixels.
    const IS_COLOR: bool;

    /// The value painted over seam pixels in a visualization frame.
    fn seam_marker() -> Self;

    /// Hand a frame over to the encoders.
    fn into_dynamic(frame: Frame<Self>) -> DynamicImage;
}

impl SeamPixel for Luma<u8> {
    const IS_COLOR: bool = false;

    // Black: a grayscale frame has no red to offer.
    fn seam_marker() -> Self {
        Luma([0])
    }

    fn into_dynamic(frame: Frame<Self>) -> DynamicImage {
        DynamicImage::ImageLuma8(frame)
    }
}

impl SeamPixel for Rgb<u8> {
    const IS_COLOR: bool = true;

    fn seam_marker() -> Self {
        Rgb([255, 0, 0])
    }

    fn into_dynamic(frame: Frame<Self>) -> DynamicImage {
        DynamicImage::ImageRgb8(frame)
    }
}
