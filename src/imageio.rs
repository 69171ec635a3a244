// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Getting images in and out
//!
//! Decoding, the optional rescale at load time, and the sink that
//! snapshots are written to.  Any format the `image` crate can read
//! is accepted; the snapshot format follows the configured extension.

use crate::errors::{CarveError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, RgbImage};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// The sub-directory visualization frames are written to.
pub const RED_LINE_DIR: &str = "red_line";

/// A decoded source, in the channel layout the run asked for.
#[derive(Debug, Clone)]
pub enum SourceImage {
    Gray(GrayImage),
    Color(RgbImage),
}

impl SourceImage {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            SourceImage::Gray(image) => image.dimensions(),
            SourceImage::Color(image) => image.dimensions(),
        }
    }
}

fn scaled(dimension: u32, scale: f64) -> u32 {
    ((f64::from(dimension) * scale).round() as u32).max(1)
}

/// Decode `path` as 8-bit RGB or 8-bit grayscale, resized by `scale`
/// along both axes with a bilinear filter.
pub fn load_image(path: &Path, is_color: bool, scale: f64) -> Result<SourceImage> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(CarveError::config(format!(
            "the scale factor must be positive, not {}",
            scale
        )));
    }
    let decoded = image::open(path).map_err(|e| CarveError::image(path, e))?;
    let (width, height) = decoded.dimensions();
    let decoded = if (scale - 1.0).abs() > std::f64::EPSILON {
        let (w, h) = (scaled(width, scale), scaled(height, scale));
        debug!("scaling {:?} from {}x{} to {}x{}", path, width, height, w, h);
        decoded.resize_exact(w, h, FilterType::Triangle)
    } else {
        decoded
    };

    Ok(if is_color {
        SourceImage::Color(decoded.to_rgb8())
    } else {
        SourceImage::Gray(decoded.to_luma8())
    })
}

/// Where snapshots go.
pub trait ImageSink {
    /// Called once, before the first frame is saved.  `red_line` says
    /// whether visualization frames will follow.
    fn prepare(&mut self, red_line: bool) -> Result<()>;

    /// Store `image` under the relative name `name`.
    fn save(&mut self, name: &str, image: &DynamicImage) -> Result<()>;
}

/// Writes every snapshot into a fresh directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DirectorySink { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageSink for DirectorySink {
    /// The directory must not already exist.
    fn prepare(&mut self, red_line: bool) -> Result<()> {
        fs::create_dir(&self.root).map_err(|e| CarveError::io(&self.root, e))?;
        if red_line {
            let nested = self.root.join(RED_LINE_DIR);
            fs::create_dir(&nested).map_err(|e| CarveError::io(&nested, e))?;
        }
        Ok(())
    }

    fn save(&mut self, name: &str, image: &DynamicImage) -> Result<()> {
        let path = self.root.join(name);
        image.save(&path).map_err(|e| CarveError::image(&path, e))?;
        debug!("wrote {:?}", path);
        Ok(())
    }
}

pub fn original_name(extension: &str) -> String {
    format!("0th_original.{}", extension)
}

pub fn carved_name(iteration: u32, preserved: bool, extension: &str) -> String {
    format!(
        "{}th_carved{}.{}",
        iteration,
        if preserved { "_preserved" } else { "" },
        extension
    )
}

pub fn red_line_name(iteration: u32, extension: &str) -> String {
    format!("{}/{}th_red_line.{}", RED_LINE_DIR, iteration, extension)
}
