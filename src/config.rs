// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Run configuration
//!
//! Everything a carve needs to know up front.  The configuration is
//! checked against the loaded image once, before any seam is searched,
//! so a bad rectangle or an impossible seam count is reported with a
//! message rather than discovered as an out-of-bounds panic halfway
//! through a run.

use crate::errors::{CarveError, Result};

/// Added to every channel of every preserved pixel's energy.
pub const PRESERVATION_PENALTY: f64 = 1e10;

/// How strongly distance from the dominant color counts against a
/// pixel, relative to its normalized energy.
pub const DOMINANT_WEIGHT: f64 = 0.1;

/// An inclusive pixel rectangle: columns `x1..=x2`, rows `y1..=y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x1: u32,
    pub x2: u32,
    pub y1: u32,
    pub y2: u32,
}

impl Region {
    pub fn new(x1: u32, x2: u32, y1: u32, y2: u32) -> Self {
        Region { x1, x2, y1, y2 }
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x1..=self.x2).contains(&x) && (self.y1..=self.y2).contains(&y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarveConfig {
    /// Carve three-channel color rather than single-channel grayscale.
    pub is_color: bool,
    /// Also emit a copy of each snapshot with its seam painted in.
    pub red_line: bool,
    /// Protect this rectangle from seams where any alternative exists.
    pub preservation: Option<Region>,
    /// Steer seams by distance from the source's dominant color.
    pub dominant: bool,
    /// How many seams to remove.
    pub iterations: u32,
    /// Emit a snapshot every this many seams.
    pub save_step: u32,
    /// Resize factor applied when the source is loaded.
    pub scale: f64,
    pub preservation_penalty: f64,
    pub dominant_weight: f64,
    /// File extension, and so encoder, for snapshots.
    pub extension: String,
}

impl CarveConfig {
    pub fn new(iterations: u32) -> Self {
        CarveConfig {
            is_color: true,
            red_line: false,
            preservation: None,
            dominant: false,
            iterations,
            save_step: 1,
            scale: 1.0,
            preservation_penalty: PRESERVATION_PENALTY,
            dominant_weight: DOMINANT_WEIGHT,
            extension: "jpg".to_string(),
        }
    }

    pub fn color(mut self, is_color: bool) -> Self {
        self.is_color = is_color;
        self
    }

    pub fn red_line(mut self, red_line: bool) -> Self {
        self.red_line = red_line;
        self
    }

    pub fn preserve(mut self, region: Region) -> Self {
        self.preservation = Some(region);
        self
    }

    pub fn dominant(mut self, dominant: bool) -> Self {
        self.dominant = dominant;
        self
    }

    pub fn save_step(mut self, save_step: u32) -> Self {
        self.save_step = save_step;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn preservation_penalty(mut self, penalty: f64) -> Self {
        self.preservation_penalty = penalty;
        self
    }

    pub fn dominant_weight(mut self, weight: f64) -> Self {
        self.dominant_weight = weight;
        self
    }

    pub fn extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Check the values that don't depend on the image.  Run before
    /// the source is even loaded.
    pub fn validate_options(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(CarveError::config("the seam count must be at least 1"));
        }
        if self.save_step == 0 {
            return Err(CarveError::config("the save step must be at least 1"));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(CarveError::config(format!(
                "the scale factor must be positive, not {}",
                self.scale
            )));
        }
        if self.dominant && !self.is_color {
            return Err(CarveError::config(
                "dominant-color bias needs a color run",
            ));
        }
        if !(self.preservation_penalty.is_finite() && self.preservation_penalty >= 0.0) {
            return Err(CarveError::config(format!(
                "the preservation penalty must be finite and non-negative, not {}",
                self.preservation_penalty
            )));
        }
        if !self.dominant_weight.is_finite() {
            return Err(CarveError::config("the dominant-color weight must be finite"));
        }
        if self.extension.is_empty() {
            return Err(CarveError::config("an output file extension is required"));
        }
        Ok(())
    }

    /// Check everything against the dimensions of the image about to
    /// be carved.
    pub fn validate(&self, width: u32, height: u32) -> Result<()> {
        self.validate_options()?;
        if let Some(region) = self.preservation {
            if region.x1 > region.x2 || region.y1 > region.y2 {
                return Err(CarveError::config(format!(
                    "the preserved region {:?} is empty",
                    region
                )));
            }
            if region.x2 >= width || region.y2 >= height {
                return Err(CarveError::config(format!(
                    "the preserved region {:?} lies outside a {}x{} image",
                    region, width, height
                )));
            }
        }
        if self.iterations >= width {
            return Err(CarveError::TooManySeams {
                seams: self.iterations,
                width,
            });
        }
        Ok(())
    }
}
