// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seamcarve - The main loop
//!
//! Every iteration rebuilds the energy map from the current frame,
//! biases it, finds and removes one vertical seam, and hands the
//! narrower frame (and preservation mask) to the next iteration.
//! Nothing survives an iteration except those two.  Every `save_step`
//! iterations a snapshot goes to the sink.

use crate::bias::{apply_dominant_bias, apply_preservation, preservation_mask, PreservationMask};
use crate::config::CarveConfig;
use crate::energy::calculate_energy;
use crate::errors::{CarveError, Result};
use crate::imageio::{carved_name, load_image, original_name, red_line_name, ImageSink, SourceImage};
use crate::palette::DominantColor;
use crate::pixel::{Frame, SeamPixel};
use crate::plane::Plane;
use crate::seamedit::{draw_seam, remove_vertical_seam, trace_seam};
use crate::seamfinder::{magnitude, search};
use image::DynamicImage;
use log::{debug, info};
use std::path::Path;

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarveReport {
    pub seams_removed: u32,
    pub width: u32,
    pub height: u32,
    /// Carved snapshots written, not counting the original or any
    /// visualization frames.
    pub snapshots: u32,
}

/// A frame being carved, and everything that has to shrink with it.
pub struct SeamCarver<'a, P: SeamPixel> {
    config: &'a CarveConfig,
    frame: Frame<P>,
    mask: Option<PreservationMask>,
    dominant: Option<[u8; 3]>,
}

impl<'a, P: SeamPixel> SeamCarver<'a, P> {
    /// Validate `config` against `frame` and set up the preservation
    /// mask.  `dominant` is required when the configuration asks for
    /// dominant-color bias, and ignored when it doesn't.
    pub fn new(frame: Frame<P>, config: &'a CarveConfig, dominant: Option<[u8; 3]>) -> Result<Self> {
        let (width, height) = frame.dimensions();
        if config.is_color != P::IS_COLOR {
            return Err(CarveError::config(format!(
                "the run is configured for {} but the frame is {}",
                if config.is_color { "color" } else { "grayscale" },
                if P::IS_COLOR { "color" } else { "grayscale" },
            )));
        }
        config.validate(width, height)?;
        if config.dominant && dominant.is_none() {
            return Err(CarveError::config(
                "dominant-color bias was requested but no dominant color was supplied",
            ));
        }

        let mask = config
            .preservation
            .map(|region| preservation_mask(width, height, &region));
        Ok(SeamCarver {
            config,
            frame,
            mask,
            dominant: dominant.filter(|_| config.dominant),
        })
    }

    pub fn frame(&self) -> &Frame<P> {
        &self.frame
    }

    pub fn mask(&self) -> Option<&PreservationMask> {
        self.mask.as_ref()
    }

    /// The map the seam search runs over: energy, plus the
    /// preservation penalty, then rebased by dominant color.
    pub fn cost_map(&self) -> Plane<f64> {
        let mut costs = calculate_energy(&self.frame);
        if let Some(mask) = &self.mask {
            costs = apply_preservation(costs, mask, self.config.preservation_penalty);
        }
        if let Some(color) = self.dominant {
            costs = apply_dominant_bias(costs, &self.frame, color, self.config.dominant_weight);
        }
        costs
    }

    /// The current frame's cheapest seam, top to bottom.
    pub fn find_seam(&self) -> Result<Vec<u32>> {
        let (table, origin) = search(&self.cost_map())?;
        let (_, height) = table.dimensions();
        debug!(
            "seam ends at column {} with cost {}",
            origin,
            magnitude(&table.costs[(origin, height - 1)])
        );
        Ok(trace_seam(&table, origin))
    }

    /// Take `seam` out of the frame and the mask alike.
    pub fn remove(&mut self, seam: &[u32]) {
        self.frame = remove_vertical_seam(&self.frame, seam);
        self.mask = self.mask.as_ref().map(|mask| mask.without_seam(seam));
    }

    /// Find and remove one seam.  Returns the frame as it was before
    /// the removal with the seam painted in, if `visualize` is set.
    pub fn carve_once(&mut self, visualize: bool) -> Result<Option<Frame<P>>> {
        let seam = self.find_seam()?;
        let marked = if visualize {
            Some(draw_seam(&self.frame, &seam))
        } else {
            None
        };
        self.remove(&seam);
        Ok(marked)
    }

    /// Run every configured iteration, writing the original and each
    /// `save_step`th frame to `sink`.  Returns the final frame.
    pub fn carve<S: ImageSink>(mut self, sink: &mut S) -> Result<(Frame<P>, CarveReport)> {
        let config = self.config;
        let extension = config.extension.as_str();
        let preserved = config.preservation.is_some();
        let (width, height) = self.frame.dimensions();
        info!(
            "removing {} seams from a {}x{} {} image",
            config.iterations,
            width,
            height,
            if P::IS_COLOR { "color" } else { "grayscale" }
        );

        sink.prepare(config.red_line)?;
        sink.save(&original_name(extension), &P::into_dynamic(self.frame.clone()))?;

        let mut snapshots = 0;
        for iteration in 1..=config.iterations {
            let snapshot = iteration % config.save_step == 0;
            let marked = self.carve_once(config.red_line && snapshot)?;
            if !snapshot {
                continue;
            }

            info!("{}th iteration", iteration);
            sink.save(
                &carved_name(iteration, preserved, extension),
                &P::into_dynamic(self.frame.clone()),
            )?;
            snapshots += 1;
            if let Some(marked) = marked {
                sink.save(&red_line_name(iteration, extension), &P::into_dynamic(marked))?;
            }
        }

        let (width, height) = self.frame.dimensions();
        info!("finished at {}x{}", width, height);
        Ok((
            self.frame,
            CarveReport {
                seams_removed: config.iterations,
                width,
                height,
                snapshots,
            },
        ))
    }
}

/// Load `source`, carve it as `config` describes, and write snapshots
/// to `sink`.  The dominant color, when wanted, is asked of `colors`
/// exactly once, for the original source file.
pub fn seamcarve<S, D>(
    source: &Path,
    config: &CarveConfig,
    sink: &mut S,
    colors: &D,
) -> Result<(DynamicImage, CarveReport)>
where
    S: ImageSink,
    D: DominantColor + ?Sized,
{
    config.validate_options()?;
    let image = load_image(source, config.is_color, config.scale)?;
    let (width, height) = image.dimensions();
    config.validate(width, height)?;

    let dominant = if config.dominant {
        let color = colors.dominant_color(source)?;
        info!("dominant color of {:?} is {:?}", source, color);
        Some(color)
    } else {
        None
    };

    match image {
        SourceImage::Gray(frame) => {
            let (frame, report) = SeamCarver::new(frame, config, dominant)?.carve(sink)?;
            Ok((DynamicImage::ImageLuma8(frame), report))
        }
        SourceImage::Color(frame) => {
            let (frame, report) = SeamCarver::new(frame, config, dominant)?.carve(sink)?;
            Ok((DynamicImage::ImageRgb8(frame), report))
        }
    }
}
