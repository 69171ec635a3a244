// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can stop a carve.
//!
//! Nothing here is retried.  I/O and codec failures abort the run
//! with whatever is already on disk left in place; configuration
//! failures are raised before the first seam is searched.

use failure::Fail;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Fail)]
pub enum CarveError {
    /// A directory or file could not be created, read, or written.
    #[fail(display = "I/O error on {:?}: {}", path, source)]
    Io {
        path: PathBuf,
        #[fail(cause)]
        source: io::Error,
    },

    /// The image codec refused to decode or encode a file.
    #[fail(display = "image error on {:?}: {}", path, source)]
    Image {
        path: PathBuf,
        #[fail(cause)]
        source: image::ImageError,
    },

    /// A run configuration value is out of range for this image.
    #[fail(display = "invalid configuration: {}", _0)]
    Config(String),

    /// More seams were requested than the image has columns to give.
    #[fail(
        display = "cannot remove {} seams from an image {} pixels wide",
        seams, width
    )]
    TooManySeams { seams: u32, width: u32 },

    /// An image this narrow has no removable seam.
    #[fail(display = "an image {} pixels wide has no removable seam", width)]
    Degenerate { width: u32 },
}

impl CarveError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        CarveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn image(path: &Path, source: image::ImageError) -> Self {
        CarveError::Image {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn config<S: Into<String>>(message: S) -> Self {
        CarveError::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CarveError>;
