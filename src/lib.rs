//! Content-aware width reduction by vertical seam carving.
//!
//! The pipeline per removed seam is: energy → preservation penalty →
//! dominant-color bias → cumulative cost search → seam removal.  See
//! [`seamcarve`] for a whole run from a file on disk, or
//! [`SeamCarver`] to drive the loop over an in-memory frame.

pub mod bias;
pub mod config;
pub mod energy;
pub mod errors;
pub mod imageio;
pub mod palette;
pub mod pixel;
pub mod plane;
pub mod seamcarver;
pub mod seamedit;
pub mod seamfinder;

pub use config::{CarveConfig, Region};
pub use energy::{calculate_energy, energy_to_image, EnergyMap};
pub use errors::{CarveError, Result};
pub use imageio::{load_image, DirectorySink, ImageSink, SourceImage};
pub use palette::{DominantColor, MedianCut};
pub use pixel::{Frame, SeamPixel};
pub use seamcarver::{seamcarve, CarveReport, SeamCarver};
