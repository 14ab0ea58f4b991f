// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seamcarve - the carving engine
//!
//! Owns the pixels and whatever caches the chosen storage keeps, and
//! runs find-a-seam / remove-the-seam until the requested number of
//! columns is gone.  A carve request is validated in full before the
//! first seam is touched; once under way, each seam is either removed
//! completely or not at all.

use crate::cq;
use crate::energy::{calculate_energy, energy_to_image};
use crate::error::{CarveError, Result};
use crate::io::{load_image, save_image};
use crate::lattice::Lattice;
use crate::seam::Seam;
use crate::seamfinder::{GridSearch, SearchPolicy, SeamFinder};
use crate::seamremover::SeamRemover;
use image::{ImageBuffer, RgbaImage};
use log::{debug, info};
use std::path::Path;

/// How to carve.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CarveOptions {
    /// Backward or forward energy accounting.
    pub policy: SearchPolicy,
    /// Keep energy and cost cached in a lattice and update them around
    /// each seam, rather than recomputing the whole image every time.
    pub incremental: bool,
}

impl Default for CarveOptions {
    fn default() -> Self {
        CarveOptions {
            policy: SearchPolicy::default(),
            incremental: true,
        }
    }
}

impl CarveOptions {
    pub fn with_policy(self, policy: SearchPolicy) -> Self {
        CarveOptions { policy, ..self }
    }

    pub fn with_incremental(self, incremental: bool) -> Self {
        CarveOptions {
            incremental,
            ..self
        }
    }
}

// The contiguous store keeps nothing but pixels; the lattice keeps
// energy and cost alongside them.
enum Storage {
    Contiguous(RgbaImage),
    Linked(Lattice),
}

impl Storage {
    fn new(image: &RgbaImage, options: CarveOptions) -> Result<Self> {
        Ok(cq!(
            options.incremental,
            Storage::Linked(Lattice::new(image, options.policy)?),
            Storage::Contiguous(image.clone())
        ))
    }

    fn name(&self) -> &'static str {
        match self {
            Storage::Contiguous(_) => "contiguous",
            Storage::Linked(_) => "linked",
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        match self {
            Storage::Contiguous(image) => image.dimensions(),
            Storage::Linked(lattice) => lattice.dimensions(),
        }
    }

    fn find_vertical_seam(&self, policy: SearchPolicy) -> Seam {
        match self {
            Storage::Contiguous(image) => GridSearch::new(image, policy).find_vertical_seam(),
            Storage::Linked(lattice) => lattice.find_vertical_seam(),
        }
    }

    fn remover(&mut self) -> &mut dyn SeamRemover {
        match self {
            Storage::Contiguous(image) => image as &mut dyn SeamRemover,
            Storage::Linked(lattice) => lattice as &mut dyn SeamRemover,
        }
    }
}

/// A carving session over one image.
pub struct SeamCarver {
    original: RgbaImage,
    storage: Storage,
    options: CarveOptions,
    removed: u32,
    last_seam: Option<Seam>,
}

impl SeamCarver {
    /// Start a session on an RGBA image.  Empty images are refused.
    pub fn new(image: RgbaImage, options: CarveOptions) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(CarveError::InvalidBuffer {
                width,
                height,
                expected: 0,
                actual: 0,
            });
        }
        let storage = Storage::new(&image, options)?;
        Ok(SeamCarver {
            original: image,
            storage,
            options,
            removed: 0,
            last_seam: None,
        })
    }

    /// Start a session on raw row-major RGBA8 bytes, four per pixel.
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>, options: CarveOptions) -> Result<Self> {
        let expected = 4 * width as usize * height as usize;
        let actual = bytes.len();
        let invalid = CarveError::InvalidBuffer {
            width,
            height,
            expected,
            actual,
        };
        if expected == 0 || actual != expected {
            return Err(invalid);
        }
        match ImageBuffer::from_raw(width, height, bytes) {
            Some(image) => SeamCarver::new(image, options),
            None => Err(invalid),
        }
    }

    /// Start a session on an image file.  If it can't be decoded there
    /// is no session.
    pub fn open<P: AsRef<Path>>(path: P, options: CarveOptions) -> Result<Self> {
        SeamCarver::new(load_image(path)?, options)
    }

    pub fn width(&self) -> u32 {
        self.storage.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.storage.dimensions().1
    }

    pub fn original_width(&self) -> u32 {
        self.original.width()
    }

    /// Seams removed since construction or the last `reset`.
    pub fn seams_removed(&self) -> u32 {
        self.removed
    }

    pub fn policy(&self) -> SearchPolicy {
        self.options.policy
    }

    pub fn options(&self) -> CarveOptions {
        self.options
    }

    /// The seam most recently removed, in the coordinates of the image
    /// it was removed from.
    pub fn last_seam(&self) -> Option<&Seam> {
        self.last_seam.as_ref()
    }

    /// Change the search policy.  Only allowed before the first seam
    /// goes; the two policies' caches aren't interchangeable.
    pub fn set_policy(&mut self, policy: SearchPolicy) -> Result<()> {
        if self.removed > 0 {
            return Err(CarveError::PolicyLocked {
                removed: self.removed,
            });
        }
        if policy != self.options.policy {
            let options = self.options.with_policy(policy);
            self.storage = Storage::new(&self.original, options)?;
            self.options = options;
        }
        Ok(())
    }

    /// Go back to the image this session started with.
    pub fn reset(&mut self) -> Result<()> {
        self.storage = Storage::new(&self.original, self.options)?;
        self.removed = 0;
        self.last_seam = None;
        Ok(())
    }

    /// Carve until `target` seams have been removed in total.  Asking for
    /// fewer than have already gone is an error, as is asking to remove
    /// every column; in either case nothing is removed.
    pub fn carve(&mut self, target: u32) -> Result<()> {
        let width = self.original_width();
        if target < self.removed {
            return Err(CarveError::SeamCountRegression {
                requested: target,
                removed: self.removed,
            });
        }
        if target >= width {
            return Err(CarveError::InvalidSeamCount {
                requested: target,
                width,
            });
        }

        let count = target - self.removed;
        if count == 0 {
            return Ok(());
        }
        info!(
            "carving {} seams from {}x{} ({} search, {} storage)",
            count,
            self.width(),
            self.height(),
            self.options.policy,
            self.storage.name()
        );
        for _ in 0..count {
            self.carve_once()?;
        }
        Ok(())
    }

    /// Carve until the image is `columns` wide.
    pub fn carve_to_width(&mut self, columns: u32) -> Result<()> {
        let width = self.original_width();
        if columns > width {
            return Err(CarveError::CannotWiden {
                requested: columns,
                width,
            });
        }
        self.carve(width - columns)
    }

    fn carve_once(&mut self) -> Result<()> {
        let seam = self.storage.find_vertical_seam(self.options.policy);
        self.storage.remover().remove_seam(&seam)?;
        self.removed += 1;
        debug!(
            "seam {} removed, ending at column {}; now {} wide",
            self.removed,
            seam.columns().last().copied().unwrap_or(0),
            self.width()
        );
        self.last_seam = Some(seam);
        Ok(())
    }

    /// The current pixels.
    pub fn image(&self) -> RgbaImage {
        match &self.storage {
            Storage::Contiguous(image) => image.clone(),
            Storage::Linked(lattice) => lattice.to_image(),
        }
    }

    /// The current pixels as row-major RGBA8 bytes.
    pub fn as_raw(&self) -> Vec<u8> {
        self.image().into_raw()
    }

    /// A greyscale picture of the current energy, alpha preserved.
    pub fn energy_image(&self) -> RgbaImage {
        match &self.storage {
            Storage::Contiguous(image) => energy_to_image(&calculate_energy(image), image),
            Storage::Linked(lattice) => energy_to_image(&lattice.energy_grid(), &lattice.to_image()),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_image(path, &self.image())
    }

    pub fn save_energy<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_image(path, &self.energy_image())
    }
}
