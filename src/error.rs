// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can go wrong while carving.
//!
//! All of these are reported synchronously by the call that detected
//! them.  None of them leave a half-carved image behind: the carver
//! validates a request completely before it touches the pixels.

use failure::Fail;
use std::path::PathBuf;

/// The library's result type.
pub type Result<T> = std::result::Result<T, CarveError>;

#[derive(Debug, Fail)]
pub enum CarveError {
    /// The image codec could not produce pixels for this path.
    #[fail(display = "could not load image {:?}: {}", path, cause)]
    LoadFailure {
        path: PathBuf,
        #[cause]
        cause: image::ImageError,
    },

    /// The image codec could not persist the buffer.
    #[fail(display = "could not save image {:?}: {}", path, cause)]
    EncodeFailure {
        path: PathBuf,
        #[cause]
        cause: image::ImageError,
    },

    /// A buffer that doesn't describe a non-empty width × height image.
    #[fail(
        display = "a {}x{} image needs {} values, got {}",
        width, height, expected, actual
    )]
    InvalidBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// The request would leave the image with no columns at all.
    #[fail(
        display = "cannot remove {} seams from an image {} pixels wide; at least one column must remain",
        requested, width
    )]
    InvalidSeamCount { requested: u32, width: u32 },

    /// Seam carving only ever takes columns away.
    #[fail(
        display = "seamcarve cannot upscale an image: asked for {} columns from {}",
        requested, width
    )]
    CannotWiden { requested: u32, width: u32 },

    /// Carve targets are cumulative, and they only go up.
    #[fail(
        display = "{} seams have already been removed; cannot carve back to {}",
        removed, requested
    )]
    SeamCountRegression { requested: u32, removed: u32 },

    /// A seam search policy nobody implemented.
    #[fail(display = "unsupported seam search policy: {:?}", name)]
    UnsupportedPolicy { name: String },

    /// The policy is fixed once the first seam is gone.
    #[fail(
        display = "cannot change the search policy after {} seams have been removed",
        removed
    )]
    PolicyLocked { removed: u32 },

    /// A seam that doesn't fit the image it was handed to.
    #[fail(display = "invalid seam: {}", reason)]
    InvalidSeam { reason: String },
}
