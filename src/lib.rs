// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seam carving: narrow an image by repeatedly removing the connected
//! top-to-bottom path of pixels whose loss disturbs it least.

pub mod ternary;

pub mod error;
pub use error::{CarveError, Result};

pub mod pixelpairs;
pub mod twodmap;
pub use twodmap::{CostAndBackPointer, CostGrid, EnergyGrid, TwoDimensionalMap};

pub mod seam;
pub use seam::Seam;

pub mod energy;
pub use energy::{calculate_energy, energy_at, energy_to_image};

pub mod backward;
pub mod forward;

pub mod seamfinder;
pub use seamfinder::{cost_to_seam, GridSearch, SearchPolicy, SeamFinder};

pub mod lattice;
pub use lattice::Lattice;

pub mod seamremover;
pub use seamremover::SeamRemover;

pub mod io;
pub use io::{load_image, save_image};

pub mod seamcarver;
pub use seamcarver::{CarveOptions, SeamCarver};
