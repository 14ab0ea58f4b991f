// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The codec boundary.  Decoding and encoding belong to the `image`
//! crate; all this does is settle on RGBA8 and say which file failed.

use crate::error::{CarveError, Result};
use image::RgbaImage;
use std::path::Path;

/// Decode any supported format into RGBA8.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
    let path = path.as_ref();
    image::open(path)
        .map(|decoded| decoded.into_rgba8())
        .map_err(|cause| CarveError::LoadFailure {
            path: path.to_path_buf(),
            cause,
        })
}

/// Encode an RGBA8 buffer, choosing the format from the file extension.
pub fn save_image<P: AsRef<Path>>(path: P, image: &RgbaImage) -> Result<()> {
    let path = path.as_ref();
    image.save(path).map_err(|cause| CarveError::EncodeFailure {
        path: path.to_path_buf(),
        cause,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    #[test]
    fn missing_files_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        match load_image(dir.path().join("nothing-here.png")) {
            Err(CarveError::LoadFailure { path, .. }) => {
                assert!(path.ends_with("nothing-here.png"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn png_keeps_every_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.png");
        let image: RgbaImage =
            ImageBuffer::from_fn(3, 2, |x, y| Rgba([x as u8 * 80, y as u8 * 90, 3, 128]));
        save_image(&path, &image).unwrap();
        assert_eq!(load_image(&path).unwrap(), image);
    }

    #[test]
    fn unknown_extensions_fail_to_save() {
        let dir = tempfile::tempdir().unwrap();
        let image: RgbaImage = ImageBuffer::new(1, 1);
        match save_image(dir.path().join("out.nope"), &image) {
            Err(CarveError::EncodeFailure { .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }
}
