use std::io::{Cursor, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat};
use tempfile::NamedTempFile;

use crate::error::Result;

/// An in-memory image written out as a PNG the engine can open.
///
/// Every staged file gets a unique name, so concurrent calls never share one.
/// The file is deleted when this value is dropped.
pub struct StagedImage {
    file: NamedTempFile,
}

impl StagedImage {
    pub fn write(image: &DynamicImage, dir: Option<&Path>) -> Result<Self> {
        let mut encoded = Vec::new();
        image.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("tessrun-").suffix(".png");
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(&encoded)?;
        file.flush()?;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
