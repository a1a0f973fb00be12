use std::io;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use super::UploadedFile;

/// An ordered collection of [`UploadedFile`], built from every file part
/// sharing one key.
///
/// Upload order is preserved and the collection owns its members: dropping
/// it releases every underlying stream.
///
/// It dereferences to `[UploadedFile]`, so the usual slice APIs (`len`,
/// `iter`, indexing) are all available.
#[derive(Debug, Default)]
pub struct UploadedFileCollection {
    files: Vec<UploadedFile>,
}

impl UploadedFileCollection {
    /// Wrap an already-opened set of files, preserving their order.
    pub fn new(files: Vec<UploadedFile>) -> Self {
        Self { files }
    }

    /// Save every member under `dir`, using its declared filename.
    ///
    /// Files are written in upload order; the first failure aborts the walk
    /// and is returned, leaving later members unsaved.
    pub fn save(&mut self, dir: impl AsRef<Path>) -> io::Result<()> {
        let dir = dir.as_ref();
        for file in &mut self.files {
            let dest = dir.join(file.name());
            file.save_as(dest)?;
        }
        Ok(())
    }

    /// Consume the collection and hand back its members.
    pub fn into_inner(self) -> Vec<UploadedFile> {
        self.files
    }
}

impl Deref for UploadedFileCollection {
    type Target = [UploadedFile];

    fn deref(&self) -> &Self::Target {
        &self.files
    }
}

impl DerefMut for UploadedFileCollection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.files
    }
}

impl IntoIterator for UploadedFileCollection {
    type Item = UploadedFile;
    type IntoIter = std::vec::IntoIter<UploadedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl FromIterator<UploadedFile> for UploadedFileCollection {
    fn from_iter<I: IntoIterator<Item = UploadedFile>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
