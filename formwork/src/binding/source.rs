use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;
use mime::Mime;
use tempfile::NamedTempFile;

/// A read-only, key-addressable view over the data submitted with one request.
///
/// Two stores coexist: scalar values (ordered sequences of strings per key,
/// coming from url-encoded pairs, multipart text fields or route placeholders)
/// and file parts (ordered sequences of [`FilePart`] per key, coming from
/// multipart uploads).
///
/// Querying an absent key yields an empty slice, never an error. In correct
/// usage a key lives in only one of the two stores; if both are populated,
/// file entries take priority during materialization.
///
/// A fresh `ValueSource` is built for every binding call and is treated as
/// immutable once handed to [`Bind::bind`](super::Bind::bind).
#[derive(Debug, Default)]
pub struct ValueSource {
    scalars: IndexMap<String, Vec<String>>,
    files: IndexMap<String, Vec<FilePart>>,
}

impl ValueSource {
    /// An empty source: every key is absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from url-encoded key/value pairs, in input order.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut source = Self::new();
        for (key, value) in pairs {
            source.push_scalar(key, value);
        }
        source
    }

    /// Build a source from already-extracted route parameters: one synthetic
    /// scalar per matched placeholder.
    ///
    /// Path matching itself is the router's job—this type only consumes the
    /// key/value pairs it produced.
    pub fn from_route_params<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut source = Self::new();
        for (key, value) in params {
            source.push_scalar(key, value);
        }
        source
    }

    /// Append a scalar value under `key`, preserving submission order.
    pub fn push_scalar(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.scalars.entry(key.into()).or_default().push(value.into());
    }

    /// Append a file part under `key`, preserving upload order.
    pub fn push_file(&mut self, key: impl Into<String>, part: FilePart) {
        self.files.entry(key.into()).or_default().push(part);
    }

    /// Returns `true` if at least one file part was submitted under `key`.
    pub fn has_file(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    /// Returns `true` if at least one scalar value was submitted under `key`.
    pub fn has_scalar(&self, key: &str) -> bool {
        self.scalars.contains_key(key)
    }

    /// The scalar values submitted under `key`, in submission order.
    pub fn scalars(&self, key: &str) -> &[String] {
        self.scalars.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// The file parts submitted under `key`, in upload order.
    pub fn files(&self, key: &str) -> &[FilePart] {
        self.files.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// A view containing a single scalar under `key`, used to materialize the
    /// elements of a sequence one at a time.
    pub(super) fn scalar_singleton(key: &str, value: &str) -> Self {
        let mut source = Self::new();
        source.push_scalar(key, value);
        source
    }

    /// A view containing a single file part under `key`.
    pub(super) fn file_singleton(key: &str, part: FilePart) -> Self {
        let mut source = Self::new();
        source.push_file(key, part);
        source
    }
}

/// One uploaded file's raw metadata and an unopened handle to its bytes.
///
/// This is the "file header" kind: materializing a `FilePart` field never
/// reads the part's content. Open it into an
/// [`UploadedFile`](super::UploadedFile) to sniff its MIME type and access
/// the bytes.
///
/// Cloning is cheap: the backing is either a reference-counted byte buffer or
/// a shared temp file.
#[derive(Debug, Clone)]
pub struct FilePart {
    file_name: String,
    content_type: Option<Mime>,
    size: u64,
    backing: Backing,
}

impl FilePart {
    pub(super) fn new(
        file_name: String,
        content_type: Option<Mime>,
        size: u64,
        backing: Backing,
    ) -> Self {
        Self {
            file_name,
            content_type,
            size,
            backing,
        }
    }

    /// Build an in-memory file part.
    ///
    /// Handy for tests and for callers that construct a [`ValueSource`] by
    /// hand instead of parsing a multipart body.
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: Option<Mime>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        let size = bytes.len() as u64;
        Self::new(file_name.into(), content_type, size, Backing::Memory(bytes))
    }

    /// The filename declared by the client.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The content type declared by the client, if any.
    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// The size of the part, in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Open a seekable stream over the part's bytes.
    ///
    /// In-memory parts can't fail; spooled parts re-open the temp file and
    /// surface the I/O error if the open fails.
    pub(super) fn open_stream(&self) -> io::Result<UploadStream> {
        match &self.backing {
            Backing::Memory(bytes) => Ok(UploadStream::Memory(Cursor::new(bytes.clone()))),
            Backing::Spooled(file) => {
                let file = fs_err::File::open(file.path().to_path_buf())?;
                Ok(UploadStream::Disk(file))
            }
        }
    }
}

/// Where a file part's bytes live.
///
/// Parts small enough to keep in memory are held as [`Bytes`]; oversized
/// parts are spooled to a temp file during multipart parsing. The temp file
/// is removed when the last clone of the part is dropped.
#[derive(Debug, Clone)]
pub(super) enum Backing {
    Memory(Bytes),
    Spooled(Arc<NamedTempFile>),
}

/// A seekable stream over one uploaded file's bytes.
#[derive(Debug)]
pub(super) enum UploadStream {
    Memory(Cursor<Bytes>),
    Disk(fs_err::File),
}

impl Read for UploadStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            UploadStream::Memory(cursor) => cursor.read(buf),
            UploadStream::Disk(file) => file.read(buf),
        }
    }
}

impl Seek for UploadStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            UploadStream::Memory(cursor) => cursor.seek(pos),
            UploadStream::Disk(file) => file.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_yield_empty_slices() {
        let source = ValueSource::new();
        assert!(!source.has_scalar("name"));
        assert!(!source.has_file("name"));
        assert!(source.scalars("name").is_empty());
        assert!(source.files("name").is_empty());
    }

    #[test]
    fn scalars_preserve_submission_order() {
        let source = ValueSource::from_pairs([("tags", "a"), ("tags", "b"), ("name", "wardonne")]);
        assert_eq!(source.scalars("tags"), ["a", "b"]);
        assert_eq!(source.scalars("name"), ["wardonne"]);
    }

    #[test]
    fn files_and_scalars_are_separate_stores() {
        let mut source = ValueSource::new();
        source.push_scalar("avatar", "not-a-file");
        source.push_file("photo", FilePart::from_bytes("photo.png", None, &b"\x89PNG"[..]));
        assert!(source.has_scalar("avatar"));
        assert!(!source.has_file("avatar"));
        assert!(source.has_file("photo"));
        assert!(!source.has_scalar("photo"));
    }

    #[test]
    fn in_memory_part_streams_its_bytes() {
        let part = FilePart::from_bytes("hello.txt", None, &b"hello world"[..]);
        assert_eq!(part.size(), 11);
        let mut stream = part.open_stream().unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"hello world");
    }
}
