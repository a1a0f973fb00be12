use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;
use mime::Mime;

use super::source::{FilePart, UploadStream};

/// How many bytes of the stream are read to sniff the MIME type.
const SNIFF_PREFIX_LEN: u64 = 8192;

/// The MIME type reported when content sniffing doesn't recognize the bytes.
const OCTET_STREAM: &str = "application/octet-stream";

/// One uploaded file: its declared metadata, its sniffed MIME type, and an
/// open, seekable stream over its bytes.
///
/// Created by opening a [`FilePart`], either directly via
/// [`UploadedFile::open`] or by materializing an `UploadedFile` field.
/// Opening reads a bounded prefix of the stream to sniff the MIME type from
/// the actual content, then rewinds to offset zero.
///
/// The engine never closes the file on your behalf: ownership moves to you,
/// and the underlying stream is released when the value is dropped.
///
/// # Example
///
/// ```rust
/// use formwork::binding::{FilePart, UploadedFile};
///
/// let part = FilePart::from_bytes("notes.txt", None, &b"hello"[..]);
/// let mut file = UploadedFile::open(part)?;
/// assert_eq!(file.name(), "notes.txt");
/// assert_eq!(file.content()?, &b"hello"[..]);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct UploadedFile {
    part: FilePart,
    stream: UploadStream,
    sniffed: Option<infer::Type>,
    content: Option<Bytes>,
}

impl UploadedFile {
    /// Open a file part: acquire its stream, sniff the MIME type from a
    /// prefix of the content, and rewind the stream to offset zero.
    pub fn open(part: FilePart) -> io::Result<Self> {
        let mut stream = part.open_stream()?;
        let mut prefix = Vec::with_capacity(SNIFF_PREFIX_LEN as usize);
        stream.by_ref().take(SNIFF_PREFIX_LEN).read_to_end(&mut prefix)?;
        let sniffed = infer::get(&prefix);
        // The rewind is mandatory: content() and save_as() both expect to
        // find the stream at offset zero after sniffing.
        stream.seek(SeekFrom::Start(0))?;
        Ok(Self {
            part,
            stream,
            sniffed,
            content: None,
        })
    }

    /// The filename declared by the client.
    pub fn name(&self) -> &str {
        self.part.file_name()
    }

    /// The extension taken from the declared filename, without the leading
    /// dot, if there is one.
    pub fn client_extension(&self) -> Option<&str> {
        Path::new(self.part.file_name())
            .extension()
            .and_then(|ext| ext.to_str())
    }

    /// The content type declared by the client, if any.
    ///
    /// Clients can declare whatever they like; prefer [`mime_type`] when you
    /// need to trust the value.
    ///
    /// [`mime_type`]: UploadedFile::mime_type
    pub fn client_mime_type(&self) -> Option<&Mime> {
        self.part.content_type()
    }

    /// The MIME type sniffed from the file's content.
    ///
    /// Falls back to `application/octet-stream` when the content doesn't
    /// match any known signature.
    pub fn mime_type(&self) -> &'static str {
        self.sniffed
            .as_ref()
            .map(|t| t.mime_type())
            .unwrap_or(OCTET_STREAM)
    }

    /// The canonical extension for the sniffed MIME type, if the content was
    /// recognized.
    pub fn extension(&self) -> Option<&'static str> {
        self.sniffed.as_ref().map(|t| t.extension())
    }

    /// The size of the uploaded file, in bytes.
    pub fn size(&self) -> u64 {
        self.part.size()
    }

    /// The file's entire content.
    ///
    /// The stream is read once and the decoded bytes are memoized: later
    /// calls return the cached buffer without touching the stream. The
    /// returned [`Bytes`] is a cheap reference-counted handle.
    pub fn content(&mut self) -> io::Result<Bytes> {
        if self.content.is_none() {
            let mut buf = Vec::with_capacity(self.part.size() as usize);
            self.stream.seek(SeekFrom::Start(0))?;
            self.stream.read_to_end(&mut buf)?;
            self.content = Some(buf.into());
        }
        Ok(self.content.clone().unwrap_or_default())
    }

    /// Copy the file's bytes, verbatim and from offset zero, to `path`.
    ///
    /// The destination is created (or truncated) first.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> io::Result<()> {
        self.stream.seek(SeekFrom::Start(0))?;
        let mut dst = fs_err::File::create(path.as_ref().to_path_buf())?;
        io::copy(&mut self.stream, &mut dst)?;
        Ok(())
    }

    /// Give back the unopened part this file was created from.
    pub fn into_part(self) -> FilePart {
        self.part
    }
}
