use std::convert::Infallible;
use std::io::Write;
use std::sync::Arc;

use bytes::Bytes;
use tempfile::NamedTempFile;

use super::errors::MultipartError;
use super::source::{Backing, FilePart, ValueSource};
use crate::request::body::BufferedBody;

/// Limits applied while buffering multipart payloads.
#[derive(Debug, Clone, Copy)]
pub struct MultipartLimits {
    /// File parts larger than this are spooled to a temp file instead of
    /// being kept in memory.
    pub in_memory_part_size: usize,
}

impl Default for MultipartLimits {
    fn default() -> Self {
        Self {
            // 32 MiB, the conventional in-memory budget for multipart forms.
            in_memory_part_size: 32 << 20,
        }
    }
}

/// Parse a buffered `multipart/form-data` body into `source`.
///
/// Text fields become scalars; file parts (anything carrying a filename)
/// become [`FilePart`]s. Both stores preserve submission order. Parts without
/// a `name` parameter are skipped.
pub(super) async fn parse_multipart(
    body: &BufferedBody,
    boundary: &str,
    limits: MultipartLimits,
    source: &mut ValueSource,
) -> Result<(), MultipartError> {
    let bytes = body.bytes.clone();
    let stream = futures_util::stream::once(async move { Ok::<_, Infallible>(bytes) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(MultipartError::InvalidSyntax)?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
            let text = field.text().await.map_err(MultipartError::InvalidSyntax)?;
            source.push_scalar(name, text);
            continue;
        };

        let content_type = field.content_type().cloned();
        let mut buffered: Vec<u8> = Vec::new();
        let mut spool: Option<NamedTempFile> = None;
        let mut size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(MultipartError::InvalidSyntax)?
        {
            size += chunk.len() as u64;
            match &mut spool {
                Some(file) => {
                    write_chunk(file, &chunk, &name, &file_name)?;
                }
                None if buffered.len() + chunk.len() > limits.in_memory_part_size => {
                    tracing::debug!(
                        part = %name,
                        file_name = %file_name,
                        "file part exceeds the in-memory limit, spooling to disk"
                    );
                    let mut file = NamedTempFile::new().map_err(|source| {
                        MultipartError::BufferPart {
                            key: name.clone(),
                            file_name: file_name.clone(),
                            source,
                        }
                    })?;
                    write_chunk(&mut file, &buffered, &name, &file_name)?;
                    write_chunk(&mut file, &chunk, &name, &file_name)?;
                    buffered = Vec::new();
                    spool = Some(file);
                }
                None => buffered.extend_from_slice(&chunk),
            }
        }

        let backing = match spool {
            Some(mut file) => {
                file.flush().map_err(|source| MultipartError::BufferPart {
                    key: name.clone(),
                    file_name: file_name.clone(),
                    source,
                })?;
                Backing::Spooled(Arc::new(file))
            }
            None => Backing::Memory(Bytes::from(buffered)),
        };
        source.push_file(name.clone(), FilePart::new(file_name, content_type, size, backing));
    }
    Ok(())
}

fn write_chunk(
    file: &mut NamedTempFile,
    chunk: &[u8],
    key: &str,
    file_name: &str,
) -> Result<(), MultipartError> {
    file.write_all(chunk).map_err(|source| MultipartError::BufferPart {
        key: key.to_owned(),
        file_name: file_name.to_owned(),
        source,
    })
}
