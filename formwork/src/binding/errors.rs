//! Errors that can happen while binding request data to a destination record.
use std::fmt;

/// The error returned when materializing a field fails.
///
/// Every variant is fatal: the whole binding call aborts as soon as one field
/// hits it, and the caller must not assume that any field of the destination
/// was set.
///
/// Missing keys, empty scalar sequences and absent optional fields are *not*
/// errors—the corresponding field is simply left untouched.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BindError {
    #[error(transparent)]
    /// See [`ArityMismatch`] for details.
    ArityMismatch(#[from] ArityMismatch),
    #[error(transparent)]
    /// See [`UnsupportedFieldType`] for details.
    UnsupportedFieldType(#[from] UnsupportedFieldType),
    #[error(transparent)]
    /// See [`ParseFieldError`] for details.
    ParseFieldError(#[from] ParseFieldError),
    #[error(transparent)]
    /// See [`DecodeFailure`] for details.
    DecodeFailure(#[from] DecodeFailure),
    #[error(transparent)]
    /// See [`FilePartError`] for details.
    FilePartError(#[from] FilePartError),
}

/// The number of submitted values does not match the declared length of a
/// fixed-length array field.
///
/// Fixed-length arrays require an exact match: the engine never truncates a
/// surplus nor pads a shortfall, regardless of whether the values are scalars
/// or file parts.
#[derive(Debug, thiserror::Error)]
#[error(
    "`{key}` carries {found} value(s), but the destination field is a \
fixed-length array of {expected}"
)]
pub struct ArityMismatch {
    pub key: String,
    pub expected: usize,
    pub found: usize,
}

/// The data submitted under a key cannot be bound to the declared field type.
///
/// This happens when a key carries file parts but the field is not one of the
/// file-artifact types, or the other way around: a plain scalar submitted for
/// an [`UploadedFile`](super::UploadedFile) or
/// [`UploadedFileCollection`](super::UploadedFileCollection) field.
#[derive(Debug, thiserror::Error)]
#[error("the data submitted under `{key}` cannot be bound to a field of type `{target}`")]
pub struct UnsupportedFieldType {
    pub key: String,
    pub target: &'static str,
}

/// A scalar value has invalid syntax for the declared field type.
///
/// Covers numeric, boolean, duration and timestamp parses alike.
#[derive(Debug, thiserror::Error)]
#[error("`{key}` is set to `{value}`, which can't be parsed as a `{expected}`")]
pub struct ParseFieldError {
    pub key: String,
    pub value: String,
    pub expected: &'static str,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// A nested structured value failed to decode.
///
/// Composite field types (nested records, keyed mappings) are reachable only
/// through a self-contained JSON document submitted as the first scalar of
/// their key. This error surfaces when that document is malformed or doesn't
/// match the target shape.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode the value of `{key}` as a nested JSON document")]
pub struct DecodeFailure {
    pub key: String,
    #[source]
    pub source: serde_path_to_error::Error<serde_json::Error>,
}

/// A file part could not be opened while materializing a file-artifact field.
///
/// Opening happens at the transport boundary (spooled parts live on disk), so
/// this is an I/O failure, not a syntax one. It aborts the whole binding call
/// rather than skipping the field.
#[derive(Debug, thiserror::Error)]
#[error("failed to open the file part `{file_name}` submitted under `{key}`")]
pub struct FilePartError {
    pub key: String,
    pub file_name: String,
    #[source]
    pub source: std::io::Error,
}

/// The error returned by the request-level binding entrypoints.
///
/// It wraps the engine-level [`BindError`] together with the failures that can
/// only happen at the dispatch layer: malformed multipart payloads and
/// structured-body deserialization errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BindRequestError {
    #[error(transparent)]
    /// See [`BindError`] for details.
    Bind(#[from] BindError),
    #[error(transparent)]
    /// See [`MultipartError`] for details.
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    /// See [`BodyDecodeError`] for details.
    Decode(#[from] BodyDecodeError),
}

/// The request body could not be parsed as a `multipart/form-data` payload.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MultipartError {
    #[error(
        "the `Content-Type` header is set to `multipart/form-data`, \
but the `boundary` parameter is missing"
    )]
    MissingBoundary,
    #[error("failed to parse the multipart body")]
    InvalidSyntax(#[source] multer::Error),
    #[error("failed to buffer the file part `{file_name}` submitted under `{key}`")]
    BufferPart {
        key: String,
        file_name: String,
        #[source]
        source: std::io::Error,
    },
}

/// The request body could not be deserialized as the structured format named
/// by its `Content-Type` header.
#[derive(Debug, thiserror::Error)]
#[error("failed to deserialize the body as a {format} document")]
pub struct BodyDecodeError {
    pub format: BodyFormat,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// The structured body formats the dispatcher knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Xml,
    Yaml,
    Toml,
}

impl fmt::Display for BodyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BodyFormat::Json => "JSON",
            BodyFormat::Xml => "XML",
            BodyFormat::Yaml => "YAML",
            BodyFormat::Toml => "TOML",
        };
        f.write_str(name)
    }
}
