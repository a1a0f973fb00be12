//! The type-directed materialization engine.
//!
//! [`Materialize`] turns the data a [`ValueSource`] holds under one key into
//! a concrete value of the declared field type. Dispatch is purely
//! type-directed and recursive: optional wrappers unwrap to their inner type,
//! sequences materialize one element at a time through singleton views, and
//! the closed set of supported leaf types decides between the scalar and the
//! file store.
//!
//! `Ok(None)` always means "absent": the caller leaves the destination field
//! at whatever value it already held.
use std::any::type_name;

use serde::de::DeserializeOwned;

use super::errors::{
    ArityMismatch, BindError, DecodeFailure, FilePartError, ParseFieldError, UnsupportedFieldType,
};
use super::source::{FilePart, ValueSource};
use super::{FieldAux, UploadedFile, UploadedFileCollection};

/// The layout used for timestamp fields when no `date_format` annotation is
/// present.
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A field type the engine knows how to construct from request data.
///
/// Implementations form a closed set: scalar kinds, temporal kinds, the
/// optional wrapper, sequences and fixed-length arrays, JSON-encoded nested
/// values, and the file-artifact kinds. Anything else fails to compile when
/// used with [`#[derive(Bind)]`][crate::Bind], and a supported type fed from
/// the wrong store (e.g. a `String` field against an uploaded file) fails at
/// runtime with [`UnsupportedFieldType`].
pub trait Materialize: Sized {
    /// Produce a value for `key`, or `Ok(None)` when the source holds nothing
    /// usable under it.
    fn materialize(
        source: &ValueSource,
        key: &str,
        aux: &FieldAux,
    ) -> Result<Option<Self>, BindError>;
}

/// File entries win over scalars for the same key, so a scalar-typed target
/// must refuse a file-bearing key instead of silently reading the scalars.
fn expect_scalars<'s>(
    source: &'s ValueSource,
    key: &str,
    target: &'static str,
) -> Result<Option<&'s [String]>, BindError> {
    if source.has_file(key) {
        return Err(UnsupportedFieldType {
            key: key.to_owned(),
            target,
        }
        .into());
    }
    if !source.has_scalar(key) {
        return Ok(None);
    }
    Ok(Some(source.scalars(key)))
}

/// First scalar under `key`, if any. An empty scalar sequence counts as
/// absent.
fn first_scalar<'s>(
    source: &'s ValueSource,
    key: &str,
    target: &'static str,
) -> Result<Option<&'s str>, BindError> {
    Ok(expect_scalars(source, key, target)?
        .and_then(|values| values.first())
        .map(String::as_str))
}

/// Mirror image of [`expect_scalars`] for the file-artifact kinds.
fn expect_files<'s>(
    source: &'s ValueSource,
    key: &str,
    target: &'static str,
) -> Result<Option<&'s [FilePart]>, BindError> {
    if source.has_file(key) {
        return Ok(Some(source.files(key)));
    }
    if source.has_scalar(key) {
        return Err(UnsupportedFieldType {
            key: key.to_owned(),
            target,
        }
        .into());
    }
    Ok(None)
}

fn open_part(part: &FilePart, key: &str) -> Result<UploadedFile, BindError> {
    UploadedFile::open(part.clone()).map_err(|source| {
        FilePartError {
            key: key.to_owned(),
            file_name: part.file_name().to_owned(),
            source,
        }
        .into()
    })
}

impl Materialize for String {
    fn materialize(
        source: &ValueSource,
        key: &str,
        _aux: &FieldAux,
    ) -> Result<Option<Self>, BindError> {
        Ok(first_scalar(source, key, type_name::<Self>())?.map(ToOwned::to_owned))
    }
}

macro_rules! materialize_from_str {
    ($($ty:ty),* $(,)?) => {$(
        impl Materialize for $ty {
            fn materialize(
                source: &ValueSource,
                key: &str,
                _aux: &FieldAux,
            ) -> Result<Option<Self>, BindError> {
                let Some(raw) = first_scalar(source, key, type_name::<Self>())? else {
                    return Ok(None);
                };
                match raw.parse::<$ty>() {
                    Ok(value) => Ok(Some(value)),
                    Err(e) => Err(ParseFieldError {
                        key: key.to_owned(),
                        value: raw.to_owned(),
                        expected: stringify!($ty),
                        source: Some(Box::new(e)),
                    }
                    .into()),
                }
            }
        }
    )*};
}

materialize_from_str!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl Materialize for bool {
    fn materialize(
        source: &ValueSource,
        key: &str,
        _aux: &FieldAux,
    ) -> Result<Option<Self>, BindError> {
        let Some(raw) = first_scalar(source, key, type_name::<Self>())? else {
            return Ok(None);
        };
        // The permissive grammar of Go's strconv.ParseBool.
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(Some(true)),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(Some(false)),
            _ => Err(ParseFieldError {
                key: key.to_owned(),
                value: raw.to_owned(),
                expected: "bool",
                source: None,
            }
            .into()),
        }
    }
}

impl Materialize for jiff::SignedDuration {
    fn materialize(
        source: &ValueSource,
        key: &str,
        _aux: &FieldAux,
    ) -> Result<Option<Self>, BindError> {
        let Some(raw) = first_scalar(source, key, type_name::<Self>())? else {
            return Ok(None);
        };
        match raw.parse::<jiff::SignedDuration>() {
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(ParseFieldError {
                key: key.to_owned(),
                value: raw.to_owned(),
                expected: "duration",
                source: Some(Box::new(e)),
            }
            .into()),
        }
    }
}

impl Materialize for jiff::civil::DateTime {
    fn materialize(
        source: &ValueSource,
        key: &str,
        aux: &FieldAux,
    ) -> Result<Option<Self>, BindError> {
        let Some(raw) = first_scalar(source, key, type_name::<Self>())? else {
            return Ok(None);
        };
        let layout = aux.date_format.unwrap_or(DEFAULT_DATE_FORMAT);
        match jiff::civil::DateTime::strptime(layout, raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(ParseFieldError {
                key: key.to_owned(),
                value: raw.to_owned(),
                expected: "datetime",
                source: Some(Box::new(e)),
            }
            .into()),
        }
    }
}

impl<T: Materialize> Materialize for Option<T> {
    fn materialize(
        source: &ValueSource,
        key: &str,
        aux: &FieldAux,
    ) -> Result<Option<Self>, BindError> {
        // Absent stays absent: a `None` result never overwrites whatever the
        // destination field currently holds.
        Ok(T::materialize(source, key, aux)?.map(Some))
    }
}

impl<T: Materialize> Materialize for Vec<T> {
    fn materialize(
        source: &ValueSource,
        key: &str,
        aux: &FieldAux,
    ) -> Result<Option<Self>, BindError> {
        if source.has_file(key) {
            let parts = source.files(key);
            let mut out = Vec::with_capacity(parts.len());
            for part in parts {
                let view = ValueSource::file_singleton(key, part.clone());
                if let Some(element) = T::materialize(&view, key, aux)? {
                    out.push(element);
                }
            }
            // A present key with zero parts yields an empty vec, not absent.
            Ok(Some(out))
        } else if source.has_scalar(key) {
            let values = source.scalars(key);
            let mut out = Vec::with_capacity(values.len());
            for value in values {
                let view = ValueSource::scalar_singleton(key, value);
                if let Some(element) = T::materialize(&view, key, aux)? {
                    out.push(element);
                }
            }
            Ok(Some(out))
        } else {
            Ok(None)
        }
    }
}

impl<T: Materialize, const N: usize> Materialize for [T; N] {
    fn materialize(
        source: &ValueSource,
        key: &str,
        aux: &FieldAux,
    ) -> Result<Option<Self>, BindError> {
        let found = if source.has_file(key) {
            source.files(key).len()
        } else if source.has_scalar(key) {
            source.scalars(key).len()
        } else {
            return Ok(None);
        };
        if found != N {
            return Err(ArityMismatch {
                key: key.to_owned(),
                expected: N,
                found,
            }
            .into());
        }
        let Some(elements) = Vec::<T>::materialize(source, key, aux)? else {
            return Ok(None);
        };
        match <[T; N]>::try_from(elements) {
            Ok(array) => Ok(Some(array)),
            Err(elements) => Err(ArityMismatch {
                key: key.to_owned(),
                expected: N,
                found: elements.len(),
            }
            .into()),
        }
    }
}

/// Wrapper for nested records and keyed mappings.
///
/// Composite types are reachable only through a self-contained structured
/// sub-encoding: the first scalar under the key is decoded as a JSON document
/// into `T`.
///
/// ```rust
/// use formwork::binding::{FieldAux, Json, Materialize, ValueSource};
///
/// #[derive(serde::Deserialize)]
/// struct Geo {
///     lat: f64,
///     lng: f64,
/// }
///
/// let source = ValueSource::from_pairs([("geo", r#"{"lat":31.2,"lng":121.5}"#)]);
/// let geo = Json::<Geo>::materialize(&source, "geo", &FieldAux::NONE)?
///     .expect("key is present");
/// assert_eq!(geo.0.lat, 31.2);
/// # Ok::<(), formwork::binding::BindError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the decoded value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> Materialize for Json<T> {
    fn materialize(
        source: &ValueSource,
        key: &str,
        _aux: &FieldAux,
    ) -> Result<Option<Self>, BindError> {
        let Some(raw) = first_scalar(source, key, type_name::<Self>())? else {
            return Ok(None);
        };
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        match serde_path_to_error::deserialize(&mut deserializer) {
            Ok(value) => Ok(Some(Json(value))),
            Err(source) => Err(DecodeFailure {
                key: key.to_owned(),
                source,
            }
            .into()),
        }
    }
}

impl Materialize for FilePart {
    fn materialize(
        source: &ValueSource,
        key: &str,
        _aux: &FieldAux,
    ) -> Result<Option<Self>, BindError> {
        // The raw file-header kind: metadata only, content stays unopened.
        let Some(parts) = expect_files(source, key, type_name::<Self>())? else {
            return Ok(None);
        };
        Ok(parts.first().cloned())
    }
}

impl Materialize for UploadedFile {
    fn materialize(
        source: &ValueSource,
        key: &str,
        _aux: &FieldAux,
    ) -> Result<Option<Self>, BindError> {
        let Some(parts) = expect_files(source, key, type_name::<Self>())? else {
            return Ok(None);
        };
        let Some(part) = parts.first() else {
            return Ok(None);
        };
        open_part(part, key).map(Some)
    }
}

impl Materialize for UploadedFileCollection {
    fn materialize(
        source: &ValueSource,
        key: &str,
        _aux: &FieldAux,
    ) -> Result<Option<Self>, BindError> {
        let Some(parts) = expect_files(source, key, type_name::<Self>())? else {
            return Ok(None);
        };
        let mut files = Vec::with_capacity(parts.len());
        for part in parts {
            files.push(open_part(part, key)?);
        }
        Ok(Some(UploadedFileCollection::new(files)))
    }
}
