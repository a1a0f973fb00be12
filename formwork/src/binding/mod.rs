//! Bind request data to plain Rust records.
//!
//! # Overview
//!
//! Binding is a _layered_ system:
//!
//! 1. A [`ValueSource`] sits at the bottom: a read-only, key-addressable view
//!    over the scalars and file parts one request submitted. It is built from
//!    the query string, an url-encoded or multipart body, or already-extracted
//!    route parameters.
//! 2. [`Materialize`] is the engine: given a declared field type and a key, it
//!    asks the source what is available and produces a concrete value (or
//!    "absent") by recursive, type-directed dispatch.
//! 3. [`Bind`], usually generated with [`#[derive(Bind)]`](crate::Bind), walks
//!    a record's annotated fields in declaration order and fills each one.
//! 4. The dispatch entrypoints ([`bind`], [`bind_form`], [`bind_params`]) tie
//!    it together per request: they pick the pipeline from the content type
//!    and run it against your record.
//!
//! ```rust
//! use formwork::binding::{Namespace, Bind, ValueSource};
//!
//! #[derive(Default, formwork::Bind)]
//! struct Signup {
//!     #[bind(form = "name")]
//!     name: String,
//!     #[bind(form = "age")]
//!     age: u8,
//!     #[bind(form = "tags")]
//!     tags: Vec<String>,
//! }
//!
//! let source = ValueSource::from_pairs([
//!     ("name", "wardonne"),
//!     ("age", "10"),
//!     ("tags", "a"),
//!     ("tags", "b"),
//! ]);
//! let mut signup = Signup::default();
//! signup.bind(&source, Namespace::Form)?;
//! assert_eq!(signup.tags, ["a", "b"]);
//! # Ok::<(), formwork::binding::BindError>(())
//! ```
pub use dispatch::{bind, bind_form, bind_params, body_format, decode_body, form_source};
pub use errors::{BindError, BindRequestError, BodyFormat};
pub use field_map::{Bind, FieldAux, FieldBinding, Namespace};
pub use file::UploadedFile;
pub use files::UploadedFileCollection;
pub use materialize::{Json, Materialize};
pub use multipart::MultipartLimits;
pub use source::{FilePart, ValueSource};

mod dispatch;
pub mod errors;
mod field_map;
mod file;
mod files;
mod materialize;
mod multipart;
mod source;
