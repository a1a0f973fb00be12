//! # Formwork
//!
//! Type-directed binding of request data—url-encoded forms, multipart
//! payloads (values and file uploads), route parameters, and structured
//! bodies (JSON/XML/YAML/TOML)—into plain Rust records.
//!
//! Annotate the fields you want populated, derive [`Bind`], and hand the
//! request to one of the [`binding`] entrypoints:
//!
//! ```rust
//! use formwork::binding::{self, UploadedFile};
//! use formwork::request::{body::BufferedBody, RequestHead};
//!
//! #[derive(Default, formwork::Bind, serde::Deserialize)]
//! #[serde(default)]
//! struct CreateProfile {
//!     #[bind(form = "name", param = "name")]
//!     name: String,
//!     #[bind(form = "age")]
//!     age: u8,
//!     #[bind(form = "avatar")]
//!     #[serde(skip)]
//!     avatar: Option<UploadedFile>,
//! }
//!
//! # async fn handle(head: RequestHead, body: BufferedBody) -> Result<(), binding::BindRequestError> {
//! let mut profile = CreateProfile::default();
//! binding::bind(&head, &body, &mut profile).await?;
//! # Ok(())
//! # }
//! ```
pub mod binding;
pub mod request;

/// Derive [`binding::Bind`] for a record with `#[bind(...)]`-annotated fields.
///
/// Supported annotations: `form = "key"`, `param = "key"`, and
/// `date_format = "strptime layout"` (consulted only for timestamp fields).
/// A key that trims to the empty string or to `-` suppresses the field in
/// that namespace.
pub use formwork_macros::Bind;
