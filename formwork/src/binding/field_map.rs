use std::fmt;

use super::{BindError, ValueSource};

/// The annotation namespaces a field can be bound under.
///
/// `Form` resolves keys from form, query and multipart data; `Param` resolves
/// them from already-extracted route placeholders. The `date_format`
/// annotation is an auxiliary option ([`FieldAux`]), not a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// The `form` annotation namespace.
    Form,
    /// The `param` annotation namespace.
    Param,
}

impl Namespace {
    /// The annotation name this namespace reads, as it appears in
    /// `#[bind(...)]` attributes.
    pub fn annotation(&self) -> &'static str {
        match self {
            Namespace::Form => "form",
            Namespace::Param => "param",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.annotation())
    }
}

/// One resolved binding target: a destination field, the key it reads, and
/// its auxiliary options.
///
/// Field tables are generated at compile time by [`#[derive(Bind)]`][derive]:
/// fields without an annotation for the namespace, and fields whose key trims
/// to the empty string or to the literal suppression marker `-`, are left out.
///
/// [derive]: formwork_macros::Bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    /// The name of the destination field.
    pub field: &'static str,
    /// The resolved key, trimmed of surrounding whitespace.
    pub key: &'static str,
    /// Auxiliary options attached to the field.
    pub aux: FieldAux,
}

/// Auxiliary per-field options that steer materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldAux {
    /// A strptime-style layout consulted only for timestamp fields.
    pub date_format: Option<&'static str>,
}

impl FieldAux {
    /// No options set.
    pub const NONE: FieldAux = FieldAux { date_format: None };
}

/// A destination record that request data can be bound into.
///
/// Don't implement this by hand: derive it and annotate the fields you want
/// populated.
///
/// ```rust
/// use formwork::binding::{Bind, Namespace, ValueSource};
///
/// #[derive(Default, formwork::Bind)]
/// struct Signup {
///     #[bind(form = "name")]
///     name: String,
///     #[bind(form = "age")]
///     age: u8,
///     #[bind(param = "team_id")]
///     team: Option<u64>,
///     // No annotation: never touched by binding.
///     internal: bool,
/// }
///
/// let source = ValueSource::from_pairs([("name", "wardonne"), ("age", "10")]);
/// let mut signup = Signup::default();
/// signup.bind(&source, Namespace::Form)?;
/// assert_eq!(signup.name, "wardonne");
/// assert_eq!(signup.age, 10);
/// assert_eq!(signup.team, None);
/// # Ok::<(), formwork::binding::BindError>(())
/// ```
pub trait Bind {
    /// The compile-time field table for `namespace`, in declaration order.
    fn bindings(namespace: Namespace) -> &'static [FieldBinding];

    /// Fill every annotated field from `source`, in declaration order.
    ///
    /// Fields whose key is absent (or resolves to an empty scalar sequence)
    /// keep their current value. The first fatal error aborts the walk; the
    /// caller must not rely on which fields were set before it.
    fn bind(&mut self, source: &ValueSource, namespace: Namespace) -> Result<(), BindError>;
}
