//! Compile-time field schema of a configuration struct.

/// One field of a [`Flags`] struct, as seen by `#[derive(Flags)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// The field identifier (raw identifiers without the `r#`).
    pub name: &'static str,
    /// Source text of the declared type, e.g. `u16` or `Vec<String>`.
    pub ty: &'static str,
    /// The raw `#[flag = "..."]` annotation, if the field has one.
    pub tag: Option<&'static str>,
}

/// A struct whose fields can be turned into command-line flags.
///
/// Implemented by `#[derive(Flags)]`. `FIELDS` lists every named field in
/// declaration order, annotated or not.
pub trait Flags {
    const FIELDS: &'static [FieldInfo];
}
