//! Derive flag descriptors from a [`Flags`] struct.
//!
//! Fields are visited in declaration order, which is also the order flags
//! show up in help output. The first bad field aborts the walk.

use serde::Serialize;
use toml::{Table, Value};

use crate::error::CommandError;
use crate::kind::{self, FlagKind};
use crate::schema::{FieldInfo, Flags};
use crate::tag::{self, Tag};

/// Everything needed to register and resolve one flag.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagDescriptor {
    /// Flag name as typed on the command line, without the leading `--`.
    pub name: String,
    pub help: String,
    pub kind: FlagKind,
    /// Default drawn from the default instance, in the kind's canonical shape.
    pub default: Value,
    /// The struct field this flag populates.
    pub field: &'static str,
}

/// A field whose tag and type have been checked but whose default is unknown.
#[derive(Debug, Clone)]
pub(crate) struct TaggedField {
    pub info: FieldInfo,
    pub tag: Tag,
    pub kind: FlagKind,
}

/// Build the descriptor list for `T`.
///
/// Defaults come from `defaults` when given, otherwise from `T::default()`.
pub fn build_descriptors<T>(defaults: Option<&T>) -> Result<Vec<FlagDescriptor>, CommandError>
where
    T: Flags + Serialize + Default,
{
    let fields = tagged_fields::<T>()?;
    let table = defaults_table(defaults)?;
    Ok(attach_defaults(fields, &table))
}

/// Parse tags and map types for every annotated field, in order.
pub(crate) fn tagged_fields<T: Flags>() -> Result<Vec<TaggedField>, CommandError> {
    let mut out = Vec::new();
    for info in T::FIELDS {
        let Some(tag) = tag::parse_tag(info.name, info.tag)? else {
            continue;
        };
        let kind = kind::map_type(info.name, info.ty)?;
        out.push(TaggedField {
            info: *info,
            tag,
            kind,
        });
    }
    Ok(out)
}

/// Serialize the default instance into a table keyed by field name.
///
/// A value the table can't hold (an integer above `i64::MAX`) fails with
/// [`CommandError::InvalidValue`] keyed by the offending field.
pub(crate) fn defaults_table<T>(defaults: Option<&T>) -> Result<Table, CommandError>
where
    T: Serialize + Default,
{
    let fallback;
    let instance = match defaults {
        Some(instance) => instance,
        None => {
            fallback = T::default();
            &fallback
        }
    };

    let value = Value::try_from(instance).map_err(|e| CommandError::InvalidValue {
        key: unrepresentable_field(instance).unwrap_or_else(|| "<defaults>".into()),
        reason: e.to_string(),
    })?;

    match value {
        Value::Table(table) => Ok(table),
        other => Err(CommandError::InvalidValue {
            key: "<defaults>".into(),
            reason: format!("expected a struct, got {}", other.type_str()),
        }),
    }
}

/// Find a field whose value alone fails to convert to a table value.
fn unrepresentable_field<T: Serialize>(instance: &T) -> Option<String> {
    let serde_json::Value::Object(fields) = serde_json::to_value(instance).ok()? else {
        return None;
    };
    fields
        .into_iter()
        .find(|(_, v)| !v.is_null() && Value::try_from(v).is_err())
        .map(|(name, _)| name)
}

pub(crate) fn attach_defaults(fields: Vec<TaggedField>, defaults: &Table) -> Vec<FlagDescriptor> {
    fields
        .into_iter()
        .map(|field| {
            let default = defaults
                .get(field.info.name)
                .and_then(|v| field.kind.coerce(v).ok())
                .unwrap_or_else(|| field.kind.zero());
            FlagDescriptor {
                name: field.tag.name,
                help: field.tag.help,
                kind: field.kind,
                default,
                field: field.info.name,
            }
        })
        .collect()
}
