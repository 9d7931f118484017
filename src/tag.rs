//! Parse `#[flag = "<name>,<help>"]` annotations.
//!
//! Only the first comma splits, so help text may contain commas. Both halves
//! are trimmed. Without a comma the whole annotation is the flag name and the
//! help text is empty.

use crate::error::CommandError;

/// A parsed flag annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub help: String,
}

/// Parse the annotation of `field`.
///
/// Returns `Ok(None)` for an unannotated field. A name that is empty after
/// trimming, or one that can't be spelled as `--name`, is a
/// [`CommandError::MalformedTag`].
pub fn parse_tag(field: &str, annotation: Option<&str>) -> Result<Option<Tag>, CommandError> {
    let Some(raw) = annotation else {
        return Ok(None);
    };

    let (name, help) = match raw.split_once(',') {
        Some((name, help)) => (name.trim(), help.trim()),
        None => (raw.trim(), ""),
    };

    if !is_valid_name(name) {
        return Err(CommandError::MalformedTag {
            field: field.to_string(),
            tag: raw.to_string(),
        });
    }

    Ok(Some(Tag {
        name: name.to_string(),
        help: help.to_string(),
    }))
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.chars().any(|c| c.is_whitespace() || c == '=')
}
