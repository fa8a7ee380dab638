//! Template parsing and expansion for variable references.
//!
//! Variable definitions may embed `${Name}` placeholders that are substituted
//! with the referenced variable's resolved value. Templates are parsed once,
//! at declaration time, into a list of segments; this makes the reference
//! graph explicit so cycles can be detected before anything is evaluated.
//!
//! # Syntax
//!
//! - `${Name}` - reference to a variable in the same context
//! - `${ns.Name}` - reference to a variable in an imported context
//! - `$$` - a literal `$`
//!
//! Every other use of `$` is an error: these strings are build-variable
//! templates, not shell text, so a dangling `$` is a typo worth rejecting.

use crate::error::VarError;

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text, passed through unchanged.
  Literal(String),

  /// A `${Name}` reference, possibly qualified as `ns.Name`.
  Reference(String),
}

/// Parse a template string into segments.
///
/// # Errors
///
/// Returns `MalformedTemplate` for an unterminated `${`, an empty or
/// ill-formed placeholder name, or a `$` not followed by `{` or `$`.
pub fn parse(input: &str) -> Result<Vec<Segment>, VarError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '$')) => {
        chars.next();
        literal.push('$');
      }
      Some((_, '{')) => {
        chars.next();

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }

        let mut name = String::new();
        let mut closed = false;
        for (_, c) in chars.by_ref() {
          if c == '}' {
            closed = true;
            break;
          }
          name.push(c);
        }

        if !closed {
          return Err(VarError::MalformedTemplate {
            position: pos,
            message: "unterminated placeholder".to_string(),
          });
        }

        validate_name(&name, pos)?;
        segments.push(Segment::Reference(name));
      }
      _ => {
        return Err(VarError::MalformedTemplate {
          position: pos,
          message: "dangling '$' (use '$$' for a literal dollar)".to_string(),
        });
      }
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

fn validate_name(name: &str, pos: usize) -> Result<(), VarError> {
  if name.is_empty() {
    return Err(VarError::MalformedTemplate {
      position: pos,
      message: "empty placeholder name".to_string(),
    });
  }

  // At most one dot, separating an import qualifier from the variable name.
  let mut parts = name.split('.');
  let valid = parts.clone().count() <= 2
    && parts.all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

  if !valid {
    return Err(VarError::MalformedTemplate {
      position: pos,
      message: format!("invalid placeholder name '{name}'"),
    });
  }

  Ok(())
}

/// Returns the distinct referenced names in declaration order.
pub fn references(segments: &[Segment]) -> Vec<String> {
  let mut refs: Vec<String> = Vec::new();
  for segment in segments {
    if let Segment::Reference(name) = segment
      && !refs.iter().any(|r| r == name)
    {
      refs.push(name.clone());
    }
  }
  refs
}

/// Expand parsed segments, resolving each reference through `lookup`.
///
/// Literal text passes through unchanged; the output contains no `${...}`
/// sequences.
pub fn expand<F>(segments: &[Segment], mut lookup: F) -> Result<String, VarError>
where
  F: FnMut(&str) -> Result<String, VarError>,
{
  let mut result = String::new();
  for segment in segments {
    match segment {
      Segment::Literal(text) => result.push_str(text),
      Segment::Reference(name) => result.push_str(&lookup(name)?),
    }
  }
  Ok(result)
}
