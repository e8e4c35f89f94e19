//! Bracket-aware list splitting and `name(type,...)` signature parsing.

use tracing::trace;

use crate::ext::ArgError;

/// Split a comma-separated list at top level, keeping parenthesized groups
/// intact.
///
/// Elements are trimmed and empty elements are dropped, so `""` yields an
/// empty list and `"a,,b"` yields `["a", "b"]`. Parentheses must balance and
/// the depth may never go negative.
pub fn split_top_level(text: &str) -> Result<Vec<&str>, ArgError> {
    let unmatched = || ArgError::UnmatchedBrackets(text.to_string());

    let mut elements = Vec::with_capacity(text.matches(',').count() + 1);
    let mut depth = 0usize;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or_else(unmatched)?,
            ',' if depth == 0 => {
                push_trimmed(&mut elements, &text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(unmatched());
    }
    push_trimmed(&mut elements, &text[start..]);

    Ok(elements)
}

fn push_trimmed<'a>(elements: &mut Vec<&'a str>, element: &'a str) {
    let element = element.trim();
    if !element.is_empty() {
        elements.push(element);
    }
}

/// Split a signature into its name and raw type tokens.
///
/// The name is whatever precedes the first `(` and the argument list runs to
/// the last `)`. A name containing `)` is therefore accepted verbatim
/// (`weirdBrackets)()` has the name `weirdBrackets)`). An empty name is
/// allowed and denotes a constructor.
pub fn parse_signature(signature: &str) -> Result<(&str, Vec<&str>), ArgError> {
    let (first, last) = match (signature.find('('), signature.rfind(')')) {
        (Some(first), Some(last)) if last > first => (first, last),
        _ => return Err(ArgError::UnmatchedBrackets(signature.to_string())),
    };

    let name = signature[..first].trim();
    let types = split_top_level(&signature[first + 1..last])?;
    trace!(name, ?types, "parsed signature");

    Ok((name, types))
}
