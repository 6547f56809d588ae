//! Positional parameter numbering
//!
//! Templates use a neutral `?` marker; the builder rewrites the i-th marker
//! to `$<start + i>`, so numbering continues across clauses of one statement.

pub const PLACEHOLDER: char = '?';

/// Count `?` markers in a template.
#[must_use]
pub fn count(template: &str) -> usize {
    template.matches(PLACEHOLDER).count()
}

/// Rewrite every `?` in `template` to `$start`, `$start+1`, ...
///
/// Fails when the marker count differs from `args`, naming both numbers.
pub fn number(template: &str, start: usize, args: usize) -> Result<String, String> {
    let found = count(template);
    if found != args {
        return Err(format!(
            "template \"{template}\" has {found} placeholder(s) but {args} argument(s) were given"
        ));
    }

    let mut out = String::with_capacity(template.len() + args * 2);
    let mut next = start;
    for ch in template.chars() {
        if ch == PLACEHOLDER {
            out.push('$');
            out.push_str(&next.to_string());
            next += 1;
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

/// `$start, $start+1, ...` joined by `, ` for a VALUES tuple.
#[must_use]
pub fn tuple(start: usize, len: usize) -> String {
    (start..start + len)
        .map(|n| format!("${n}"))
        .collect::<Vec<_>>()
        .join(", ")
}
