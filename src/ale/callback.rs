//! §4.G ALE callback interface, grounded on Design Notes §9: "express the
//! host hook as a trait with two methods, resolving `{name}` lookups and
//! comparing `==`/`!=` operands."

/// A number that may already be resolved, or may still be an unevaluated
/// range into the expression's source bytes (§4.G `Number`). The original
/// carries both possibilities in a raw union with a side-channel "evaluated"
/// flag; a tagged enum makes the same distinction safely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Value(f64),
    Range { offset: usize, length: usize },
}

impl Number {
    /// The resolved value, or `0.0` for an unresolved range (callers only
    /// call this once a range has been resolved by [`Callback::compare`]).
    pub fn value(&self) -> f64 {
        match *self {
            Number::Value(v) => v,
            Number::Range { .. } => 0.0,
        }
    }
}

/// Host hook for `{name}` resolution and `==`/`!=` comparison (§4.G).
///
/// `resolve_name` is consulted for every `{...}` reference (braces already
/// stripped). `compare` is consulted for every `==`/`!=`; it receives the
/// full expression source plus each operand, which may already be a plain
/// number (if it was folded through a higher-precedence sub-expression) or
/// still an unevaluated range (a literal or a parenthesized sub-expression
/// that hasn't been parsed yet).
pub trait Callback {
    fn resolve_name(&self, content: &[u8]) -> Option<f64>;

    fn compare(&self, content: &[u8], left: Number, right: Number) -> Option<bool>;
}

/// The default callback (`ALEHelper` in the original): no `{name}` support,
/// and `==`/`!=` resolve purely numerically — a parenthesized range is
/// evaluated recursively, anything else is parsed as a plain literal, then
/// the two sides are compared as `f64`. A host embedding ALE in a richer
/// context (object lookups, string equality) supplies its own `Callback`
/// instead.
pub struct NumericCallback;

impl Callback for NumericCallback {
    fn resolve_name(&self, _content: &[u8]) -> Option<f64> {
        None
    }

    fn compare(&self, content: &[u8], left: Number, right: Number) -> Option<bool> {
        let l = resolve_numeric(content, left, self)?;
        let r = resolve_numeric(content, right, self)?;
        Some(l == r)
    }
}

fn resolve_numeric(content: &[u8], number: Number, callback: &dyn Callback) -> Option<f64> {
    match number {
        Number::Value(v) => Some(v),
        Number::Range { offset, length } => {
            let mut start = offset;
            let mut end = offset + length;

            while start < end && content[start] == b' ' {
                start += 1;
            }
            while end > start && content[end - 1] == b' ' {
                end -= 1;
            }

            if start == end {
                return None;
            }

            if content[start] == b'(' && content[end - 1] == b')' {
                return crate::ale::evaluate(&content[start + 1..end - 1], callback);
            }

            crate::ale::parse_number(&content[start..end])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_callback_resolves_plain_literals() {
        let content = b"5==5";
        let cb = NumericCallback;
        let result = cb.compare(
            content,
            Number::Range { offset: 0, length: 1 },
            Number::Range { offset: 3, length: 1 },
        );
        assert_eq!(result, Some(true));
    }

    #[test]
    fn numeric_callback_evaluates_parenthesized_ranges() {
        let content = b"(1+1)==2";
        let cb = NumericCallback;
        let result = cb.compare(
            content,
            Number::Range { offset: 0, length: 5 },
            Number::Range { offset: 7, length: 1 },
        );
        assert_eq!(result, Some(true));
    }
}
