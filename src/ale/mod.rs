//! §4.G ALE: the arithmetic and logic expression evaluator, grounded on
//! `original_source/Include/ALE.hpp`.
//!
//! An operator-precedence parser over a flat byte slice: no AST is built,
//! each operator folds its left operand in place as soon as a
//! same-or-lower-precedence operator is seen, recursing only to let a
//! higher-precedence run bind first. `{name}` references and `==`/`!=`
//! comparisons are resolved through a host [`Callback`]; everything else
//! (arithmetic, relational, logical operators, parenthesized
//! sub-expressions) is self-contained.

pub mod callback;

pub use callback::{Callback, Number, NumericCallback};

/// §4.G `Operation`: the operator tags. The declaration order doubles as a
/// precedence ordering — comparing two `Operation` values with `<`/`>`
/// compares how tightly they bind, exactly as in the original enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Operation {
    None,
    Or,
    And,
    BiggerOrEqual,
    Bigger,
    LessOrEqual,
    Less,
    NotEqual,
    Equal,
    Subtraction,
    Addition,
    Division,
    Multiplication,
    Remainder,
    Exponent,
    Error,
}

/// Evaluates `content` as an ALE expression, returning `None` if it's not a
/// well-formed expression (unbalanced brackets, division/remainder by zero,
/// an unresolved comparison, and so on — §4.G edge cases).
pub fn evaluate(content: &[u8], callback: &dyn Callback) -> Option<f64> {
    let mut number = Number::Value(0.0);
    let mut current_op = Operation::None;
    let mut offset = 0usize;

    if parse(&mut current_op, &mut number, content, &mut offset, content.len(), callback) {
        Some(number.value())
    } else {
        None
    }
}

/// Convenience wrapper matching the original's "for testing" overloads:
/// failed evaluation reads as `0`.
pub fn evaluate_or_zero(content: &[u8], callback: &dyn Callback) -> f64 {
    evaluate(content, callback).unwrap_or(0.0)
}

fn parse(
    current_op: &mut Operation,
    left: &mut Number,
    content: &[u8],
    offset: &mut usize,
    end_offset: usize,
    callback: &dyn Callback,
) -> bool {
    let previous_offset_start = *offset;
    let (op0, op_w0) = next_operation(content, offset, end_offset);

    if !get_number(
        left,
        content,
        previous_offset_start,
        *offset - previous_offset_start,
        callback,
        op0,
    ) {
        return false;
    }

    let mut op = op0;
    let mut op_w = op_w0;
    advance(op, offset);
    let mut previous_offset = *offset;

    while *offset < end_offset {
        let (next_op, next_op_w) = next_operation(content, offset, end_offset);

        if next_op_w > op_w {
            let mut tmp_op = op;
            let mut right = Number::Value(0.0);

            if parse(&mut tmp_op, &mut right, content, &mut previous_offset, end_offset, callback)
                && process(content, left, right, op, callback)
            {
                op = tmp_op;
                *offset = previous_offset;
                continue;
            }
        } else {
            let mut right = Number::Value(0.0);

            if get_number(
                &mut right,
                content,
                previous_offset,
                *offset - previous_offset,
                callback,
                op,
            ) && process(content, left, right, op, callback)
            {
                advance(next_op, offset);

                if next_op_w < *current_op {
                    *current_op = next_op;
                    return true;
                }

                op = next_op;
                op_w = next_op_w;
                previous_offset = *offset;
                continue;
            }
        }

        return false;
    }

    op == Operation::None
}

fn advance(op: Operation, offset: &mut usize) {
    match op {
        Operation::Equal
        | Operation::NotEqual
        | Operation::LessOrEqual
        | Operation::BiggerOrEqual
        | Operation::And
        | Operation::Or => *offset += 2,
        _ => *offset += 1,
    }
}

#[inline]
fn peek(content: &[u8], index: usize) -> u8 {
    content.get(index).copied().unwrap_or(0)
}

fn next_operation(
    content: &[u8],
    offset: &mut usize,
    end_offset: usize,
) -> (Operation, Operation) {
    while *offset < end_offset {
        match content[*offset] {
            b'|' => {
                if peek(content, *offset + 1) == b'|' {
                    return (Operation::Or, Operation::And);
                }
                return (Operation::Error, Operation::None);
            }
            b'&' => {
                if peek(content, *offset + 1) == b'&' {
                    return (Operation::And, Operation::And);
                }
                return (Operation::Error, Operation::None);
            }
            b'>' => {
                if peek(content, *offset + 1) == b'=' {
                    return (Operation::BiggerOrEqual, Operation::BiggerOrEqual);
                }
                return (Operation::Bigger, Operation::BiggerOrEqual);
            }
            b'<' => {
                if peek(content, *offset + 1) == b'=' {
                    return (Operation::LessOrEqual, Operation::LessOrEqual);
                }
                return (Operation::Less, Operation::LessOrEqual);
            }
            b'!' => {
                if peek(content, *offset + 1) == b'=' {
                    return (Operation::NotEqual, Operation::Equal);
                }
                return (Operation::Error, Operation::None);
            }
            b'=' => {
                if peek(content, *offset + 1) == b'=' {
                    return (Operation::Equal, Operation::Equal);
                }
                return (Operation::Error, Operation::None);
            }
            b'-' => {
                if is_operation(content, *offset) {
                    return (Operation::Subtraction, Operation::Addition);
                }
            }
            b'+' => {
                if is_operation(content, *offset) {
                    return (Operation::Addition, Operation::Addition);
                }
            }
            b'/' => return (Operation::Division, Operation::Multiplication),
            b'*' => return (Operation::Multiplication, Operation::Multiplication),
            b'%' => return (Operation::Remainder, Operation::Remainder),
            b'^' => return (Operation::Exponent, Operation::Exponent),
            b'(' => {
                *offset += 1;
                let after = crate::engine::skip_inner_patterns(b'(', b')', content, *offset, end_offset);

                if after != 0 {
                    *offset = after;
                    continue;
                }

                *offset = end_offset;
                return (Operation::Error, Operation::None);
            }
            b'{' => {
                *offset += 1;
                let after = crate::engine::find_one(b'}', content, *offset, end_offset);

                if after != 0 {
                    *offset = after;
                    continue;
                }

                *offset = end_offset;
                return (Operation::Error, Operation::None);
            }
            _ => {}
        }

        *offset += 1;
    }

    (Operation::None, Operation::None)
}

/// Whether the `-`/`+` at `offset` is binary (follows a digit or a closing
/// `)`/`}`) or a unary sign character, found by scanning backward over
/// spaces (§4.G `isOperation`).
fn is_operation(content: &[u8], mut offset: usize) -> bool {
    while offset != 0 {
        offset -= 1;

        match content[offset] {
            b' ' => {}
            b')' | b'}' => return true,
            c => return c > b'/' && c < b':',
        }
    }

    false
}

fn get_number(
    val: &mut Number,
    content: &[u8],
    offset: usize,
    length: usize,
    callback: &dyn Callback,
    op: Operation,
) -> bool {
    if op == Operation::Error {
        return false;
    }

    let mut start = offset;
    let mut end = offset + length;

    while start < end && content[start] == b' ' {
        start += 1;
    }
    while end > start && content[end - 1] == b' ' {
        end -= 1;
    }

    if op == Operation::Equal || op == Operation::NotEqual {
        *val = Number::Range {
            offset: start,
            length: end - start,
        };
        return true;
    }

    if start >= end {
        return false;
    }

    match content[start] {
        b'(' => {
            let new_start = start + 1;
            let new_end = end - 1;

            if new_start > new_end {
                return false;
            }

            let mut current_op = Operation::None;
            let mut inner_offset = new_start;
            parse(&mut current_op, val, content, &mut inner_offset, new_end, callback)
        }
        b'{' => {
            let inner_end = end - 1;

            if start + 1 > inner_end {
                return false;
            }

            match callback.resolve_name(&content[start + 1..inner_end]) {
                Some(v) => {
                    *val = Number::Value(v);
                    true
                }
                None => false,
            }
        }
        _ => match parse_number(&content[start..end]) {
            Some(v) => {
                *val = Number::Value(v);
                true
            }
            None => false,
        },
    }
}

fn process(
    content: &[u8],
    left: &mut Number,
    right: Number,
    op: Operation,
    callback: &dyn Callback,
) -> bool {
    match op {
        Operation::Exponent => {
            let right = right.value();

            if right != 0.0 {
                let base = left.value();

                if base != 0.0 {
                    let neg = right < 0.0;
                    let right_abs = if neg { -right } else { right };

                    if right_abs < 1.0 {
                        return false;
                    }

                    let mut times = right_abs as u32;
                    let mut result = base;

                    while {
                        times -= 1;
                        times != 0
                    } {
                        result *= base;
                    }

                    if neg {
                        result = 1.0 / result;
                    }

                    *left = Number::Value(result);
                }
            } else {
                *left = Number::Value(1.0);
            }

            true
        }

        Operation::Remainder => {
            let right = right.value() as u64;

            if right == 0 {
                return false;
            }

            let left_int = left.value() as u64;
            *left = Number::Value((left_int % right) as f64);
            true
        }

        Operation::Multiplication => {
            *left = Number::Value(left.value() * right.value());
            true
        }

        Operation::Division => {
            let right = right.value();

            if right == 0.0 {
                return false;
            }

            *left = Number::Value(left.value() / right);
            true
        }

        Operation::Addition => {
            *left = Number::Value(left.value() + right.value());
            true
        }

        Operation::Subtraction => {
            *left = Number::Value(left.value() - right.value());
            true
        }

        Operation::Less => {
            *left = Number::Value(if left.value() < right.value() { 1.0 } else { 0.0 });
            true
        }

        Operation::LessOrEqual => {
            *left = Number::Value(if left.value() <= right.value() { 1.0 } else { 0.0 });
            true
        }

        Operation::Bigger => {
            *left = Number::Value(if left.value() > right.value() { 1.0 } else { 0.0 });
            true
        }

        Operation::BiggerOrEqual => {
            *left = Number::Value(if left.value() >= right.value() { 1.0 } else { 0.0 });
            true
        }

        Operation::And => {
            *left = Number::Value(if left.value() > 0.0 && right.value() > 0.0 {
                1.0
            } else {
                0.0
            });
            true
        }

        Operation::Or => {
            *left = Number::Value(if left.value() > 0.0 || right.value() > 0.0 {
                1.0
            } else {
                0.0
            });
            true
        }

        Operation::Equal | Operation::NotEqual => match callback.compare(content, *left, right) {
            Some(is_equal) => {
                let result = if op == Operation::Equal { is_equal } else { !is_equal };
                *left = Number::Value(if result { 1.0 } else { 0.0 });
                true
            }
            None => false,
        },

        Operation::None | Operation::Error => true,
    }
}

/// Parses a numeric literal, including a leading run of unary `+`/`-` signs
/// folded by parity (`"---1"` → `-1`, §4.G edge cases). Rejects anything
/// containing characters outside `[0-9.eE+-]` so identifiers and `NaN`/
/// `inf` spellings aren't silently accepted as the original's strict
/// digit-grammar parser wouldn't accept them either.
pub fn parse_number(bytes: &[u8]) -> Option<f64> {
    let end = bytes.len();
    let mut start = 0;

    while start < end && bytes[start] == b' ' {
        start += 1;
    }

    if start >= end {
        return None;
    }

    let mut negative = false;

    while start < end && (bytes[start] == b'+' || bytes[start] == b'-') {
        if bytes[start] == b'-' {
            negative = !negative;
        }
        start += 1;
    }

    if start >= end {
        return None;
    }

    let digits = &bytes[start..end];

    for &b in digits {
        if !(b.is_ascii_digit() || b == b'.' || b == b'e' || b == b'E' || b == b'+' || b == b'-') {
            return None;
        }
    }

    let text = core::str::from_utf8(digits).ok()?;
    let value: f64 = text.parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ObjectCallback;

    impl Callback for ObjectCallback {
        fn resolve_name(&self, content: &[u8]) -> Option<f64> {
            match content {
                b"eq" => Some(10.0),
                _ => None,
            }
        }

        fn compare(&self, _content: &[u8], left: Number, right: Number) -> Option<bool> {
            let resolve = |n: Number| -> Option<f64> {
                match n {
                    Number::Value(v) => Some(v),
                    Number::Range { .. } => None,
                }
            };
            Some(resolve(left)? == resolve(right)?)
        }
    }

    struct NameEqualsCallback;

    impl Callback for NameEqualsCallback {
        fn resolve_name(&self, content: &[u8]) -> Option<f64> {
            let _ = content;
            None
        }

        fn compare(&self, content: &[u8], left: Number, right: Number) -> Option<bool> {
            let text_of = |n: Number| -> &[u8] {
                match n {
                    Number::Range { offset, length } => &content[offset..offset + length],
                    Number::Value(_) => b"",
                }
            };

            let l = text_of(left);
            let r = text_of(right);
            let l = if l.starts_with(b"{") && l.ends_with(b"}") {
                b"Qentem".as_slice()
            } else {
                l
            };

            Some(l == r)
        }
    }

    #[test]
    fn leading_unary_signs_fold_by_parity() {
        assert_eq!(evaluate(b"+1+1", &NumericCallback), Some(2.0));
        assert_eq!(evaluate(b"---1", &NumericCallback), Some(-1.0));
    }

    #[test]
    fn exponent_matches_repeated_multiplication() {
        assert_eq!(evaluate(b"2^8", &NumericCallback), Some(256.0));
    }

    #[test]
    fn nested_parens_and_division() {
        assert_eq!(
            evaluate(b"((1+2)^(1+2))/2", &NumericCallback),
            Some(13.5)
        );
    }

    #[test]
    fn logical_and_relational_precedence() {
        assert_eq!(
            evaluate(b"5+2*4-8/2==9 && 1", &NumericCallback),
            Some(1.0)
        );
    }

    #[test]
    fn identifier_without_braces_is_not_a_number() {
        assert_eq!(evaluate(b"a+2", &NumericCallback), None);
    }

    #[test]
    fn division_by_zero_fails() {
        assert_eq!(evaluate(b"8/0", &NumericCallback), None);
    }

    #[test]
    fn bracket_reference_resolves_through_callback() {
        assert_eq!(evaluate(b"{eq}", &ObjectCallback), Some(10.0));
    }

    #[test]
    fn string_equality_is_a_host_callback_concern() {
        assert_eq!(
            evaluate(b"{name} == Qentem", &NameEqualsCallback),
            Some(1.0)
        );
    }
}
