//! §4.H scanning primitives: single-character and pattern search, plus
//! nested-bracket skipping, grounded on
//! `original_source/Include/Engine.hpp`'s `FindOne`/`Find`/`SkipInnerPatterns`.
//!
//! The SIMD fast paths in the original are dropped per the REDESIGN FLAGS
//! (scalar-only); the scalar fallback loops are what's ported here, byte for
//! byte.

/// Returns one past the index of the first `needle` in `content[offset..end]`,
/// or `0` if absent (§4.H `FindOne`).
pub fn find_one(needle: u8, content: &[u8], mut offset: usize, end_offset: usize) -> usize {
    while offset < end_offset && content[offset] != needle {
        offset += 1;
    }

    if offset < end_offset {
        offset + 1
    } else {
        0
    }
}

/// Returns one past the end index of the first occurrence of `pattern` in
/// `content[offset..end]`, or `0` if absent (§4.H `Find`). `pattern` must be
/// at least 2 bytes.
pub fn find(pattern: &[u8], content: &[u8], mut offset: usize, mut end_offset: usize) -> usize {
    debug_assert!(pattern.len() > 1);

    if offset >= end_offset || offset + pattern.len() > end_offset {
        return 0;
    }

    let len_one_less = pattern.len() - 1;
    let pattern_last = pattern[len_one_less];
    end_offset -= len_one_less;

    while offset < end_offset {
        if pattern[0] == content[offset] && pattern_last == content[offset + len_one_less] {
            let mut tmp = 1;
            while tmp < len_one_less && pattern[tmp] == content[tmp + offset] {
                tmp += 1;
            }

            if tmp == len_one_less {
                return offset + tmp + 1;
            }
        }

        offset += 1;
    }

    0
}

/// Skips past a `prefix`/`suffix`-delimited region that may nest itself, e.g.
/// `{.{..{...}..}.}` (§4.H `SkipInnerPatterns`, single-char overload).
/// `offset` should already point past the opening `prefix` that the caller
/// consumed; returns one past the matching outer `suffix`, or `0` if
/// unbalanced.
pub fn skip_inner_patterns(
    prefix: u8,
    suffix: u8,
    content: &[u8],
    offset: usize,
    end_offset: usize,
) -> usize {
    let mut offset = offset;
    let mut offset2 = offset;

    loop {
        offset2 = find_one(suffix, content, offset2, end_offset);
        offset = find_one(prefix, content, offset, offset2);

        if offset == 0 {
            break;
        }
    }

    offset2
}

/// Multi-byte-pattern counterpart of [`skip_inner_patterns`] (§4.H, the
/// `Find`-based `SkipInnerPatterns` overload). Both `prefix` and `suffix`
/// must be at least 2 bytes.
pub fn skip_inner_patterns_str(
    prefix: &[u8],
    suffix: &[u8],
    content: &[u8],
    offset: usize,
    end_offset: usize,
) -> usize {
    let mut offset = offset;
    let mut offset2 = offset;

    loop {
        offset2 = find(suffix, content, offset2, end_offset);
        offset = find(prefix, content, offset, offset2);

        if offset == 0 {
            break;
        }
    }

    offset2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_one_locates_first_match() {
        assert_eq!(find_one(b'A', b"AAAAA", 1, 5), 2);
        assert_eq!(find_one(b'Z', b"AAAAA", 0, 5), 0);
    }

    #[test]
    fn find_locates_pattern_end() {
        assert_eq!(find(b"ABC", b"ABABABABABAAABABC", 0, 17), 17);
    }

    #[test]
    fn skip_inner_patterns_balances_nested_braces() {
        assert_eq!(skip_inner_patterns(b'{', b'}', b"{{{{{{}}}}}}", 1, 12), 12);
    }

    #[test]
    fn skip_inner_patterns_returns_zero_when_unbalanced() {
        assert_eq!(skip_inner_patterns(b'{', b'}', b"{{{", 1, 3), 0);
    }
}
