//! Natural string ordering: runs of ASCII digits compare by numeric value,
//! so `item2` sorts before `item10`.

use std::cmp::Ordering;

/// Compares two strings in natural order.
///
/// Digits sort before any other byte. Numbers with the same value but a
/// different number of leading zeros order by the count of zeros, fewer
/// first, so the ordering only returns `Equal` for identical strings.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let (ca, cb) = (a[i], b[j]);
        match (ca.is_ascii_digit(), cb.is_ascii_digit()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {
                if ca != cb {
                    return ca.cmp(&cb);
                }
                i += 1;
                j += 1;
            }
            (true, true) => {
                while i < a.len() && a[i] == b'0' {
                    i += 1;
                }
                while j < b.len() && b[j] == b'0' {
                    j += 1;
                }
                let (start_a, start_b) = (i, j);
                while i < a.len() && a[i].is_ascii_digit() {
                    i += 1;
                }
                while j < b.len() && b[j].is_ascii_digit() {
                    j += 1;
                }
                let (num_a, num_b) = (&a[start_a..i], &b[start_b..j]);
                let by_value = num_a.len().cmp(&num_b.len()).then_with(|| num_a.cmp(num_b));
                if by_value != Ordering::Equal {
                    return by_value;
                }
                // same value, the one with fewer leading zeros first
                if start_a != start_b {
                    return start_a.cmp(&start_b);
                }
            }
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}
