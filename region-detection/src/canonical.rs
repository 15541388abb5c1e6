//! Rotation and reflection invariant identity for cycles.

// Unit separator; vertex ids come from user data and may contain commas or pipes
const KEY_SEPARATOR: &str = "\u{1f}";

/// Create a canonical key for a cycle.
///
/// Every rotation of the sequence and of its reverse is a candidate; the lexicographically
/// smallest one, joined with a fixed separator, is the key. The same loop walked from a
/// different start vertex or in the other direction therefore produces the same key.
pub fn canonical_key<S: AsRef<str>>(cycle: &[S]) -> String {
    let forward: Vec<&str> = cycle.iter().map(|s| s.as_ref()).collect();
    let n = forward.len();
    if n == 0 {
        return String::new();
    }

    let mut reversed = forward.clone();
    reversed.reverse();

    fn rotation<'s>(seq: &'s [&'s str], start: usize) -> impl Iterator<Item = &'s str> + 's {
        seq[start..].iter().chain(seq[..start].iter()).copied()
    }

    // Compare lazily; for distinct ids almost every candidate loses on its first element
    let mut best: (&[&str], usize) = (forward.as_slice(), 0);
    for seq in [&forward, &reversed] {
        for start in 0..n {
            if rotation(seq, start).cmp(rotation(best.0, best.1)).is_lt() {
                best = (seq.as_slice(), start);
            }
        }
    }

    rotation(best.0, best.1).collect::<Vec<_>>().join(KEY_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotations_share_key() {
        let key = canonical_key(&["A", "B", "C", "D"]);
        assert_eq!(key, canonical_key(&["C", "D", "A", "B"]));
        assert_eq!(key, canonical_key(&["B", "C", "D", "A"]));
    }

    #[test]
    fn test_reflection_shares_key() {
        assert_eq!(
            canonical_key(&["A", "B", "C", "D"]),
            canonical_key(&["D", "C", "B", "A"])
        );
        assert_eq!(
            canonical_key(&["A", "B", "C", "D"]),
            canonical_key(&["B", "A", "D", "C"])
        );
    }

    #[test]
    fn test_key_starts_with_smallest_id() {
        let key = canonical_key(&["d", "a", "c", "b"]);
        assert_eq!(key, ["a", "c", "b", "d"].join(KEY_SEPARATOR));
    }

    #[test]
    fn test_different_cycles_differ() {
        assert_ne!(
            canonical_key(&["A", "B", "C", "D"]),
            canonical_key(&["A", "C", "B", "D"])
        );
    }

    #[test]
    fn test_separator_prevents_id_collisions() {
        assert_ne!(canonical_key(&["ab", "c", "d"]), canonical_key(&["a", "bc", "d"]));
    }

    #[test]
    fn test_empty_cycle() {
        let empty: [&str; 0] = [];
        assert_eq!(canonical_key(&empty), "");
    }
}
