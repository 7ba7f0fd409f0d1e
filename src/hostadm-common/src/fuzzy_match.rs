//! Fuzzy string matching for command names.
//!
//! Used to suggest commands when the typed name does not resolve. Matching is
//! byte-wise: no case folding and no locale awareness.

/// Unit-cost Levenshtein distance between two byte strings.
///
/// Insertions, deletions and substitutions cost 1; transpositions are not
/// special-cased and cost 2.
pub fn levenshtein_distance(a: &[u8], b: &[u8]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let n = b.len();
    let mut prev_row: Vec<usize> = (0..=n).collect();
    let mut curr_row = vec![0usize; n + 1];

    for (i, a_byte) in a.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_byte) in b.iter().enumerate() {
            let cost = usize::from(a_byte != b_byte);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[n]
}

/// Whether `input` is "close enough" to `candidate` to be worth suggesting.
///
/// True when the edit distance is exactly one, or when one string contains
/// the other and their lengths differ. Identical strings do not match.
pub fn matches(candidate: &str, input: &str) -> bool {
    let (clen, inplen) = (candidate.len(), input.len());

    // A distance of one needs the lengths to be within one of each other.
    if clen.abs_diff(inplen) <= 1
        && levenshtein_distance(candidate.as_bytes(), input.as_bytes()) == 1
    {
        return true;
    }

    (clen > inplen && candidate.contains(input)) || (inplen > clen && input.contains(candidate))
}
