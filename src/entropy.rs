// Character-level Shannon entropy
use std::collections::HashMap;

/// Bits of entropy per character of `text`.
///
/// An empty string scores 0.0. Frequencies are counted over Unicode scalar
/// values, so multi-byte characters count once.
pub fn shannon_entropy(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    let mut length = 0usize;
    for c in text.chars() {
        *freq.entry(c).or_insert(0) += 1;
        length += 1;
    }

    let length = length as f64;
    freq.values()
        .map(|&count| {
            let p = count as f64 / length;
            -p * p.log2()
        })
        .sum()
}
