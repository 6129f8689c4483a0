/*!
 * String similarity scoring for round-trip fidelity checks.
 *
 * Provides a normalized Levenshtein-based similarity percentage used to
 * compare a back-translation against the original source text.
 */

/// Calculate similarity percentage between two strings (0.0 - 100.0).
///
/// Both inputs are normalized (lowercased and trimmed) before the edit
/// distance is computed, and the `longer`/`shorter` roles are assigned on
/// the normalized character counts. The distance can therefore never exceed
/// the divisor, which keeps the score within [0, 100].
///
/// Returns exactly 100.0 when the normalized `longer` string is empty, so two
/// empty (or whitespace-only) inputs score a perfect match instead of
/// dividing by zero.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let (longer, shorter, longer_len) = if a_len >= b_len {
        (a, b, a_len)
    } else {
        (b, a, b_len)
    };

    if longer_len == 0 {
        return 100.0;
    }

    let distance = edit_distance(&longer, &shorter);
    (longer_len as f64 - distance as f64) / longer_len as f64 * 100.0
}

/// Normalize a string for comparison: trim surrounding whitespace and lowercase.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Classic Levenshtein edit distance over a full (len+1) x (len+1) DP table.
///
/// Operates on characters, with unit cost for substitution, insertion and
/// deletion.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0usize; a_len + 1]; b_len + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=a_len {
        matrix[0][j] = j;
    }

    for i in 1..=b_len {
        for j in 1..=a_len {
            if b_chars[i - 1] == a_chars[j - 1] {
                matrix[i][j] = matrix[i - 1][j - 1];
            } else {
                matrix[i][j] = (matrix[i - 1][j - 1] + 1)
                    .min(matrix[i][j - 1] + 1)
                    .min(matrix[i - 1][j] + 1);
            }
        }
    }

    matrix[b_len][a_len]
}
