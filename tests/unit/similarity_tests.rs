/*!
 * Tests for similarity scoring properties.
 */

use backtrans::similarity::similarity;

#[test]
fn test_similarity_anyStringWithItself_shouldBe100() {
    for s in ["", "a", "Hello world", "multi\nline\ttext", "héllo wörld"] {
        assert_eq!(similarity(s, s), 100.0, "similarity({s:?}, {s:?})");
    }
}

#[test]
fn test_similarity_kittenSitting_shouldBeAbout57() {
    let score = similarity("kitten", "sitting");
    assert!((score - 57.142857).abs() < 1e-4, "got {score}");
}

#[test]
fn test_similarity_injectedEdits_shouldBeMonotonicallyNonIncreasing() {
    let base = "consensus translation round trip";
    let mut previous = similarity(base, base);

    // Substitute one more character each step, keeping length fixed
    let mut perturbed: Vec<char> = base.chars().collect();
    for i in 0..8 {
        perturbed[i] = if i % 2 == 0 { '#' } else { '%' };
        let candidate: String = perturbed.iter().collect();
        let score = similarity(base, &candidate);
        assert!(score <= previous, "edit {} raised the score: {} > {}", i + 1, score, previous);
        previous = score;
    }
}

#[test]
fn test_similarity_disjointStrings_shouldScoreZero() {
    assert_eq!(similarity("aaaa", "bbbb"), 0.0);
}

#[test]
fn test_similarity_scoresBounded_forTypicalInputs() {
    let pairs = [
        ("Hello world", "Bonjour le monde"),
        ("short", "a considerably longer sentence"),
        ("", "non-empty"),
        ("Hi  ", "abc"),
        ("   padded source text   ", "short"),
    ];
    for (a, b) in pairs {
        let score = similarity(a, b);
        assert!((0.0..=100.0).contains(&score), "similarity({a:?}, {b:?}) = {score}");
        assert!(score.is_finite());
    }
}
