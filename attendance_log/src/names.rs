use std::collections::BTreeSet;

use log::{debug, info};

use crate::config::{QualityRules, SimilarityPair};

// Linking articles of Portuguese names. They stay in lower case inside a name.
const LINKING_ARTICLES: [&str; 5] = ["Da", "De", "Do", "Das", "Dos"];

/// Canonical display form of a name, the missing marker being passed through.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_name)
}

/// Canonical display form of a name.
///
/// Surrounding whitespace is removed, internal runs of whitespace are collapsed,
/// every word is title-cased and the linking articles (`da`, `de`, `do`, `das`,
/// `dos`) are put in lower case when they are neither the first nor the last word.
///
/// ```
/// use attendance_log::normalize_name;
///
/// assert_eq!(normalize_name("  MARIA   DE souza "), "Maria de Souza");
/// assert_eq!(normalize_name("de Souza"), "De Souza");
/// ```
pub fn normalize_name(raw: &str) -> String {
    let words: Vec<String> = raw.split_whitespace().map(title_case).collect();
    let last = words.len().saturating_sub(1);
    words
        .into_iter()
        .enumerate()
        .map(|(idx, word)| {
            if idx > 0 && idx < last && LINKING_ARTICLES.contains(&word.as_str()) {
                word.to_lowercase()
            } else {
                word
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// Upper case after any character that is not a letter (start, apostrophe, hyphen),
// lower case otherwise.
fn title_case(word: &str) -> String {
    let mut res = String::with_capacity(word.len());
    let mut at_word_start = true;
    for c in word.chars() {
        if at_word_start {
            // A multi-char capital keeps only its first char upper: "ß" gives "Ss".
            let mut upper = c.to_uppercase();
            res.extend(upper.next());
            res.extend(upper.flat_map(char::to_lowercase));
        } else {
            res.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphabetic();
    }
    res
}

/// A score between two strings, in [0, 1]. Identical strings score 1.
pub trait SimilarityMetric {
    fn ratio(&self, a: &str, b: &str) -> f64;

    /// An upper bound of `ratio` knowing only the lengths (in characters) of the inputs.
    /// Pairs whose bound is under the threshold are not scored.
    fn upper_bound(&self, _len_a: usize, _len_b: usize) -> f64 {
        1.0
    }
}

// Length of the longest common subsequence, two rows of the table at a time.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = vec![0; b.len() + 1];
    let mut cur: Vec<usize> = vec![0; b.len() + 1];
    for ca in a.iter() {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// The ratio of matching characters: 2 × M / T, where M is the length of the
/// longest common subsequence and T the total number of characters.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct MatchingRatio;

impl SimilarityMetric for MatchingRatio {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        (2 * lcs_len(&a, &b)) as f64 / total as f64
    }

    fn upper_bound(&self, len_a: usize, len_b: usize) -> f64 {
        if len_a + len_b == 0 {
            1.0
        } else {
            (2 * len_a.min(len_b)) as f64 / (len_a + len_b) as f64
        }
    }
}

/// Finds the pairs of distinct names that are likely to be the same person.
///
/// It only reports candidates: merging is always left to the operator.
#[derive(Debug, Clone)]
pub struct SimilarityDetector<M: SimilarityMetric = MatchingRatio> {
    metric: M,
    threshold: f64,
}

impl SimilarityDetector<MatchingRatio> {
    pub fn new() -> SimilarityDetector<MatchingRatio> {
        SimilarityDetector::with_metric(MatchingRatio)
    }
}

impl Default for SimilarityDetector<MatchingRatio> {
    fn default() -> Self {
        SimilarityDetector::new()
    }
}

impl<M: SimilarityMetric> SimilarityDetector<M> {
    pub fn with_metric(metric: M) -> SimilarityDetector<M> {
        SimilarityDetector {
            metric,
            threshold: QualityRules::DEFAULT_RULES.similarity_threshold,
        }
    }

    pub fn threshold(self, threshold: f64) -> SimilarityDetector<M> {
        SimilarityDetector {
            metric: self.metric,
            threshold,
        }
    }

    /// All the pairs scoring in [threshold, 1.0), by decreasing score.
    ///
    /// The comparison is case-insensitive. Duplicated input names are compared once.
    /// Ties are ordered by names to keep the output stable.
    pub fn find_similar<'a, I>(&self, names: I) -> Vec<SimilarityPair>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: BTreeSet<&str> = names.into_iter().collect();
        let keyed: Vec<(&str, String, usize)> = unique
            .into_iter()
            .map(|name| {
                let lower = name.to_lowercase();
                let len = lower.chars().count();
                (name, lower, len)
            })
            .collect();
        info!("find_similar: comparing {} names", keyed.len());

        let mut res: Vec<SimilarityPair> = Vec::new();
        for (idx, (name_a, lower_a, len_a)) in keyed.iter().enumerate() {
            for (name_b, lower_b, len_b) in keyed[idx + 1..].iter() {
                if self.metric.upper_bound(*len_a, *len_b) < self.threshold {
                    continue;
                }
                let score = self.metric.ratio(lower_a, lower_b);
                if score >= self.threshold && score < 1.0 {
                    debug!("find_similar: {:?} ~ {:?}: {:.3}", name_a, name_b, score);
                    res.push(SimilarityPair {
                        name_a: name_a.to_string(),
                        name_b: name_b.to_string(),
                        score,
                    });
                }
            }
        }
        res.sort_by(|p1, p2| {
            p2.score
                .partial_cmp(&p1.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| p1.name_a.cmp(&p2.name_a))
                .then_with(|| p1.name_b.cmp(&p2.name_b))
        });
        info!("find_similar: {} similar pairs", res.len());
        res
    }
}

/// Shortcut for the default detector.
pub fn find_similar<'a, I>(names: I) -> Vec<SimilarityPair>
where
    I: IntoIterator<Item = &'a str>,
{
    SimilarityDetector::new().find_similar(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_title_cases() {
        assert_eq!(normalize_name("  joão   silva "), "João Silva");
        assert_eq!(normalize_name("MARIA santos"), "Maria Santos");
        assert_eq!(normalize_name("\tana\u{a0}paula\n"), "Ana Paula");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn lowers_articles_inside_names_only() {
        assert_eq!(normalize_name("Maria De Souza"), "Maria de Souza");
        assert_eq!(normalize_name("maria das dores"), "Maria das Dores");
        assert_eq!(normalize_name("PEDRO DOS SANTOS DA SILVA"), "Pedro dos Santos da Silva");
        assert_eq!(normalize_name("de Souza"), "De Souza");
        assert_eq!(normalize_name("Joana Da"), "Joana Da");
        // Not a whole word.
        assert_eq!(normalize_name("dora dantas"), "Dora Dantas");
    }

    #[test]
    fn title_cases_multi_char_capitals() {
        assert_eq!(normalize_name("ßa silva"), "Ssa Silva");
        assert_eq!(normalize_name("ﬁona"), "Fiona");
        assert_eq!(normalize_name("ŉa"), "\u{2bc}na");
    }

    #[test]
    fn title_cases_after_punctuation() {
        assert_eq!(normalize_name("d'ávila"), "D'Ávila");
        assert_eq!(normalize_name("ana-maria"), "Ana-Maria");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "  joão   silva ",
            "MARIA DE souza",
            "de souza",
            "ana DAS dores dos reis",
            "x",
            "o'neil",
            "ßa silva",
            "ŉa",
            "ﬁona",
        ];
        for input in inputs.iter() {
            let once = normalize_name(input);
            assert_eq!(normalize_name(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn missing_names_are_passed_through() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some(" bruno ")), Some("Bruno".to_string()));
    }

    #[test]
    fn ratio_counts_matching_characters() {
        let m = MatchingRatio;
        assert_eq!(m.ratio("abcd", "abcd"), 1.0);
        assert_eq!(m.ratio("", ""), 1.0);
        assert_eq!(m.ratio("abc", "xyz"), 0.0);
        assert!((m.ratio("joão silva", "joao silva") - 0.9).abs() < 1e-9);
        // A missing linking article.
        assert!((m.ratio("pedro santos", "pedro dos santos") - 24.0 / 28.0).abs() < 1e-9);
        assert!((m.ratio("maria de souza", "mariana souza") - 22.0 / 27.0).abs() < 1e-9);
        assert_eq!(m.ratio("abcde", "abcdf"), 0.8);
    }

    #[test]
    fn ratio_is_symmetric() {
        let m = MatchingRatio;
        let pairs = [
            ("ana ana ana", "mariana souza"),
            ("pedro santos", "pedro dos santos"),
            ("joão da silva", "joana silveira"),
            ("", "bruno"),
        ];
        for (a, b) in pairs.iter() {
            assert_eq!(m.ratio(a, b), m.ratio(b, a), "{:?} / {:?}", a, b);
        }
        assert!((m.ratio("ana ana ana", "mariana souza") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn reports_pairs_from_the_threshold_up() {
        let pairs = find_similar(
            ["Pedro Santos", "Pedro dos Santos", "Maria de Souza", "Mariana Souza"]
                .iter()
                .copied(),
        );
        let found: Vec<(&str, &str)> = pairs
            .iter()
            .map(|p| (p.name_a.as_str(), p.name_b.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("Pedro Santos", "Pedro dos Santos"),
                ("Maria de Souza", "Mariana Souza"),
            ]
        );

        let at_threshold = find_similar(["abcde", "abcdf"].iter().copied());
        assert_eq!(at_threshold.len(), 1);
        assert_eq!(at_threshold[0].score, 0.8);
    }

    #[test]
    fn similar_pairs_respect_threshold_and_order() {
        let names = [
            "João Silva",
            "Joao Silva",
            "Joao Silvaa",
            "Maria Santos",
            "Bruno",
            "JOÃO SILVA",
        ];
        let pairs = find_similar(names.iter().copied());
        assert!(!pairs.is_empty());
        for p in pairs.iter() {
            assert!(p.score >= 0.8 && p.score < 1.0, "{:?}", p);
            assert_ne!(p.name_a, p.name_b);
        }
        for w in pairs.windows(2) {
            assert!(w[0].score >= w[1].score);
        }
        // Case-only differences are identical names, never similar ones.
        assert!(!pairs
            .iter()
            .any(|p| p.name_a.to_lowercase() == p.name_b.to_lowercase()));
        assert!(!pairs
            .iter()
            .any(|p| p.name_a == "Bruno" || p.name_b == "Bruno"));
    }

    #[test]
    fn duplicated_inputs_are_compared_once() {
        let pairs = find_similar(["Joao Silva", "João Silva", "Joao Silva"].iter().copied());
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].name_a, "Joao Silva");
        assert_eq!(pairs[0].name_b, "João Silva");
    }

    #[derive(Debug)]
    struct SameFirstLetter;

    impl SimilarityMetric for SameFirstLetter {
        fn ratio(&self, a: &str, b: &str) -> f64 {
            if a.chars().next() == b.chars().next() {
                0.9
            } else {
                0.0
            }
        }
    }

    #[test]
    fn metric_is_pluggable() {
        let detector = SimilarityDetector::with_metric(SameFirstLetter);
        let pairs = detector.find_similar(["Ana", "Alice", "Bruno"].iter().copied());
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].name_a, "Alice");
        assert_eq!(pairs[0].name_b, "Ana");

        let strict = SimilarityDetector::with_metric(SameFirstLetter).threshold(0.95);
        assert!(strict
            .find_similar(["Ana", "Alice"].iter().copied())
            .is_empty());
    }
}
