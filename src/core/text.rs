// src/core/text.rs
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Tokens are runs of at least two word characters.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"));

/// The classic English stop-word list used by most TF-IDF tooling.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together",
    "too", "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

static STOP_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Longest n-gram an analyzer may produce.
pub const MAX_NGRAM: usize = 2;

/// Turns raw ticket text into the n-gram stream the vectorizer counts.
///
/// Text is lowercased and tokenized, then stop words are dropped. N-grams are
/// built over the remaining tokens, so "fan is loud" yields the bigram
/// "fan loud".
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Analyzer {
    pub min_n: usize,
    pub max_n: usize,
    pub remove_stop_words: bool,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self { min_n: 1, max_n: 2, remove_stop_words: true }
    }
}

impl Analyzer {
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !(self.remove_stop_words && is_stop_word(t)))
            .map(str::to_string)
            .collect()
    }

    pub fn ngrams(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenize(text);
        let mut grams = Vec::new();
        for n in self.min_n.max(1)..=self.max_n.min(MAX_NGRAM) {
            if n == 1 {
                grams.extend(tokens.iter().cloned());
                continue;
            }
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stop_words_and_single_chars() {
        let analyzer = Analyzer::default();
        assert_eq!(
            analyzer.tokenize("I cannot connect to the WiFi, a 2 b"),
            vec!["connect", "wifi"]
        );
    }

    #[test]
    fn bigrams_skip_over_removed_stop_words() {
        let analyzer = Analyzer::default();
        let grams = analyzer.ngrams("Fan making loud noise, down for now");
        assert_eq!(
            grams,
            vec!["fan", "making", "loud", "noise", "fan making", "making loud", "loud noise"]
        );
    }

    #[test]
    fn keeps_stop_words_when_disabled() {
        let analyzer = Analyzer { remove_stop_words: false, ..Analyzer::default() };
        assert_eq!(analyzer.tokenize("down for now"), vec!["down", "for", "now"]);
    }

    #[test]
    fn empty_text_has_no_ngrams() {
        assert!(Analyzer::default().ngrams("  !! ").is_empty());
    }
}
