use clap::ValueEnum;
use strsim::normalized_levenshtein;

use super::process::{preprocess, sorted_tokens, token_set};

/// Highest possible similarity score
pub const MAX_SCORE: u8 = 100;

/// Weight applied to the token based ratios in [`Scorer::Weighted`]
const TOKEN_SCALE: f64 = 0.95;

/// Approximate string similarity metric, scores in [0, 100]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Scorer {
    /// Normalized Levenshtein similarity
    Ratio,
    /// Ratio of the alphabetically sorted tokens
    TokenSort,
    /// Ratio over shared tokens versus the remainders
    TokenSet,
    /// Best of ratio, token sort and token set, token ratios slightly discounted
    #[default]
    Weighted,
}

/// A string alongside its preprocessed form
///
/// Build these once for text that gets scored many times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared<'a> {
    raw: &'a str,
    processed: String,
}

impl<'a> Prepared<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            processed: preprocess(raw),
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }
}

impl Scorer {
    /// Score two strings
    ///
    /// Identical inputs always score 100. Inputs that normalize to nothing
    /// score 0 against anything else.
    pub fn score(self, a: &str, b: &str) -> u8 {
        if a == b {
            return MAX_SCORE;
        }
        self.score_prepared(&Prepared::new(a), &Prepared::new(b))
    }

    /// Same as [`Scorer::score`] on text that is already preprocessed
    pub fn score_prepared(self, a: &Prepared<'_>, b: &Prepared<'_>) -> u8 {
        if a.raw == b.raw {
            return MAX_SCORE;
        }

        let (a, b) = (a.processed.as_str(), b.processed.as_str());
        if a.is_empty() || b.is_empty() {
            return 0;
        }

        let value = match self {
            Scorer::Ratio => ratio(a, b),
            Scorer::TokenSort => token_sort_ratio(a, b),
            Scorer::TokenSet => token_set_ratio(a, b),
            Scorer::Weighted => {
                let base = ratio(a, b);
                if base >= 1.0 {
                    return MAX_SCORE;
                }
                base.max(token_sort_ratio(a, b) * TOKEN_SCALE)
                    .max(token_set_ratio(a, b) * TOKEN_SCALE)
            }
        };

        to_score(value)
    }
}

fn to_score(similarity: f64) -> u8 {
    (similarity.clamp(0.0, 1.0) * f64::from(MAX_SCORE)).round() as u8
}

fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b)
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn token_set_ratio(a: &str, b: &str) -> f64 {
    let set_a = token_set(a);
    let set_b = token_set(b);

    let join = |tokens: Vec<&&str>| tokens.into_iter().copied().collect::<Vec<_>>().join(" ");
    let intersection = join(set_a.intersection(&set_b).collect());
    let only_a = join(set_a.difference(&set_b).collect());
    let only_b = join(set_b.difference(&set_a).collect());

    let combined_a = format!("{} {}", intersection, only_a).trim().to_string();
    let combined_b = format!("{} {}", intersection, only_b).trim().to_string();

    let pair_ratio = ratio(&combined_a, &combined_b);
    if intersection.is_empty() {
        return pair_ratio;
    }

    pair_ratio
        .max(ratio(&intersection, &combined_a))
        .max(ratio(&intersection, &combined_b))
}
