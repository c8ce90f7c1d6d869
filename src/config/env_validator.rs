//! Environment variable validation
//!
//! Invalid values never fail a run: they become warnings, with a typo
//! suggestion when one of the accepted values is close.

use super::loader::ConfigWarning;

/// Validator for one environment variable
pub struct EnvVarValidator<'a> {
    var_name: &'a str,
    expected: &'a str,
    candidates: &'a [&'a str],
}

impl<'a> EnvVarValidator<'a> {
    /// `expected` describes valid input for the warning message
    pub fn new(var_name: &'a str, expected: &'a str) -> Self {
        Self {
            var_name,
            expected,
            candidates: &[],
        }
    }

    /// Accepted literal values, used for suggestions
    pub fn with_candidates(mut self, candidates: &'a [&'a str]) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn parse<T, F>(&self, value: &str, parser: F) -> Result<T, ConfigWarning>
    where
        F: Fn(&str) -> Option<T>,
    {
        parser(value.trim()).ok_or_else(|| ConfigWarning::InvalidEnv {
            var: self.var_name.to_string(),
            value: value.to_string(),
            expected: self.expected.to_string(),
            suggestion: self.suggest(value),
        })
    }

    /// Closest candidate within two edits
    fn suggest(&self, value: &str) -> Option<String> {
        let input = value.trim().to_lowercase();
        self.candidates
            .iter()
            .map(|c| (*c, levenshtein(&input, c)))
            .filter(|(_, dist)| *dist > 0 && *dist <= 2)
            .min_by_key(|(_, dist)| *dist)
            .map(|(c, _)| c.to_string())
    }
}

/// Levenshtein distance for typo detection
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    if a_bytes.is_empty() {
        return b_bytes.len();
    }
    if b_bytes.is_empty() {
        return a_bytes.len();
    }

    let mut prev_row: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr_row: Vec<usize> = vec![0; b_bytes.len() + 1];

    for (i, a_char) in a_bytes.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b_bytes.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_bytes.len()]
}
