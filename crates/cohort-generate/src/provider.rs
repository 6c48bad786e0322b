use std::fmt;
use std::str::FromStr;

use fake::Fake;
use fake::faker::name::raw::{FirstName, LastName, Name};
use fake::locales::{EN, PT_BR};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use cohort_core::{FactKind, FactOptions, GeneratedValue};

use crate::errors::GenerationError;

const DEFAULT_CHARSET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub(crate) const DEFAULT_TEXT_MIN: i64 = 10;
pub(crate) const DEFAULT_TEXT_MAX: i64 = 15;
pub(crate) const DEFAULT_INT_MIN: i64 = 1;
pub(crate) const DEFAULT_INT_MAX: i64 = 10;

/// Source of independent random facts.
///
/// Each call returns one fresh value of the requested kind. Options are
/// honoured for `Text` (lengths) and `Integer` (inclusive bounds) and
/// ignored for name kinds.
pub trait FactProvider {
    fn draw(&mut self, kind: FactKind, options: &FactOptions) -> GeneratedValue;
}

/// Locale used for person names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FakerLocale {
    #[default]
    En,
    PtBr,
}

impl FakerLocale {
    pub fn as_str(self) -> &'static str {
        match self {
            FakerLocale::En => "en",
            FakerLocale::PtBr => "pt_br",
        }
    }
}

impl fmt::Display for FakerLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FakerLocale {
    type Err = GenerationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().replace('-', "_").as_str() {
            "en" | "en_us" => Ok(FakerLocale::En),
            "pt_br" => Ok(FakerLocale::PtBr),
            other => Err(GenerationError::InvalidPlan(format!(
                "unsupported faker locale '{other}'"
            ))),
        }
    }
}

/// Fact provider backed by `fake` for names and a seeded ChaCha stream for
/// text and integers.
#[derive(Debug, Clone)]
pub struct FakerProvider {
    rng: ChaCha8Rng,
    locale: FakerLocale,
    charset: Vec<char>,
}

impl FakerProvider {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            locale: FakerLocale::En,
            charset: DEFAULT_CHARSET.chars().collect(),
        }
    }

    pub fn from_os_rng() -> Self {
        Self::seeded(rand::random())
    }

    pub fn with_locale(mut self, locale: FakerLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Replaces the alphabet used for free text. An empty charset keeps
    /// the default.
    pub fn with_charset(mut self, charset: &str) -> Self {
        let chars: Vec<char> = charset.chars().collect();
        if !chars.is_empty() {
            self.charset = chars;
        }
        self
    }

    fn text(&mut self, options: &FactOptions) -> String {
        let (min_len, max_len) = match (options.exactly, options.at_least, options.at_most) {
            (Some(exactly), _, _) => (exactly, exactly),
            (None, Some(min), Some(max)) => (min, max),
            (None, Some(min), None) => (min, min.max(DEFAULT_TEXT_MAX)),
            (None, None, Some(max)) => (max.min(DEFAULT_TEXT_MIN), max),
            (None, None, None) => (DEFAULT_TEXT_MIN, DEFAULT_TEXT_MAX),
        };
        let min_len = usize::try_from(min_len).unwrap_or(0);
        let max_len = usize::try_from(max_len).unwrap_or(0).max(min_len);

        let len = if min_len == max_len {
            min_len
        } else {
            self.rng.random_range(min_len..=max_len)
        };
        let mut value = String::with_capacity(len);
        for _ in 0..len {
            let idx = self.rng.random_range(0..self.charset.len());
            value.push(self.charset[idx]);
        }
        value
    }

    fn integer(&mut self, options: &FactOptions) -> i64 {
        let (min, max) = match (options.at_least, options.at_most) {
            (Some(min), Some(max)) => (min, max),
            (Some(min), None) => (min, min.max(DEFAULT_INT_MAX)),
            (None, Some(max)) => (max.min(DEFAULT_INT_MIN), max),
            (None, None) => (DEFAULT_INT_MIN, DEFAULT_INT_MAX),
        };
        if min >= max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    fn name(&mut self, kind: FactKind) -> String {
        let rng = &mut self.rng;
        match (kind, self.locale) {
            (FactKind::FirstName, FakerLocale::En) => FirstName(EN).fake_with_rng(rng),
            (FactKind::FirstName, FakerLocale::PtBr) => FirstName(PT_BR).fake_with_rng(rng),
            (FactKind::LastName, FakerLocale::En) => LastName(EN).fake_with_rng(rng),
            (FactKind::LastName, FakerLocale::PtBr) => LastName(PT_BR).fake_with_rng(rng),
            (_, FakerLocale::En) => Name(EN).fake_with_rng(rng),
            (_, FakerLocale::PtBr) => Name(PT_BR).fake_with_rng(rng),
        }
    }
}

impl FactProvider for FakerProvider {
    fn draw(&mut self, kind: FactKind, options: &FactOptions) -> GeneratedValue {
        match kind {
            FactKind::Text => GeneratedValue::Text(self.text(options)),
            FactKind::Integer => GeneratedValue::Int(self.integer(options)),
            FactKind::FirstName | FactKind::LastName | FactKind::FullName => {
                GeneratedValue::Text(self.name(kind))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_provider_ranges() {
        let mut provider = FakerProvider::seeded(7);
        for _ in 0..200 {
            let text = provider.draw(FactKind::Text, &FactOptions::default());
            let len = text.as_str().expect("text").chars().count();
            assert!((10..=15).contains(&len), "length {len}");

            let number = provider.draw(FactKind::Integer, &FactOptions::default());
            assert!((1..=10).contains(&number.as_i64().expect("int")));
        }
    }

    #[test]
    fn exact_length_and_charset_are_honoured() {
        let mut provider = FakerProvider::seeded(3).with_charset("ab");
        let value = provider.draw(FactKind::Text, &FactOptions::exactly(6));
        let text = value.as_str().expect("text");
        assert_eq!(text.len(), 6);
        assert!(text.chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn same_seed_same_facts() {
        let mut left = FakerProvider::seeded(99);
        let mut right = FakerProvider::seeded(99);
        for kind in [FactKind::FullName, FactKind::Text, FactKind::Integer] {
            assert_eq!(
                left.draw(kind, &FactOptions::between(1, 50)),
                right.draw(kind, &FactOptions::between(1, 50))
            );
        }
    }

    #[test]
    fn names_are_non_empty_in_every_locale() {
        for locale in [FakerLocale::En, FakerLocale::PtBr] {
            let mut provider = FakerProvider::seeded(11).with_locale(locale);
            for kind in [FactKind::FirstName, FactKind::LastName, FactKind::FullName] {
                let value = provider.draw(kind, &FactOptions::default());
                assert!(!value.as_str().expect("name").is_empty());
            }
        }
    }

    #[test]
    fn locale_parses_aliases() {
        assert_eq!("pt-BR".parse::<FakerLocale>().expect("pt_br"), FakerLocale::PtBr);
        assert_eq!("en_US".parse::<FakerLocale>().expect("en"), FakerLocale::En);
        assert!("xx".parse::<FakerLocale>().is_err());
    }
}
