// src/analysis/classifier.rs
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
        }
    }

    /// Capitalized label used in human readable summaries
    pub fn label(&self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "Junior",
            ExperienceLevel::Mid => "Mid",
            ExperienceLevel::Senior => "Senior",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One keyword tier. Tiers are checked in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelTier {
    pub level: ExperienceLevel,
    pub keywords: Vec<String>,
    /// Years assumed when this tier matches and the text states none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_years: Option<u32>,
}

impl LevelTier {
    pub fn new(level: ExperienceLevel, keywords: &[&str]) -> Self {
        Self {
            level,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            default_years: None,
        }
    }

    pub fn with_default_years(mut self, years: u32) -> Self {
        self.default_years = Some(years);
        self
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

pub struct ExperienceClassifier {
    tiers: Vec<LevelTier>,
    default_level: ExperienceLevel,
    years_regex: Regex,
}

impl ExperienceClassifier {
    pub fn new(tiers: Vec<LevelTier>, default_level: ExperienceLevel) -> Self {
        let years_regex =
            Regex::new(r"(?i)(\d+)\s*(?:years?|yrs?)").expect("Invalid experience years regex");

        Self {
            tiers,
            default_level,
            years_regex,
        }
    }

    fn matched_tier(&self, text: &str) -> Option<&LevelTier> {
        self.tiers.iter().find(|tier| tier.matches(text))
    }

    /// First tier with any keyword contained in `text` wins.
    pub fn classify(&self, text: &str) -> ExperienceLevel {
        self.matched_tier(text)
            .map(|tier| tier.level)
            .unwrap_or(self.default_level)
    }

    pub fn default_years(&self, text: &str) -> Option<u32> {
        self.matched_tier(text).and_then(|tier| tier.default_years)
    }

    /// Number of distinct keywords of `level` tiers present in `text`.
    pub fn keyword_hits(&self, text: &str, level: ExperienceLevel) -> usize {
        self.tiers
            .iter()
            .filter(|tier| tier.level == level)
            .flat_map(|tier| tier.keywords.iter())
            .filter(|k| text.contains(k.as_str()))
            .count()
    }

    /// Largest "N years" / "N yrs" figure mentioned in `text`.
    pub fn experience_years(&self, text: &str) -> Option<u32> {
        self.years_regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_classifier() -> ExperienceClassifier {
        ExperienceClassifier::new(
            vec![
                LevelTier::new(ExperienceLevel::Senior, &["senior", "lead", "5+ years"]),
                LevelTier::new(ExperienceLevel::Mid, &["3 years", "intermediate"]),
            ],
            ExperienceLevel::Junior,
        )
    }

    #[test]
    fn test_senior_wins_over_mid() {
        let classifier = default_classifier();
        assert_eq!(
            classifier.classify("intermediate dev, 3 years, now senior"),
            ExperienceLevel::Senior
        );
    }

    #[test]
    fn test_mid_and_default() {
        let classifier = default_classifier();
        assert_eq!(classifier.classify("3 years of rust"), ExperienceLevel::Mid);
        assert_eq!(classifier.classify("fresh graduate"), ExperienceLevel::Junior);
        assert_eq!(classifier.classify(""), ExperienceLevel::Junior);
    }

    #[test]
    fn test_tier_order_allows_repeated_levels() {
        let classifier = ExperienceClassifier::new(
            vec![
                LevelTier::new(ExperienceLevel::Senior, &["senior"]),
                LevelTier::new(ExperienceLevel::Junior, &["junior"]),
                LevelTier::new(ExperienceLevel::Senior, &["architect"]),
            ],
            ExperienceLevel::Mid,
        );
        assert_eq!(classifier.classify("junior architect"), ExperienceLevel::Junior);
        assert_eq!(classifier.classify("solution architect"), ExperienceLevel::Senior);
        assert_eq!(classifier.classify("developer"), ExperienceLevel::Mid);
    }

    #[test]
    fn test_default_years_follow_the_matched_tier() {
        let classifier = ExperienceClassifier::new(
            vec![
                LevelTier::new(ExperienceLevel::Senior, &["senior"]).with_default_years(5),
                LevelTier::new(ExperienceLevel::Senior, &["principal"]).with_default_years(8),
                LevelTier::new(ExperienceLevel::Mid, &["intermediate"]),
            ],
            ExperienceLevel::Junior,
        );
        assert_eq!(classifier.default_years("principal engineer"), Some(8));
        assert_eq!(classifier.default_years("senior principal"), Some(5));
        assert_eq!(classifier.default_years("intermediate"), None);
        assert_eq!(classifier.default_years("student"), None);
    }

    #[test]
    fn test_keyword_hits() {
        let classifier = default_classifier();
        assert_eq!(
            classifier.keyword_hits("senior tech lead", ExperienceLevel::Senior),
            2
        );
        assert_eq!(classifier.keyword_hits("nothing", ExperienceLevel::Senior), 0);
    }

    #[test]
    fn test_experience_years() {
        let classifier = default_classifier();
        assert_eq!(
            classifier.experience_years("2 years at acme, then 7 yrs freelancing"),
            Some(7)
        );
        assert_eq!(classifier.experience_years("no numbers here"), None);
    }
}
