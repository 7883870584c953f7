// src/analysis/mod.rs
//! Keyword based skill analysis.
//!
//! Everything here is a pure function of the input text and the analyzer
//! profile: the same input always produces the same result.

pub mod classifier;
pub mod extractor;
pub mod normalizer;
pub mod profile;
pub mod report;
pub mod scorer;

pub use classifier::{ExperienceClassifier, ExperienceLevel, LevelTier};
pub use extractor::{ExtractedSkill, SkillExtractor};
pub use normalizer::normalize;
pub use profile::{AnalyzerProfile, MatchMode, ProfileRegistry, SkillCategory, SkillEntry};
pub use report::{ProfileSummary, ProfileSummaryInput, SkillsReport, SkillsReportKind};
pub use scorer::{MarketDemand, RateRange};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

impl AnalysisInput {
    pub fn from_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    fn has_text(&self) -> bool {
        [&self.text, &self.bio]
            .iter()
            .any(|field| field.as_deref().is_some_and(|t| !t.trim().is_empty()))
    }

    fn has_profile_fields(&self) -> bool {
        let has_skills = self
            .skills
            .as_ref()
            .is_some_and(|skills| skills.iter().any(|s| !s.trim().is_empty()));
        let has_experience = self
            .experience
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty());
        has_skills && has_experience
    }

    /// Text content, or both a skill list and an experience description.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.has_text() || self.has_profile_fields() {
            Ok(())
        } else {
            Err(AnalysisError::InvalidInput(
                "Please provide text content or profile information to analyze".to_string(),
            ))
        }
    }

    pub fn explicit_skills(&self) -> &[String] {
        self.skills.as_deref().unwrap_or_default()
    }

    pub fn normalized_text(&self) -> String {
        let skills = self.explicit_skills().join(" ");
        normalize([
            self.text.as_deref().unwrap_or_default(),
            self.bio.as_deref().unwrap_or_default(),
            skills.as_str(),
            self.experience.as_deref().unwrap_or_default(),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub skills: Vec<ExtractedSkill>,
    pub level: ExperienceLevel,
    pub confidence: f64,
    pub rate_range: RateRange,
    pub demand: MarketDemand,
    pub improvement_areas: Vec<String>,
    pub suggestions: Vec<String>,
}

/// One analyzer profile with its matchers built.
pub struct SkillAnalyzer {
    profile: AnalyzerProfile,
    extractor: SkillExtractor,
    classifier: ExperienceClassifier,
}

impl SkillAnalyzer {
    pub fn new(profile: AnalyzerProfile) -> Self {
        let extractor =
            SkillExtractor::new(&profile.dictionary, profile.max_skills, profile.match_mode);
        let classifier = ExperienceClassifier::new(profile.tiers.clone(), profile.default_level);

        Self {
            profile,
            extractor,
            classifier,
        }
    }

    pub fn profile(&self) -> &AnalyzerProfile {
        &self.profile
    }

    pub fn extract(&self, normalized: &str, explicit: &[String]) -> Vec<ExtractedSkill> {
        self.extractor.extract(normalized, explicit)
    }

    pub fn classify(&self, normalized: &str) -> ExperienceLevel {
        self.classifier.classify(normalized)
    }

    pub fn experience_years(&self, normalized: &str) -> Option<u32> {
        self.classifier.experience_years(normalized)
    }

    pub fn default_years(&self, normalized: &str) -> Option<u32> {
        self.classifier.default_years(normalized)
    }

    pub fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisResult, AnalysisError> {
        input.validate()?;

        let text = input.normalized_text();
        let skills = self.extract(&text, input.explicit_skills());
        let level = self.classify(&text);

        let senior_hits = self
            .classifier
            .keyword_hits(&text, ExperienceLevel::Senior);
        let confidence = scorer::confidence(text.chars().count(), skills.len() + senior_hits);

        let rate_range = scorer::rate_range(
            &skills,
            level,
            &self.profile.rates,
            &self.profile.premium_skills,
        );
        let demand = scorer::market_demand(&skills, &self.profile.high_demand_skills);
        let improvement_areas = scorer::improvement_areas(&skills, level);
        let suggestions = scorer::suggestions(&skills, level, &text);

        Ok(AnalysisResult {
            skills,
            level,
            confidence,
            rate_range,
            demand,
            improvement_areas,
            suggestions,
        })
    }
}

/// Analyzers for every registered profile, built once at startup.
pub struct AnalyzerSet {
    analyzers: std::collections::HashMap<String, SkillAnalyzer>,
    fallback: SkillAnalyzer,
}

impl AnalyzerSet {
    pub fn new(registry: &ProfileRegistry) -> Self {
        let analyzers = registry
            .names()
            .into_iter()
            .filter_map(|name| {
                let profile = registry.get(&name)?.clone();
                Some((name, SkillAnalyzer::new(profile)))
            })
            .collect();

        let fallback = SkillAnalyzer::new(
            registry
                .get(profile::PROFILE_ANALYZER)
                .cloned()
                .unwrap_or_else(AnalyzerProfile::profile),
        );

        Self {
            analyzers,
            fallback,
        }
    }

    pub fn get(&self, name: &str) -> Option<&SkillAnalyzer> {
        self.analyzers.get(name)
    }

    /// Named analyzer, or the default profile analyzer when the name is unknown.
    pub fn get_or_default(&self, name: &str) -> &SkillAnalyzer {
        self.analyzers.get(name).unwrap_or(&self.fallback)
    }
}

impl Default for AnalyzerSet {
    fn default() -> Self {
        Self::new(&ProfileRegistry::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> SkillAnalyzer {
        SkillAnalyzer::new(AnalyzerProfile::profile())
    }

    fn names(result: &AnalysisResult) -> Vec<&str> {
        result.skills.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_senior_python_example() {
        let input = AnalysisInput::from_text(
            "Senior Python engineer, 7 years, TensorFlow and AWS experience",
        );
        let result = analyzer().analyze(&input).unwrap();

        assert_eq!(result.level, ExperienceLevel::Senior);
        assert_eq!(names(&result), vec!["Python", "TensorFlow", "AWS"]);
        assert_eq!(result.demand, MarketDemand::High);
        assert_eq!(result.rate_range, RateRange { min: 90, max: 130 });
        assert!(result.confidence <= 0.95);
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = analyzer().analyze(&AnalysisInput::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));

        let blank = AnalysisInput::from_text("   ");
        assert!(analyzer().analyze(&blank).is_err());
    }

    #[test]
    fn test_skills_need_experience_without_text() {
        let only_skills = AnalysisInput {
            skills: Some(vec!["React".to_string()]),
            ..Default::default()
        };
        assert!(analyzer().analyze(&only_skills).is_err());

        let profile = AnalysisInput {
            skills: Some(vec!["React".to_string(), "Jest".to_string()]),
            experience: Some("4 years building dashboards".to_string()),
            ..Default::default()
        };
        let result = analyzer().analyze(&profile).unwrap();
        assert_eq!(result.level, ExperienceLevel::Mid);
        assert_eq!(names(&result), vec!["React", "Jest"]);
        assert!(result.skills.iter().all(|s| s.confidence == 1.0));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let input = AnalysisInput::from_text("Lead React and Node.js developer, Docker, Redis");
        let first = analyzer().analyze(&input).unwrap();
        let second = analyzer().analyze(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_tokens_do_not_match_inside_words() {
        let input = AnalysisInput::from_text("I maintain email campaigns");
        let result = analyzer().analyze(&input).unwrap();
        assert!(result.skills.is_empty());
        assert_eq!(result.demand, MarketDemand::Low);
    }

    #[test]
    fn test_suggestions_fed_back_do_not_contradict() {
        let input = AnalysisInput::from_text("Junior JavaScript developer who likes CSS");
        let result = analyzer().analyze(&input).unwrap();

        let feedback = AnalysisInput::from_text(&result.suggestions.join(" "));
        let echoed = analyzer().analyze(&feedback).unwrap();
        for skill in &echoed.skills {
            assert!(
                ["AI", "Machine Learning", "TensorFlow", "AWS", "Docker", "Node.js", "Python", "React", "Vue.js"]
                    .contains(&skill.name.as_str()),
                "unexpected skill {}",
                skill.name
            );
        }
    }

    #[test]
    fn test_analyzer_set_falls_back_to_profile() {
        let set = AnalyzerSet::default();
        assert_eq!(set.get_or_default("unknown").profile().name, "profile");
        assert_eq!(set.get_or_default("matching").profile().name, "matching");
        assert!(set.get("skills").is_some());
    }
}
