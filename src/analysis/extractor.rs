// src/analysis/extractor.rs
use super::profile::{MatchMode, SkillCategory, SkillEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSkill {
    pub name: String,
    pub category: SkillCategory,
    pub confidence: f64,
}

pub struct SkillExtractor {
    entries: Vec<(SkillEntry, String)>,
    max_skills: usize,
    mode: MatchMode,
}

impl SkillExtractor {
    pub fn new(dictionary: &[SkillEntry], max_skills: usize, mode: MatchMode) -> Self {
        let entries = dictionary
            .iter()
            .filter(|entry| !entry.name.trim().is_empty())
            .map(|entry| (entry.clone(), entry.name.to_lowercase()))
            .collect();

        Self {
            entries,
            max_skills,
            mode,
        }
    }

    /// Dictionary entries present in `text`, in dictionary order, capped at `max_skills`.
    ///
    /// `text` must already be normalized. Skills the caller listed explicitly get
    /// full confidence; text mentions start at 0.7 and gain 0.1 per repeat.
    pub fn extract(&self, text: &str, explicit: &[String]) -> Vec<ExtractedSkill> {
        self.entries
            .iter()
            .filter_map(|(entry, needle)| {
                let count = occurrences(text, needle, self.mode);
                if count == 0 {
                    return None;
                }

                let listed = explicit
                    .iter()
                    .any(|skill| skill.trim().to_lowercase() == *needle);

                let confidence = if listed {
                    1.0
                } else {
                    round2((0.7 + 0.1 * (count - 1) as f64).min(1.0))
                };

                Some(ExtractedSkill {
                    name: entry.name.clone(),
                    category: entry.category,
                    confidence,
                })
            })
            .take(self.max_skills)
            .collect()
    }
}

fn occurrences(text: &str, needle: &str, mode: MatchMode) -> usize {
    if needle.is_empty() {
        return 0;
    }

    match mode {
        MatchMode::Substring => text.matches(needle).count(),
        MatchMode::Word => text
            .match_indices(needle)
            .filter(|(idx, hit)| {
                let before = text[..*idx].chars().next_back();
                let after = text[idx + hit.len()..].chars().next();
                is_boundary(before) && is_boundary(after)
            })
            .count(),
    }
}

fn is_boundary(c: Option<char>) -> bool {
    c.map_or(true, |c| !c.is_alphanumeric())
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> Vec<SkillEntry> {
        vec![
            SkillEntry::new("Java", SkillCategory::Technical),
            SkillEntry::new("JavaScript", SkillCategory::Technical),
            SkillEntry::new("Node.js", SkillCategory::Framework),
            SkillEntry::new("AI", SkillCategory::Data),
            SkillEntry::new("R", SkillCategory::Technical),
        ]
    }

    #[test]
    fn test_word_mode_skips_partial_words() {
        let extractor = SkillExtractor::new(&dictionary(), 10, MatchMode::Word);
        let skills = extractor.extract("javascript and node.js; maintain servers", &[]);
        let names: Vec<_> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["JavaScript", "Node.js"]);
    }

    #[test]
    fn test_substring_mode_keeps_legacy_behavior() {
        let extractor = SkillExtractor::new(&dictionary(), 10, MatchMode::Substring);
        let skills = extractor.extract("javascript, maintain", &[]);
        let names: Vec<_> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Java", "JavaScript", "AI", "R"]);
    }

    #[test]
    fn test_dictionary_order_and_cap() {
        let extractor = SkillExtractor::new(&dictionary(), 2, MatchMode::Word);
        let skills = extractor.extract("r, ai, node.js, java", &[]);
        let names: Vec<_> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Java", "Node.js"]);
    }

    #[test]
    fn test_confidence_grows_with_mentions_and_explicit_listing() {
        let extractor = SkillExtractor::new(&dictionary(), 10, MatchMode::Word);
        let skills = extractor.extract("java java java, node.js", &["Node.js".to_string()]);
        assert_eq!(skills[0].confidence, 0.9);
        assert_eq!(skills[1].confidence, 1.0);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let extractor = SkillExtractor::new(&dictionary(), 10, MatchMode::Word);
        assert!(extractor.extract("", &[]).is_empty());
    }
}
