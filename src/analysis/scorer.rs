// src/analysis/scorer.rs
use super::classifier::ExperienceLevel;
use super::extractor::{round2, ExtractedSkill};
use super::profile::RateTable;
use serde::{Deserialize, Serialize};

const MAX_CONFIDENCE: f64 = 0.95;
const MAX_IMPROVEMENT_AREAS: usize = 3;
const MAX_SUGGESTIONS: usize = 4;

const AI_SKILLS: &[&str] = &["AI", "Machine Learning", "TensorFlow", "PyTorch", "Deep Learning"];
const WEB_SKILLS: &[&str] = &["React", "Vue.js", "Angular", "Next.js", "JavaScript", "TypeScript"];
const BACKEND_SKILLS: &[&str] = &["Node.js", "Python", "Django", "FastAPI", "Express"];
const CLOUD_SKILLS: &[&str] = &["AWS", "Docker", "Kubernetes", "DevOps"];
const MODERN_WEB_SKILLS: &[&str] = &["React", "Vue.js", "Next.js", "TypeScript"];
const TESTING_SKILLS: &[&str] = &["Jest", "Cypress", "Selenium"];
const DEVOPS_SKILLS: &[&str] = &["Docker", "Kubernetes", "AWS", "Jenkins"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketDemand {
    Low,
    Medium,
    High,
}

fn has_any(skills: &[ExtractedSkill], group: &[&str]) -> bool {
    skills.iter().any(|skill| group.contains(&skill.name.as_str()))
}

fn count_in(skills: &[ExtractedSkill], list: &[String]) -> usize {
    skills
        .iter()
        .filter(|skill| list.iter().any(|name| name == &skill.name))
        .count()
}

/// `0.6 + min(len, 500)/1000 + matches/20`, capped at 0.95 and rounded to 2 decimals.
pub fn confidence(text_len: usize, match_count: usize) -> f64 {
    let raw = 0.6 + (text_len.min(500) as f64 / 1000.0) + (match_count as f64 / 20.0);
    round2(raw.min(MAX_CONFIDENCE))
}

pub fn rate_range(
    skills: &[ExtractedSkill],
    level: ExperienceLevel,
    rates: &RateTable,
    premium_skills: &[String],
) -> RateRange {
    let bonus = count_in(skills, premium_skills) as u32 * rates.premium_bonus;
    let adjusted = rates.base(level) + bonus;

    RateRange {
        min: adjusted.saturating_sub(rates.spread_below).max(rates.floor),
        max: adjusted + rates.spread_above,
    }
}

pub fn market_demand(skills: &[ExtractedSkill], high_demand: &[String]) -> MarketDemand {
    match count_in(skills, high_demand) {
        n if n >= 3 => MarketDemand::High,
        n if n >= 1 => MarketDemand::Medium,
        _ => MarketDemand::Low,
    }
}

pub fn improvement_areas(skills: &[ExtractedSkill], level: ExperienceLevel) -> Vec<String> {
    let mut areas = Vec::new();

    if !has_any(skills, MODERN_WEB_SKILLS) {
        areas.push("Modern JavaScript frameworks (React, Vue.js)".to_string());
    }
    if !has_any(skills, TESTING_SKILLS) && level != ExperienceLevel::Junior {
        areas.push("Testing frameworks and methodologies".to_string());
    }
    if !has_any(skills, DEVOPS_SKILLS) {
        areas.push("DevOps and cloud technologies".to_string());
    }

    areas.truncate(MAX_IMPROVEMENT_AREAS);
    areas
}

/// Skill based, then level based, then content based suggestions; at most four.
pub fn suggestions(skills: &[ExtractedSkill], level: ExperienceLevel, text: &str) -> Vec<String> {
    let mut out: Vec<&str> = Vec::new();

    let has_ai = has_any(skills, AI_SKILLS);
    let has_web = has_any(skills, WEB_SKILLS);
    let has_backend = has_any(skills, BACKEND_SKILLS);
    let has_cloud = has_any(skills, CLOUD_SKILLS);

    if has_ai {
        out.push("Consider highlighting specific AI/ML projects with measurable results (e.g., \"improved accuracy by 15%\")");
    }
    if has_web && !has_backend {
        out.push("Adding backend skills like Node.js or Python could increase your project opportunities");
    }
    if !has_cloud && level != ExperienceLevel::Junior {
        out.push("Cloud skills (AWS, Docker) are in high demand - consider adding these to your skillset");
    }

    match level {
        ExperienceLevel::Junior => {
            out.push("Focus on building a portfolio of personal projects to demonstrate your skills");
            out.push("Consider contributing to open-source projects to showcase collaboration skills");
        }
        ExperienceLevel::Mid => {
            out.push("Highlight leadership experiences and complex problem-solving achievements");
            out.push("Consider mentioning team collaboration and project management experience");
        }
        ExperienceLevel::Senior => {
            out.push("Emphasize your impact on business outcomes and team growth");
            out.push("Showcase your architecture decisions and technical leadership examples");
        }
    }

    if !text.contains("project") {
        out.push("Include specific project examples with technologies used and outcomes achieved");
    }
    if !text.contains('%') && !text.contains("improved") && !text.contains("increased") {
        out.push("Add quantifiable achievements (e.g., \"reduced load time by 40%\", \"increased user engagement by 25%\")");
    }

    out.into_iter()
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::profile::SkillCategory;

    fn skills(names: &[&str]) -> Vec<ExtractedSkill> {
        names
            .iter()
            .map(|name| ExtractedSkill {
                name: name.to_string(),
                category: SkillCategory::Technical,
                confidence: 0.7,
            })
            .collect()
    }

    fn list(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_confidence_bounds() {
        assert_eq!(confidence(0, 0), 0.6);
        assert_eq!(confidence(200, 2), 0.9);
        assert_eq!(confidence(10_000, 40), 0.95);
    }

    #[test]
    fn test_confidence_monotonic_in_matches() {
        let mut previous = 0.0;
        for matches in 0..30 {
            let value = confidence(120, matches);
            assert!(value >= previous);
            assert!((0.0..=0.95).contains(&value));
            previous = value;
        }
    }

    #[test]
    fn test_rate_range() {
        let rates = RateTable::default();
        let premium = list(&["AWS", "TensorFlow"]);

        let junior = rate_range(&[], ExperienceLevel::Junior, &rates, &premium);
        assert_eq!(junior, RateRange { min: 15, max: 50 });

        let senior = rate_range(
            &skills(&["Python", "TensorFlow", "AWS"]),
            ExperienceLevel::Senior,
            &rates,
            &premium,
        );
        assert_eq!(senior, RateRange { min: 90, max: 130 });
    }

    #[test]
    fn test_market_demand_tiers() {
        let high_demand = list(&["React", "Python", "AWS"]);
        assert_eq!(market_demand(&[], &high_demand), MarketDemand::Low);
        assert_eq!(
            market_demand(&skills(&["Python", "Figma"]), &high_demand),
            MarketDemand::Medium
        );
        assert_eq!(
            market_demand(&skills(&["Python", "React", "AWS"]), &high_demand),
            MarketDemand::High
        );
    }

    #[test]
    fn test_improvement_areas_skip_testing_for_juniors() {
        let junior = improvement_areas(&[], ExperienceLevel::Junior);
        assert_eq!(junior.len(), 2);
        assert!(!junior.iter().any(|a| a.contains("Testing")));

        let mid = improvement_areas(&[], ExperienceLevel::Mid);
        assert_eq!(mid.len(), 3);

        let covered = improvement_areas(&skills(&["React", "Jest", "AWS"]), ExperienceLevel::Senior);
        assert!(covered.is_empty());
    }

    #[test]
    fn test_suggestions_order_and_cap() {
        let result = suggestions(
            &skills(&["TensorFlow", "React"]),
            ExperienceLevel::Senior,
            "no details",
        );
        assert_eq!(result.len(), 4);
        assert!(result[0].contains("AI/ML"));
        assert!(result[1].contains("backend"));
        assert!(result[2].contains("Cloud"));
        assert!(result[3].contains("business outcomes"));
    }

    #[test]
    fn test_suggestions_content_checks() {
        let result = suggestions(
            &[],
            ExperienceLevel::Junior,
            "built a project that improved revenue",
        );
        assert_eq!(result.len(), 2);
        assert!(result[0].contains("portfolio"));
    }
}
