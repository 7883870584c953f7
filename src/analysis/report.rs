// src/analysis/report.rs
//! Skills report and profile summary built on top of a `SkillAnalyzer`.

use super::{normalize, AnalysisError, ExperienceLevel, ExtractedSkill, SkillAnalyzer, SkillCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TOP_SKILLS: usize = 10;
const HIGH_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillsReportKind {
    #[default]
    Profile,
    Resume,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsReport {
    pub total_skills_found: usize,
    pub skills_by_category: BTreeMap<String, Vec<ExtractedSkill>>,
    pub top_skills: Vec<ExtractedSkill>,
    pub insights: Vec<String>,
    pub confidence_score: f64,
}

impl SkillsReport {
    pub fn build(
        analyzer: &SkillAnalyzer,
        text: &str,
        kind: SkillsReportKind,
    ) -> Result<Self, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(
                "Text content is required for analysis".to_string(),
            ));
        }

        let normalized = normalize([text]);
        let skills = analyzer.extract(&normalized, &[]);

        let mut skills_by_category: BTreeMap<String, Vec<ExtractedSkill>> = BTreeMap::new();
        for skill in &skills {
            skills_by_category
                .entry(skill.category.as_str().to_string())
                .or_default()
                .push(skill.clone());
        }

        let mut insights = skill_insights(&skills);
        if kind == SkillsReportKind::Resume {
            insights.extend(resume_insights(&normalized));
        }

        Ok(Self {
            total_skills_found: skills.len(),
            skills_by_category,
            top_skills: skills.iter().take(TOP_SKILLS).cloned().collect(),
            insights,
            confidence_score: overall_confidence(&skills),
        })
    }
}

fn skill_insights(skills: &[ExtractedSkill]) -> Vec<String> {
    if skills.is_empty() {
        return vec![
            "No specific technical skills were identified. Consider adding more detailed skill descriptions."
                .to_string(),
        ];
    }

    let mut insights = Vec::new();

    if skills.len() > 20 {
        insights.push(format!(
            "Excellent skill diversity with {} identified skills.",
            skills.len()
        ));
    } else if skills.len() > 10 {
        insights.push(format!(
            "Good skill range with {} identified skills.",
            skills.len()
        ));
    } else {
        insights.push(
            "Consider expanding skill descriptions to showcase more expertise.".to_string(),
        );
    }

    let strong: Vec<&str> = skills
        .iter()
        .filter(|s| s.confidence > HIGH_CONFIDENCE)
        .map(|s| s.name.as_str())
        .collect();
    if !strong.is_empty() {
        insights.push(format!(
            "Strong evidence found for {} skills: {}.",
            strong.len(),
            strong.iter().take(3).copied().collect::<Vec<_>>().join(", ")
        ));
    }

    let has_category = |category: SkillCategory| skills.iter().any(|s| s.category == category);
    if has_category(SkillCategory::Technical) && has_category(SkillCategory::Tool) {
        insights.push(
            "Great balance of technical knowledge and practical tool experience.".to_string(),
        );
    }

    let ml_skills = skills
        .iter()
        .filter(|s| {
            let name = s.name.to_lowercase();
            name.contains("learning") || name.contains("neural")
        })
        .count();
    if ml_skills > 3 {
        insights.push("Strong machine learning background detected.".to_string());
    }

    let languages = skills
        .iter()
        .filter(|s| ["python", "r", "java"].contains(&s.name.to_lowercase().as_str()))
        .count();
    if languages > 1 {
        insights.push("Multi-language programming capability identified.".to_string());
    }

    insights
}

fn resume_insights(text: &str) -> Vec<String> {
    let checks: [(&[&str], &str); 4] = [
        (
            &["years", "experience"],
            "Experience duration indicators found in resume.",
        ),
        (
            &["degree", "university", "phd"],
            "Educational background information detected.",
        ),
        (
            &["project", "developed", "built"],
            "Project experience and hands-on work evidence found.",
        ),
        (
            &["publication", "paper", "research"],
            "Research and publication background identified.",
        ),
    ];

    checks
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, insight)| insight.to_string())
        .collect()
}

/// Mean skill confidence plus a volume bonus of 0.01 per skill (at most 0.2), capped at 1.
fn overall_confidence(skills: &[ExtractedSkill]) -> f64 {
    if skills.is_empty() {
        return 0.0;
    }

    let mean = skills.iter().map(|s| s.confidence).sum::<f64>() / skills.len() as f64;
    let volume_bonus = (skills.len() as f64 * 0.01).min(0.2);
    super::extractor::round2((mean + volume_bonus).min(1.0))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSummaryInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub summary: String,
    pub skills: Vec<String>,
    pub level: ExperienceLevel,
    pub categories: Vec<String>,
    pub experience_years: u32,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub score: u32,
}

impl ProfileSummary {
    pub fn build(
        analyzer: &SkillAnalyzer,
        input: &ProfileSummaryInput,
    ) -> Result<Self, AnalysisError> {
        let skills_text = input.skills.as_deref().unwrap_or_default().join(" ");
        let text = normalize([
            input.bio.as_deref().unwrap_or_default(),
            input.experience.as_deref().unwrap_or_default(),
            skills_text.as_str(),
        ]);

        if text.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "Profile needs a bio, an experience description or a skill list".to_string(),
            ));
        }

        let skills: Vec<String> = analyzer
            .extract(&text, input.skills.as_deref().unwrap_or_default())
            .into_iter()
            .map(|s| s.name)
            .collect();
        let level = analyzer.classify(&text);
        let categories = categories(&skills);

        let experience_years = analyzer
            .experience_years(&text)
            .or_else(|| analyzer.default_years(&text))
            .unwrap_or(match level {
                ExperienceLevel::Senior => 5,
                _ => 2,
            });

        let confidence = (skills.len() as f64 * 0.1 + 0.3).min(0.9);

        let focus = if categories.is_empty() {
            "technology".to_string()
        } else {
            categories.join(", ")
        };

        Ok(Self {
            summary: format!(
                "{} level professional with {} years of experience in {}",
                level.label(),
                experience_years,
                focus
            ),
            strengths: vec![
                format!(
                    "Strong {} background",
                    categories.first().map(String::as_str).unwrap_or("technical")
                ),
                "Diverse skill set".to_string(),
                "Good experience level".to_string(),
            ],
            improvements: vec![
                "Consider adding more specific project examples".to_string(),
                "Include quantifiable achievements".to_string(),
                "Add relevant certifications".to_string(),
            ],
            score: (confidence * 100.0).round() as u32,
            skills,
            level,
            categories,
            experience_years,
        })
    }
}

fn categories(skills: &[String]) -> Vec<String> {
    let groups: [(&str, &[&str]); 3] = [
        ("AI/ML", &["Python", "Machine Learning", "TensorFlow", "PyTorch"]),
        ("Web Development", &["JavaScript", "TypeScript", "React", "Node.js"]),
        ("DevOps", &["AWS", "Docker", "Kubernetes"]),
    ];

    groups
        .iter()
        .filter(|(_, members)| skills.iter().any(|s| members.contains(&s.as_str())))
        .map(|(label, _)| label.to_string())
        .collect()
}
