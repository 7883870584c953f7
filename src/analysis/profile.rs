// src/analysis/profile.rs
//! Analyzer profiles: the data that distinguishes one analyzer from another.
//!
//! Every analyzer runs the same extraction, classification and scoring code.
//! Profiles only carry the skill dictionary, keyword tiers and rate tables.

use super::classifier::{ExperienceLevel, LevelTier};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub const PROFILE_ANALYZER: &str = "profile";
pub const SKILLS_ANALYZER: &str = "skills";
pub const MATCHING_ANALYZER: &str = "matching";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Technical,
    Tool,
    Framework,
    Data,
    Cloud,
    Design,
}

impl SkillCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Technical => "technical",
            SkillCategory::Tool => "tool",
            SkillCategory::Framework => "framework",
            SkillCategory::Data => "data",
            SkillCategory::Cloud => "cloud",
            SkillCategory::Design => "design",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub category: SkillCategory,
}

impl SkillEntry {
    pub fn new(name: &str, category: SkillCategory) -> Self {
        Self {
            name: name.to_string(),
            category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Hit must not be flanked by alphanumeric characters
    Word,
    /// Raw containment, matches inside longer words
    Substring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub junior: u32,
    pub mid: u32,
    pub senior: u32,
    pub premium_bonus: u32,
    pub floor: u32,
    pub spread_below: u32,
    pub spread_above: u32,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            junior: 25,
            mid: 50,
            senior: 85,
            premium_bonus: 10,
            floor: 15,
            spread_below: 15,
            spread_above: 25,
        }
    }
}

impl RateTable {
    pub fn base(&self, level: ExperienceLevel) -> u32 {
        match level {
            ExperienceLevel::Junior => self.junior,
            ExperienceLevel::Mid => self.mid,
            ExperienceLevel::Senior => self.senior,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerProfile {
    pub name: String,
    pub dictionary: Vec<SkillEntry>,
    pub max_skills: usize,
    pub match_mode: MatchMode,
    pub tiers: Vec<LevelTier>,
    pub default_level: ExperienceLevel,
    pub rates: RateTable,
    pub premium_skills: Vec<String>,
    pub high_demand_skills: Vec<String>,
}

/// Partial profile read from the analyzer YAML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileOverride {
    pub extends: Option<String>,
    pub dictionary: Option<Vec<SkillEntry>>,
    pub max_skills: Option<usize>,
    pub match_mode: Option<MatchMode>,
    pub tiers: Option<Vec<LevelTier>>,
    pub default_level: Option<ExperienceLevel>,
    pub rates: Option<RateTable>,
    pub premium_skills: Option<Vec<String>>,
    pub high_demand_skills: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: HashMap<String, ProfileOverride>,
}

impl AnalyzerProfile {
    /// Full freelancer profile analyzer.
    pub fn profile() -> Self {
        use SkillCategory::*;

        let dictionary = [
            ("JavaScript", Technical),
            ("TypeScript", Technical),
            ("React", Framework),
            ("Node.js", Framework),
            ("Python", Technical),
            ("Machine Learning", Data),
            ("TensorFlow", Framework),
            ("PyTorch", Framework),
            ("AWS", Cloud),
            ("Docker", Tool),
            ("Kubernetes", Cloud),
            ("MongoDB", Data),
            ("PostgreSQL", Data),
            ("Next.js", Framework),
            ("Vue.js", Framework),
            ("Angular", Framework),
            ("Express", Framework),
            ("FastAPI", Framework),
            ("Django", Framework),
            ("Flask", Framework),
            ("Data Science", Data),
            ("AI", Data),
            ("NLP", Data),
            ("Computer Vision", Data),
            ("Deep Learning", Data),
            ("SQL", Technical),
            ("NoSQL", Data),
            ("Redis", Data),
            ("GraphQL", Technical),
            ("REST API", Technical),
            ("Microservices", Technical),
            ("DevOps", Cloud),
            ("Git", Tool),
            ("Linux", Tool),
            ("HTML", Technical),
            ("CSS", Technical),
            ("Sass", Tool),
            ("Webpack", Tool),
            ("Babel", Tool),
            ("Jest", Tool),
            ("Cypress", Tool),
            ("Selenium", Tool),
            ("Jenkins", Tool),
            ("GitHub Actions", Tool),
            ("Firebase", Cloud),
            ("Stripe", Tool),
            ("Figma", Design),
            ("Adobe XD", Design),
            ("Photoshop", Design),
            ("Illustrator", Design),
            ("Sketch", Design),
        ];

        Self {
            name: PROFILE_ANALYZER.to_string(),
            dictionary: entries(&dictionary),
            max_skills: 12,
            match_mode: MatchMode::Word,
            tiers: default_tiers(),
            default_level: ExperienceLevel::Junior,
            rates: RateTable::default(),
            premium_skills: strings(&[
                "AI",
                "Machine Learning",
                "TensorFlow",
                "PyTorch",
                "AWS",
                "Kubernetes",
                "DevOps",
            ]),
            high_demand_skills: strings(&[
                "React",
                "Node.js",
                "Python",
                "AI",
                "Machine Learning",
                "AWS",
                "TypeScript",
                "TensorFlow",
            ]),
        }
    }

    /// Skills report analyzer: wider dictionary, no practical cap.
    pub fn skills() -> Self {
        use SkillCategory::*;

        let dictionary = [
            ("JavaScript", Technical),
            ("TypeScript", Technical),
            ("Python", Technical),
            ("Java", Technical),
            ("R", Technical),
            ("Go", Technical),
            ("Rust", Technical),
            ("SQL", Technical),
            ("React", Framework),
            ("Node.js", Framework),
            ("Express", Framework),
            ("FastAPI", Framework),
            ("TensorFlow", Framework),
            ("PyTorch", Framework),
            ("Scikit-learn", Framework),
            ("Pandas", Tool),
            ("MongoDB", Data),
            ("PostgreSQL", Data),
            ("Machine Learning", Data),
            ("Deep Learning", Data),
            ("Reinforcement Learning", Data),
            ("Neural Networks", Data),
            ("NLP", Data),
            ("Computer Vision", Data),
            ("Data Science", Data),
            ("OpenAI", Tool),
            ("AWS", Cloud),
            ("Kubernetes", Cloud),
            ("Docker", Tool),
            ("Git", Tool),
            ("Linux", Tool),
            ("Jupyter", Tool),
        ];

        Self {
            name: SKILLS_ANALYZER.to_string(),
            dictionary: entries(&dictionary),
            max_skills: 32,
            ..Self::profile()
        }
    }

    /// Profile summary analyzer. Defaults to mid level when no tier matches.
    pub fn matching() -> Self {
        use SkillCategory::*;

        let dictionary = [
            ("JavaScript", Technical),
            ("TypeScript", Technical),
            ("Python", Technical),
            ("React", Framework),
            ("Node.js", Framework),
            ("Express", Framework),
            ("MongoDB", Data),
            ("PostgreSQL", Data),
            ("AWS", Cloud),
            ("Docker", Tool),
            ("Kubernetes", Cloud),
            ("Git", Tool),
            ("Machine Learning", Data),
            ("TensorFlow", Framework),
            ("PyTorch", Framework),
            ("OpenAI", Tool),
            ("NLP", Data),
            ("Computer Vision", Data),
            ("Deep Learning", Data),
            ("Data Science", Data),
            ("FastAPI", Framework),
        ];

        Self {
            name: MATCHING_ANALYZER.to_string(),
            dictionary: entries(&dictionary),
            max_skills: 10,
            tiers: vec![
                LevelTier::new(ExperienceLevel::Senior, &["senior", "lead", "expert"])
                    .with_default_years(5),
                LevelTier::new(ExperienceLevel::Junior, &["junior", "entry"]),
                LevelTier::new(ExperienceLevel::Senior, &["principal", "architect"])
                    .with_default_years(8),
            ],
            default_level: ExperienceLevel::Mid,
            ..Self::profile()
        }
    }

    fn apply(mut self, name: &str, patch: ProfileOverride) -> Self {
        self.name = name.to_string();
        if let Some(dictionary) = patch.dictionary {
            self.dictionary = dictionary;
        }
        if let Some(max_skills) = patch.max_skills {
            self.max_skills = max_skills;
        }
        if let Some(match_mode) = patch.match_mode {
            self.match_mode = match_mode;
        }
        if let Some(tiers) = patch.tiers {
            self.tiers = tiers
                .into_iter()
                .map(|tier| LevelTier {
                    keywords: tier.keywords.iter().map(|k| k.to_lowercase()).collect(),
                    ..tier
                })
                .collect();
        }
        if let Some(default_level) = patch.default_level {
            self.default_level = default_level;
        }
        if let Some(rates) = patch.rates {
            self.rates = rates;
        }
        if let Some(premium) = patch.premium_skills {
            self.premium_skills = premium;
        }
        if let Some(high_demand) = patch.high_demand_skills {
            self.high_demand_skills = high_demand;
        }
        self
    }
}

fn default_tiers() -> Vec<LevelTier> {
    vec![
        LevelTier::new(
            ExperienceLevel::Senior,
            &[
                "senior",
                "lead",
                "architect",
                "5+ years",
                "6+ years",
                "7+ years",
                "team lead",
                "management",
                "mentor",
                "principal",
            ],
        ),
        LevelTier::new(
            ExperienceLevel::Mid,
            &[
                "3 years",
                "4 years",
                "5 years",
                "intermediate",
                "mid-level",
                "experienced",
            ],
        ),
    ]
}

fn entries(items: &[(&str, SkillCategory)]) -> Vec<SkillEntry> {
    items
        .iter()
        .map(|(name, category)| SkillEntry::new(name, *category))
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Named analyzer profiles available to the process.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<String, AnalyzerProfile>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileRegistry {
    pub fn builtin() -> Self {
        let profiles = [
            AnalyzerProfile::profile(),
            AnalyzerProfile::skills(),
            AnalyzerProfile::matching(),
        ]
        .into_iter()
        .map(|profile| (profile.name.clone(), profile))
        .collect();

        Self { profiles }
    }

    /// Built-in profiles with the overrides of a YAML file applied.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read analyzer config: {}", path.display()))?;
        let registry = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse analyzer config: {}", path.display()))?;

        info!(
            "Loaded {} analyzer profiles from {}",
            registry.profiles.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: ProfileFile = serde_yaml::from_str(content)?;
        let builtin = Self::builtin().profiles;

        let mut names: Vec<_> = file.profiles.keys().cloned().collect();
        names.sort();

        let mut resolver = Resolver {
            file: &file.profiles,
            builtin: &builtin,
            resolved: HashMap::new(),
            visiting: Vec::new(),
        };
        for name in &names {
            resolver.resolve(name)?;
        }

        let resolved = resolver.resolved;
        let mut profiles = builtin;
        profiles.extend(resolved);
        Ok(Self { profiles })
    }

    pub fn get(&self, name: &str) -> Option<&AnalyzerProfile> {
        self.profiles.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Resolves `extends` chains in dependency order.
struct Resolver<'a> {
    file: &'a HashMap<String, ProfileOverride>,
    builtin: &'a HashMap<String, AnalyzerProfile>,
    resolved: HashMap<String, AnalyzerProfile>,
    visiting: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<AnalyzerProfile> {
        if let Some(profile) = self.resolved.get(name) {
            return Ok(profile.clone());
        }

        let Some(patch) = self.file.get(name).cloned() else {
            return self
                .builtin
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Unknown base profile: {}", name));
        };

        if self.visiting.iter().any(|v| v == name) {
            anyhow::bail!(
                "Analyzer profiles extend each other in a cycle: {} -> {}",
                self.visiting.join(" -> "),
                name
            );
        }
        self.visiting.push(name.to_string());

        // A profile extending its own name patches the built-in of that name.
        // Without `extends`, new names derive from the full profile analyzer.
        let base = match patch.extends.as_deref() {
            Some(base) if base == name => self.builtin.get(name).cloned().ok_or_else(|| {
                anyhow::anyhow!("Profile {} extends itself and is not built in", name)
            })?,
            Some(base) => self
                .resolve(base)
                .with_context(|| format!("Profile {} extends {}", name, base))?,
            None => match self.builtin.get(name) {
                Some(builtin) => builtin.clone(),
                None => self.resolve(PROFILE_ANALYZER)?,
            },
        };

        self.visiting.pop();
        let profile = base.apply(name, patch);
        self.resolved.insert(name.to_string(), profile.clone());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let registry = ProfileRegistry::builtin();
        assert_eq!(registry.names(), vec!["matching", "profile", "skills"]);

        let profile = registry.get(PROFILE_ANALYZER).unwrap();
        assert_eq!(profile.dictionary.len(), 51);
        assert!(profile
            .dictionary
            .iter()
            .any(|entry| entry.name == "Adobe XD" && entry.category == SkillCategory::Design));
        assert_eq!(profile.default_level, ExperienceLevel::Junior);

        let matching = registry.get(MATCHING_ANALYZER).unwrap();
        assert_eq!(matching.default_level, ExperienceLevel::Mid);
    }

    #[test]
    fn test_yaml_override_and_extension() {
        let yaml = r#"
profiles:
  profile:
    max_skills: 8
    match_mode: substring
  design:
    extends: profile
    dictionary:
      - { name: Figma, category: design }
      - { name: Sketch, category: design }
    rates:
      junior: 20
      mid: 40
      senior: 70
      premium_bonus: 5
      floor: 10
      spread_below: 10
      spread_above: 20
"#;
        let registry = ProfileRegistry::from_yaml_str(yaml).unwrap();

        let profile = registry.get(PROFILE_ANALYZER).unwrap();
        assert_eq!(profile.max_skills, 8);
        assert_eq!(profile.match_mode, MatchMode::Substring);

        let design = registry.get("design").unwrap();
        assert_eq!(design.name, "design");
        assert_eq!(design.dictionary.len(), 2);
        assert_eq!(design.rates.senior, 70);
        assert_eq!(design.match_mode, MatchMode::Substring);
        assert_eq!(design.tiers, profile.tiers);
    }

    #[test]
    fn test_extends_resolves_in_dependency_order() {
        let yaml = r#"
profiles:
  alpha:
    extends: beta
  beta:
    extends: skills
    max_skills: 3
"#;
        let registry = ProfileRegistry::from_yaml_str(yaml).unwrap();

        let alpha = registry.get("alpha").unwrap();
        assert_eq!(alpha.name, "alpha");
        assert_eq!(alpha.max_skills, 3);
        assert_eq!(
            alpha.dictionary,
            registry.get(SKILLS_ANALYZER).unwrap().dictionary
        );
    }

    #[test]
    fn test_unknown_base_profile_is_rejected() {
        let yaml = r#"
profiles:
  gamma:
    extends: doesnotexist
"#;
        let err = ProfileRegistry::from_yaml_str(yaml).unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown base profile: doesnotexist"));
    }

    #[test]
    fn test_extends_cycle_is_rejected() {
        let yaml = r#"
profiles:
  left:
    extends: right
  right:
    extends: left
"#;
        let err = ProfileRegistry::from_yaml_str(yaml).unwrap_err();
        assert!(format!("{:#}", err).contains("cycle"));
    }

    #[test]
    fn test_empty_yaml_keeps_builtins() {
        let registry = ProfileRegistry::from_yaml_str("profiles: {}").unwrap();
        assert_eq!(registry.names().len(), 3);
    }
}
