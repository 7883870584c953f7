pub mod analysis;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod marketplace;
pub mod web;

pub use analysis::{AnalysisInput, AnalysisResult, AnalyzerSet, SkillAnalyzer};
pub use config::ConfigManager;
pub use web::{build_rocket, start_web_server};
