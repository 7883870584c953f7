// src/marketplace/filter.rs
use super::models::{Job, JobStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobSort {
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "budget-high")]
    BudgetHigh,
    #[serde(rename = "budget-low")]
    BudgetLow,
}

impl FromStr for JobSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "newest" => Ok(JobSort::Newest),
            "budget-high" => Ok(JobSort::BudgetHigh),
            "budget-low" => Ok(JobSort::BudgetLow),
            other => anyhow::bail!(
                "Unknown sort order: {}. Use newest, budget-high or budget-low",
                other
            ),
        }
    }
}

/// Browse filter for the job board. Only open jobs are ever listed.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub search: Option<String>,
    pub skills: Vec<String>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    pub sort: JobSort,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if job.status != JobStatus::Open {
            return false;
        }

        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = job.title.to_lowercase().contains(&term)
                || job.description.to_lowercase().contains(&term)
                || job.skills.iter().any(|s| s.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        let wanted: Vec<String> = self
            .skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !wanted.is_empty() {
            let job_skills: Vec<String> = job.skills.iter().map(|s| s.to_lowercase()).collect();
            if !wanted
                .iter()
                .any(|w| job_skills.iter().any(|s| s.contains(w.as_str())))
            {
                return false;
            }
        }

        if self.min_budget.is_some_and(|min| job.budget < min) {
            return false;
        }
        if self.max_budget.is_some_and(|max| job.budget > max) {
            return false;
        }

        true
    }

    pub fn apply(&self, jobs: Vec<Job>) -> Vec<Job> {
        let mut kept: Vec<Job> = jobs.into_iter().filter(|job| self.matches(job)).collect();

        kept.sort_by(|a, b| {
            let primary = match self.sort {
                JobSort::Newest => b.created_at.cmp(&a.created_at),
                JobSort::BudgetHigh => b.budget.partial_cmp(&a.budget).unwrap_or(Ordering::Equal),
                JobSort::BudgetLow => a.budget.partial_cmp(&b.budget).unwrap_or(Ordering::Equal),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn job(id: &str, title: &str, skills: &[&str], budget: f64, age_days: i64) -> Job {
        Job {
            id: id.to_string(),
            client_id: "user_client".to_string(),
            title: title.to_string(),
            description: format!("{} for a growing startup", title),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            budget,
            status: JobStatus::Open,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn board() -> Vec<Job> {
        vec![
            job("job_a", "React dashboard", &["React", "TypeScript"], 1200.0, 3),
            job("job_b", "ML pipeline", &["Python", "TensorFlow"], 5000.0, 1),
            job("job_c", "Landing page", &["HTML", "CSS"], 300.0, 2),
        ]
    }

    fn ids(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(|j| j.id.as_str()).collect()
    }

    #[test]
    fn test_default_sort_is_newest() {
        let jobs = JobFilter::default().apply(board());
        assert_eq!(ids(&jobs), vec!["job_b", "job_c", "job_a"]);
    }

    #[test]
    fn test_budget_sorts() {
        let high = JobFilter {
            sort: JobSort::BudgetHigh,
            ..Default::default()
        };
        assert_eq!(ids(&high.apply(board())), vec!["job_b", "job_a", "job_c"]);

        let low = JobFilter {
            sort: JobSort::BudgetLow,
            ..Default::default()
        };
        assert_eq!(ids(&low.apply(board())), vec!["job_c", "job_a", "job_b"]);
    }

    #[test]
    fn test_search_matches_skills_case_insensitively() {
        let filter = JobFilter {
            search: Some("tensorflow".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(board())), vec!["job_b"]);
    }

    #[test]
    fn test_skill_filter_uses_containment() {
        let filter = JobFilter {
            skills: vec!["script".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(board())), vec!["job_a"]);
    }

    #[test]
    fn test_budget_bounds_are_inclusive() {
        let filter = JobFilter {
            min_budget: Some(300.0),
            max_budget: Some(1200.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(board())), vec!["job_c", "job_a"]);
    }

    #[test]
    fn test_closed_jobs_hidden() {
        let mut jobs = board();
        jobs[1].status = JobStatus::Closed;
        assert_eq!(ids(&JobFilter::default().apply(jobs)), vec!["job_c", "job_a"]);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("budget-high".parse::<JobSort>().unwrap(), JobSort::BudgetHigh);
        assert_eq!("".parse::<JobSort>().unwrap(), JobSort::Newest);
        assert!("cheapest".parse::<JobSort>().is_err());
    }
}
