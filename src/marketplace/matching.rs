// src/marketplace/matching.rs
use super::models::{Job, User, UserRole};
use crate::analysis::extractor::round2;
use serde::Serialize;
use std::cmp::Ordering;

pub const MAX_MATCHES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreelancerMatch {
    pub freelancer_id: String,
    pub name: String,
    pub email: String,
    pub match_score: f64,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Rank freelancers by the share of the job's skills they list.
///
/// Freelancers with no overlap are left out. Equal scores are ordered by name.
pub fn rank_freelancers(job: &Job, candidates: &[User], limit: usize) -> Vec<FreelancerMatch> {
    if job.skills.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<FreelancerMatch> = candidates
        .iter()
        .filter(|user| user.role == UserRole::Freelancer)
        .filter_map(|user| {
            let (matching, missing): (Vec<String>, Vec<String>) =
                job.skills.iter().cloned().partition(|wanted| {
                    user.skills.iter().any(|have| have.eq_ignore_ascii_case(wanted))
                });

            if matching.is_empty() {
                return None;
            }

            Some(FreelancerMatch {
                freelancer_id: user.id.clone(),
                name: user.name.clone(),
                email: user.email.clone(),
                match_score: round2(matching.len() as f64 / job.skills.len() as f64),
                matching_skills: matching,
                missing_skills: missing,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.freelancer_id.cmp(&b.freelancer_id))
    });
    matches.truncate(limit);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::models::JobStatus;
    use chrono::Utc;

    fn user(id: &str, name: &str, role: UserRole, skills: &[&str]) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", id),
            role,
            company: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            telegram_id: None,
            created_at: Utc::now(),
        }
    }

    fn job(skills: &[&str]) -> Job {
        Job {
            id: "job_1".to_string(),
            client_id: "client".to_string(),
            title: "API work".to_string(),
            description: "REST API".to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            budget: 800.0,
            status: JobStatus::Open,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_ranking_by_overlap_then_name() {
        let candidates = vec![
            user("u1", "Zoe", UserRole::Freelancer, &["python"]),
            user("u2", "Adam", UserRole::Freelancer, &["Python"]),
            user("u3", "Mia", UserRole::Freelancer, &["Python", "FastAPI", "Docker"]),
            user("u4", "Bob", UserRole::Freelancer, &["Figma"]),
            user("u5", "Carl", UserRole::Client, &["Python", "FastAPI"]),
        ];

        let ranked = rank_freelancers(&job(&["Python", "FastAPI"]), &candidates, MAX_MATCHES);
        let names: Vec<&str> = ranked.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Mia", "Adam", "Zoe"]);
        assert_eq!(ranked[0].match_score, 1.0);
        assert_eq!(ranked[1].match_score, 0.5);
        assert_eq!(ranked[1].missing_skills, vec!["FastAPI"]);
    }

    #[test]
    fn test_limit_and_empty_job() {
        let candidates: Vec<User> = (0..15)
            .map(|i| user(&format!("u{:02}", i), &format!("Dev {:02}", i), UserRole::Freelancer, &["Rust"]))
            .collect();
        assert_eq!(rank_freelancers(&job(&["Rust"]), &candidates, MAX_MATCHES).len(), 10);
        assert!(rank_freelancers(&job(&[]), &candidates, MAX_MATCHES).is_empty());
    }
}
