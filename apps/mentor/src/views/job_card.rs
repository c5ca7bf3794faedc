use serde::Serialize;

use crate::models::job::Job;

const SKILLS_SHOWN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperienceBadge {
    Junior,
    MidLevel,
    Senior,
    Other,
}

impl ExperienceBadge {
    pub fn classify(level: &str) -> Self {
        match level.trim().to_lowercase().as_str() {
            "junior" | "entry" | "entry-level" => Self::Junior,
            "mid-level" | "mid level" | "mid" => Self::MidLevel,
            "senior" => Self::Senior,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobTypeBadge {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Other,
}

impl JobTypeBadge {
    pub fn classify(job_type: &str) -> Self {
        match job_type.trim().to_lowercase().replace(' ', "-").as_str() {
            "full-time" | "fulltime" => Self::FullTime,
            "part-time" | "parttime" => Self::PartTime,
            "contract" | "contractor" => Self::Contract,
            "internship" | "intern" => Self::Internship,
            _ => Self::Other,
        }
    }
}

/// A job listing with its badges and the skills shown on the card.
#[derive(Debug, Clone, Serialize)]
pub struct JobCard {
    #[serde(flatten)]
    pub job: Job,
    pub experience_badge: ExperienceBadge,
    pub type_badge: JobTypeBadge,
    pub shown_skills: Vec<String>,
    pub more_skills: usize,
}

impl From<Job> for JobCard {
    fn from(job: Job) -> Self {
        let shown_skills: Vec<String> = job.skills.iter().take(SKILLS_SHOWN).cloned().collect();
        Self {
            experience_badge: ExperienceBadge::classify(&job.experience_level),
            type_badge: JobTypeBadge::classify(&job.job_type),
            more_skills: job.skills.len() - shown_skills.len(),
            shown_skills,
            job,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badges_are_case_insensitive() {
        assert_eq!(ExperienceBadge::classify("Senior"), ExperienceBadge::Senior);
        assert_eq!(ExperienceBadge::classify(" Mid-Level "), ExperienceBadge::MidLevel);
        assert_eq!(ExperienceBadge::classify("principal"), ExperienceBadge::Other);
        assert_eq!(JobTypeBadge::classify("Full-time"), JobTypeBadge::FullTime);
        assert_eq!(JobTypeBadge::classify("part time"), JobTypeBadge::PartTime);
        assert_eq!(JobTypeBadge::classify(""), JobTypeBadge::Other);
    }

    #[test]
    fn test_card_caps_skills_and_serializes_flat() {
        let job = Job {
            title: "Rust Engineer".to_string(),
            job_type: "Internship".to_string(),
            skills: ["Rust", "Tokio", "SQL", "gRPC", "Kafka", "Linux"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..Job::default()
        };
        let card = JobCard::from(job);
        assert_eq!(card.shown_skills.len(), 4);
        assert_eq!(card.more_skills, 2);

        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["title"], "Rust Engineer");
        assert_eq!(value["type"], "Internship");
        assert_eq!(value["type_badge"], "internship");
        assert_eq!(value["experience_badge"], "other");
    }
}
