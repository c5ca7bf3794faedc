use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Job ids come back as numbers from some listing sources and strings from others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Number(i64),
    Text(String),
}

impl Default for JobId {
    fn default() -> Self {
        JobId::Text(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    #[serde(deserialize_with = "null_as_default")]
    pub id: JobId,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub job_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub salary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub requirements: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub posted_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub experience_level: String,
    #[serde(deserialize_with = "null_as_default")]
    pub remote_friendly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_highlights: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub job_benefits: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub job_required_skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub job_required_qualifications: Vec<String>,
}

/// Listing sources send `null` for fields they have no value for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Query sent to the roadmap generator for one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapQuery {
    pub job_title: String,
    pub description: String,
    pub skills: String,
    pub requirements: String,
}

impl From<&Job> for RoadmapQuery {
    fn from(job: &Job) -> Self {
        Self {
            job_title: job.title.clone(),
            description: job.description.clone(),
            skills: job.skills.join(", "),
            requirements: job.requirements.join(", "),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flowchart_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roadmap_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_tolerates_sparse_payload() {
        let job: Job = serde_json::from_str(r#"{"id": 42, "title": "Rust Engineer"}"#).unwrap();
        assert_eq!(job.id, JobId::Number(42));
        assert_eq!(job.title, "Rust Engineer");
        assert!(job.skills.is_empty());
        assert!(!job.remote_friendly);
    }

    #[test]
    fn test_job_tolerates_null_fields() {
        let jobs: Vec<Job> = serde_json::from_str(
            r#"[{"id": 1, "title": "Rust Engineer", "salary": null, "description": null,
                 "requirements": null, "skills": null, "remote_friendly": null,
                 "type": null, "job_url": null}]"#,
        )
        .unwrap();
        let job = &jobs[0];
        assert_eq!(job.title, "Rust Engineer");
        assert_eq!(job.salary, "");
        assert!(job.requirements.is_empty());
        assert!(job.skills.is_empty());
        assert!(!job.remote_friendly);
        assert_eq!(job.job_type, "");
        assert!(job.job_url.is_none());
    }

    #[test]
    fn test_job_type_field_is_renamed() {
        let job: Job =
            serde_json::from_str(r#"{"id": "abc", "type": "Full-time", "skills": ["Rust"]}"#)
                .unwrap();
        assert_eq!(job.id, JobId::Text("abc".to_string()));
        assert_eq!(job.job_type, "Full-time");
    }

    #[test]
    fn test_roadmap_query_joins_lists() {
        let job = Job {
            title: "Backend Engineer".to_string(),
            description: "Build APIs".to_string(),
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            requirements: vec!["3+ years".to_string()],
            ..Job::default()
        };
        let query = RoadmapQuery::from(&job);
        assert_eq!(query.skills, "Rust, SQL");
        assert_eq!(query.requirements, "3+ years");
        assert_eq!(query.job_title, "Backend Engineer");
    }
}
