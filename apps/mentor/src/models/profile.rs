use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

const GITHUB_BASE: &str = "https://github.com/";
const CODECHEF_BASE: &str = "https://www.codechef.com/users/";
const LINKEDIN_BASE: &str = "https://www.linkedin.com/in/";

/// Payload returned by the profile extractor, kept verbatim.
/// May carry `linkedin`, `github_repos` and `codechef` sections, or none of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileBundle(pub Value);

impl ProfileBundle {
    pub fn linkedin(&self) -> Option<&Value> {
        self.0.get("linkedin").filter(|v| !v.is_null())
    }

    pub fn github_repos(&self) -> &[Value] {
        self.0
            .get("github_repos")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn codechef(&self) -> Option<&Value> {
        self.0.get("codechef").filter(|v| !v.is_null())
    }

    pub fn database_status(&self) -> Option<&str> {
        self.0.get("database_status").and_then(Value::as_str)
    }
}

/// Profile links as submitted by the user. Entries may be URLs or bare handles.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileLinks {
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub codechef_url: Option<String>,
}

/// Links that passed validation; this is the `/extract` request body.
/// LinkedIn is optional and serializes as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedProfileLinks {
    pub linkedin_url: Option<String>,
    pub github_url: String,
    pub codechef_url: String,
}

impl ProfileLinks {
    /// GitHub and CodeChef are required, LinkedIn is optional.
    pub fn validate(self) -> Result<ValidatedProfileLinks, AppError> {
        let github = non_blank(self.github_url);
        let codechef = non_blank(self.codechef_url);

        let missing: Vec<&str> = [
            ("GitHub", github.is_none()),
            ("CodeChef", codechef.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect();

        match (github, codechef) {
            (Some(github), Some(codechef)) => Ok(ValidatedProfileLinks {
                linkedin_url: non_blank(self.linkedin_url).map(|l| expand_handle(&l, LINKEDIN_BASE)),
                github_url: expand_handle(&github, GITHUB_BASE),
                codechef_url: expand_handle(&codechef, CODECHEF_BASE),
            }),
            _ => Err(AppError::Validation(format!(
                "{} profile is required",
                missing.join(" and ")
            ))),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turns a bare handle into a profile URL; anything URL-shaped is left alone.
fn expand_handle(input: &str, base: &str) -> String {
    let looks_like_url = input.starts_with("http://")
        || input.starts_with("https://")
        || input.contains('/')
        || input.contains('.');
    if looks_like_url {
        input.to_string()
    } else {
        format!("{base}{}", input.trim_start_matches('@'))
    }
}
