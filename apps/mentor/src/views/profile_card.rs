use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::extract::display_scalar;
use crate::models::profile::ProfileBundle;

const TOP_LANGUAGES: usize = 3;

/// Render-ready summary of an extracted profile bundle. Sections the
/// extractor did not return are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileCards {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<LinkedInCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codechef: Option<CodeChefCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedInCard {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub certifications: usize,
    pub achievements: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GitHubCard {
    pub repo_count: usize,
    pub top_languages: Vec<String>,
    pub total_stars: u64,
    pub total_forks: u64,
    pub live_projects: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeChefCard {
    pub handle: Option<String>,
    pub rating: Option<String>,
    pub highest_rating: Option<String>,
    pub global_rank: Option<String>,
    pub country_rank: Option<String>,
    pub solved_count: Option<String>,
    pub stars: Option<String>,
    pub certificates: usize,
}

impl ProfileCards {
    pub fn from_bundle(bundle: &ProfileBundle) -> Self {
        Self {
            database_status: bundle.database_status().map(str::to_string),
            linkedin: bundle.linkedin().filter(|v| v.is_object()).map(linkedin_card),
            github: bundle
                .0
                .get("github_repos")
                .filter(|v| v.is_array())
                .map(|_| github_card(bundle.github_repos())),
            codechef: bundle.codechef().filter(|v| v.is_object()).map(codechef_card),
        }
    }
}

fn field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(display_scalar)
}

fn count(value: &Value, key: &str) -> usize {
    value.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

fn linkedin_card(data: &Value) -> LinkedInCard {
    LinkedInCard {
        full_name: field(data, "full_name"),
        headline: field(data, "headline"),
        bio: field(data, "bio"),
        certifications: count(data, "certifications"),
        achievements: count(data, "achievements"),
    }
}

fn github_card(repos: &[Value]) -> GitHubCard {
    let mut seen = HashSet::new();
    let top_languages = repos
        .iter()
        .filter_map(|repo| repo.get("language").and_then(Value::as_str))
        .filter(|lang| !lang.is_empty() && seen.insert(*lang))
        .take(TOP_LANGUAGES)
        .map(str::to_string)
        .collect();

    let sum = |key: &str| -> u64 {
        repos
            .iter()
            .filter_map(|repo| repo.get(key).and_then(Value::as_u64))
            .sum()
    };

    GitHubCard {
        repo_count: repos.len(),
        top_languages,
        total_stars: sum("stargazers_count"),
        total_forks: sum("forks_count"),
        live_projects: repos
            .iter()
            .filter(|repo| field(repo, "live_link").is_some())
            .count(),
    }
}

fn codechef_card(data: &Value) -> CodeChefCard {
    CodeChefCard {
        handle: field(data, "handle"),
        rating: field(data, "rating"),
        highest_rating: field(data, "highest_rating"),
        global_rank: field(data, "global_rank"),
        country_rank: field(data, "country_rank"),
        solved_count: field(data, "solved_count"),
        stars: field(data, "stars"),
        certificates: count(data, "certificates"),
    }
}
