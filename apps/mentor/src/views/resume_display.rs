//! Render contract for parsed resumes.
//!
//! Parser output arrives in several shapes: a well-formed object, an object
//! whose `raw_extraction` string holds the JSON, or the JSON string itself,
//! optionally fenced as a markdown code block. All of them normalise to one
//! object before any field lookup.

use serde::Serialize;
use serde_json::Value;

use crate::extract::{self, display_scalar};
use crate::models::resume::ResumeFields;

pub const NOT_AVAILABLE: &str = "Not Available";

const NAME_KEYS: &[&str] = &["/Full Name", "/full_name", "/name"];
const EMAIL_KEYS: &[&str] = &["/Email", "/email"];
const PHONE_KEYS: &[&str] = &["/Phone Number", "/phone", "/phone_number"];
const SKILLS_KEYS: &[&str] = &["/Skills", "/skills"];
const EDUCATION_KEYS: &[&str] = &["/Education", "/education"];
const EXPERIENCE_KEYS: &[&str] = &["/Work Experience", "/work_experience", "/experience"];
const PROJECTS_KEYS: &[&str] = &["/Projects", "/projects"];
const LANGUAGES_KEYS: &[&str] = &["/Languages", "/languages"];

/// Keys whose presence marks an object as already well-formed.
const SHAPE_KEYS: &[&str] = &[
    "/Full Name",
    "/full_name",
    "/name",
    "/Email",
    "/email",
    "/Skills",
    "/skills",
    "/Education",
    "/education",
];

const EDUCATION_SHOWN: usize = 2;
const SKILLS_SHOWN: usize = 8;
const EXPERIENCE_SHOWN: usize = 2;
const PROJECTS_SHOWN: usize = 2;
const LANGUAGES_SHOWN: usize = 4;
const ABOUT_SKILLS: usize = 5;

/// One education, experience or project entry. Parsers emit either a plain
/// string or an object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResumeItem {
    Text {
        text: String,
    },
    Detailed {
        title: Option<String>,
        subtitle: Option<String>,
        period: Option<String>,
        detail: Option<String>,
        live_demo: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeDisplay {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub about: String,
    pub skills: Vec<String>,
    pub education: Vec<ResumeItem>,
    pub experience: Vec<ResumeItem>,
    pub projects: Vec<ResumeItem>,
    pub languages: Vec<String>,
    /// Totals before the display caps were applied.
    pub total_skills: usize,
    pub total_experience: usize,
    pub total_projects: usize,
}

/// Resolves the parser payload to a single object, or returns it unchanged
/// when no embedded JSON can be recovered.
pub fn normalize(raw: &Value) -> Value {
    match raw {
        Value::Object(_) if extract::first_present(raw, SHAPE_KEYS).is_some() => raw.clone(),
        Value::Object(map) => map
            .get("raw_extraction")
            .and_then(Value::as_str)
            .and_then(extract::parse_embedded_json)
            .filter(Value::is_object)
            .unwrap_or_else(|| raw.clone()),
        Value::String(text) => extract::parse_embedded_json(text)
            .filter(Value::is_object)
            .unwrap_or_else(|| raw.clone()),
        _ => raw.clone(),
    }
}

fn text_or_default(data: &Value, keys: &[&str]) -> String {
    extract::first_scalar(data, keys).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn list<'a>(data: &'a Value, keys: &[&str]) -> &'a [Value] {
    extract::first_present(data, keys)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn strings(items: &[Value]) -> Vec<String> {
    items.iter().filter_map(display_scalar).collect()
}

fn pick(item: &Value, keys: &[&str]) -> Option<String> {
    extract::first_present(item, keys).and_then(|v| match v {
        Value::Array(parts) => {
            let joined = strings(parts).join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        other => display_scalar(other),
    })
}

fn education_item(item: &Value) -> Option<ResumeItem> {
    if let Some(text) = display_scalar(item) {
        return Some(ResumeItem::Text { text });
    }
    item.is_object().then(|| ResumeItem::Detailed {
        title: pick(item, &["/Degree", "/degree"]),
        subtitle: pick(item, &["/Institution", "/institution"]),
        period: pick(item, &["/Years", "/years"]),
        detail: pick(item, &["/CGPA", "/cgpa"]).map(|cgpa| format!("CGPA: {cgpa}")),
        live_demo: false,
    })
}

fn experience_item(item: &Value) -> Option<ResumeItem> {
    if let Some(text) = display_scalar(item) {
        return Some(ResumeItem::Text { text });
    }
    item.is_object().then(|| ResumeItem::Detailed {
        title: pick(item, &["/Title", "/title"]),
        subtitle: pick(item, &["/Company", "/company"]),
        period: pick(item, &["/Duration", "/duration"]),
        detail: pick(item, &["/Description", "/description"]),
        live_demo: false,
    })
}

fn project_item(item: &Value) -> Option<ResumeItem> {
    if let Some(text) = display_scalar(item) {
        return Some(ResumeItem::Text { text });
    }
    item.is_object().then(|| ResumeItem::Detailed {
        title: pick(item, &["/Name", "/name"]),
        subtitle: pick(item, &["/Technologies", "/technologies"]),
        period: None,
        detail: pick(item, &["/Description", "/description"]),
        live_demo: pick(item, &["/Live Demo", "/live_demo"]).is_some(),
    })
}

fn about(skills: &[String], experience: usize, projects: usize) -> String {
    let mut about = if skills.is_empty() {
        "Experienced professional.".to_string()
    } else {
        let shown: Vec<&str> = skills.iter().take(ABOUT_SKILLS).map(String::as_str).collect();
        format!("Experienced professional with expertise in {}.", shown.join(", "))
    };

    if experience > 0 {
        let noun = if experience == 1 { "role" } else { "roles" };
        about.push_str(&format!(" Has held {experience} {noun} of work experience."));
    } else {
        about.push_str(" Currently seeking opportunities.");
    }

    if projects > 0 {
        let noun = if projects == 1 { "project" } else { "projects" };
        about.push_str(&format!(
            " Completed {projects} {noun} demonstrating technical skills."
        ));
    }
    about
}

impl ResumeDisplay {
    pub fn from_fields(fields: &ResumeFields) -> Self {
        let data = normalize(&fields.0);

        let all_skills = strings(list(&data, SKILLS_KEYS));
        let experience = list(&data, EXPERIENCE_KEYS);
        let projects = list(&data, PROJECTS_KEYS);

        Self {
            name: text_or_default(&data, NAME_KEYS),
            email: text_or_default(&data, EMAIL_KEYS),
            phone: text_or_default(&data, PHONE_KEYS),
            about: about(&all_skills, experience.len(), projects.len()),
            skills: all_skills.iter().take(SKILLS_SHOWN).cloned().collect(),
            education: list(&data, EDUCATION_KEYS)
                .iter()
                .filter_map(education_item)
                .take(EDUCATION_SHOWN)
                .collect(),
            experience: experience
                .iter()
                .filter_map(experience_item)
                .take(EXPERIENCE_SHOWN)
                .collect(),
            projects: projects
                .iter()
                .filter_map(project_item)
                .take(PROJECTS_SHOWN)
                .collect(),
            languages: strings(list(&data, LANGUAGES_KEYS))
                .into_iter()
                .take(LANGUAGES_SHOWN)
                .collect(),
            total_skills: all_skills.len(),
            total_experience: experience.len(),
            total_projects: projects.len(),
        }
    }
}
