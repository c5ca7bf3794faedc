//! Canned assistant texts used by the onboarding flow.

use std::fmt::Display;

pub const PROFILE_PROMPT: &str = "Great! I can be your AI career mentor. Share your profile links so I can tailor guidance to you:

• LinkedIn URL (optional)
• GitHub URL
• CodeChef URL

Once I have these, I'll analyze your background and suggest the best next steps, roles to target, and a learning roadmap.";

pub const PROFILES_RECEIVED: &str =
    "Thanks! I've analyzed your profiles. Here's what I found:";

pub const RESUME_PROMPT: &str = "To complete your profile, please upload your resume (PDF, DOCX, or TXT). \
I'll extract your education, skills, and experience to sharpen my recommendations.";

pub const RESUME_RECEIVED: &str =
    "Your resume has been analyzed successfully. Here's a summary of what I extracted:";

pub const CONNECTION_TROUBLE: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// Used when the chat backend answers but no reply text can be located.
pub const FALLBACK_REPLY: &str =
    "Thanks for your message! Tell me a bit more about what you'd like to focus on next.";

pub fn profile_failure(error: impl Display) -> String {
    format!(
        "Sorry, I couldn't extract your profiles: {error}. Please check the links and try again."
    )
}

pub fn resume_failure(error: impl Display) -> String {
    format!("Sorry, I couldn't analyze your resume: {error}. Please try uploading it again.")
}
