//! Instructions sent alongside each extraction schema.
//!
//! The page content travels separately as the user message; these are the
//! system-side instructions only.

/// Instruction for the job posting page.
pub const JOB_POSTING_PROMPT: &str = r#"You are reading a job posting for a role within software engineering.

Extract the posting and separate it into:
- title: the position being advertised
- company: the company posting the position
- about: what the page says about the company itself
- description: what the role involves
- requirements: qualifications and experience asked of candidates

Also list every skill the posting mentions that relates to software engineering, hard skills (languages, frameworks, tools) and soft skills alike, with how many times each is referenced.
Also list the company values the posting mentions, with how many times each is referenced.

Only report what the page states. Use an empty string for text that is missing and an empty list when nothing is mentioned."#;

/// Instruction for link discovery on the company homepage.
pub const LINK_DISCOVERY_PROMPT: &str = r#"You are reading a company homepage.

List the navigation links and buttons on the page whose target has a decent chance of describing the company, and most importantly its values (about us, mission, culture, careers, team).

Rules:
- Each link appears once; no duplicate entries
- The url must be the link target exactly as it appears on the page, absolute or relative
- URLs must be clean, with no remnants of HTML tags or markup. A URL such as https://www.appliedintuition.com/%3C/careers%3E is wrong
- Skip social media, login, legal and external links"#;

/// Instruction for a company "about" page.
pub const COMPANY_PAGE_PROMPT: &str = r#"You are reading a page published by a company about itself.

Extract a company profile:
- page_title: the title of this page
- about_text: a short text describing what the company is about
- soft_skills: the soft skills the page mentions, with how many times each is referenced
- values: the company values the page mentions, with how many times each is referenced

{focus_section}
{language_section}

Only report what the page states. Use empty lists when nothing is mentioned."#;

/// Format the company page instruction.
///
/// `job_title` biases the extraction toward what matters for that role;
/// `output_language` asks for the text to be translated.
pub fn format_company_prompt(job_title: Option<&str>, output_language: Option<&str>) -> String {
    let focus_section = match job_title.map(str::trim) {
        Some(title) if !title.is_empty() => format!(
            "Favor information relevant to someone applying for the position \"{}\".",
            title
        ),
        _ => "Favor information relevant to software engineering jobs.".to_string(),
    };

    let language_section = match output_language.map(str::trim) {
        Some(lang) if !lang.is_empty() => format!(
            "Write page_title, about_text and every skill and value name in {}, translating where needed.",
            lang
        ),
        _ => String::new(),
    };

    COMPANY_PAGE_PROMPT
        .replace("{focus_section}", &focus_section)
        .replace("{language_section}", &language_section)
        .trim()
        .to_string()
}
