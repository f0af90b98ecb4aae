//! Prompt templates for the LLM candidate overview
//!
//! Provides the default overview prompt and helpers for rendering it and
//! reading fields back out of the model's response.

/// Default prompt templates for overview generation
pub struct PromptTemplates;

impl PromptTemplates {
    /// Rules appended to every prompt
    pub fn constraints() -> &'static str {
        r#"NON-NEGOTIABLE RULES:
- Be concise and factual
- Do NOT assign scores
- Do NOT make hiring decisions
- Do NOT invent information
- Use only CV and JD content"#
    }

    /// Instruction block for the JD & CV overview, without the documents
    pub fn jd_cv_analysis() -> String {
        format!(
            r#"You are analyzing a Job Description and a Candidate CV for interview preparation.

{constraints}

OUTPUT FORMAT (STRICT):

Candidate Name:
<name or 'Not explicitly stated'>

Candidate Summary:
- 3–4 bullet points summarizing background and role fit

Key JD Highlights:
- 5 concise bullets capturing role expectations

Top 10 Candidate Skills:
- Bullet list (skills inferred directly from CV)

Top 5 Interview Questions:
- Role-relevant, probing questions"#,
            constraints = Self::constraints()
        )
    }

    /// Full overview prompt for a job description and CV
    pub fn render_overview(job_description: &str, cv_text: &str) -> String {
        format!(
            "JOB DESCRIPTION:\n{}\n\nCANDIDATE CV:\n{}\n\n{}",
            job_description,
            cv_text,
            Self::jd_cv_analysis()
        )
    }
}

/// Extract the candidate name from an overview response
///
/// Accepts the value on the same line as `Candidate Name:` or on the next
/// non-empty line. Placeholders, "not stated" answers and a blank value
/// followed directly by the next section heading yield `None`.
pub fn parse_candidate_name(overview: &str) -> Option<String> {
    let mut lines = overview.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim().trim_start_matches(['*', '#', ' ']);
        let Some(rest) = strip_prefix_ignore_case(trimmed, "candidate name:") else {
            continue;
        };

        let value = if rest.trim().trim_matches('*').trim().is_empty() {
            let next = lines.find(|l| !l.trim().is_empty()).unwrap_or("");
            // A heading here means the name was left blank
            if next.trim().trim_end_matches('*').ends_with(':') {
                return None;
            }
            next
        } else {
            rest
        };

        let name = value
            .trim()
            .trim_start_matches("- ")
            .trim_matches(['*', '"'])
            .trim();

        if name.is_empty()
            || name.starts_with('<')
            || name.to_lowercase().contains("not explicitly stated")
        {
            return None;
        }
        return Some(name.to_string());
    }

    None
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}
