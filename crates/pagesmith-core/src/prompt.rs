//! Prompt assembly for single-file website generation.

/// Wrap the user's request in the instruction block the generator is
/// driven with.
///
/// The wording is deliberately strict and repetitive: small local
/// models drift into commentary and Markdown fences unless told not to
/// in several ways.
pub fn render_page_prompt(request: &str) -> String {
    format!(
        r#"You are a machine that only generates raw HTML code.
Your task is to convert the user's request into a single, self-contained HTML file.

**CRITICAL RULES:**
- **DO NOT** write any text, explanations, or summaries.
- **DO NOT** write any notes or tell about the code.
- **DO NOT** highlight the code using '''html markdown format
- **DO NOT** use Markdown formatting like ```html.
- Your response **MUST** be only the HTML code with integration of CSS in style tag and Javascript in Script tag.
- Your response **MUST** start with `<!DOCTYPE html>`.
- The generated code **MUST** be fully responsive and use modern CSS and JavaScript for a high-quality, interactive user experience.

**USER REQUEST:** "{request}"

**HTML CODE ONLY:**
"#
    )
}
