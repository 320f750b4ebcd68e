// Shared prompt fragments and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Output contract appended to every prompt that asks for a full HTML document.
pub const RAW_HTML_ONLY: &str = "\
IMPORTANT:
- Return ONLY the raw HTML content
- Do NOT wrap response in markdown code blocks
- Do NOT include explanations or commentary before or after the document
- Start directly with <!DOCTYPE html>";

/// Optional context block; empty when the user supplied nothing.
pub fn optional_section(heading: &str, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!("\n{heading}:\n{body}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_section_empty_body() {
        assert_eq!(optional_section("Extra", "   "), "");
    }

    #[test]
    fn test_optional_section_with_body() {
        let section = optional_section("Extra", " led migrations ");
        assert_eq!(section, "\nExtra:\nled migrations\n");
    }
}
