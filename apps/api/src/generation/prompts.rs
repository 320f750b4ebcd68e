// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Resume tailoring prompt template.
/// Replace: {resume_content}, {job_description}, {company_overview},
///          {additional_context}, {output_contract}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Given this resume content:
{resume_content}

And this job description:
{job_description}

Company Overview:
{company_overview}
{additional_context}
Instructions:
1. Analyze the job description, company overview, and any additional relevant experience carefully
2. IMPORTANT: Do NOT modify any HTML tags or structure - only update the text content within existing elements
3. Customize ONLY the text content to better match the job requirements while keeping all HTML intact
4. Highlight relevant skills and experience that match the job description
5. If additional relevant experience was provided, incorporate it naturally into the appropriate sections
6. Ensure the modifications are subtle and professional
7. Keep all existing sections and their HTML structure exactly as is
8. Add relevant keywords from the job description naturally within the existing text

{output_contract}
- Do NOT modify ANY HTML tags or attributes
- Only change the text between tags
- Keep all HTML structure exactly as provided"#;

/// Cover letter prompt template.
/// Replace: {resume_content}, {job_title}, {company_name}, {hiring_manager},
///          {date}, {job_description}, {company_overview}, {additional_context},
///          {letter_template}, {output_contract}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Given this resume content:
{resume_content}

Create a professional cover letter with the following details:
- Job Title: {job_title}
- Company: {company_name}
- Hiring Manager: {hiring_manager}
- Date: {date}

Job Description:
{job_description}

Company Overview:
{company_overview}
{additional_context}
Instructions:
1. IMPORTANT: Use EXACTLY this HTML structure - do not modify any tags:
{letter_template}

2. Only modify:
   - [DATE] with the provided date
   - [RECIPIENT] with the hiring manager details
   - The content within the letter-body div
3. Focus on matching the candidate's experience with the job requirements
4. If additional relevant experience was provided, emphasize it prominently in the letter
5. Demonstrate understanding of the company's values and culture
6. Keep the tone professional yet engaging
7. Include a strong call to action in the closing paragraph
8. Limit to 3-4 paragraphs

{output_contract}
- Use EXACTLY the HTML structure provided
- Only modify the marked placeholders and letter body content
- Do NOT modify any other HTML elements or attributes"#;

/// Heading for the user's free-text experience in the resume prompt.
pub const RESUME_EXPERIENCE_HEADING: &str = "Additional Relevant Experience";

/// Heading for the user's free-text experience in the cover letter prompt.
pub const LETTER_EXPERIENCE_HEADING: &str = "Additional Context - Relevant Experience to Highlight";

/// Used when no hirer name was given.
pub const GENERIC_HIRING_MANAGER: &str = "Hiring Manager (name not provided, omit the name)";
