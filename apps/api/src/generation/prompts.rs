//! Prompt assembly for the initial ad generation call.
//!
//! Const templates with `{placeholder}` markers, replaced before sending.
//! Both user inputs are embedded verbatim inside delimiter tags so the
//! model can tell template structure from job facts.

use crate::generation::tone::Tone;

/// Generation prompt template.
/// Replace: {template}, {job_description}, {config_instructions}
const GENERATION_PROMPT_TEMPLATE: &str = r#"You are an expert HR copywriter specializing in creating compelling job advertisements.
Your task is to generate a complete and engaging job advertisement based on the provided template, job description, and specific instructions.

**INSTRUCTIONS FOR GENERATION:**
1.  **Adherence to Template:** Strictly use the following TEMPLATE as the primary structure and guide for the sections and their order:
    <template>
    {template}
    </template>

2.  **Content Integration:** Fill in the template placeholders and expand upon its sections using the detailed information from this JOB DESCRIPTION:
    <job_description>
    {job_description}
    </job_description>

3.  **Tone and Word Count:**
    {config_instructions}

4.  **Elaboration and Creativity:**
    *   If the template has sections like "About Us" or "Why Join Us?", and the job description lacks explicit text for these, use your HR expertise to write plausible, positive, and attractive content. You can infer company culture aspects if not directly stated.
    *   If placeholders like "[Insert Job Title Here]" are present, ensure they are filled based on the job description.
    *   Ensure the language is inclusive and appealing to a diverse range of candidates.

5.  **Output Format:**
    *   The output should be the complete job advertisement text ONLY.
    *   Do not include any of your own commentary, introductions, or sign-offs (like "Generated Job Advertisement:" or "Here is the job ad:") before or after the actual advertisement content.
    *   Preserve formatting (like bullet points, bolding indicated by asterisks in the template) as much as possible.

Begin the job advertisement now:"#;

/// Builds the tone/length directive block.
/// A zero word limit produces the no-strict-limit sentence, never a number.
fn build_config_instructions(tone: Tone, max_words: u32) -> String {
    let mut instructions = format!("Adopt a '{}' tone for the advertisement.", tone.label());
    if max_words > 0 {
        instructions.push_str(&format!(
            "\nTry to keep the advertisement approximately under {max_words} words."
        ));
    } else {
        instructions.push_str(
            "\nThere is no strict word limit, but aim for clarity and conciseness appropriate for a job ad.",
        );
    }
    instructions
}

/// Assembles the full generation prompt. Inputs are embedded verbatim.
pub fn build_generation_prompt(
    template: &str,
    description: &str,
    tone: Tone,
    max_words: u32,
) -> String {
    GENERATION_PROMPT_TEMPLATE
        .replace("{template}", template)
        .replace("{job_description}", description)
        .replace(
            "{config_instructions}",
            &build_config_instructions(tone, max_words),
        )
}
