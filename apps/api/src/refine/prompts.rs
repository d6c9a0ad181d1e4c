//! The priming message for a refinement session.
//!
//! This synthetic opening turn restates the current ad in full and imposes
//! the output-format contract the sanitizer and ad-update path rely on. It
//! is stored as the session's first turn but never surfaced as something the
//! user wrote.

/// Priming template. Replace: {ad_text}
const PRIMING_TEMPLATE: &str = r#"Okay, I'm ready to help you refine the job ad. Here is the current version:

--- START OF CURRENT JOB AD ---
{ad_text}
--- END OF CURRENT JOB AD ---

**CRITICAL INSTRUCTIONS FOR OUR INTERACTION (Please Read Carefully):**

1.  **Your Primary Goal:** Your main task is to help me refine the job advertisement above.
2.  **Responding to Ad Refinement Requests:** When I ask you to make changes to the job ad (e.g., "change the location," "make the tone more formal"), your response **MUST BE ONLY the complete, revised job advertisement text**.
    *   Do NOT include any conversational phrases, introductions, explanations, or sign-offs before or after the job ad text itself.
3.  **Responding to General/Unrelated Questions:** If I ask you a question that is NOT about refining the current job ad, you can answer it naturally and conversationally. You are NOT restricted to outputting only the job ad in these cases.
4.  **Returning to Ad Refinement:** After any general conversation, if I then ask you to make a change to the job ad again, you **MUST immediately switch back to following Instruction #2** — your response must again be ONLY the complete, revised job advertisement text, without any preamble.
5.  **Output Format for Ad:** When providing the job ad, preserve formatting (like bullet points and bolding) as indicated in the original template or current ad structure.

What changes would you like to make to the job ad displayed above?"#;

/// Builds the priming turn text for the given ad.
pub fn build_priming_message(ad_text: &str) -> String {
    PRIMING_TEMPLATE.replace("{ad_text}", ad_text)
}
