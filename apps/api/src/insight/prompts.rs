// Prompt template for prospect analysis and outreach drafting.
// Reuses the cross-cutting fragments from llm_client::prompts.

use crate::insight::models::{ProspectRecord, SenderProfile};
use crate::llm_client::prompts::RAW_JSON_PREAMBLE;

/// Insight prompt template.
/// Replace: {preamble}, {company_name}, {industry}, {notes},
///          {sender_company}, {sender_service}, {sender_tone}
pub const INSIGHT_PROMPT_TEMPLATE: &str = r#"{preamble}

Target company (the prospect):
Company: {company_name}
Industry: {industry}
Notes / pain points: {notes}

Sender (the company reaching out to help):
Sender company: {sender_company}
What we offer: {sender_service}
Tone: {sender_tone}

Your job:
1) Classify the pain points into a short category.
2) Summarize the opportunity in 1-2 sentences.
3) Write a SALES OUTREACH email from the SENDER to the TARGET company.
   - The email must be written in first person plural ("we") as the sender.
   - Do NOT write as if you work at the target company.
   - Keep it specific to the notes.
   - Keep it short and realistic (no hype).

Return ONLY a flat JSON object with exactly these keys:
- category
- opportunity_summary
- email_subject
- email_body

Rules:
- email_body must be plain text with normal new lines.
- Do not return nested objects."#;

/// Renders the insight prompt. Pure; every field is inserted verbatim.
///
/// Single left-to-right pass over the template: substituted values are never
/// re-scanned, so a prospect note containing `{sender_company}` stays literal.
pub fn build_insight_prompt(sender: &SenderProfile, prospect: &ProspectRecord) -> String {
    let replacements: [(&str, &str); 7] = [
        ("{preamble}", RAW_JSON_PREAMBLE),
        ("{company_name}", &prospect.company_name),
        ("{industry}", &prospect.industry),
        ("{notes}", &prospect.notes),
        ("{sender_company}", &sender.company),
        ("{sender_service}", &sender.service_offered),
        ("{sender_tone}", &sender.tone),
    ];

    let mut out = String::with_capacity(INSIGHT_PROMPT_TEMPLATE.len() + 256);
    let mut rest = INSIGHT_PROMPT_TEMPLATE;
    while let Some(start) = rest.find('{') {
        let matched = replacements
            .iter()
            .find(|(placeholder, _)| rest[start..].starts_with(placeholder));
        match matched {
            Some((placeholder, value)) => {
                out.push_str(&rest[..start]);
                out.push_str(value);
                rest = &rest[start + placeholder.len()..];
            }
            None => {
                out.push_str(&rest[..=start]);
                rest = &rest[start + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}
