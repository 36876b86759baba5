use serde::{Deserialize, Serialize};

/// Tone presets offered by the UI. Any free-text tone is accepted.
pub const TONE_PRESETS: &[&str] = &[
    "professional, concise, helpful",
    "friendly and direct",
    "formal",
];

/// The outreach identity. Supplied once per session and applied to every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderProfile {
    pub company: String,
    pub service_offered: String,
    pub tone: String,
}

impl Default for SenderProfile {
    fn default() -> Self {
        Self {
            company: "Northeast co.".to_string(),
            service_offered:
                "automation + AI tools (dashboards, CRM workflows, outreach automation)"
                    .to_string(),
            tone: TONE_PRESETS[0].to_string(),
        }
    }
}

/// One analyzed target company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProspectRecord {
    pub company_name: String,
    pub industry: String,
    pub notes: String,
}

impl ProspectRecord {
    /// True when every field is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.company_name.trim().is_empty()
            && self.industry.trim().is_empty()
            && self.notes.trim().is_empty()
    }
}

/// Validated model output. Field order is the canonical JSON key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightResult {
    pub category: String,
    pub opportunity_summary: String,
    pub email_subject: String,
    pub email_body: String,
}

/// A prospect and its insight, flattened for tabular display and CSV export.
/// Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRow {
    pub company_name: String,
    pub industry: String,
    pub category: String,
    pub opportunity_summary: String,
    pub email_subject: String,
    pub email_body: String,
}

impl BatchRow {
    pub fn new(record: ProspectRecord, insight: InsightResult) -> Self {
        Self {
            company_name: record.company_name,
            industry: record.industry,
            category: insight.category,
            opportunity_summary: insight.opportunity_summary,
            email_subject: insight.email_subject,
            email_body: insight.email_body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_profile_partial_json_fills_defaults() {
        let sender: SenderProfile = serde_json::from_str(r#"{"company": "Globex"}"#).unwrap();
        assert_eq!(sender.company, "Globex");
        assert_eq!(sender.tone, "professional, concise, helpful");
        assert!(sender.service_offered.starts_with("automation + AI tools"));
    }

    #[test]
    fn test_prospect_is_blank_ignores_whitespace() {
        let record = ProspectRecord {
            company_name: "  ".to_string(),
            industry: "\t".to_string(),
            notes: String::new(),
        };
        assert!(record.is_blank());

        let record = ProspectRecord {
            notes: "only notes".to_string(),
            ..ProspectRecord::default()
        };
        assert!(!record.is_blank());
    }

    #[test]
    fn test_batch_row_keeps_prospect_and_insight_fields() {
        let row = BatchRow::new(
            ProspectRecord {
                company_name: "Acme".to_string(),
                industry: "Logistics".to_string(),
                notes: "Excel tracking".to_string(),
            },
            InsightResult {
                category: "Workflow automation".to_string(),
                opportunity_summary: "Acme tracks shipments by hand.".to_string(),
                email_subject: "Less spreadsheet work".to_string(),
                email_body: "Hi Acme,\nWe can help.".to_string(),
            },
        );
        assert_eq!(row.company_name, "Acme");
        assert_eq!(row.category, "Workflow automation");
        assert_eq!(row.email_body, "Hi Acme,\nWe can help.");
    }
}
