use crate::insight::models::BatchRow;

/// Export column order. The header row is always written, even for zero rows.
pub const EXPORT_COLUMNS: [&str; 6] = [
    "company_name",
    "industry",
    "category",
    "opportunity_summary",
    "email_subject",
    "email_body",
];

/// Suggested download file name for batch results.
pub const EXPORT_FILE_NAME: &str = "ai_results.csv";

/// Renders batch rows as CSV text, header first, rows in the given order.
pub fn write_results_csv(rows: &[BatchRow]) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::new(e.error().kind(), e.error().to_string())))?;
    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company: &str, body: &str) -> BatchRow {
        BatchRow {
            company_name: company.to_string(),
            industry: "Logistics".to_string(),
            category: "Workflow automation".to_string(),
            opportunity_summary: "Manual tracking slows them down.".to_string(),
            email_subject: "Quick idea".to_string(),
            email_body: body.to_string(),
        }
    }

    #[test]
    fn test_header_written_first() {
        let csv = write_results_csv(&[row("Acme", "Hi")]).unwrap();
        assert_eq!(
            csv.lines().next(),
            Some("company_name,industry,category,opportunity_summary,email_subject,email_body")
        );
    }

    #[test]
    fn test_header_written_for_empty_results() {
        let csv = write_results_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_rows_keep_order_and_quote_multiline_bodies() {
        let rows = vec![
            row("Acme", "Hi Acme,\nWe can help, quickly."),
            row("BetaSoft", "Hello"),
        ];
        let csv = write_results_csv(&rows).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let parsed: Vec<BatchRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(parsed, rows);
    }
}
