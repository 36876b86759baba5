//! Batch mode: CSV ingestion and the sequential per-row completion loop.
//!
//! Ingestion policy:
//! - UTF-8 BOM stripped; headers trimmed and lower-cased before matching.
//! - Rows whose required fields are all empty are dropped silently.
//! - Only the first `max_rows` usable rows are kept, silently.
//!
//! Run policy: rows are processed one at a time, in input order. The first failing
//! row aborts the run and nothing is returned for the rows that succeeded.

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::insight::invoker::{generate_insight, CompletionError};
use crate::insight::models::{BatchRow, ProspectRecord, SenderProfile};
use crate::llm_client::CompletionBackend;

/// Columns every input CSV must carry, sorted.
pub const REQUIRED_COLUMNS: [&str; 3] = ["company_name", "industry", "notes"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Could not read CSV headers. Make sure the first row is the header row.")]
    EmptyHeader,

    #[error("Missing required column(s): {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("No rows found in CSV (after header).")]
    NoRows,

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A batch run stopped at `row` (1-based, among ingested records).
#[derive(Debug, Error)]
#[error("Row {row} ('{company_name}') failed: {source}")]
pub struct BatchAborted {
    pub row: usize,
    pub company_name: String,
    pub source: CompletionError,
}

/// Parses CSV bytes into at most `max_rows` prospect records, in input order.
pub fn ingest_csv(input: &[u8], max_rows: usize) -> Result<Vec<ProspectRecord>, IngestError> {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    if headers.is_empty() {
        return Err(IngestError::EmptyHeader);
    }

    // Later duplicates win, matching dict-style row access.
    let indices = REQUIRED_COLUMNS.map(|name| headers.iter().rposition(|h| h == name));
    let [Some(company_idx), Some(industry_idx), Some(notes_idx)] = indices else {
        let columns = REQUIRED_COLUMNS
            .iter()
            .zip(indices)
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        return Err(IngestError::MissingColumns { columns });
    };

    let mut records = Vec::new();
    for result in reader.records() {
        if records.len() >= max_rows {
            break;
        }
        let row = result?;
        let cell = |idx: usize| row.get(idx).unwrap_or("").trim().to_string();
        let record = ProspectRecord {
            company_name: cell(company_idx),
            industry: cell(industry_idx),
            notes: cell(notes_idx),
        };
        if !record.is_blank() {
            records.push(record);
        }
    }

    if records.is_empty() {
        return Err(IngestError::NoRows);
    }
    Ok(records)
}

/// Runs one completion per record, sequentially, aborting on the first failure.
pub async fn run_batch(
    llm: &dyn CompletionBackend,
    sender: &SenderProfile,
    records: Vec<ProspectRecord>,
) -> Result<Vec<BatchRow>, BatchAborted> {
    let run_id = Uuid::new_v4();
    let total = records.len();
    info!("Batch {run_id}: processing {total} companies");

    let mut rows = Vec::with_capacity(total);
    for (idx, record) in records.into_iter().enumerate() {
        match generate_insight(llm, sender, &record).await {
            Ok(insight) => rows.push(BatchRow::new(record, insight)),
            Err(source) => {
                error!(
                    "Batch {run_id}: row {} of {total} ('{}') failed, aborting: {source}",
                    idx + 1,
                    record.company_name
                );
                return Err(BatchAborted {
                    row: idx + 1,
                    company_name: record.company_name,
                    source,
                });
            }
        }
    }

    info!("Batch {run_id}: processed {} companies", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::invoker::testing::StubBackend;
    use crate::llm_client::LlmError;

    const SAMPLE: &str = "company_name,industry,notes\n\
        Acme Logistics,Logistics,\"Manual follow-ups, Excel-based tracking\"\n\
        BetaSoft,SaaS,\"No CRM, outbound heavy\"\n";

    #[test]
    fn test_ingest_sample() {
        let records = ingest_csv(SAMPLE.as_bytes(), 10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].company_name, "Acme Logistics");
        assert_eq!(records[0].notes, "Manual follow-ups, Excel-based tracking");
        assert_eq!(records[1].industry, "SaaS");
    }

    #[test]
    fn test_ingest_normalizes_header_case_and_whitespace() {
        let csv = "Company_Name, Industry , NOTES\nAcme,Logistics,Excel\n";
        let records = ingest_csv(csv.as_bytes(), 10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].industry, "Logistics");
    }

    #[test]
    fn test_ingest_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(SAMPLE.as_bytes());
        let records = ingest_csv(&bytes, 10).unwrap();
        assert_eq!(records[0].company_name, "Acme Logistics");
    }

    #[test]
    fn test_ingest_reports_missing_columns_sorted() {
        let csv = "name,sector\nAcme,Logistics\n";
        match ingest_csv(csv.as_bytes(), 10).unwrap_err() {
            IngestError::MissingColumns { columns } => {
                assert_eq!(columns, vec!["company_name", "industry", "notes"])
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }

        let csv = "company_name,industry\nAcme,Logistics\n";
        let err = ingest_csv(csv.as_bytes(), 10).unwrap_err();
        assert_eq!(err.to_string(), "Missing required column(s): notes");
    }

    #[test]
    fn test_ingest_empty_input_is_empty_header() {
        for input in [&b""[..], &b"\xEF\xBB\xBF"[..], &b"\n\n"[..]] {
            assert!(matches!(
                ingest_csv(input, 10).unwrap_err(),
                IngestError::EmptyHeader
            ));
        }
    }

    #[test]
    fn test_ingest_blank_header_names_are_missing_columns() {
        match ingest_csv(b" , \nAcme,Logistics\n", 10).unwrap_err() {
            IngestError::MissingColumns { columns } => {
                assert_eq!(columns, vec!["company_name", "industry", "notes"])
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_ingest_header_only_is_no_rows() {
        let err = ingest_csv(b"company_name,industry,notes\n", 10).unwrap_err();
        assert!(matches!(err, IngestError::NoRows));
    }

    #[test]
    fn test_ingest_drops_blank_rows() {
        let csv = "company_name,industry,notes\n , ,\nAcme,,\n,,\n";
        let records = ingest_csv(csv.as_bytes(), 10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company_name, "Acme");
        assert_eq!(records[0].notes, "");

        let err = ingest_csv(b"company_name,industry,notes\n,,\n  ,\t,\n", 10).unwrap_err();
        assert!(matches!(err, IngestError::NoRows));
    }

    #[test]
    fn test_ingest_truncates_to_cap_in_order() {
        let csv = "company_name,industry,notes\nA,x,n\nB,x,n\nC,x,n\nD,x,n\nE,x,n\n";
        let records = ingest_csv(csv.as_bytes(), 2).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_ingest_tolerates_ragged_rows_and_extra_columns() {
        let csv = "notes,website,company_name,industry\nExcel,acme.io,Acme,Logistics\nPhone only\n";
        let records = ingest_csv(csv.as_bytes(), 10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].company_name, "Acme");
        assert_eq!(records[0].notes, "Excel");
        assert_eq!(records[1].notes, "Phone only");
        assert_eq!(records[1].company_name, "");
    }

    #[test]
    fn test_ingest_rejects_invalid_utf8() {
        let bytes = b"company_name,industry,notes\n\xFF\xFE,x,y\n";
        assert!(matches!(
            ingest_csv(bytes, 10).unwrap_err(),
            IngestError::Csv(_)
        ));
    }

    #[tokio::test]
    async fn test_run_batch_preserves_order() {
        let stub = StubBackend::default();
        let records = ingest_csv(SAMPLE.as_bytes(), 10).unwrap();
        let rows = run_batch(&stub, &SenderProfile::default(), records)
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].company_name, "Acme Logistics");
        assert_eq!(rows[0].category, "Automation for Acme Logistics");
        assert_eq!(rows[1].company_name, "BetaSoft");
        assert_eq!(rows[1].category, "Automation for BetaSoft");
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_run_batch_aborts_on_first_failure() {
        let stub = StubBackend::with_replies(vec![
            Ok(crate::insight::invoker::testing::insight_json("Ops")),
            Ok("not json at all".to_string()),
            Err(LlmError::EmptyContent),
        ]);
        let csv = "company_name,industry,notes\nA,x,n\nB,x,n\nC,x,n\n";
        let records = ingest_csv(csv.as_bytes(), 10).unwrap();

        let err = run_batch(&stub, &SenderProfile::default(), records)
            .await
            .unwrap_err();
        assert_eq!(err.row, 2);
        assert_eq!(err.company_name, "B");
        assert!(matches!(
            err.source,
            CompletionError::MalformedResponse { .. }
        ));
        assert_eq!(stub.calls(), 2, "row C must not be attempted");
    }
}
