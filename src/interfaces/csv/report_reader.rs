use crate::domain::report::RoyaltyReport;
use crate::error::{PayoutError, Result};
use std::io::Read;

/// Reads royalty report fixtures from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record
/// lengths, yielding `Result<RoyaltyReport>` lazily so large fixture files
/// stream without loading into memory.
pub struct ReportReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ReportReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn reports(self) -> impl Iterator<Item = Result<RoyaltyReport>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(|e| PayoutError::Storage(std::io::Error::other(e))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::ReportStatus;
    use rust_decimal_macros::dec;

    const HEADER: &str = "id,merchant_id,status,period_from,period_to,amount,currency";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\n\
             7f3f6f1e-8f44-4f08-9d2e-7a4f8bafafc1, 9e107d9d-372b-4676-9e2b-5a5c33a3e7de, accepted, 2026-01-01T00:00:00Z, 2026-01-08T00:00:00Z, 100.50, USD"
        );
        let reader = ReportReader::new(data.as_bytes());
        let reports: Vec<Result<RoyaltyReport>> = reader.reports().collect();

        assert_eq!(reports.len(), 1);
        let report = reports[0].as_ref().unwrap();
        assert_eq!(report.status, ReportStatus::Accepted);
        assert_eq!(report.amount, dec!(100.50));
        assert_eq!(report.currency, "USD");
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}\nnot-a-uuid, x, accepted, 2026-01-01T00:00:00Z, 2026-01-08T00:00:00Z, 1.0, USD");
        let reader = ReportReader::new(data.as_bytes());
        let reports: Vec<Result<RoyaltyReport>> = reader.reports().collect();
        assert!(reports[0].is_err());
    }
}
