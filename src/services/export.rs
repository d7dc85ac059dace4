//! CSV exports offered by the backend.

use crate::domain::resource::ResourceKind;
use crate::repository::ExportReader;
use crate::repository::errors::ApiError;
use crate::services::ServiceResult;

/// Parsed CSV export: a header row plus records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CsvExport {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvExport {
    pub fn parse(text: &str) -> Result<Self, ApiError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|err| ApiError::Decode(err.to_string()))?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();

        let rows = reader
            .records()
            .map(|record| {
                record
                    .map(|record| record.iter().map(str::to_string).collect())
                    .map_err(|err| ApiError::Decode(err.to_string()))
            })
            .collect::<Result<Vec<Vec<String>>, ApiError>>()?;

        Ok(Self { headers, rows })
    }

    /// Index of the column named `name`, ignoring case.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
    }

    /// Values of the column named `name`; short rows yield empty strings.
    pub fn values(&self, name: &str) -> Vec<&str> {
        let Some(index) = self.column(name) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .map(|row| row.get(index).map(String::as_str).unwrap_or_default())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Downloads and parses the CSV export of `resource`.
pub async fn export_resource<R>(repo: &R, resource: ResourceKind) -> ServiceResult<CsvExport>
where
    R: ExportReader + ?Sized,
{
    let text = repo.export_csv(resource).await.map_err(|err| {
        log::error!("Failed to export {resource}: {err}");
        err
    })?;
    let export = CsvExport::parse(&text)?;
    log::info!("Exported {} {resource}", export.len());
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPANIES: &str = "ID,Name,Industry,Country,Email,Phone,Website,Created At\n\
        1,\"Acme, Inc\",Software,India,hello@acme.io,,https://acme.io,2025-03-01 10:00:00\n\
        2,Globex,Retail,India,,,,2025-03-02 11:00:00\n";

    #[test]
    fn parses_quoted_fields() {
        let export = CsvExport::parse(COMPANIES).unwrap();
        assert_eq!(export.headers.len(), 8);
        assert_eq!(export.len(), 2);
        assert_eq!(export.values("name"), vec!["Acme, Inc", "Globex"]);
        assert_eq!(export.column("Created At"), Some(7));
        assert!(export.values("missing").is_empty());
    }

    #[test]
    fn empty_body_has_no_rows() {
        let export = CsvExport::parse("").unwrap();
        assert!(export.is_empty());
        assert!(export.headers.is_empty());
    }
}

#[cfg(all(test, feature = "test-mocks"))]
mod mock_tests {
    use super::*;
    use crate::repository::mock::MockRepository;

    #[tokio::test]
    async fn export_goes_through_the_reader() {
        let mut repo = MockRepository::new();
        repo.expect_export_csv()
            .withf(|resource| *resource == ResourceKind::Leads)
            .times(1)
            .returning(|_| Ok("Company,Email\nAcme,hello@acme.io\n".to_string()));

        let export = export_resource(&repo, ResourceKind::Leads).await.unwrap();
        assert_eq!(export.values("email"), vec!["hello@acme.io"]);
    }
}
