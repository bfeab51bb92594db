//! Party-specific endpoints: proximity search, CSV export, own parties.

use chrono::NaiveDate;
use reqwest::Method;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::header::CONTENT_TYPE;

use crate::PartyRegClient;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::Party;
use crate::model::Resource;
use crate::model::Student;

const QUERY_DATE: &str = "%Y-%m-%d";

/// A downloaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Extracts `filename` from a `Content-Disposition` value.
fn disposition_filename(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

impl PartyRegClient {
    /// `GET /parties/nearby?place_id=&start_date=&end_date=`
    ///
    /// Parties near a place within a date window.
    pub async fn parties_nearby(
        &self,
        place_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Party>, Error> {
        let url = self.endpoint(
            &[Party::PATH, "nearby"],
            &[
                ("place_id", place_id.to_string()),
                ("start_date", start_date.format(QUERY_DATE).to_string()),
                ("end_date", end_date.format(QUERY_DATE).to_string()),
            ],
        )?;
        self.get_json(url).await
    }

    /// `GET /parties/csv?start_date=&end_date=`
    ///
    /// The body is passed through untouched.
    pub async fn export_parties_csv(&self, start_date: NaiveDate, end_date: NaiveDate) -> Result<ExportFile, Error> {
        let start = start_date.format(QUERY_DATE).to_string();
        let end = end_date.format(QUERY_DATE).to_string();
        let url = self.endpoint(
            &[Party::PATH, "csv"],
            &[("start_date", start.clone()), ("end_date", end.clone())],
        )?;

        let response = self.send(Method::GET, url, None).await?;
        let headers = response.headers();
        let filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename)
            .unwrap_or_else(|| format!("parties_{start}_{end}.csv"));
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/csv")
            .to_string();
        let bytes = response.bytes().await.map_err(ApiError::from)?.to_vec();

        log::info!("exported {} bytes to {filename}", bytes.len());
        Ok(ExportFile {
            filename,
            content_type,
            bytes,
        })
    }

    /// `GET /students/me`, the signed-in student.
    pub async fn current_student(&self) -> Result<Student, Error> {
        let url = self.endpoint(&[Student::PATH, "me"], &[])?;
        self.get_json(url).await
    }

    /// `GET /students/me/parties`, parties the signed-in student registered.
    pub async fn my_parties(&self) -> Result<Vec<Party>, Error> {
        let url = self.endpoint(&[Student::PATH, "me", Party::PATH], &[])?;
        self.get_json(url).await
    }
}
