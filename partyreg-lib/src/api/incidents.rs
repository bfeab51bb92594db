//! Incidents logged against a location.

use reqwest::Method;

use crate::PartyRegClient;
use crate::error::Error;
use crate::model::Incident;
use crate::model::IncidentPayload;
use crate::model::Location;
use crate::model::Resource;

impl PartyRegClient {
    /// `POST /locations/{id}/incidents`
    pub async fn create_incident(&self, payload: &IncidentPayload) -> Result<Incident, Error> {
        let location_id = payload.location_id.to_string();
        let url = self.endpoint(&[Location::PATH, &location_id, "incidents"], &[])?;
        self.send_json(Method::POST, url, payload).await
    }

    /// `PUT /locations/{id}/incidents/{incident_id}`
    pub async fn update_incident(&self, incident_id: i64, payload: &IncidentPayload) -> Result<Incident, Error> {
        let location_id = payload.location_id.to_string();
        let incident_id = incident_id.to_string();
        let url = self.endpoint(&[Location::PATH, &location_id, "incidents", &incident_id], &[])?;
        self.send_json(Method::PUT, url, payload).await
    }

    /// `DELETE /locations/{id}/incidents/{incident_id}`
    pub async fn delete_incident(&self, location_id: i64, incident_id: i64) -> Result<(), Error> {
        let location_id = location_id.to_string();
        let incident_id = incident_id.to_string();
        let url = self.endpoint(&[Location::PATH, &location_id, "incidents", &incident_id], &[])?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }
}
