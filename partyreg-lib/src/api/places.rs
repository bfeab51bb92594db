//! Address lookup, proxied by the backend to the geocoding provider.

use crate::PartyRegClient;
use crate::error::Error;
use crate::model::AutocompleteSuggestion;
use crate::model::PlaceDetails;

impl PartyRegClient {
    /// `GET /locations/autocomplete?input=`
    ///
    /// Blank input returns no suggestions without a request.
    pub async fn autocomplete(&self, input: &str) -> Result<Vec<AutocompleteSuggestion>, Error> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.endpoint(&["locations", "autocomplete"], &[("input", input.to_string())])?;
        self.get_json(url).await
    }

    /// `GET /locations/place-details/{place_id}`
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, Error> {
        let url = self.endpoint(&["locations", "place-details", place_id], &[])?;
        self.get_json(url).await
    }
}
