use serde::Deserialize;
use serde::Serialize;

/// One address suggestion from the autocomplete endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteSuggestion {
    pub formatted_address: String,
    pub google_place_id: String,
}

/// Resolved place for a place id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub google_place_id: String,
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
}
