use serde::{Deserialize, Serialize};

/// A single scraped listing as served by the offers backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub area: f64,
    pub rooms: i64,
    pub location: String,
    pub price_per_m2: f64,
    pub detail_url: String,
}

/// User-chosen search criteria
///
/// Every field is independently optional. Fields missing from a persisted
/// record fall back to [`FilterState::default`], while an explicit `null`
/// stays absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterState {
    pub location: Option<String>,
    pub price: Option<f64>,
    pub rooms: Option<u32>,
    pub exclude: Option<bool>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            location: Some(String::new()),
            price: Some(0.0),
            rooms: Some(0),
            exclude: Some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults_but_null_stays_absent() {
        let state: FilterState =
            serde_json::from_str(r#"{"location":"Gdańsk","price":null}"#).unwrap();

        assert_eq!(state.location.as_deref(), Some("Gdańsk"));
        assert_eq!(state.price, None);
        assert_eq!(state.rooms, Some(0));
        assert_eq!(state.exclude, Some(false));
    }

    #[test]
    fn offer_decodes_backend_field_names() {
        let offer: Offer = serde_json::from_str(
            r#"{
                "id": 7,
                "title": "Mieszkanie 2 pokoje",
                "price": 419000.0,
                "area": 38.5,
                "rooms": 2,
                "location": "Gdańsk, Wrzeszcz",
                "price_per_m2": 10883.1,
                "detail_url": "https://www.otodom.pl/pl/oferta/7"
            }"#,
        )
        .unwrap();

        assert_eq!(offer.id, 7);
        assert_eq!(offer.rooms, 2);
        assert_eq!(offer.detail_url, "https://www.otodom.pl/pl/oferta/7");
    }
}
