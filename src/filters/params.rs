use crate::models::FilterState;
use url::form_urlencoded;

/// Ordered request parameters
pub type QueryParams = Vec<(&'static str, String)>;

/// Turn a filter state into `/offers` request parameters
///
/// `price`, `exclude` and `rooms` are only sent alongside a non-empty
/// `location`; without one the list is empty no matter what else is set.
/// Within that branch a field counts as set only when it carries a
/// meaningful value: a non-zero price, `exclude == true`, non-zero rooms.
pub fn serialize_params(state: &FilterState) -> QueryParams {
    let mut params = QueryParams::new();

    let Some(location) = state.location.as_deref().filter(|l| !l.is_empty()) else {
        return params;
    };
    params.push(("location", location.to_string()));

    if let Some(price) = state.price.filter(|p| *p != 0.0 && !p.is_nan()) {
        params.push(("price", price.to_string()));
    }
    if state.exclude == Some(true) {
        params.push(("exclude", true.to_string()));
    }
    if let Some(rooms) = state.rooms.filter(|r| *r != 0) {
        params.push(("rooms", rooms.to_string()));
    }

    params
}

/// Form-urlencode parameters the way a browser's `URLSearchParams` would
pub fn to_query_string(params: &[(&'static str, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(
        location: Option<&str>,
        price: Option<f64>,
        rooms: Option<u32>,
        exclude: Option<bool>,
    ) -> FilterState {
        FilterState {
            location: location.map(str::to_string),
            price,
            rooms,
            exclude,
        }
    }

    #[test]
    fn empty_location_suppresses_every_other_field() {
        let params = serialize_params(&state(Some(""), Some(500000.0), Some(2), Some(true)));
        assert!(params.is_empty());
    }

    #[test]
    fn absent_location_suppresses_every_other_field() {
        let params = serialize_params(&state(None, Some(500000.0), Some(3), None));
        assert!(params.is_empty());
    }

    #[test]
    fn full_state_serializes_in_stable_order() {
        let params = serialize_params(&state(Some("Warszawa"), Some(500000.0), Some(2), Some(true)));

        assert_eq!(
            params,
            vec![
                ("location", "Warszawa".to_string()),
                ("price", "500000".to_string()),
                ("exclude", "true".to_string()),
                ("rooms", "2".to_string()),
            ]
        );
        assert_eq!(
            to_query_string(&params),
            "location=Warszawa&price=500000&exclude=true&rooms=2"
        );
    }

    #[test]
    fn default_values_are_not_sent() {
        let params = serialize_params(&FilterState {
            location: Some("Kraków".to_string()),
            ..FilterState::default()
        });

        assert_eq!(params, vec![("location", "Kraków".to_string())]);
    }

    #[test]
    fn only_set_fields_follow_location() {
        let params = serialize_params(&state(Some("Sopot"), None, Some(4), Some(false)));

        assert_eq!(
            params,
            vec![("location", "Sopot".to_string()), ("rooms", "4".to_string())]
        );
    }

    #[test]
    fn fractional_price_keeps_its_decimals() {
        let params = serialize_params(&state(Some("Gdynia"), Some(4.5), None, None));
        assert_eq!(params[1], ("price", "4.5".to_string()));
    }

    #[test]
    fn query_string_escapes_like_a_form() {
        let params = serialize_params(&state(Some("Gdańsk Wrzeszcz"), None, None, None));
        assert_eq!(to_query_string(&params), "location=Gda%C5%84sk+Wrzeszcz");
    }
}
