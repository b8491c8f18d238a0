use crate::models::FilterState;
use serde_json::json;
use std::fmt;

const KEY_PREFIX: &str = "offers";

/// Cache key for one request shape
///
/// A present filter state encodes as `offers/` followed by a JSON array of
/// all four fields in declaration order. The unfiltered request uses the
/// bare `offers` key, which no encoded state can produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn for_params(params: Option<&FilterState>) -> Self {
        match params {
            None => Self(KEY_PREFIX.to_string()),
            Some(state) => {
                // -0.0 sends the same request as 0.0
                let price = state.price.map(|p| if p == 0.0 { 0.0 } else { p });
                let encoded = json!([state.location, price, state.rooms, state.exclude]);
                Self(format!("{}/{}", KEY_PREFIX, encoded))
            }
        }
    }

    /// The key used when no filters are applied
    pub fn unfiltered() -> Self {
        Self::for_params(None)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_states_share_a_key() {
        let a = FilterState {
            location: Some("Gdańsk".to_string()),
            ..FilterState::default()
        };
        let b = a.clone();

        assert_eq!(QueryKey::for_params(Some(&a)), QueryKey::for_params(Some(&b)));
    }

    #[test]
    fn encoding_is_stable() {
        let key = QueryKey::for_params(Some(&FilterState::default()));
        assert_eq!(
            key.as_str(),
            r#"offers/["",0.0,0,false]"#
        );
    }

    #[test]
    fn unfiltered_is_distinct_from_every_state() {
        let all_absent = FilterState {
            location: None,
            price: None,
            rooms: None,
            exclude: None,
        };

        assert_ne!(QueryKey::unfiltered(), QueryKey::for_params(Some(&all_absent)));
        assert_ne!(
            QueryKey::unfiltered(),
            QueryKey::for_params(Some(&FilterState::default()))
        );
        assert_eq!(QueryKey::unfiltered().as_str(), "offers");
    }

    #[test]
    fn negative_zero_price_shares_the_zero_key() {
        let zero = FilterState::default();
        let negative = FilterState {
            price: Some(-0.0),
            ..FilterState::default()
        };

        assert_eq!(QueryKey::for_params(Some(&negative)), QueryKey::for_params(Some(&zero)));
    }

    #[test]
    fn every_field_participates() {
        let base = FilterState::default();
        let variants = [
            FilterState {
                location: Some("Sopot".to_string()),
                ..base.clone()
            },
            FilterState {
                price: Some(1.0),
                ..base.clone()
            },
            FilterState {
                rooms: Some(1),
                ..base.clone()
            },
            FilterState {
                exclude: Some(true),
                ..base.clone()
            },
        ];

        let base_key = QueryKey::for_params(Some(&base));
        for variant in &variants {
            assert_ne!(QueryKey::for_params(Some(variant)), base_key);
        }
    }
}
