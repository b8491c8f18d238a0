//! Shared fixtures for integration tests

#![allow(dead_code)]

use offer_scout::config::ClientConfig;
use offer_scout::{FilterState, Offer, OfferClient};
use std::time::Duration;
use wiremock::MockServer;

pub fn client_for(server: &MockServer) -> OfferClient {
    let config = ClientConfig::new(&server.uri(), Duration::from_secs(5)).unwrap();
    OfferClient::new(config).unwrap()
}

pub fn filters(location: &str) -> FilterState {
    FilterState {
        location: Some(location.to_string()),
        ..FilterState::default()
    }
}

pub fn sample_offers() -> Vec<Offer> {
    vec![
        Offer {
            id: 101,
            title: "Przestronne 2 pokoje z balkonem".to_string(),
            price: 419000.0,
            area: 38.5,
            rooms: 2,
            location: "Gdańsk, Wrzeszcz, ul. Grunwaldzka".to_string(),
            price_per_m2: 10883.116883116883,
            detail_url: "https://www.otodom.pl/pl/oferta/przestronne-2-pokoje-ID4abc".to_string(),
        },
        Offer {
            id: 102,
            title: "Kawalerka przy plaży".to_string(),
            price: 655500.0,
            area: 29.9,
            rooms: 1,
            location: "Sopot, Dolny".to_string(),
            price_per_m2: 21923.08,
            detail_url: "https://www.otodom.pl/pl/oferta/kawalerka-ID4def".to_string(),
        },
    ]
}
