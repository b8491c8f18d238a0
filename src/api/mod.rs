pub mod client;
pub mod traits;

pub use client::OfferClient;
pub use traits::OfferSource;

#[cfg(test)]
pub use traits::MockOfferSource;
