use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::listing::{Listing, Rooms};
use crate::error::Result;
use crate::ports::listing_source::ListingSource;

type LoadFn = Box<dyn Fn() -> Result<Vec<Listing>> + Send + Sync>;

pub struct MockListingSource {
    load_fn: Mutex<LoadFn>,
}

impl Default for MockListingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockListingSource {
    pub fn new() -> Self {
        Self {
            load_fn: Mutex::new(Box::new(|| Ok(vec![]))),
        }
    }

    #[must_use]
    pub fn with_listings(self, listings: Vec<Listing>) -> Self {
        self.with_load(move || Ok(listings.clone()))
    }

    #[must_use]
    pub fn with_load(self, f: impl Fn() -> Result<Vec<Listing>> + Send + Sync + 'static) -> Self {
        *self.load_fn.lock().unwrap() = Box::new(f);
        self
    }
}

#[async_trait]
impl ListingSource for MockListingSource {
    async fn load_listings(&self) -> Result<Vec<Listing>> {
        let f = self.load_fn.lock().unwrap();
        f()
    }

    fn describe(&self) -> String {
        "mock".into()
    }
}

// --- Factory functions ---

pub fn make_listing(id: &str, price: f64) -> Listing {
    Listing {
        id: id.to_string(),
        title: format!("Homestay {id}"),
        location: "Test Town".to_string(),
        description: "A quiet test stay".to_string(),
        price,
        rating: Some(4.5),
        review_count: Some(10),
        amenities: vec!["wifi".to_string()],
        rooms: Some(Rooms {
            bedrooms: Some(1),
            bathrooms: Some(1.0),
            max_guests: Some(2),
        }),
        instant_bookable: false,
        image: None,
        images: vec![],
    }
}

/// A small catalogue covering the cases the search tools care about.
pub fn make_catalogue() -> Vec<Listing> {
    let mut goa = make_listing("goa-1", 2500.0);
    goa.title = "Casa Azul".into();
    goa.location = "Goa".into();
    goa.rating = Some(4.6);
    goa.review_count = Some(80);
    goa.amenities = vec!["wifi".into(), "pool".into()];
    goa.instant_bookable = true;

    let mut north_goa = make_listing("goa-2", 1800.0);
    north_goa.title = "Palm Grove".into();
    north_goa.location = "North Goa".into();
    north_goa.rating = Some(4.9);
    north_goa.review_count = Some(12);

    let mut kasol = make_listing("kasol-1", 1200.0);
    kasol.title = "Pine Loft".into();
    kasol.location = "Kasol".into();
    kasol.description = "Riverside loft near the Goa-bound bus stand".into();
    kasol.rooms = Some(Rooms {
        bedrooms: Some(2),
        bathrooms: Some(1.0),
        max_guests: Some(6),
    });

    vec![goa, north_goa, kasol]
}

pub fn ids(listings: &[Listing]) -> Vec<&str> {
    listings.iter().map(|l| l.id.as_str()).collect()
}
