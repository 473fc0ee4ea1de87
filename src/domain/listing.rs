use serde::{Deserialize, Deserializer, Serialize};

/// Prices in the catalogue are nightly rates in Indian rupees.
pub const CURRENCY_SYMBOL: &str = "₹";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, rename = "reviews")]
    pub review_count: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub rooms: Option<Rooms>,
    #[serde(default, rename = "instant", deserialize_with = "null_as_default")]
    pub instant_bookable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rooms {
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<f64>,
    #[serde(default)]
    pub max_guests: Option<u32>,
}

impl Listing {
    pub fn max_guests(&self) -> Option<u32> {
        self.rooms.and_then(|r| r.max_guests)
    }

    pub fn has_amenity(&self, amenity: &str) -> bool {
        self.amenities.iter().any(|a| a == amenity)
    }

    /// `rating * review_count`, with missing values counted as zero.
    pub fn recommended_score(&self) -> f64 {
        self.rating.unwrap_or(0.0) * f64::from(self.review_count.unwrap_or(0))
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.image
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }

    /// Multi-line rendering used for the listing detail view.
    pub fn details(&self) -> ListingDetails<'_> {
        ListingDetails(self)
    }
}

/// Catalogue ids are numbers in some exports and strings in others.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Some exports write `null` where a field has no value; treat it like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} ({CURRENCY_SYMBOL}{}/night",
            self.title, self.location, self.price
        )?;
        if let Some(rating) = self.rating {
            write!(
                f,
                ", {rating:.1}* {reviews} reviews",
                reviews = self.review_count.unwrap_or(0)
            )?;
        }
        if let Some(guests) = self.max_guests() {
            write!(f, " | Up to {guests} guests")?;
        }
        if self.instant_bookable {
            write!(f, " | Instant")?;
        }
        write!(f, ")")
    }
}

pub struct ListingDetails<'a>(&'a Listing);

impl std::fmt::Display for ListingDetails<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listing = self.0;
        writeln!(f, "# {}", listing.title)?;
        writeln!(f, "ID: {}", listing.id)?;
        writeln!(f, "Location: {}", listing.location)?;
        writeln!(f, "Price: {CURRENCY_SYMBOL}{}/night", listing.price)?;
        if let Some(rating) = listing.rating {
            writeln!(
                f,
                "Rating: {rating:.2} ({} reviews)",
                listing.review_count.unwrap_or(0)
            )?;
        }
        if let Some(rooms) = listing.rooms {
            let mut parts = Vec::new();
            if let Some(bedrooms) = rooms.bedrooms {
                parts.push(format!("Bedrooms: {bedrooms}"));
            }
            if let Some(bathrooms) = rooms.bathrooms {
                parts.push(format!("Bathrooms: {bathrooms}"));
            }
            if let Some(max) = rooms.max_guests {
                parts.push(format!("Max guests: {max}"));
            }
            if !parts.is_empty() {
                writeln!(f, "{}", parts.join(" | "))?;
            }
        }
        writeln!(
            f,
            "Instant booking: {}",
            if listing.instant_bookable { "yes" } else { "no" }
        )?;
        if !listing.description.is_empty() {
            writeln!(f, "\n## Description\n{}", listing.description)?;
        }
        if !listing.amenities.is_empty() {
            writeln!(f, "\n## Amenities\n{}", listing.amenities.join(", "))?;
        }
        if let Some(image) = listing.primary_image() {
            writeln!(f, "\nImage: {image}")?;
        }
        Ok(())
    }
}
