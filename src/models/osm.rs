//! Raw Overpass API payloads and their normalization into [`Cinema`] records.

use std::fmt::Display;

use serde::Deserialize;

use crate::geo::{haversine_distance, round_to_tenth};
use crate::models::{Cinema, Coordinates, CINEMA_SOURCE};

/// Placeholder when an element carries only a localized name variant.
/// A placeholder alone never identifies a cinema.
pub const UNKNOWN_CINEMA_NAME: &str = "Unknown cinema";
/// Sentinel when no address tags are present
pub const ADDRESS_UNKNOWN: &str = "Address unknown";

/// Envelope of an Overpass interpreter response
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverpassElementType {
    Node,
    Way,
    Relation,
}

impl Display for OverpassElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverpassElementType::Node => write!(f, "node"),
            OverpassElementType::Way => write!(f, "way"),
            OverpassElementType::Relation => write!(f, "relation"),
        }
    }
}

/// Centroid returned for area-type elements (`out center`)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

/// One geotagged map feature from the spatial query
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: OverpassElementType,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: Option<OverpassTags>,
}

/// The subset of OSM tags the normalizer reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassTags {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "name:de", default)]
    pub name_de: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(rename = "contact:phone", default)]
    pub contact_phone: Option<String>,
    #[serde(rename = "contact:website", default)]
    pub contact_website: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(rename = "addr:street", default)]
    pub addr_street: Option<String>,
    #[serde(rename = "addr:housenumber", default)]
    pub addr_housenumber: Option<String>,
    #[serde(rename = "addr:city", default)]
    pub addr_city: Option<String>,
    #[serde(rename = "addr:postcode", default)]
    pub addr_postcode: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub capacity: Option<String>,
    #[serde(default)]
    pub wheelchair: Option<String>,
}

impl OverpassTags {
    /// Street line, city and postal code derived from the address tags.
    ///
    /// Street + house number are joined with a space when present; otherwise
    /// the generic `addr` tag is used, otherwise the sentinel.
    fn address_parts(&self) -> (String, String, Option<String>) {
        let street_parts: Vec<&str> = [self.addr_street.as_deref(), self.addr_housenumber.as_deref()]
            .into_iter()
            .flatten()
            .collect();

        let street = if street_parts.is_empty() {
            self.addr
                .clone()
                .unwrap_or_else(|| ADDRESS_UNKNOWN.to_string())
        } else {
            street_parts.join(" ")
        };

        let city = self.addr_city.clone().unwrap_or_default();
        (street, city, self.addr_postcode.clone())
    }
}

impl OverpassElement {
    /// Point coordinate, falling back to the centroid for area-type elements
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => self.center.map(|c| Coordinates {
                lat: c.lat,
                lng: c.lon,
            }),
        }
    }

    /// Normalizes this element into a [`Cinema`], or `None` if it lacks
    /// identifying data (no tags, no resolvable coordinates, or no usable
    /// name).
    pub fn to_cinema(&self, search_center: Coordinates) -> Option<Cinema> {
        let tags = self.tags.as_ref()?;
        let coordinates = self.coordinates()?;

        let name = tags
            .name
            .clone()
            .or_else(|| tags.name_de.clone())
            .unwrap_or_else(|| UNKNOWN_CINEMA_NAME.to_string());
        // The placeholder alone does not identify a cinema; a real `name` tag
        // that happens to match it is kept as-is.
        if name == UNKNOWN_CINEMA_NAME && tags.name.is_none() {
            return None;
        }

        let distance = round_to_tenth(haversine_distance(search_center, coordinates));
        let (address, city, zip_code) = tags.address_parts();

        Some(Cinema {
            id: format!("osm_{}_{}", self.element_type, self.id),
            name,
            address,
            city,
            zip_code,
            phone: tags.phone.clone().or_else(|| tags.contact_phone.clone()),
            website: tags
                .website
                .clone()
                .or_else(|| tags.contact_website.clone()),
            distance,
            coordinates,
            opening_hours: tags.opening_hours.clone(),
            operator: tags.operator.clone().or_else(|| tags.brand.clone()),
            capacity: tags.capacity.clone(),
            // Only the literal "yes" counts; "limited", "no" and unknown
            // values all map to false.
            wheelchair_accessible: tags.wheelchair.as_deref() == Some("yes"),
            source: CINEMA_SOURCE.to_string(),
        })
    }
}
