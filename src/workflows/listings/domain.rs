use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;
use crate::workflows::error::ValidationError;

/// How long an approved listing stays on the public site.
pub const PUBLICATION_WINDOW_DAYS: i64 = 90;

/// Hard cap on the image gallery; the first entry is the cover.
pub const MAX_IMAGES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListingId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Kind of deal being advertised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    Vendita,
    AffittoBreve,
    AffittoLungo,
    Cercasi,
}

impl ListingType {
    pub const fn label(self) -> &'static str {
        match self {
            ListingType::Vendita => "Vendita",
            ListingType::AffittoBreve => "Affitto Breve",
            ListingType::AffittoLungo => "Affitto Lungo",
            ListingType::Cercasi => "Cercasi",
        }
    }
}

/// Property category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingCategory {
    Appartamento,
    Villa,
    Terreno,
    Commerciale,
    Altro,
}

impl ListingCategory {
    pub const fn label(self) -> &'static str {
        match self {
            ListingCategory::Appartamento => "Appartamento",
            ListingCategory::Villa => "Villa",
            ListingCategory::Terreno => "Terreno",
            ListingCategory::Commerciale => "Commerciale",
            ListingCategory::Altro => "Altro",
        }
    }
}

/// Moderation state of a listing. Nothing here is terminal: rejected and
/// expired listings re-enter review through an owner resubmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Bozza,
    InAttesa,
    Pubblicato,
    Rifiutato,
    Scaduto,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ListingStatus::Bozza => "Bozza",
            ListingStatus::InAttesa => "In Attesa",
            ListingStatus::Pubblicato => "Pubblicato",
            ListingStatus::Rifiutato => "Rifiutato",
            ListingStatus::Scaduto => "Scaduto",
        }
    }

    /// States an owner may resubmit for review from.
    pub const fn resubmittable(self) -> bool {
        matches!(
            self,
            ListingStatus::Bozza | ListingStatus::Rifiutato | ListingStatus::Scaduto
        )
    }
}

/// Energy certification band as printed on the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyClass {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl EnergyClass {
    pub const fn label(self) -> &'static str {
        match self {
            EnergyClass::APlus => "A+",
            EnergyClass::A => "A",
            EnergyClass::B => "B",
            EnergyClass::C => "C",
            EnergyClass::D => "D",
            EnergyClass::E => "E",
            EnergyClass::F => "F",
            EnergyClass::G => "G",
        }
    }
}

/// Amenity tags selectable on the listing form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Balcone,
    Terrazzo,
    Giardino,
    Piscina,
    Garage,
    Cantina,
    Ascensore,
    AriaCondizionata,
    RiscaldamentoAutonomo,
    PortaBlindata,
    Allarme,
    Wifi,
    CucinaAttrezzata,
    Arredato,
    Parcheggio,
}

/// The 107 Italian provinces accepted on a listing. Anything else is
/// rejected at validation time.
pub const PROVINCES: &[&str] = &[
    "Agrigento",
    "Alessandria",
    "Ancona",
    "Aosta",
    "Arezzo",
    "Ascoli Piceno",
    "Asti",
    "Avellino",
    "Bari",
    "Barletta-Andria-Trani",
    "Belluno",
    "Benevento",
    "Bergamo",
    "Biella",
    "Bologna",
    "Bolzano",
    "Brescia",
    "Brindisi",
    "Cagliari",
    "Caltanissetta",
    "Campobasso",
    "Caserta",
    "Catania",
    "Catanzaro",
    "Chieti",
    "Como",
    "Cosenza",
    "Cremona",
    "Crotone",
    "Cuneo",
    "Enna",
    "Fermo",
    "Ferrara",
    "Firenze",
    "Foggia",
    "Forlì-Cesena",
    "Frosinone",
    "Genova",
    "Gorizia",
    "Grosseto",
    "Imperia",
    "Isernia",
    "La Spezia",
    "L'Aquila",
    "Latina",
    "Lecce",
    "Lecco",
    "Livorno",
    "Lodi",
    "Lucca",
    "Macerata",
    "Mantova",
    "Massa-Carrara",
    "Matera",
    "Messina",
    "Milano",
    "Modena",
    "Monza e Brianza",
    "Napoli",
    "Novara",
    "Nuoro",
    "Oristano",
    "Padova",
    "Palermo",
    "Parma",
    "Pavia",
    "Perugia",
    "Pesaro e Urbino",
    "Pescara",
    "Piacenza",
    "Pisa",
    "Pistoia",
    "Pordenone",
    "Potenza",
    "Prato",
    "Ragusa",
    "Ravenna",
    "Reggio Calabria",
    "Reggio Emilia",
    "Rieti",
    "Rimini",
    "Roma",
    "Rovigo",
    "Salerno",
    "Sassari",
    "Savona",
    "Siena",
    "Siracusa",
    "Sondrio",
    "Sud Sardegna",
    "Taranto",
    "Teramo",
    "Terni",
    "Torino",
    "Trapani",
    "Trento",
    "Treviso",
    "Trieste",
    "Udine",
    "Varese",
    "Venezia",
    "Verbano-Cusio-Ossola",
    "Vercelli",
    "Verona",
    "Vibo Valentia",
    "Vicenza",
    "Viterbo",
];

pub fn is_known_province(candidate: &str) -> bool {
    PROVINCES.iter().any(|province| *province == candidate)
}

/// A property classified ad together with its moderation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub category: ListingCategory,
    pub price: f64,
    pub location: String,
    pub city: String,
    pub province: String,
    pub address: Option<String>,
    pub images: Vec<String>,
    pub surface: Option<f64>,
    pub rooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub floor: Option<i32>,
    pub energy_class: Option<EnergyClass>,
    pub features: BTreeSet<Feature>,
    pub status: ListingStatus,
    pub moderation_note: Option<String>,
    pub views: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Whether anonymous visitors see this listing at `now`.
    pub fn publicly_visible(&self, now: DateTime<Utc>) -> bool {
        self.status == ListingStatus::Pubblicato
            && self.expires_at.map(|expiry| now < expiry).unwrap_or(false)
    }
}

/// The publication window applied when a listing is approved.
pub fn publication_window(published_at: DateTime<Utc>) -> DateTime<Utc> {
    published_at + Duration::days(PUBLICATION_WINDOW_DAYS)
}

/// Field payload for creating or editing a listing. Images arrive as the
/// client-accumulated blob URLs and are persisted in one piece with the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub category: ListingCategory,
    pub price: f64,
    #[serde(default)]
    pub location: String,
    pub city: String,
    pub province: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub surface: Option<f64>,
    #[serde(default)]
    pub rooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub energy_class: Option<EnergyClass>,
    #[serde(default)]
    pub features: BTreeSet<Feature>,
}

impl ListingDraft {
    /// Field constraints shared by create and update.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if !(self.price > 0.0) {
            return Err(ValidationError::NonPositivePrice);
        }
        if self.city.trim().is_empty() {
            return Err(ValidationError::EmptyCity);
        }
        if !is_known_province(&self.province) {
            return Err(ValidationError::UnknownProvince(self.province.clone()));
        }
        if self.images.len() > MAX_IMAGES {
            return Err(ValidationError::TooManyImages {
                max: MAX_IMAGES,
                found: self.images.len(),
            });
        }
        Ok(())
    }
}

/// Whether a freshly created listing starts as a private draft or goes
/// straight into the moderation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionMode {
    Bozza,
    InAttesa,
}

impl SubmissionMode {
    pub const fn initial_status(self) -> ListingStatus {
        match self {
            SubmissionMode::Bozza => ListingStatus::Bozza,
            SubmissionMode::InAttesa => ListingStatus::InAttesa,
        }
    }
}

/// Conjunctive search filters over the public catalogue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilters {
    /// Free text matched case-insensitively against title and description.
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub listing_type: Option<ListingType>,
    pub category: Option<ListingCategory>,
    pub province: Option<String>,
    /// Substring match, case-insensitive.
    pub city: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ListingFilters {
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            let in_title = listing.title.to_lowercase().contains(&needle);
            let in_description = listing.description.to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(listing_type) = self.listing_type {
            if listing.listing_type != listing_type {
                return false;
            }
        }
        if let Some(category) = self.category {
            if listing.category != category {
                return false;
            }
        }
        if let Some(province) = &self.province {
            if &listing.province != province {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if !listing.city.to_lowercase().contains(&city.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if listing.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if listing.price > max {
                return false;
            }
        }
        true
    }
}

/// Per-status totals for the admin dashboard, computed store-side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub bozza: usize,
    pub in_attesa: usize,
    pub pubblicato: usize,
    pub rifiutato: usize,
    pub scaduto: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.bozza + self.in_attesa + self.pubblicato + self.rifiutato + self.scaduto
    }

    pub fn bump(&mut self, status: ListingStatus) {
        match status {
            ListingStatus::Bozza => self.bozza += 1,
            ListingStatus::InAttesa => self.in_attesa += 1,
            ListingStatus::Pubblicato => self.pubblicato += 1,
            ListingStatus::Rifiutato => self.rifiutato += 1,
            ListingStatus::Scaduto => self.scaduto += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UserId;

    fn draft() -> ListingDraft {
        ListingDraft {
            title: "Trilocale luminoso".to_string(),
            description: "Terzo piano con ascensore, doppia esposizione.".to_string(),
            listing_type: ListingType::Vendita,
            category: ListingCategory::Appartamento,
            price: 250_000.0,
            location: "Porta Romana".to_string(),
            city: "Milano".to_string(),
            province: "Milano".to_string(),
            address: None,
            images: Vec::new(),
            surface: Some(85.0),
            rooms: Some(3),
            bathrooms: Some(1),
            floor: Some(3),
            energy_class: Some(EnergyClass::B),
            features: BTreeSet::from([Feature::Ascensore, Feature::Balcone]),
        }
    }

    fn listing(status: ListingStatus) -> Listing {
        let now = Utc::now();
        Listing {
            id: ListingId::from("lst-000001"),
            owner_id: UserId::from("usr-1"),
            title: "Trilocale luminoso".to_string(),
            description: "Terzo piano con ascensore.".to_string(),
            listing_type: ListingType::Vendita,
            category: ListingCategory::Appartamento,
            price: 250_000.0,
            location: "Porta Romana".to_string(),
            city: "Milano".to_string(),
            province: "Milano".to_string(),
            address: None,
            images: Vec::new(),
            surface: None,
            rooms: None,
            bathrooms: None,
            floor: None,
            energy_class: None,
            features: BTreeSet::new(),
            status,
            moderation_note: None,
            views: 0,
            created_at: now,
            updated_at: now,
            published_at: None,
            expires_at: None,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn zero_price_is_rejected() {
        let mut bad = draft();
        bad.price = 0.0;
        assert_eq!(bad.validate(), Err(ValidationError::NonPositivePrice));
    }

    #[test]
    fn unknown_province_is_rejected() {
        let mut bad = draft();
        bad.province = "Atlantide".to_string();
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::UnknownProvince(_))
        ));
    }

    #[test]
    fn eleventh_image_is_rejected() {
        let mut bad = draft();
        bad.images = (0..11).map(|n| format!("https://blob/{n}.jpg")).collect();
        assert_eq!(
            bad.validate(),
            Err(ValidationError::TooManyImages { max: 10, found: 11 })
        );
    }

    #[test]
    fn energy_classes_serialize_as_certificate_bands() {
        let json = serde_json::to_string(&EnergyClass::APlus).expect("serialize");
        assert_eq!(json, "\"A+\"");
        let parsed: EnergyClass = serde_json::from_str("\"G\"").expect("deserialize");
        assert_eq!(parsed, EnergyClass::G);
    }

    #[test]
    fn published_listing_visible_until_expiry() {
        let mut published = listing(ListingStatus::Pubblicato);
        let now = Utc::now();
        published.published_at = Some(now);
        published.expires_at = Some(publication_window(now));
        assert!(published.publicly_visible(now));
        assert!(!published.publicly_visible(now + Duration::days(PUBLICATION_WINDOW_DAYS)));
    }

    #[test]
    fn draft_listing_never_publicly_visible() {
        assert!(!listing(ListingStatus::Bozza).publicly_visible(Utc::now()));
    }

    #[test]
    fn filters_compose_conjunctively() {
        let target = listing(ListingStatus::Pubblicato);
        let filters = ListingFilters {
            query: Some("luminoso".to_string()),
            listing_type: Some(ListingType::Vendita),
            city: Some("mila".to_string()),
            min_price: Some(200_000.0),
            max_price: Some(300_000.0),
            ..ListingFilters::default()
        };
        assert!(filters.matches(&target));

        let mismatch = ListingFilters {
            listing_type: Some(ListingType::Cercasi),
            ..filters
        };
        assert!(!mismatch.matches(&target));
    }

    #[test]
    fn resubmittable_states() {
        assert!(ListingStatus::Bozza.resubmittable());
        assert!(ListingStatus::Rifiutato.resubmittable());
        assert!(ListingStatus::Scaduto.resubmittable());
        assert!(!ListingStatus::InAttesa.resubmittable());
        assert!(!ListingStatus::Pubblicato.resubmittable());
    }
}
