use crate::error::ExtractError;
use crate::models::{FieldDefaults, ListingRecord};
use crate::scrapers::normalize::{normalize_area, normalize_currency, parse_leading_int};
use crate::scrapers::traits::ExtractionStrategy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Card containers, in order of preference
const CARD_SELECTORS: [&str; 2] = [
    "div.ui-organism-intersection__element",
    "div.card-featured__content-wrapper",
];

pub const MISSING_NAME: &str = "N/A";

/// Fields read from one listing card before defaults are applied.
/// Zero means "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub name: Option<String>,
    pub price: u64,
    pub building_area: u32,
    pub land_area: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub garages: u32,
}

impl RawListing {
    /// Apply the admission filter, then fill unextracted fields from `defaults`.
    /// The sequence is left at 0; the store assigns it.
    pub fn into_record(self, defaults: &FieldDefaults) -> Option<ListingRecord> {
        if self.price == 0 {
            return None;
        }

        let or_default = |value: u32, fallback: u32| if value > 0 { value } else { fallback };

        Some(ListingRecord {
            sequence: 0,
            name: self
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| MISSING_NAME.to_string()),
            price: self.price,
            building_area: or_default(self.building_area, defaults.building_area),
            land_area: or_default(self.land_area, defaults.land_area),
            bedrooms: or_default(self.bedrooms, defaults.bedrooms),
            bathrooms: or_default(self.bathrooms, defaults.bathrooms),
            garages: or_default(self.garages, defaults.garages),
        })
    }

    /// Take from `other` every field this listing has not found yet
    pub fn fill_missing(&mut self, other: RawListing) {
        fn fill<T: Default + PartialEq>(slot: &mut T, value: T) {
            if *slot == T::default() {
                *slot = value;
            }
        }

        if self.name.is_none() {
            self.name = other.name;
        }
        fill(&mut self.price, other.price);
        fill(&mut self.building_area, other.building_area);
        fill(&mut self.land_area, other.land_area);
        fill(&mut self.bedrooms, other.bedrooms);
        fill(&mut self.bathrooms, other.bathrooms);
        fill(&mut self.garages, other.garages);
    }

    fn is_complete(&self) -> bool {
        self.name.is_some()
            && [
                self.building_area,
                self.land_area,
                self.bedrooms,
                self.bathrooms,
                self.garages,
            ]
            .iter()
            .all(|v| *v > 0)
            && self.price > 0
    }

    fn set_labelled(&mut self, label: &str, value: u32) {
        match label.trim().to_uppercase().as_str() {
            "LB" | "LUAS BANGUNAN" => self.building_area = value,
            "LT" | "LUAS TANAH" => self.land_area = value,
            "KT" | "KAMAR TIDUR" => self.bedrooms = value,
            "KM" | "KAMAR MANDI" => self.bathrooms = value,
            "GRS" | "GARASI" | "CARPORT" => self.garages = value,
            other => debug!(label = other, "Ignoring unknown attribute label"),
        }
    }
}

fn parse_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Whitespace-collapsed text content of an element
fn flatten_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Reads title, price and attribute badges from their known card elements
pub struct StructuredMarkupStrategy {
    title: Selector,
    title_link: Selector,
    price: Selector,
    price_heading: Selector,
    attribute: Selector,
    attribute_label: Selector,
    attribute_value: Selector,
}

impl StructuredMarkupStrategy {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            title: parse_selector("h2")?,
            title_link: parse_selector("a[title]")?,
            price: parse_selector("div.price")?,
            price_heading: parse_selector("span.ui-atomic-text--type-heading")?,
            attribute: parse_selector("div.attribute-info")?,
            attribute_label: parse_selector(".attribute-label")?,
            attribute_value: parse_selector(".attribute-value")?,
        })
    }

    fn read_attributes(&self, listing: ElementRef<'_>, raw: &mut RawListing) {
        for attribute in listing.select(&self.attribute) {
            let label = attribute.select(&self.attribute_label).next().map(flatten_text);
            let value = attribute.select(&self.attribute_value).next().map(flatten_text);

            match (label, value) {
                (Some(label), Some(value)) => raw.set_labelled(&label, parse_leading_int(&value)),
                _ => {
                    // Unlabelled badge: only trust an inline "LT 120"-style tag
                    let text = flatten_text(attribute);
                    for label in ["LB", "LT", "KT", "KM", "GRS"] {
                        let value = normalize_area(&text, label);
                        if value > 0 {
                            raw.set_labelled(label, value);
                        }
                    }
                }
            }
        }
    }
}

impl ExtractionStrategy for StructuredMarkupStrategy {
    fn name(&self) -> &'static str {
        "structured-markup"
    }

    fn extract(&self, listing: ElementRef<'_>) -> Option<RawListing> {
        let title = listing
            .select(&self.title)
            .next()
            .map(flatten_text)
            .or_else(|| {
                listing
                    .select(&self.title_link)
                    .next()
                    .and_then(|a| a.value().attr("title"))
                    .map(|t| t.trim().to_string())
            });

        let price_el = listing
            .select(&self.price)
            .next()
            .or_else(|| listing.select(&self.price_heading).next());

        if title.is_none() && price_el.is_none() {
            return None;
        }

        let mut raw = RawListing {
            name: title,
            price: price_el.map(|el| normalize_currency(&flatten_text(el))).unwrap_or(0),
            ..RawListing::default()
        };
        self.read_attributes(listing, &mut raw);

        Some(raw)
    }
}

/// Scans the card's flattened text for a price and labelled areas
pub struct TextPatternStrategy;

impl ExtractionStrategy for TextPatternStrategy {
    fn name(&self) -> &'static str {
        "text-pattern"
    }

    fn extract(&self, listing: ElementRef<'_>) -> Option<RawListing> {
        let text = flatten_text(listing);
        if text.is_empty() {
            return None;
        }

        let garages = match normalize_area(&text, "GRS") {
            0 => normalize_area(&text, "Garasi"),
            n => n,
        };

        Some(RawListing {
            name: None,
            price: normalize_currency(&text),
            building_area: normalize_area(&text, "LB"),
            land_area: normalize_area(&text, "LT"),
            // Unlabelled small numbers are too ambiguous to read as room counts
            bedrooms: normalize_area(&text, "KT"),
            bathrooms: normalize_area(&text, "KM"),
            garages,
        })
    }
}

/// Outcome of extracting every card on one page
#[derive(Debug, Default)]
pub struct PageExtraction {
    pub records: Vec<ListingRecord>,
    pub listings_seen: usize,
    /// No strategy could read the card
    pub skipped: usize,
    /// Read, but failed the admission filter
    pub rejected: usize,
}

/// Splits a page into listing cards and runs the strategy chain over each
pub struct ListingExtractor {
    cards: Vec<Selector>,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    defaults: FieldDefaults,
}

impl ListingExtractor {
    /// Structured lookup first, then text scanning
    pub fn new(defaults: FieldDefaults) -> Result<Self, ExtractError> {
        let strategies: Vec<Box<dyn ExtractionStrategy>> = vec![
            Box::new(StructuredMarkupStrategy::new()?),
            Box::new(TextPatternStrategy),
        ];
        Self::with_strategies(defaults, strategies)
    }

    pub fn with_strategies(
        defaults: FieldDefaults,
        strategies: Vec<Box<dyn ExtractionStrategy>>,
    ) -> Result<Self, ExtractError> {
        let cards = CARD_SELECTORS
            .iter()
            .map(|css| parse_selector(css))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            cards,
            strategies,
            defaults,
        })
    }

    /// Run the strategy chain over one card.
    ///
    /// Earlier strategies take precedence field by field; later ones only
    /// fill what is still missing, so a card whose price sits outside the
    /// known price elements is still priced from its text.
    pub fn extract_listing(&self, listing: ElementRef<'_>) -> Result<RawListing, ExtractError> {
        let mut found: Option<RawListing> = None;

        for strategy in &self.strategies {
            let Some(raw) = strategy.extract(listing) else {
                continue;
            };
            debug!(strategy = strategy.name(), "Listing read");

            let merged = match found.take() {
                Some(mut merged) => {
                    merged.fill_missing(raw);
                    merged
                }
                None => raw,
            };
            if merged.is_complete() {
                return Ok(merged);
            }
            found = Some(merged);
        }

        found.ok_or(ExtractError::Unrecognized)
    }

    pub fn extract_page(&self, html: &str) -> PageExtraction {
        let document = Html::parse_document(html);

        let cards: Vec<ElementRef<'_>> = self
            .cards
            .iter()
            .map(|selector| document.select(selector).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default();

        let mut outcome = PageExtraction {
            listings_seen: cards.len(),
            ..PageExtraction::default()
        };

        for (idx, card) in cards.into_iter().enumerate() {
            let raw = match self.extract_listing(card) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(listing = idx, error = %e, "Skipping listing");
                    outcome.skipped += 1;
                    continue;
                }
            };

            match raw.into_record(&self.defaults) {
                Some(record) => {
                    debug!(listing = idx, features = ?record.features(), "Listing admitted");
                    outcome.records.push(record);
                }
                None => {
                    debug!(listing = idx, "Listing has no recognisable price, dropped");
                    outcome.rejected += 1;
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRUCTURED_CARD: &str = r#"
        <div class="ui-organism-intersection__element">
          <a href="/properti/1" title="Rumah Asri Kemang"><h2>Rumah Asri  Kemang</h2></a>
          <div class="price">Rp 7,5 Miliar</div>
          <div class="attribute-info"><span class="attribute-label">LT</span><span class="attribute-value">200 m²</span></div>
          <div class="attribute-info"><span class="attribute-label">LB</span><span class="attribute-value">150 m²</span></div>
          <div class="attribute-info"><span class="attribute-label">KT</span><span class="attribute-value">4</span></div>
          <div class="attribute-info"><span class="attribute-label">KM</span><span class="attribute-value">3</span></div>
        </div>
    "#;

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(FieldDefaults::default()).unwrap()
    }

    #[test]
    fn test_structured_card() {
        let page = extractor().extract_page(STRUCTURED_CARD);
        assert_eq!(page.listings_seen, 1);
        assert_eq!(page.records.len(), 1);

        let record = &page.records[0];
        assert_eq!(record.name, "Rumah Asri Kemang");
        assert_eq!(record.price, 7_500_000_000);
        assert_eq!(record.land_area, 200);
        assert_eq!(record.building_area, 150);
        assert_eq!(record.bedrooms, 4);
        assert_eq!(record.bathrooms, 3);
        assert_eq!(record.garages, 1);
    }

    #[test]
    fn test_title_attribute_when_heading_missing() {
        let html = r#"
            <div class="card-featured__content-wrapper">
              <a href="/p/2" title="Rumah Cilandak"></a>
              <span class="ui-atomic-text--type-heading">Rp 900 Juta</span>
            </div>
        "#;
        let page = extractor().extract_page(html);
        assert_eq!(page.records[0].name, "Rumah Cilandak");
        assert_eq!(page.records[0].price, 900_000_000);
    }

    #[test]
    fn test_text_fallback_and_defaults() {
        let html = r#"
            <div class="ui-organism-intersection__element">
              <p>Dijual cepat Rp 2,1 M</p>
              <p>LT: 120 m2 LB: 90 m2</p>
              <p>3 2 1</p>
            </div>
        "#;
        let page = extractor().extract_page(html);
        let record = &page.records[0];
        assert_eq!(record.name, MISSING_NAME);
        assert_eq!(record.price, 2_100_000_000);
        assert_eq!(record.land_area, 120);
        assert_eq!(record.building_area, 90);
        // Bare "3 2 1" is not read as room counts
        assert_eq!(record.bedrooms, 2);
        assert_eq!(record.bathrooms, 1);
    }

    #[test]
    fn test_priceless_listing_rejected_but_page_continues() {
        let html = r#"
            <div class="ui-organism-intersection__element"><h2>Harga Nego</h2><div class="price">Hubungi agen</div></div>
            <div class="ui-organism-intersection__element"><div></div></div>
            <div class="ui-organism-intersection__element"><h2>Rumah B</h2><div class="price">Rp 1,5 Miliar</div></div>
        "#;
        let page = extractor().extract_page(html);
        assert_eq!(page.listings_seen, 3);
        assert_eq!(page.rejected, 1);
        assert_eq!(page.skipped, 1);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].name, "Rumah B");
    }

    #[test]
    fn test_titled_card_priced_from_text() {
        let html = r#"
            <div class="ui-organism-intersection__element">
              <h2>Rumah Kebayoran</h2>
              <p>Rp 3,5 Miliar</p>
              <p>LT: 150 m2 LB: 120 m2</p>
            </div>
        "#;
        let page = extractor().extract_page(html);
        assert_eq!(page.rejected, 0);
        assert_eq!(page.records.len(), 1);

        let record = &page.records[0];
        assert_eq!(record.name, "Rumah Kebayoran");
        assert_eq!(record.price, 3_500_000_000);
        assert_eq!(record.land_area, 150);
        assert_eq!(record.building_area, 120);
    }

    #[test]
    fn test_structured_fields_win_over_text() {
        let html = r#"
            <div class="ui-organism-intersection__element">
              <h2>Rumah Tebet</h2>
              <div class="price">Rp 2 Miliar</div>
              <p>Turun harga dari Rp 3 Miliar, LT: 80 m2</p>
              <div class="attribute-info"><span class="attribute-label">LT</span><span class="attribute-value">1.200 m²</span></div>
            </div>
        "#;
        let page = extractor().extract_page(html);
        let record = &page.records[0];
        assert_eq!(record.price, 2_000_000_000);
        assert_eq!(record.land_area, 1_200);
    }

    #[test]
    fn test_page_without_cards() {
        let page = extractor().extract_page("<html><body><p>Maaf</p></body></html>");
        assert_eq!(page.listings_seen, 0);
        assert!(page.records.is_empty());
    }

    #[test]
    fn test_strategy_order_is_respected() {
        struct Fixed(u64);
        impl ExtractionStrategy for Fixed {
            fn name(&self) -> &'static str {
                "fixed"
            }
            fn extract(&self, _listing: ElementRef<'_>) -> Option<RawListing> {
                Some(RawListing {
                    price: self.0,
                    ..RawListing::default()
                })
            }
        }

        let strategies: Vec<Box<dyn ExtractionStrategy>> =
            vec![Box::new(Fixed(1)), Box::new(Fixed(2))];
        let extractor =
            ListingExtractor::with_strategies(FieldDefaults::default(), strategies).unwrap();
        let page = extractor.extract_page(STRUCTURED_CARD);
        assert_eq!(page.records[0].price, 1);
    }

    #[test]
    fn test_into_record_applies_configured_defaults() {
        let defaults = FieldDefaults {
            building_area: 36,
            land_area: 60,
            bedrooms: 3,
            bathrooms: 2,
            garages: 0,
        };
        let record = RawListing {
            name: Some(String::new()),
            price: 10,
            land_area: 72,
            ..RawListing::default()
        }
        .into_record(&defaults)
        .unwrap();

        assert_eq!(record.name, MISSING_NAME);
        assert_eq!(record.land_area, 72);
        assert_eq!(record.building_area, 36);
        assert_eq!(record.bedrooms, 3);
        assert_eq!(record.bathrooms, 2);
        assert_eq!(record.garages, 0);
    }
}
