use super::{decode, Catalog, ContentError};

const SAMPLE_PRICING: &str = include_str!("../../data/pricing_fallback.json");

/// Bundled pricing catalogue shown when the content service is unavailable.
pub fn sample_pricing() -> Result<Catalog, ContentError> {
    decode("data/pricing_fallback.json", SAMPLE_PRICING.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalogue_is_valid() {
        let catalog = sample_pricing().unwrap();
        assert_eq!(catalog.0.len(), 2);
        assert_eq!(catalog.services().count(), 3);
        assert_eq!(catalog.plans().count(), 8);
    }
}
