//! Wire schema of the upstream content service.
//!
//! Both `client-services` and `client-pricing` return the same categorized
//! document; pricing responses additionally fill in `pricing` per service.
//! Decoding is strict about types and validated afterwards, so a changed
//! upstream shape shows up as an error instead of an empty page.

pub mod v1 {
    use indexmap::IndexMap;
    use serde::{Deserialize, Serialize};
    use std::fmt;

    /// Categories in upstream order, keyed by display name.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Catalog(pub IndexMap<String, Category>);

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct Category {
        #[serde(default)]
        pub services: Vec<Service>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Service {
        pub title: String,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub keys: Vec<Feature>,
        #[serde(default)]
        pub pricing: Option<PricingSections>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Feature {
        pub name: String,
        #[serde(default)]
        pub desc: String,
    }

    impl fmt::Display for Feature {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if self.desc.is_empty() {
                write!(f, "{}", self.name)
            } else {
                write!(f, "{}: {}", self.name, self.desc)
            }
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct PricingSections {
        #[serde(default)]
        pub fixed: Vec<Plan>,
        #[serde(default)]
        pub plus: Vec<Plan>,
        #[serde(default)]
        pub range: Vec<Plan>,
    }

    impl PricingSections {
        pub fn tiers(&self) -> [(Tier, &[Plan]); 3] {
            [
                (Tier::Fixed, self.fixed.as_slice()),
                (Tier::Plus, self.plus.as_slice()),
                (Tier::Range, self.range.as_slice()),
            ]
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Tier {
        Fixed,
        Plus,
        Range,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Plan {
        pub title: String,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub price: Option<Price>,
        #[serde(default)]
        pub min_price: Option<f64>,
        #[serde(default)]
        pub max_price: Option<f64>,
        #[serde(default)]
        pub currency: Option<String>,
        #[serde(default, rename = "delivery_time")]
        pub delivery_time: Option<String>,
        #[serde(default)]
        pub keys: Vec<Feature>,
    }

    /// Upstream sends either a preformatted label ("$1,899+") or a bare amount.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum Price {
        Amount(f64),
        Label(String),
    }

    impl Plan {
        /// Human readable price, `None` when the plan is quote-only.
        pub fn price_label(&self) -> Option<String> {
            let currency = self.currency.as_deref().map(|c| format!("{} ", c)).unwrap_or_default();
            match (&self.price, self.min_price, self.max_price) {
                (Some(Price::Label(label)), _, _) if !label.trim().is_empty() => {
                    Some(label.trim().to_string())
                }
                (Some(Price::Amount(amount)), _, _) => {
                    Some(format!("{}{}", currency, format_amount(*amount)))
                }
                (_, Some(min), Some(max)) => Some(format!(
                    "{}{}-{}",
                    currency,
                    format_amount(min),
                    format_amount(max)
                )),
                _ => None,
            }
        }
    }

    fn format_amount(amount: f64) -> String {
        if amount.fract() == 0.0 {
            format!("{}", amount as i64)
        } else {
            format!("{:.2}", amount)
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Violation {
        BlankServiceTitle { category: String },
        BlankPlanTitle { service: String },
        InvertedRange { plan: String },
    }

    impl fmt::Display for Violation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Violation::BlankServiceTitle { category } => {
                    write!(f, "service without a title in category '{}'", category)
                }
                Violation::BlankPlanTitle { service } => {
                    write!(f, "pricing plan without a title in service '{}'", service)
                }
                Violation::InvertedRange { plan } => {
                    write!(f, "plan '{}' has minPrice above maxPrice", plan)
                }
            }
        }
    }

    impl Catalog {
        pub fn validate(&self) -> Result<(), Violation> {
            for (category, cat) in &self.0 {
                for service in &cat.services {
                    if service.title.trim().is_empty() {
                        return Err(Violation::BlankServiceTitle {
                            category: category.clone(),
                        });
                    }
                    let Some(pricing) = &service.pricing else {
                        continue;
                    };
                    for (_, plans) in pricing.tiers() {
                        for plan in plans {
                            if plan.title.trim().is_empty() {
                                return Err(Violation::BlankPlanTitle {
                                    service: service.title.clone(),
                                });
                            }
                            if let (Some(min), Some(max)) = (plan.min_price, plan.max_price) {
                                if min > max {
                                    return Err(Violation::InvertedRange {
                                        plan: plan.title.clone(),
                                    });
                                }
                            }
                        }
                    }
                }
            }
            Ok(())
        }

        /// Services in catalogue order with their category and position inside it.
        pub fn services(&self) -> impl Iterator<Item = (&str, usize, &Service)> {
            self.0.iter().flat_map(|(category, cat)| {
                cat.services
                    .iter()
                    .enumerate()
                    .map(move |(idx, service)| (category.as_str(), idx, service))
            })
        }

        /// Every priced plan, walking categories, services, then tiers in order,
        /// with the plan's position inside its category.
        pub fn plans(&self) -> impl Iterator<Item = (&str, usize, &Service, Tier, &Plan)> {
            self.0.iter().flat_map(|(category, cat)| {
                cat.services
                    .iter()
                    .flat_map(|service| {
                        service
                            .pricing
                            .iter()
                            .flat_map(|pricing| pricing.tiers())
                            .flat_map(move |(tier, plans)| {
                                plans.iter().map(move |plan| (service, tier, plan))
                            })
                    })
                    .enumerate()
                    .map(move |(idx, (service, tier, plan))| {
                        (category.as_str(), idx, service, tier, plan)
                    })
            })
        }
    }
}
