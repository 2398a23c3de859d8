//! Live business context used to ground chat answers.

use log::{debug, warn};

use crate::content::{Catalog, ContentClient};

const MAX_ITEMS: usize = 12;
const MAX_SERVICE_DESCRIPTION: usize = 140;
const MAX_PLAN_FEATURES: usize = 4;
const MAX_FEATURE_EXCERPT: usize = 120;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSummary {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    pub name: String,
    pub price: Option<String>,
    pub features: String,
}

/// Per-request snapshot of services and pricing. Never cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSnapshot {
    pub services: Vec<ServiceSummary>,
    pub plans: Vec<PlanSummary>,
}

impl ContextSnapshot {
    /// Fetches both catalogues concurrently. Either side may fail without
    /// affecting the other; failures only drop that section.
    pub async fn gather(content: &ContentClient) -> Self {
        let (services, pricing) = tokio::join!(content.services(), content.pricing());

        let services = services
            .map_err(|e| warn!("Services context unavailable: {}", e))
            .ok();
        let pricing = pricing
            .map_err(|e| warn!("Pricing context unavailable: {}", e))
            .ok();

        let snapshot = Self::from_catalogs(services.as_ref(), pricing.as_ref());
        debug!(
            "Context snapshot: {} services, {} plans",
            snapshot.services.len(),
            snapshot.plans.len()
        );
        snapshot
    }

    pub fn from_catalogs(services: Option<&Catalog>, pricing: Option<&Catalog>) -> Self {
        let services = services
            .map(|catalog| {
                catalog
                    .services()
                    .take(MAX_ITEMS)
                    .map(|(_, _, service)| ServiceSummary {
                        name: service.title.clone(),
                        description: truncate_chars(service.description.trim(), MAX_SERVICE_DESCRIPTION),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let plans = pricing
            .map(|catalog| {
                catalog
                    .plans()
                    .take(MAX_ITEMS)
                    .map(|(_, _, service, _, plan)| {
                        let features = if plan.keys.is_empty() {
                            plan.description.trim().to_string()
                        } else {
                            plan.keys
                                .iter()
                                .take(MAX_PLAN_FEATURES)
                                .map(|f| f.to_string())
                                .collect::<Vec<_>>()
                                .join(", ")
                        };
                        PlanSummary {
                            name: format!("{} / {}", service.title, plan.title),
                            price: plan.price_label(),
                            features: truncate_chars(&features, MAX_FEATURE_EXCERPT),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { services, plans }
    }

    /// Prompt section with the live data, `None` when nothing was fetched.
    pub fn render(&self) -> Option<String> {
        let mut sections = Vec::new();

        if !self.services.is_empty() {
            let lines: Vec<String> = self
                .services
                .iter()
                .map(|s| {
                    if s.description.is_empty() {
                        format!("- {}", s.name)
                    } else {
                        format!("- {}: {}", s.name, s.description)
                    }
                })
                .collect();
            sections.push(format!("Services (live):\n{}", lines.join("\n")));
        }

        if !self.plans.is_empty() {
            let lines: Vec<String> = self
                .plans
                .iter()
                .map(|p| {
                    let price = p.price.as_deref().unwrap_or("contact for pricing");
                    if p.features.is_empty() {
                        format!("- {}: {}", p.name, price)
                    } else {
                        format!("- {}: {} ({})", p.name, price, p.features)
                    }
                })
                .collect();
            sections.push(format!("Pricing (live):\n{}", lines.join("\n")));
        }

        if sections.is_empty() {
            None
        } else {
            Some(sections.join("\n\n"))
        }
    }
}

/// Cuts `text` to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog(value: serde_json::Value) -> Catalog {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 140), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn service_summaries_are_bounded() {
        let services: Vec<_> = (0..20)
            .map(|i| json!({ "title": format!("Service {}", i), "description": "x".repeat(300) }))
            .collect();
        let services = catalog(json!({ "Web": { "services": services } }));

        let snapshot = ContextSnapshot::from_catalogs(Some(&services), None);
        assert_eq!(snapshot.services.len(), MAX_ITEMS);
        assert!(snapshot
            .services
            .iter()
            .all(|s| s.description.chars().count() == MAX_SERVICE_DESCRIPTION));
        assert!(snapshot.plans.is_empty());
    }

    #[test]
    fn plan_features_keep_first_four() {
        let pricing = catalog(json!({
            "Web": { "services": [{
                "title": "Landing Pages",
                "pricing": { "fixed": [{
                    "title": "Starter",
                    "price": "$899",
                    "keys": [
                        { "name": "A", "desc": "1" },
                        { "name": "B", "desc": "2" },
                        { "name": "C", "desc": "3" },
                        { "name": "D", "desc": "4" },
                        { "name": "E", "desc": "5" }
                    ]
                }] }
            }] }
        }));

        let snapshot = ContextSnapshot::from_catalogs(None, Some(&pricing));
        assert_eq!(
            snapshot.plans,
            vec![PlanSummary {
                name: "Landing Pages / Starter".into(),
                price: Some("$899".into()),
                features: "A: 1, B: 2, C: 3, D: 4".into(),
            }]
        );
    }

    #[test]
    fn plan_summaries_are_bounded() {
        let keys: Vec<_> = ["Pages", "Hosting", "Support", "Analytics", "Backups"]
            .iter()
            .map(|name| json!({ "name": name, "desc": "d".repeat(40) }))
            .collect();
        let plans: Vec<_> = (0..15)
            .map(|i| json!({ "title": format!("Plan {}", i), "price": "$100", "keys": keys }))
            .collect();
        let pricing = catalog(json!({
            "Web": { "services": [{ "title": "Landing Pages", "pricing": { "fixed": plans } }] }
        }));

        let snapshot = ContextSnapshot::from_catalogs(None, Some(&pricing));
        assert_eq!(snapshot.plans.len(), MAX_ITEMS);
        assert_eq!(snapshot.plans[11].name, "Landing Pages / Plan 11");
        for plan in &snapshot.plans {
            assert_eq!(plan.features.chars().count(), MAX_FEATURE_EXCERPT);
            assert!(plan.features.starts_with("Pages: ddd"));
            assert!(!plan.features.contains("Backups"));
        }
    }

    #[test]
    fn render_is_none_without_data() {
        assert_eq!(ContextSnapshot::default().render(), None);
    }

    #[test]
    fn render_lists_both_sections() {
        let snapshot = ContextSnapshot {
            services: vec![ServiceSummary {
                name: "AI Chatbots".into(),
                description: "Custom RAG bots".into(),
            }],
            plans: vec![PlanSummary {
                name: "AI Chatbots / Custom".into(),
                price: None,
                features: String::new(),
            }],
        };
        assert_eq!(
            snapshot.render().unwrap(),
            "Services (live):\n- AI Chatbots: Custom RAG bots\n\n\
             Pricing (live):\n- AI Chatbots / Custom: contact for pricing"
        );
    }
}
