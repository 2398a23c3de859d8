//! Server-rendered pages, sitemap and robots.

use actix_web::{web, HttpResponse, Responder};
use log::{error, warn};
use serde::Serialize;
use tera::Context;

use crate::content::{fallback, Catalog, Feature, Tier};
use crate::AppState;

/// Public routes, in sitemap order.
pub const ROUTES: [&str; 7] = ["", "/about", "/services", "/pricing", "/contact", "/privacy", "/terms"];

fn render(data: &AppState, template: &str, page: &str, mut context: Context) -> HttpResponse {
    context.insert("page", page);
    render_as(data, template, "text/html", context)
}

fn render_as(data: &AppState, template: &str, content_type: &str, mut context: Context) -> HttpResponse {
    context.insert("site", &data.branding());
    match data.tera.render(template, &context) {
        Ok(body) => HttpResponse::Ok().content_type(content_type.to_string()).body(body),
        Err(e) => {
            error!("Template error: {:?}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Index page handler
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    render(&data, "index.html", "home", Context::new())
}

pub async fn about(data: web::Data<AppState>) -> impl Responder {
    render(&data, "about.html", "about", Context::new())
}

pub async fn contact(data: web::Data<AppState>) -> impl Responder {
    let mut context = Context::new();
    context.insert("whatsapp", &data.config.whatsapp_number.is_some());
    render(&data, "contact.html", "contact", context)
}

pub async fn privacy(data: web::Data<AppState>) -> impl Responder {
    render(&data, "privacy.html", "privacy", Context::new())
}

pub async fn terms(data: web::Data<AppState>) -> impl Responder {
    render(&data, "terms.html", "terms", Context::new())
}

#[derive(Debug, Serialize)]
struct ServiceCard<'a> {
    id: String,
    category: &'a str,
    title: &'a str,
    description: &'a str,
    keys: &'a [Feature],
}

pub async fn services(data: web::Data<AppState>) -> impl Responder {
    let catalog = data.content.services().await.unwrap_or_else(|e| {
        warn!("Services page rendered without catalogue: {}", e);
        Catalog::default()
    });

    let cards: Vec<ServiceCard> = catalog
        .services()
        .map(|(category, idx, service)| {
            let title_slug = match slug(&service.title) {
                s if s.is_empty() => idx.to_string(),
                s => s,
            };
            ServiceCard {
                id: format!("{}-{}", slug(category), title_slug),
                category,
                title: &service.title,
                description: &service.description,
                keys: &service.keys,
            }
        })
        .collect();

    let mut context = Context::new();
    context.insert("services", &cards);
    render(&data, "services.html", "services", context)
}

#[derive(Debug, Serialize)]
struct PlanCard {
    name: String,
    description: String,
    price: String,
    features: Vec<String>,
    delivery_time: Option<String>,
}

#[derive(Debug, Serialize)]
struct TierGroup {
    tier: Tier,
    plans: Vec<PlanCard>,
}

#[derive(Debug, Serialize)]
struct ServicePricing {
    title: String,
    tiers: Vec<TierGroup>,
}

#[derive(Debug, Serialize)]
struct CategoryPricing {
    name: String,
    services: Vec<ServicePricing>,
}

/// Category → service → tier → plans, empty tiers dropped.
fn pricing_groups(catalog: &Catalog) -> Vec<CategoryPricing> {
    catalog
        .0
        .iter()
        .map(|(name, category)| CategoryPricing {
            name: name.clone(),
            services: category
                .services
                .iter()
                .filter_map(|service| {
                    let pricing = service.pricing.as_ref()?;
                    let tiers: Vec<TierGroup> = pricing
                        .tiers()
                        .into_iter()
                        .filter(|(_, plans)| !plans.is_empty())
                        .map(|(tier, plans)| TierGroup {
                            tier,
                            plans: plans
                                .iter()
                                .map(|plan| PlanCard {
                                    name: plan.title.clone(),
                                    description: plan.description.clone(),
                                    price: plan
                                        .price_label()
                                        .unwrap_or_else(|| "Contact for pricing".to_string()),
                                    features: plan.keys.iter().map(|k| k.to_string()).collect(),
                                    delivery_time: plan.delivery_time.clone(),
                                })
                                .collect(),
                        })
                        .collect();
                    Some(ServicePricing {
                        title: service.title.clone(),
                        tiers,
                    })
                })
                .collect(),
        })
        .filter(|category| !category.services.is_empty())
        .collect()
}

pub async fn pricing(data: web::Data<AppState>) -> impl Responder {
    let live = match data.content.pricing().await {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            warn!("Pricing page falling back to sample catalogue: {}", e);
            None
        }
    };
    let catalog = match live {
        Some(catalog) => catalog,
        None => fallback::sample_pricing().unwrap_or_else(|e| {
            error!("Bundled pricing catalogue is invalid: {}", e);
            Catalog::default()
        }),
    };

    let mut context = Context::new();
    context.insert("categories", &pricing_groups(&catalog));
    render(&data, "pricing.html", "pricing", context)
}

#[derive(Debug, Serialize)]
struct SitemapEntry {
    path: &'static str,
    priority: &'static str,
}

fn sitemap_entries() -> Vec<SitemapEntry> {
    ROUTES
        .iter()
        .map(|&path| match path {
            "" => SitemapEntry { path: "/", priority: "1.0" },
            path => SitemapEntry { path, priority: "0.7" },
        })
        .collect()
}

pub async fn sitemap(data: web::Data<AppState>) -> impl Responder {
    let mut context = Context::new();
    context.insert("entries", &sitemap_entries());
    render_as(&data, "sitemap.xml", "application/xml", context)
}

pub async fn robots(data: web::Data<AppState>) -> impl Responder {
    render_as(&data, "robots.txt", "text/plain", Context::new())
}

fn slug(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slug("AI & Automation"), "ai-automation");
        assert_eq!(slug("  E-commerce!  "), "e-commerce");
        assert_eq!(slug("***"), "");
    }

    fn metadata_context(site_url: &str) -> Context {
        let mut context = Context::new();
        context.insert(
            "site",
            &crate::contact::Branding { site_name: "Example", site_url },
        );
        context.insert("entries", &sitemap_entries());
        context
    }

    #[test]
    fn sitemap_lists_every_route() {
        let tera = crate::load_templates("templates/**/*").unwrap();
        let xml = tera
            .render("sitemap.xml", &metadata_context("https://example.com"))
            .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert_eq!(xml.matches("<url>").count(), ROUTES.len());
        assert!(xml.contains("<loc>https://example.com/</loc>\n    <changefreq>weekly</changefreq>\n    <priority>1.0</priority>"));
        assert!(xml.contains("<loc>https://example.com/pricing</loc>"));
        assert!(!xml.contains("example.com//"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn robots_points_at_sitemap() {
        let tera = crate::load_templates("templates/**/*").unwrap();
        let robots = tera
            .render("robots.txt", &metadata_context("https://example.com"))
            .unwrap();

        assert!(robots.starts_with("User-agent: *\nAllow: /"));
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
        assert!(robots.contains("Host: https://example.com"));
    }

    #[test]
    fn pricing_groups_drop_empty_tiers() {
        let catalog = fallback::sample_pricing().unwrap();
        let groups = pricing_groups(&catalog);

        assert_eq!(groups.len(), 2);
        let ecommerce = &groups[0].services[1];
        assert_eq!(ecommerce.title, "E-commerce");
        let tiers: Vec<Tier> = ecommerce.tiers.iter().map(|t| t.tier).collect();
        assert_eq!(tiers, vec![Tier::Plus, Tier::Range]);
    }
}
