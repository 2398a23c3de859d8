use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use serde_json::json;
use uuid::Uuid;

use crate::contact::{self, Contact};
use crate::content::ContentError;
use crate::context::ContextSnapshot;
use crate::error::{ApiError, ApiResult};
use crate::model::{prompt, CompletionError, EMPTY_FALLBACK, QUOTA_FALLBACK};
use crate::web::models::{
    ChatReply, ChatRequest, ContactReceipt, ContactSubmission, PricingPreview, ServicePreview,
    WhatsAppLink,
};
use crate::AppState;

const PREVIEW_LIMIT: usize = 6;
const MAIL_NOT_CONFIGURED: &str =
    "Email not configured. Please set SMTP_HOST, SMTP_PORT, SMTP_USER, SMTP_PASS in .env and restart the server.";

/// Maps body extraction failures to the JSON error shape.
pub fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected body for {}: {}", req.path(), err);
    ApiError::InvalidRequest(format!("Invalid request: {}", err)).into()
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Chat API endpoint. The key check runs before the body is decoded.
pub async fn chat(
    data: web::Data<AppState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let model = data.model.as_ref().ok_or(ApiError::MissingApiKey)?;

    let ChatRequest { messages } = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected chat body: {}", e);
        ApiError::InvalidRequest(format!("Invalid request: {}", e))
    })?;

    let request_id = Uuid::new_v4();
    info!("Chat request {}: {} messages", request_id, messages.len());

    let context = ContextSnapshot::gather(&data.content).await;
    let prompt = prompt::build_messages(&context, &messages);

    match model.complete(&prompt).await {
        Ok(Some(content)) => Ok(HttpResponse::Ok().json(ChatReply { content })),
        Ok(None) => {
            warn!("Chat request {}: provider returned no content", request_id);
            Ok(HttpResponse::Ok().json(ChatReply {
                content: EMPTY_FALLBACK.to_string(),
            }))
        }
        Err(CompletionError::QuotaExceeded) => {
            warn!("Chat request {}: provider quota exceeded", request_id);
            Ok(HttpResponse::Ok().json(ChatReply {
                content: QUOTA_FALLBACK.to_string(),
            }))
        }
        Err(CompletionError::Provider { status, body }) => {
            error!("Chat request {}: provider error {}: {}", request_id, status, body);
            Err(ApiError::Provider(body))
        }
        Err(e @ CompletionError::Transport(_)) => {
            error!("Chat request {}: {}", request_id, e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}

// Contact form endpoint
pub async fn contact(
    data: web::Data<AppState>,
    req: web::Json<ContactSubmission>,
) -> ApiResult<HttpResponse> {
    let contact = Contact::try_from(req.into_inner())?;

    let not_configured = || ApiError::NotConfigured(MAIL_NOT_CONFIGURED.to_string());
    let mailer = data.mailer.as_ref().ok_or_else(not_configured)?;
    let owner = data.config.contact_to.as_deref().ok_or_else(not_configured)?;

    let branding = data.branding();
    let owner_notice = contact::owner_notice(&data.tera, &contact, owner, &branding)?;
    let acknowledgment = contact::acknowledgment(&data.tera, &contact, &branding)?;

    let (owner_result, ack_result) =
        tokio::join!(mailer.send(owner_notice), mailer.send(acknowledgment));

    if let Err(e) = &owner_result {
        error!("Owner notice for {} failed: {}", contact.email, e);
    }
    if let Err(e) = &ack_result {
        error!("Acknowledgment to {} failed: {}", contact.email, e);
    }

    let receipt = receipt(owner_result.is_ok(), ack_result.is_ok());
    info!(
        "Contact from {}: owner={} ack={}",
        contact.email, receipt.owner_send_ok, receipt.client_send_ok
    );

    if receipt.ok {
        Ok(HttpResponse::Ok().json(receipt))
    } else {
        Ok(HttpResponse::BadGateway().json(receipt))
    }
}

fn receipt(owner_send_ok: bool, client_send_ok: bool) -> ContactReceipt {
    let message = match (owner_send_ok, client_send_ok) {
        (true, true) => "Message sent",
        (true, false) => "Message received, but the confirmation email could not be sent",
        (false, true) => "Confirmation sent, but the team could not be notified",
        (false, false) => "Failed to send email",
    };
    ContactReceipt {
        ok: owner_send_ok && client_send_ok,
        owner_send_ok,
        client_send_ok,
        message: message.to_string(),
    }
}

// WhatsApp hand-off: same validation as email, returns a prefilled chat link
pub async fn whatsapp(
    data: web::Data<AppState>,
    req: web::Json<ContactSubmission>,
) -> ApiResult<HttpResponse> {
    let contact = Contact::try_from(req.into_inner())?;
    let number = data.config.whatsapp_number.as_deref().ok_or_else(|| {
        ApiError::NotConfigured("WhatsApp not configured. Please set WHATSAPP_NUMBER.".to_string())
    })?;

    let url = contact::whatsapp_link(&contact, number)?;
    Ok(HttpResponse::Ok().json(WhatsAppLink {
        url: url.to_string(),
    }))
}

fn upstream_failure(e: ContentError) -> ApiError {
    warn!("Content service error: {}", e);
    ApiError::from(e)
}

pub async fn services_preview(data: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let catalog = data.content.services().await.map_err(upstream_failure)?;

    let items: Vec<ServicePreview> = catalog
        .services()
        .take(PREVIEW_LIMIT)
        .map(|(category, idx, service)| ServicePreview {
            id: format!("{}-{}", category, idx),
            category_id: category.to_string(),
            title: service.title.clone(),
            description: service.description.clone(),
            keys: service.keys.clone(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(items))
}

pub async fn pricing_preview(data: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let catalog = data.content.pricing().await.map_err(upstream_failure)?;

    let items: Vec<PricingPreview> = catalog
        .plans()
        .take(PREVIEW_LIMIT)
        .map(|(category, idx, service, tier, plan)| PricingPreview {
            id: format!("{}-{}", category, idx),
            category: category.to_string(),
            service: service.title.clone(),
            tier,
            name: plan.title.clone(),
            description: plan.description.clone(),
            price: plan.price_label(),
            features: plan.keys.iter().map(|k| k.to_string()).collect(),
            delivery_time: plan.delivery_time.clone(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_distinguishes_partial_failure() {
        let partial = receipt(true, false);
        assert!(!partial.ok);
        assert!(partial.owner_send_ok);
        assert!(!partial.client_send_ok);

        let total = receipt(false, false);
        assert!(!total.ok);
        assert_eq!(total.message, "Failed to send email");

        assert!(receipt(true, true).ok);
    }
}
