use anyhow::{Result, anyhow};
use reqwest::Method;

use crate::core::terminal::{GuideSection, print_success, print_warn};

use super::{api_request, positional_args};

pub async fn run_webhook_command(args: &[String], api_url: &str) -> Result<()> {
    let positional = positional_args(args, 2);
    let sub_cmd = positional.first().map(String::as_str).unwrap_or("show");

    match sub_cmd {
        "show" => {
            let body = api_request(api_url, Method::GET, "/api/config", None).await?;
            let text = |key: &str| body.get(key).and_then(|v| v.as_str()).unwrap_or("");
            let url = text("webhook_url");

            let mut section = GuideSection::new("Booking webhook")
                .status("URL", if url.is_empty() { "none" } else { url })
                .status("Delivery", text("delivery_mode"))
                .status("Legacy form", text("legacy_form_url"));
            if url.is_empty() {
                section = section.info("Bookings are simulated locally until a URL is set.");
            } else if body.get("endpoint_valid").and_then(|v| v.as_bool()) != Some(true) {
                section = section.info("This URL does not look like http(s); bookings will fail.");
            }
            section.print();
            println!();
            Ok(())
        }
        "set" => {
            let Some(url) = positional.get(1) else {
                return Err(anyhow!("Usage: flashfix webhook set <url>"));
            };
            let body = set_webhook(api_url, url).await?;
            if body.get("endpoint_valid").and_then(|v| v.as_bool()) == Some(true) {
                print_success("Webhook URL saved");
            } else {
                print_warn("Webhook URL saved, but it does not look like an http(s) URL");
            }
            Ok(())
        }
        "clear" => {
            set_webhook(api_url, "").await?;
            print_success("Webhook cleared. Bookings will be simulated locally.");
            Ok(())
        }
        other => Err(anyhow!(
            "Unknown webhook command '{}'. Expected: show, set, clear",
            other
        )),
    }
}

async fn set_webhook(api_url: &str, url: &str) -> Result<serde_json::Value> {
    api_request(
        api_url,
        Method::PUT,
        "/api/config/webhook",
        Some(serde_json::json!({ "url": url })),
    )
    .await
}
