use anyhow::{Result, anyhow};
use reqwest::Method;

use crate::core::terminal::{print_info, print_success};

use super::{api_request, positional_args};

pub async fn run_key_command(args: &[String], api_url: &str) -> Result<()> {
    let positional = positional_args(args, 2);
    let sub_cmd = positional.first().map(String::as_str).unwrap_or("status");

    match sub_cmd {
        "status" => {
            let body = api_request(api_url, Method::GET, "/api/ai/key", None).await?;
            if body.get("selected").and_then(|v| v.as_bool()) == Some(true) {
                print_success("An AI key is selected");
            } else {
                print_info("No AI key selected. Run 'flashfix key set' to add one.");
            }
            Ok(())
        }
        "set" => {
            let key = inquire::Password::new("AI API key:")
                .without_confirmation()
                .with_help_message("Stored encrypted on this machine")
                .prompt()?;
            if key.trim().is_empty() {
                println!("  No key provided. Aborting.");
                return Ok(());
            }
            api_request(
                api_url,
                Method::POST,
                "/api/ai/key",
                Some(serde_json::json!({ "key": key })),
            )
            .await?;
            print_success("AI key selected");
            Ok(())
        }
        "clear" => {
            api_request(api_url, Method::DELETE, "/api/ai/key", None).await?;
            print_success("AI key cleared");
            Ok(())
        }
        other => Err(anyhow!(
            "Unknown key command '{}'. Expected: status, set, clear",
            other
        )),
    }
}
