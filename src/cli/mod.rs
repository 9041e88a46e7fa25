mod book;
mod dashboard;
mod jobs;
mod key;
mod serve;
mod webhook;

use anyhow::{Result, anyhow};
use console::style;
use reqwest::Method;

use crate::core::settings::{DEFAULT_API_HOST, DEFAULT_API_PORT};
use crate::core::terminal::{self, GuideSection, print_error};

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Server")
        .command("serve", "Run the booking API (--api-host, --api-port)")
        .print();

    GuideSection::new("Bookings")
        .command("book", "Fill in and submit a turnover booking")
        .command("jobs", "List the job log (--status to filter)")
        .command("jobs status", "Move a job to Pending, In Progress or Completed")
        .command("dashboard", "Status counts and the most recent jobs")
        .print();

    GuideSection::new("Settings")
        .command("webhook", "Show, set or clear the booking webhook URL")
        .command("key", "Manage the AI inspector key")
        .print();

    GuideSection::new("Examples")
        .hint("flashfix serve", "")
        .hint(
            "flashfix jobs status FIX-4821 \"In Progress\"",
            "quotes keep the status in one argument",
        )
        .hint("flashfix webhook set https://script.google.com/macros/s/.../exec", "")
        .info("Every client command accepts --api-url (default http://127.0.0.1:17990).")
        .print();

    println!(
        "\n {} {} <command> [subcommand] [flags]\n",
        style("Usage:").bold(),
        style("flashfix").green()
    );
}

/// Value following `flag` anywhere from `start` on.
pub(crate) fn flag_value(args: &[String], start: usize, flag: &str) -> Option<String> {
    let mut i = start;
    while i < args.len() {
        if args[i] == flag {
            return args.get(i + 1).cloned();
        }
        i += 1;
    }
    None
}

/// Positional arguments from `start` on, with `--flag value` pairs skipped.
pub(crate) fn positional_args(args: &[String], start: usize) -> Vec<String> {
    let mut positional = Vec::new();
    let mut i = start;
    while i < args.len() {
        if args[i].starts_with("--") {
            i += 2;
        } else {
            positional.push(args[i].clone());
            i += 1;
        }
    }
    positional
}

pub(crate) fn parse_api_server_flags(
    args: &[String],
    start: usize,
    mut api_host: Option<String>,
    mut api_port: Option<u16>,
) -> Result<(Option<String>, Option<u16>)> {
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--api-port" => {
                if i + 1 < args.len() {
                    api_port = Some(
                        args[i + 1]
                            .parse()
                            .map_err(|_| anyhow!("--api-port expects a port number"))?,
                    );
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--api-host" => {
                if i + 1 < args.len() {
                    api_host = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    Ok((api_host, api_port))
}

pub(crate) fn default_api_url() -> String {
    format!("http://{}:{}", DEFAULT_API_HOST, DEFAULT_API_PORT)
}

/// Call the local API and hand back its JSON body. A body with
/// `"success": false` becomes an error carrying the server's message.
pub(crate) async fn api_request(
    api_url: &str,
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> Result<serde_json::Value> {
    let client = reqwest::Client::new();
    let url = format!("{}{}", api_url.trim_end_matches('/'), path);
    let mut req = client.request(method, url.as_str());
    if let Some(body) = body {
        req = req.json(&body);
    }

    let resp = req.send().await.map_err(|e| {
        anyhow!(
            "Could not reach the Flash Fix API at {} ({}). Is 'flashfix serve' running?",
            api_url,
            e
        )
    })?;
    let status = resp.status();
    let json: serde_json::Value = resp
        .json()
        .await
        .map_err(|e| anyhow!("Unexpected response from {} (HTTP {}): {}", url, status, e))?;

    if json.get("success").and_then(|v| v.as_bool()) == Some(true) {
        Ok(json)
    } else {
        let msg = json
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("request failed");
        Err(anyhow!("{}", msg))
    }
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let api_url = flag_value(&args, 1, "--api-url").unwrap_or_else(default_api_url);

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    let cmd = args[1].as_str();
    match cmd {
        "serve" => serve::run_serve(&args).await,
        "book" => book::run_book_command(&args, &api_url).await,
        "jobs" => jobs::run_jobs_command(&args, &api_url).await,
        "dashboard" => dashboard::run_dashboard_command(&api_url).await,
        "webhook" => webhook::run_webhook_command(&args, &api_url).await,
        "key" => key::run_key_command(&args, &api_url).await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        other => {
            print_error(&format!("Unknown command '{}'", other));
            print_help();
            Ok(())
        }
    }
}
