use anyhow::Result;
use console::style;
use reqwest::Method;

use crate::core::terminal::GuideSection;

use super::api_request;
use super::jobs::job_line;

pub async fn run_dashboard_command(api_url: &str) -> Result<()> {
    let body = api_request(api_url, Method::GET, "/api/dashboard", None).await?;
    let count = |key: &str| {
        body["counts"]
            .get(key)
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
            .to_string()
    };

    GuideSection::new("Overview")
        .status("Pending", &format!("{}", style(count("pending")).yellow().bold()))
        .status(
            "In Progress",
            &format!("{}", style(count("inProgress")).cyan().bold()),
        )
        .status("Completed", &format!("{}", style(count("completed")).green().bold()))
        .status("Total", &count("total"))
        .print();

    let recent = body
        .get("recent")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    let mut section = GuideSection::new("Recent jobs");
    if recent.is_empty() {
        section = section
            .text("No jobs yet.")
            .hint("flashfix book", "");
    } else {
        for job in &recent {
            section = section.bullet(&job_line(job));
        }
    }
    section.print();
    println!();
    Ok(())
}
