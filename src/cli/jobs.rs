use anyhow::{Result, anyhow};
use console::style;
use reqwest::Method;

use crate::core::jobs::JobStatus;
use crate::core::terminal::{GuideSection, print_info, print_success, print_warn};

use super::{api_request, flag_value, positional_args};

pub async fn run_jobs_command(args: &[String], api_url: &str) -> Result<()> {
    let positional = positional_args(args, 2);
    let sub_cmd = positional.first().map(String::as_str).unwrap_or("list");

    match sub_cmd {
        "list" | "ls" => {
            let filter = flag_value(args, 2, "--status")
                .map(|raw| raw.parse::<JobStatus>())
                .transpose()?;
            list_jobs(api_url, filter).await
        }
        "status" => {
            if positional.len() < 3 {
                let choices: Vec<String> = JobStatus::ALL
                    .iter()
                    .map(|s| format!("\"{}\"", s))
                    .collect();
                return Err(anyhow!(
                    "Usage: flashfix jobs status <id> <{}>",
                    choices.join("|")
                ));
            }
            let id = &positional[1];
            let status = positional[2..].join(" ").parse::<JobStatus>()?;
            update_status(api_url, id, status).await
        }
        other => Err(anyhow!(
            "Unknown jobs command '{}'. Expected: list, status",
            other
        )),
    }
}

pub(crate) fn styled_status(status: &str) -> String {
    match status {
        "Completed" => style(status).green().to_string(),
        "In Progress" => style(status).cyan().to_string(),
        _ => style(status).yellow().to_string(),
    }
}

pub(crate) fn job_line(job: &serde_json::Value) -> String {
    let text = |key: &str| job.get(key).and_then(|v| v.as_str()).unwrap_or("?");
    format!(
        "{} [{}] {} · {} {} · {} · {}",
        style(text("id")).white().bold(),
        styled_status(text("status")),
        text("clientName"),
        text("address"),
        text("unit"),
        text("serviceType"),
        style(text("timestamp")).dim()
    )
}

async fn list_jobs(api_url: &str, filter: Option<JobStatus>) -> Result<()> {
    let body = api_request(api_url, Method::GET, &list_path(filter), None).await?;
    let jobs = body
        .get("jobs")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let title = match filter {
        Some(status) => format!("Job log · {}", status),
        None => "Job log".to_string(),
    };
    if jobs.is_empty() {
        GuideSection::new(&title)
            .text("No jobs recorded yet.")
            .hint("flashfix book", "submit the first turnover")
            .print();
    } else {
        let mut section = GuideSection::new(&title);
        for job in &jobs {
            section = section.bullet(&job_line(job));
        }
        section.print();
    }
    println!();
    Ok(())
}

fn list_path(filter: Option<JobStatus>) -> String {
    match filter {
        Some(status) => format!("/api/jobs?status={}", urlencoding::encode(status.as_str())),
        None => "/api/jobs".to_string(),
    }
}

/// Legacy ids are free text, so the id is percent-encoded as one path segment.
fn status_path(id: &str) -> String {
    format!("/api/jobs/{}/status", urlencoding::encode(id))
}

async fn update_status(api_url: &str, id: &str, status: JobStatus) -> Result<()> {
    let body = api_request(
        api_url,
        Method::PATCH,
        &status_path(id),
        Some(serde_json::json!({ "status": status.as_str() })),
    )
    .await?;

    if body.get("updated").and_then(|v| v.as_bool()) == Some(true) {
        print_success(&format!("{} is now {}", id, status));
    } else {
        print_warn(&format!("No job with id '{}', nothing changed", id));
        print_info("Run 'flashfix jobs' to see the recorded ids.");
    }
    Ok(())
}
