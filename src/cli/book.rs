use anyhow::Result;
use inquire::{Confirm, Select, Text};
use reqwest::Method;

use crate::core::booking::BookingForm;
use crate::core::jobs::{BookingParams, PDF_PLACEHOLDER, ServiceType};
use crate::core::terminal::{GuideSection, print_error, print_info, print_success};

use super::{api_request, flag_value};

const FIELD_FLAGS: [&str; 6] = [
    "--name",
    "--email",
    "--address",
    "--unit",
    "--service",
    "--lockbox",
];

pub async fn run_book_command(args: &[String], api_url: &str) -> Result<()> {
    if FIELD_FLAGS.iter().any(|f| flag_value(args, 2, f).is_some()) {
        let mut form = BookingForm::with_params(params_from_flags(args)?);
        let body = submit(&mut form, api_url).await?;
        print_job(&body);
        return Ok(());
    }

    let mut form = BookingForm::new();
    loop {
        prompt_fields(&mut form)?;
        match submit(&mut form, api_url).await {
            Ok(body) => {
                print_job(&body);
                return Ok(());
            }
            Err(e) => {
                print_error(&e.to_string());
                let question = retry_question(form.params());
                let retry = Confirm::new(&question)
                    .with_default(true)
                    .prompt()?;
                if !retry {
                    return Ok(());
                }
            }
        }
    }
}

fn retry_question(params: &BookingParams) -> String {
    let client = params.client_name.trim();
    if client.is_empty() {
        "Try again? Your answers are kept.".to_string()
    } else {
        format!("Try again? Answers for {} are kept.", client)
    }
}

fn params_from_flags(args: &[String]) -> Result<BookingParams> {
    let field = |flag: &str| flag_value(args, 2, flag).unwrap_or_default();
    let service_type = match flag_value(args, 2, "--service") {
        Some(raw) => raw.parse::<ServiceType>()?,
        None => ServiceType::default(),
    };
    Ok(BookingParams {
        client_name: field("--name"),
        client_email: field("--email"),
        address: field("--address"),
        unit: field("--unit"),
        service_type,
        lockbox: field("--lockbox"),
    })
}

fn ask(label: &str, current: &str, help: &str) -> Result<String> {
    let mut prompt = Text::new(label).with_initial_value(current);
    if !help.is_empty() {
        prompt = prompt.with_help_message(help);
    }
    Ok(prompt.prompt()?)
}

fn prompt_fields(form: &mut BookingForm) -> Result<()> {
    let Some(params) = form.params_mut() else {
        return Ok(());
    };

    params.client_name = ask("Client name:", &params.client_name, "")?;
    params.client_email = ask("Client email:", &params.client_email, "Work order goes here")?;
    params.address = ask("Property address:", &params.address, "")?;
    params.unit = ask("Unit:", &params.unit, "")?;

    let cursor = ServiceType::ALL
        .iter()
        .position(|t| *t == params.service_type)
        .unwrap_or(0);
    params.service_type = Select::new("Service type:", ServiceType::ALL.to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;

    params.lockbox = ask("Lockbox / access:", &params.lockbox, "Code or access notes")?;
    Ok(())
}

/// Validate locally, then post. The form's fields are cleared only when
/// the server reports success.
async fn submit(form: &mut BookingForm, api_url: &str) -> Result<serde_json::Value> {
    let params = form.begin_submit()?;
    print_info("Submitting booking...");

    let outcome = match serde_json::to_value(&params) {
        Ok(body) => api_request(api_url, Method::POST, "/api/bookings", Some(body)).await,
        Err(e) => Err(e.into()),
    };
    form.finish_submit(outcome.is_ok());
    outcome
}

fn print_job(body: &serde_json::Value) {
    let job = &body["job"];
    let text = |key: &str| job.get(key).and_then(|v| v.as_str()).unwrap_or("?").to_string();

    print_success(&format!("Booking {} submitted", text("id")));
    let pdf = text("pdfUrl");
    GuideSection::new("Work order")
        .status("Client", &text("clientName"))
        .status("Property", &format!("{}, unit {}", text("address"), text("unit")))
        .status("Service", &text("serviceType"))
        .status("Status", &text("status"))
        .status(
            "Document",
            if pdf == PDF_PLACEHOLDER || pdf == "?" {
                "not available yet"
            } else {
                pdf.as_str()
            },
        )
        .print();
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_fill_booking_params() {
        let argv = args(&[
            "flashfix",
            "book",
            "--name",
            "Jane Doe",
            "--email",
            "jane@x.com",
            "--address",
            "1 Oak Rd",
            "--unit",
            "2A",
            "--service",
            "express (24h)",
            "--lockbox",
            "9999",
        ]);
        let params = params_from_flags(&argv).unwrap();
        assert_eq!(params.client_name, "Jane Doe");
        assert_eq!(params.service_type, ServiceType::Express);
        assert_eq!(params.lockbox, "9999");
    }

    #[test]
    fn missing_service_flag_uses_standard_turnover() {
        let argv = args(&["flashfix", "book", "--name", "Jane Doe"]);
        let params = params_from_flags(&argv).unwrap();
        assert_eq!(params.service_type, ServiceType::StandardTurnover);
        assert!(params.unit.is_empty());
    }

    #[test]
    fn unknown_service_flag_is_rejected() {
        let argv = args(&["flashfix", "book", "--service", "Gutter Cleaning"]);
        assert!(params_from_flags(&argv).is_err());
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_before_any_request() {
        let mut form = BookingForm::with_params(BookingParams {
            client_name: "Jane Doe".into(),
            ..BookingParams::default()
        });
        let err = submit(&mut form, "http://127.0.0.1:9").await.unwrap_err();
        assert!(err.to_string().contains("is required"));
        assert_eq!(form.params().client_name, "Jane Doe");
    }

    #[tokio::test]
    async fn unreachable_api_keeps_fields() {
        let params = BookingParams {
            client_name: "Jane Doe".into(),
            client_email: "jane@x.com".into(),
            address: "1 Oak Rd".into(),
            unit: "2A".into(),
            service_type: ServiceType::Express,
            lockbox: "9999".into(),
        };
        let mut form = BookingForm::with_params(params.clone());
        let err = submit(&mut form, "http://127.0.0.1:9").await.unwrap_err();
        assert!(err.to_string().contains("flashfix serve"));
        assert_eq!(form.params(), &params);
    }

    #[test]
    fn retry_question_names_the_client_when_known() {
        let mut params = BookingParams::default();
        assert_eq!(retry_question(&params), "Try again? Your answers are kept.");

        params.client_name = " Jane Doe ".into();
        assert_eq!(
            retry_question(&params),
            "Try again? Answers for Jane Doe are kept."
        );
    }
}
