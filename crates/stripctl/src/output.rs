use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use stripctl_command::Response;
use stripctl_strip::StripStatus;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_response(response: &Response, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(response),
        OutputFormat::Pretty => {
            println!("{} {}", response.status, response.message);
            if let Some(description) = &response.description {
                println!("description: {description}");
            }
            if let Some(result) = &response.result {
                println!("{}", to_pretty(result));
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["STATUS", "MESSAGE", "RESULT", "DESCRIPTION"])
                .add_row(vec![
                    response.status.to_string(),
                    response.message.clone(),
                    response
                        .result
                        .as_ref()
                        .map(|result| result.to_string())
                        .unwrap_or_default(),
                    response.description.clone().unwrap_or_default(),
                ]);
            println!("{table}");
        }
    }
}

pub fn print_status(status: &StripStatus, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(status),
        OutputFormat::Pretty => {
            println!(
                "strip: {} pixels, {}, background {}",
                status.strip_length,
                on_off(status.is_on),
                status.background
            );
            for section in &status.sections {
                println!(
                    "  {} [{}..={}] {} {}",
                    section.id,
                    section.limits.start,
                    section.limits.end,
                    section.color,
                    on_off(section.is_on)
                );
            }
        }
        OutputFormat::Table => println!("{}", status_table(status)),
    }
}

fn status_table(status: &StripStatus) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["SECTION", "START", "END", "COLOR", "STATE"]);
    for section in &status.sections {
        table.add_row(vec![
            section.id.clone(),
            section.limits.start.to_string(),
            section.limits.end.to_string(),
            section.color.to_string(),
            on_off(section.is_on).to_string(),
        ]);
    }
    table.add_row(vec![
        "(strip)".to_string(),
        "0".to_string(),
        status.strip_length.saturating_sub(1).to_string(),
        status.background.to_string(),
        on_off(status.is_on).to_string(),
    ]);
    table
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn to_pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use stripctl_strip::{Color, Limits, SectionStatus};

    use super::*;

    #[test]
    fn table_lists_sections_then_strip() {
        let status = StripStatus {
            strip_length: 300,
            is_on: true,
            background: Color::BLACK,
            sections: vec![SectionStatus {
                id: "sec-1".into(),
                is_on: false,
                color: Color::new(255, 0, 0),
                limits: Limits { start: 0, end: 99 },
            }],
        };

        let rendered = status_table(&status).to_string();
        assert!(rendered.contains("sec-1"));
        assert!(rendered.contains("#ff0000"));
        assert!(rendered.contains("(strip)"));
        assert!(rendered.contains("299"));
    }
}
