use anyhow::Result;
use calmirror_core::provider::CalendarProvider;
use calmirror_core::{DateRange, Settings};
use owo_colors::OwoColorize;

/// Resolve every configured calendar and list today's events from each.
pub async fn run<P: CalendarProvider>(provider: &P, settings: &Settings) -> Result<()> {
    let calendars = [
        ("Work", settings.work_calendar_id.as_str()),
        ("Life", settings.life_calendar_id.as_str()),
        ("Holidays", settings.holiday_rules.holiday_calendar_id.as_str()),
    ];
    let today = chrono::Utc::now()
        .with_timezone(&settings.timezone)
        .date_naive();
    let range = DateRange::day(today, &settings.timezone);
    let mut failures = 0;

    for (label, calendar_id) in calendars {
        let result = match provider.resolve_calendar(calendar_id).await {
            Ok(Some(info)) => provider
                .list_events(&info.id, &range)
                .await
                .map(|events| format!("{} ({} events today)", info, events.len())),
            Ok(None) => Err(calmirror_core::CalMirrorError::CalendarNotFound(
                calendar_id.to_string(),
            )),
            Err(e) => Err(e),
        };

        match result {
            Ok(detail) => println!("{} {}: {}", "OK".green(), label, detail),
            Err(e) => {
                failures += 1;
                println!("{} {}: {}", "NG".red(), label, e.to_string().red());
            }
        }
    }

    println!(
        "\nWebhooks: {}",
        if settings.channels.is_empty() {
            "none".to_string()
        } else {
            settings
                .channels
                .iter()
                .map(|c| c.kind.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    );

    if failures > 0 {
        anyhow::bail!("{} calendar(s) not reachable", failures);
    }
    Ok(())
}
