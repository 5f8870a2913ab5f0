use anyhow::Result;
use calmirror_core::Settings;
use calmirror_core::notify::Reporter;
use calmirror_core::provider::CalendarProvider;

use crate::render::Render;

pub async fn run<P: CalendarProvider>(provider: &P, settings: &Settings) -> Result<()> {
    let reporter = Reporter::new(settings.channels.clone())?;

    let summary = calmirror_core::run(provider, settings, &reporter).await;

    println!("{}", summary.render());

    let totals = summary.totals();
    if totals.failed > 0 {
        println!("\n{} change(s) failed; they will be retried on the next run", totals.failed);
    }

    Ok(())
}
