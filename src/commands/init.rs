use std::path::Path;

use anyhow::Result;
use calmirror_core::config::RawSettings;
use owo_colors::OwoColorize;

pub fn run(path: Option<&Path>) -> Result<()> {
    let path = RawSettings::resolve_path(path)?;

    if RawSettings::create_default_config(&path)? {
        println!("Created {}", path.display().green());
        println!("Set work_calendar_id and life_calendar_id, then run:\n  calmirror check");
    } else {
        println!("{} already exists, leaving it untouched", path.display().yellow());
    }

    Ok(())
}
