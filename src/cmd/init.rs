use crate::data::persistence::Persistable;
use crate::data::{AppSettings, Store};
use anyhow::Result;
use std::fs;
use std::path::Path;

pub fn run() -> Result<()> {
    let dir = crate::data::persistence::get_data_dir()?;
    fs::create_dir_all(&dir)?;
    run_in_dir(&dir)?;
    println!("Data files initialized successfully.");
    Ok(())
}

/// Writes all default data files into `dir`. Exposed for unit testing.
pub(crate) fn run_in_dir(dir: &Path) -> Result<()> {
    write_calendars(dir)?;
    write_config(dir)?;
    Ok(())
}

fn write_calendars(dir: &Path) -> Result<()> {
    Store::seed_collection().save_to(dir)
}

fn write_config(dir: &Path) -> Result<()> {
    AppSettings::default().save_to(dir)
}
