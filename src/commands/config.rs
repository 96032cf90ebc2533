use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::CalgridConfig;

pub fn run(config: &CalgridConfig) -> Result<()> {
    let config_path = CalgridConfig::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Data:       {}", config.data_path().display());

    println!("{}", "Display".bold());
    println!("  Timezone:   {}", config.timezone);
    println!("  Week start: {:?}", config.week_start);

    Ok(())
}
