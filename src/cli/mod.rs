use clap::Parser;
use dialoguer::Select;
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Drives a DrumBrute master clock from a MIDI foot pedal",
    long_about = None
)]
pub struct Args {
    /// List available MIDI ports and exit
    #[arg(long)]
    pub device_list: bool,

    /// Index of the MIDI input port (the pedal)
    #[arg(long)]
    pub input_port: Option<usize>,

    /// Index of the MIDI output port (the drum machine)
    #[arg(long)]
    pub output_port: Option<usize>,

    /// Preselect the input port whose name contains this text
    #[arg(long)]
    pub input_query: Option<String>,

    /// Preselect the output port whose name contains this text
    #[arg(long)]
    pub output_query: Option<String>,

    /// Pick ports from the queries only, without a menu
    #[arg(long)]
    pub auto_select: bool,

    /// Never show the port selection menu
    #[arg(long)]
    pub quiet: bool,

    /// Location of the state database (`:memory:` keeps nothing)
    #[arg(long)]
    pub db_file_path: Option<PathBuf>,

    /// Configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Append logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn interactive(&self) -> bool {
        !self.quiet && !self.auto_select
    }
}

/// Picks the candidate index for one port, before any menu:
/// explicit index, then query match, then the stored index.
pub fn preselect_port(
    explicit: Option<usize>,
    queried: Option<usize>,
    stored: Option<usize>,
    auto_select: bool,
) -> Option<usize> {
    if auto_select {
        return queried;
    }
    explicit.or(queried).or(stored)
}

pub fn validate_port(
    label: &str,
    port: Option<usize>,
    available: &[String],
) -> Result<usize, String> {
    match port {
        Some(index) if index < available.len() => Ok(index),
        Some(index) => {
            let mut error_msg = format!(
                "Error: {} port {} not found in available ports:\n",
                label, index
            );
            for (i, name) in available.iter().enumerate() {
                error_msg.push_str(&format!("  {}: {}\n", i, name));
            }
            Err(error_msg)
        }
        None => Err(format!("Error: {} port must be set", label)),
    }
}

/// Shows a selection menu with the cursor on `cursor`, or on the first entry
/// if `cursor` is out of range.
pub fn select_port_from_menu(
    available: &[String],
    cursor: Option<usize>,
    label: &str,
) -> Result<usize, dialoguer::Error> {
    let cursor = cursor.filter(|&c| c < available.len()).unwrap_or(0);
    let selection = Select::new()
        .with_prompt(format!("Select a {} port", label))
        .items(available)
        .default(cursor)
        .interact()?;
    info!("Selected {} port {}", label, selection);
    Ok(selection)
}
