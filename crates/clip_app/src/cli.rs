use std::path::PathBuf;

use clap::Parser;
use clip_core::MediaKind;

#[derive(Debug, Parser)]
#[command(name = "clip_app")]
#[command(about = "Scroll a recorded chat feed, collect its media links and download them")]
pub struct Cli {
    /// Directory of `*.html` frames, replayed in file-name order
    #[arg(long)]
    pub frames: PathBuf,

    /// Download folder name, relative to the output directory
    #[arg(long, default_value = "")]
    pub folder: String,

    /// Where downloads are written
    #[arg(long, default_value = "downloads")]
    pub out: PathBuf,

    /// Media family to collect: video or image
    #[arg(long, default_value = "video")]
    pub kind: MediaKind,

    /// RON settings file
    #[arg(long, default_value = "clip_settings.ron")]
    pub settings: PathBuf,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    pub save_settings: bool,

    /// Scan and list results without downloading
    #[arg(long)]
    pub dry_run: bool,

    /// Also log to the terminal
    #[arg(long)]
    pub verbose: bool,
}
