use std::path::PathBuf;

use clap::Parser;

use inset_lens::config::CanvasConfig;
use inset_lens::gui_app::run_iced_app;

#[derive(Parser, Debug)]
#[command(name = "lens_gui", about = "Interactive selection magnifier", version)]
struct Args {
    /// Image to open; a generated sample is shown when omitted
    path: Option<PathBuf>,

    /// JSON file with canvas settings
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    inset_lens::init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let mut config = CanvasConfig::from_json_file(path)?;
            config.resolution.get_or_insert(inset_lens::config::GUI_RESOLUTION);
            config
        }
        None => CanvasConfig::for_gui(),
    };

    run_iced_app(args.path, config)?;
    Ok(())
}
