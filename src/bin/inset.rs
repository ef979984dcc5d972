use clap::{ArgGroup, Parser};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use inset_lens::canvas::{CanvasEvent, MagCanvas, UpdateOutcome};
use inset_lens::config::CanvasConfig;
use inset_lens::geometry::Rectangle;
use inset_lens::inset::{Corner, Mode, ZoomRatio, segment_points};
use inset_lens::io::is_image_file;
use inset_lens::sample::write_sample;

#[derive(Parser, Debug)]
#[command(
    name = "lens_cli",
    about = "Draw a magnified inset of a rectangle into a corner of an image",
    version,
    group(ArgGroup::new("source").required(true).args(["input", "sample"])),
    group(ArgGroup::new("zoom_level").args(["zoom", "ratio"]))
)]
struct Cli {
    /// Image file, or a directory of images
    input: Option<PathBuf>,

    /// Output file, or a directory when the input is a directory
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Selection corners in image pixels
    #[arg(long = "rect", num_args = 4, value_names = ["X1", "Y1", "X2", "Y2"], allow_negative_numbers = true)]
    rect: Option<Vec<i32>>,

    /// Inset corner: LU, RU, LB, RB (or their long names)
    #[arg(long = "corner")]
    corner: Option<Corner>,

    /// Connector mode: diagonal, bottom-line, side-line
    #[arg(long = "mode")]
    mode: Option<Mode>,

    /// Slider position 0..=100, mapped to ratio 1.0..=5.0
    #[arg(long = "zoom", value_parser = clap::value_parser!(u32).range(0..=100))]
    zoom: Option<u32>,

    /// Magnification ratio 1.0..=5.0, snapped to the nearest slider step (0.04)
    #[arg(long = "ratio")]
    ratio: Option<f32>,

    /// Border width around the inset in pixels
    #[arg(long = "margin")]
    margin: Option<u32>,

    /// Resize the longer edge to this many pixels before selecting
    #[arg(long = "resolution")]
    resolution: Option<u32>,

    /// JSON file with canvas settings
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Write the generated sample pattern to the output path and exit
    #[arg(long = "sample")]
    sample: bool,
}

impl Cli {
    fn canvas_config(&self) -> Result<CanvasConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => CanvasConfig::from_json_file(path)?,
            None => CanvasConfig::default(),
        };
        if let Some(corner) = self.corner {
            config.corner = corner;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(zoom) = self.zoom {
            config.zoom_value = zoom;
        }
        if let Some(ratio) = self.ratio {
            config.zoom_value = ZoomRatio::new(ratio).slider_value();
        }
        if let Some(margin) = self.margin {
            config.margin = margin;
        }
        if self.resolution.is_some() {
            config.resolution = self.resolution;
        }
        Ok(config)
    }

    fn rectangle(&self) -> Result<Rectangle, Box<dyn Error>> {
        match self.rect.as_deref() {
            Some(&[x1, y1, x2, y2]) => Ok(Rectangle::from_coords(x1, y1, x2, y2)),
            _ => Err("--rect X1 Y1 X2 Y2 is required".into()),
        }
    }
}

fn process(
    config: &CanvasConfig,
    rect: Rectangle,
    input: &Path,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let mut canvas = MagCanvas::new(config.clone());
    canvas.subscribe(|event| match event {
        CanvasEvent::ImageLoaded { width, height } => log::info!("working size {width}x{height}"),
        CanvasEvent::Skipped(reason) => log::warn!("inset skipped: {reason}"),
        CanvasEvent::Saved { path, bytes } => log::info!("wrote {} ({bytes} bytes)", path.display()),
        _ => {}
    });

    canvas.load(input)?;
    match canvas.set_rectangle(rect)? {
        UpdateOutcome::Rendered(layout) => {
            let [a, b] = layout.connectors.map(|s| segment_points(&s));
            println!(
                "{}: inset {}x{} at ({}, {}) ratio {:.2} [{} / {}], lines {:?}->{:?} {:?}->{:?}",
                input.display(),
                layout.region.width,
                layout.region.height,
                layout.region.x,
                layout.region.y,
                layout.ratio,
                layout.corner,
                layout.mode,
                a.0,
                a.1,
                b.0,
                b.1,
            );
        }
        UpdateOutcome::Skipped(reason) => {
            println!("{}: unchanged ({reason})", input.display());
        }
    }
    canvas.save(output)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    inset_lens::init_logging();
    let cli = Cli::parse();

    if cli.sample {
        write_sample(&cli.output, 640, 480)?;
        println!("wrote sample pattern to {}", cli.output.display());
        return Ok(());
    }

    let Some(input) = cli.input.as_deref() else {
        return Err("an input path is required".into());
    };
    let config = cli.canvas_config()?;
    let rect = cli.rectangle()?;

    if !input.is_dir() {
        return process(&config, rect, input, &cli.output);
    }

    let mut images: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    images.sort();

    if images.is_empty() {
        eprintln!("No images found in {}", input.display());
        return Ok(());
    }

    fs::create_dir_all(&cli.output)?;
    let mut failures = 0usize;
    for image_path in &images {
        let Some(name) = image_path.file_name() else {
            continue;
        };
        let out_path = cli.output.join(name);
        if let Err(e) = process(&config, rect, image_path, &out_path) {
            eprintln!("Failed on {}: {e}", image_path.display());
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(format!("{failures} of {} images failed", images.len()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn ratio_snaps_to_the_slider_grid() {
        let cli = parse(&["lens_cli", "in.png", "-o", "out.png", "--rect", "1", "2", "3", "4", "--ratio", "2.5"]);
        let config = cli.canvas_config().expect("config");
        assert_eq!(config.zoom_value, 38);
        assert!((ZoomRatio::from_slider(config.zoom_value).get() - 2.52).abs() < 1e-4);
    }

    #[test]
    fn zoom_and_ratio_are_exclusive() {
        let err = Cli::try_parse_from(["lens_cli", "in.png", "-o", "o.png", "--zoom", "10", "--ratio", "2"]);
        assert!(err.is_err());
    }

    #[test]
    fn negative_rect_coordinates_are_accepted() {
        let cli = parse(&["lens_cli", "in.png", "-o", "out.png", "--rect", "-5", "10", "40", "-2"]);
        assert_eq!(cli.rectangle().expect("rect"), Rectangle::from_coords(-5, 10, 40, -2));
    }
}
