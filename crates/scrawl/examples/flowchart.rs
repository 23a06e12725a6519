//! Draws a small flowchart and writes it as an `.excalidraw` file.
//!
//! ```text
//! cargo run --example flowchart -- --font fonts/Virgil.ttf -o flowchart.excalidraw
//! ```

use std::{path::PathBuf, process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, error, info};

use scrawl::{
    ConnectorStyle, ScrawlError, Sketch,
    attributes::Attributes,
    config,
    geometry::{Point, Size},
};

#[derive(Parser, Debug)]
#[command(about = "Draw an example flowchart")]
struct Args {
    /// Font file used for font family 1
    #[arg(long)]
    font: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "flowchart.excalidraw")]
    output: PathBuf,

    /// Path to a configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn run(args: &Args) -> Result<(), ScrawlError> {
    let config = config::load_config(args.config.as_ref())?.with_font("1", &args.font);
    let mut sketch = Sketch::new(&config)?;
    let none = Attributes::new();

    let mut prev = sketch.text_box("Start Here", Point::new(0.0, 0.0), &none, &none)?;
    for (index, item) in ["First Step", "Second Step", "Third Step"]
        .into_iter()
        .enumerate()
    {
        let center = Point::new(0.0, (index + 1) as f64 * 150.0);
        let next = sketch.text_box(item, center, &none, &none)?;
        sketch.binding_arrow(&prev, &next, ConnectorStyle::Arrow, &none)?;
        prev = next;
    }

    let header_box = sketch.header_content_box(
        "Header",
        "Content",
        Point::new(-200.0, 400.0),
        &Attributes::new().with("strokeColor", "blue"),
        &none,
    )?;
    let circle = sketch.ellipse(
        Point::new(200.0, 400.0),
        Size::new(50.0, 50.0),
        &Attributes::new()
            .with("backgroundColor", "red")
            .with("roughness", 1),
    )?;

    sketch.binding_arrow(&prev, &header_box, ConnectorStyle::DoubleArrow, &none)?;
    sketch.binding_arrow(
        &prev,
        &circle,
        ConnectorStyle::Arrow,
        &Attributes::new().with("strokeColor", "blue"),
    )?;

    sketch.export_to_file(&args.output)
}

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    if let Err(err) = run(&args) {
        error!(err:%; "Failed to draw flowchart");
        process::exit(1);
    }

    info!(output:? = args.output; "Completed successfully");
}
