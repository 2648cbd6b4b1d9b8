use clap::Parser;
use isoline::io::{load_rgb_image, save_rgb_image};
use isoline::{
    ContourConfig, DirTemplates, Execution, ProceduralTemplates, Renderer, TemplateSource,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Marching-squares contour overlay renderer")]
struct Cli {
    /// Input image (PPM or PNG).
    #[arg(required_unless_present = "print_example")]
    input: Option<PathBuf>,
    /// Output image; the format follows the extension.
    #[arg(required_unless_present = "print_example")]
    output: Option<PathBuf>,
    /// Number of worker threads.
    #[arg(required_unless_present = "print_example", value_parser = clap::value_parser!(u32).range(1..))]
    threads: Option<u32>,
    /// Directory holding the contour templates `0.ppm` .. `15.ppm`.
    /// Built-in templates are drawn when omitted.
    #[arg(short, long, value_name = "DIR")]
    templates: Option<PathBuf>,
    /// Optional JSON file overriding the rendering parameters.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum ExecutionConfig {
    #[default]
    Barrier,
    ForkJoin,
}

impl From<ExecutionConfig> for Execution {
    fn from(value: ExecutionConfig) -> Self {
        match value {
            ExecutionConfig::Barrier => Execution::Barrier,
            ExecutionConfig::ForkJoin => Execution::ForkJoin,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
struct Config {
    step: usize,
    sigma: u8,
    rescale_width: usize,
    rescale_height: usize,
    execution: ExecutionConfig,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = ContourConfig::default();
        Self {
            step: cfg.step,
            sigma: cfg.sigma,
            rescale_width: cfg.rescale_width,
            rescale_height: cfg.rescale_height,
            execution: ExecutionConfig::default(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("isoline=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{}", serde_json::to_string_pretty(&Config::default())?);
        return Ok(());
    }

    let (Some(input), Some(output), Some(threads)) = (cli.input, cli.output, cli.threads) else {
        return Err("input, output and thread count are required".into());
    };

    let config: Config = match &cli.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    let contour = ContourConfig {
        step: config.step,
        sigma: config.sigma,
        rescale_width: config.rescale_width,
        rescale_height: config.rescale_height,
    };
    contour.validate()?;

    let templates: Box<dyn TemplateSource> = match cli.templates {
        Some(dir) => Box::new(DirTemplates::new(dir)),
        None => Box::new(ProceduralTemplates::new(contour.step)),
    };

    let image = load_rgb_image(&input)?;
    let renderer = Renderer::new(templates, contour)
        .with_threads(threads as usize)
        .with_execution(config.execution.into());
    let rendered = renderer.render(image)?;

    save_rgb_image(&rendered, &output)?;
    tracing::info!(
        output = %output.display(),
        width = rendered.width(),
        height = rendered.height(),
        step = renderer.config().step,
        threads = renderer.threads(),
        "contour image written"
    );
    Ok(())
}
