//! # certforme CLI
//!
//! Usage:
//!   certforme render request.json --template template.pdf -o out.pdf [--grid]
//!   certforme generate <record-id> --store ./store -o out.pdf [--grid]
//!   certforme grid --orientation landscape --step 25 -o grid.pdf
//!   certforme layout alzain_female
//!   certforme example > request.json
//!   certforme example config > certforme.json

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use certforme::config::EngineConfig;
use certforme::error::ComposeError;
use certforme::model::{Orientation, RenderRequest};
use certforme::service::{CertificateService, DirectorySource};
use certforme::Engine;

#[derive(Parser)]
#[command(version, about = "Compose certificates onto PDF templates", long_about = None)]
struct Opts {
    /// Engine configuration (JSON). Font paths in it resolve relative to its directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a request JSON (file or stdin) onto a template.
    Render {
        /// Request file; reads stdin when omitted.
        request: Option<PathBuf>,
        #[arg(short, long)]
        template: PathBuf,
        #[arg(short, long, default_value = "report.pdf")]
        output: PathBuf,
        /// Stamp the calibration grid over the result.
        #[arg(long)]
        grid: bool,
    },
    /// Generate the certificate for a record in a directory store.
    Generate {
        record: String,
        #[arg(short, long)]
        store: PathBuf,
        #[arg(short, long, default_value = "report.pdf")]
        output: PathBuf,
        #[arg(long)]
        grid: bool,
    },
    /// Write a standalone calibration grid page.
    Grid {
        #[arg(long, value_enum, default_value_t = OrientationArg::Portrait)]
        orientation: OrientationArg,
        #[arg(long)]
        step: Option<f64>,
        #[arg(short, long, default_value = "grid.pdf")]
        output: PathBuf,
    },
    /// Print the layout a template kind resolves to.
    Layout { kind: String },
    /// Print an example request or engine config.
    Example {
        #[arg(value_enum, default_value_t = ExampleKind::Request)]
        kind: ExampleKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExampleKind {
    Request,
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(o: OrientationArg) -> Self {
        match o {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Opts::parse()) {
        match e.downcast_ref::<ComposeError>() {
            Some(ce) => eprintln!("✗ [{}] {:#}", ce.kind(), e),
            None => eprintln!("✗ {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(opts: Opts) -> anyhow::Result<()> {
    let config = match &opts.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    let base_dir = opts.config.as_deref().and_then(Path::parent);

    match opts.command {
        Command::Render {
            request,
            template,
            output,
            grid,
        } => {
            let json = match request {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read request '{}'", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
                    buf
                }
            };
            let template = fs::read(&template)
                .map_err(|e| ComposeError::TemplateNotFound(format!("{}: {}", template.display(), e)))?;

            let engine = Engine::from_config(&config, base_dir)?;
            let mut request: RenderRequest =
                serde_json::from_str(&json).map_err(ComposeError::from)?;
            request.show_grid |= grid;
            certforme::load_signature_sources(&mut request);
            let doc = engine.render(&request, &template)?;
            write_output(&output, &doc.bytes, doc.dropped_signers)
        }

        Command::Generate {
            record,
            store,
            output,
            grid,
        } => {
            let engine = Engine::from_config(&config, base_dir)?;
            let service = CertificateService::new(DirectorySource::new(store), engine, &config);
            let doc = service.generate(&record, grid)?;
            write_output(&output, &doc.bytes, doc.dropped_signers)
        }

        Command::Grid {
            orientation,
            step,
            output,
        } => {
            let engine = Engine::from_config(&config, base_dir)?;
            let bytes = engine.grid(orientation.into(), step)?;
            write_output(&output, &bytes, 0)
        }

        Command::Layout { kind } => {
            let catalog = config.catalog();
            if !catalog.contains(&kind) {
                log::warn!("'{}' is not in the catalog; showing the default layout", kind);
            }
            println!("{}", serde_json::to_string_pretty(&catalog.resolve(&kind))?);
            Ok(())
        }

        Command::Example { kind } => {
            match kind {
                ExampleKind::Request => {
                    print!("{}", example_request_json());
                    eprintln!(
                        "note: Arabic text needs embedded fonts. Without font paths it is drawn in \
                         Helvetica as '?'. Pass a config with font paths (see `certforme example config`)."
                    );
                }
                ExampleKind::Config => print!("{}", example_config_json()),
            }
            Ok(())
        }
    }
}

fn write_output(path: &Path, bytes: &[u8], dropped: usize) -> anyhow::Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write '{}'", path.display()))?;
    eprintln!("✓ Written {} bytes to {}", bytes.len(), path.display());
    if dropped > 0 {
        eprintln!("  {} signer(s) left out (missing or unreadable signature)", dropped);
    }
    Ok(())
}

/// Font paths resolve against the config file's directory.
fn example_config_json() -> &'static str {
    r##"{
  "fonts": {
    "label": { "family": "NotoKufiArabic", "weight": 400, "path": "fonts/NotoKufiArabic-Regular.ttf" },
    "name": { "family": "NotoKufiArabic", "weight": 400, "path": "fonts/NotoKufiArabic-Regular.ttf" },
    "title": { "family": "NotoKufiArabic", "weight": 200, "path": "fonts/NotoKufiArabic-ExtraLight.ttf" }
  },
  "signatureSpacing": 50,
  "gridStep": 50
}
"##
}

fn example_request_json() -> &'static str {
    r##"{
  "templateKind": "alzain_female",
  "labelText": "سارة أحمد",
  "signers": [
    {
      "identifier": "director1",
      "displayName": "محمد علي",
      "title": "مدير الموارد البشرية",
      "signatureSrc": "./signatures/director1.png"
    },
    {
      "identifier": "ceo",
      "displayName": "خالد يوسف",
      "signatureSrc": "./signatures/ceo.png"
    }
  ],
  "showGrid": false
}
"##
}
