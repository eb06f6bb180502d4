//! Batch runner binary for the Tidelock randomizer.
//!
//! Performs exactly one randomization pass and writes the serializable
//! report. There is no service loop: randomization is a one-shot batch
//! computation per new game, so the binary loads data, runs, writes, and
//! exits.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tidelock.yaml` (first argument overrides)
//! 2. Initialize structured logging (tracing); `RUST_LOG` wins over the
//!    configured level
//! 3. Load the data set: the built-in catalog, or a JSON override file
//! 4. Run the randomization pass
//! 5. Write the report JSON (second argument overrides the path)
//! 6. Log the summary
//!
//! # Usage
//!
//! ```text
//! tidelock [config.yaml] [report.json] [--data world.json]
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tidelock_logic::catalog::{Catalog, default_catalog};
use tidelock_logic::config::RandomizerConfig;
use tidelock_logic::randomize::randomize;
use tidelock_types::{Entity, Region, RegionId, Transition};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default configuration path when no argument is given.
const DEFAULT_CONFIG_PATH: &str = "tidelock.yaml";

/// Default report path when no argument is given.
const DEFAULT_REPORT_PATH: &str = "tidelock-report.json";

/// External data set override, mirroring the built-in catalog layout.
#[derive(Debug, Deserialize)]
struct WorldFile {
    /// Every randomizable entity.
    entities: Vec<Entity>,
    /// Every region of the world.
    regions: Vec<Region>,
    /// Directed transitions between regions.
    transitions: Vec<Transition>,
    /// Where sphere 0 begins.
    start: RegionId,
}

/// Parsed command line: config path, report path, optional data override.
struct CliArgs {
    config_path: PathBuf,
    report_path: PathBuf,
    data_path: Option<PathBuf>,
}

fn parse_args() -> CliArgs {
    let mut positional: Vec<String> = Vec::new();
    let mut data_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--data" {
            data_path = args.next().map(PathBuf::from);
        } else {
            positional.push(arg);
        }
    }
    let config_path = positional
        .first()
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let report_path = positional
        .get(1)
        .map_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH), PathBuf::from);
    CliArgs {
        config_path,
        report_path,
        data_path,
    }
}

/// Load the data set: a JSON world file if given, the built-in catalog
/// otherwise.
fn load_catalog(data_path: Option<&Path>) -> anyhow::Result<Catalog> {
    let Some(path) = data_path else {
        info!("using built-in catalog");
        return Ok(default_catalog());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading world data from {}", path.display()))?;
    let world: WorldFile = serde_json::from_str(&contents)
        .with_context(|| format!("parsing world data from {}", path.display()))?;
    info!(
        path = %path.display(),
        entities = world.entities.len(),
        regions = world.regions.len(),
        "world data loaded"
    );
    Ok(Catalog {
        entities: world.entities,
        regions: world.regions,
        transitions: world.transitions,
        start: world.start,
    })
}

fn main() -> anyhow::Result<()> {
    let args = parse_args();

    // 1. Configuration first: its logging level feeds the subscriber. A
    //    missing file at the default path falls back to defaults; an
    //    explicit path that fails to parse is an error.
    let config = if args.config_path.exists() {
        RandomizerConfig::from_file(&args.config_path)
            .with_context(|| format!("loading config from {}", args.config_path.display()))?
    } else {
        RandomizerConfig::default()
    };

    // 2. Structured logging; RUST_LOG overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        config = %args.config_path.display(),
        seed = config.seed,
        mode = ?config.mode,
        "tidelock starting"
    );

    // 3. Data set.
    let catalog = load_catalog(args.data_path.as_deref())?;

    // 4. The one-shot randomization pass.
    let output = randomize(&config, catalog).context("randomization failed")?;

    // 5. Persist the report.
    let json = output
        .to_json_string()
        .context("encoding the report to JSON")?;
    std::fs::write(&args.report_path, json)
        .with_context(|| format!("writing report to {}", args.report_path.display()))?;

    // 6. Summary.
    info!(
        report = %args.report_path.display(),
        recipes = output.recipe_count(),
        spheres = output.sphere_count(),
        priority_grants = output.priority_grants.len(),
        "tidelock finished"
    );
    Ok(())
}
