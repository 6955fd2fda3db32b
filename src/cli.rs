use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use cubelet::config::{AppSettings, load_app_config};
use cubelet::cube::{Measure, MissingKeyPolicy, render_report, write_snapshot};
use cubelet::explorer::CubeController;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cubelet", about = "Small OLAP cube builder and explorer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a freshly generated demonstration cube
    Sample {
        /// Destination snapshot file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the dimensions and fact count of a cube
    Inspect {
        #[arg(short, long)]
        cube: PathBuf,
    },
    /// Add or replace a dimension. Creates the cube file if it does not exist.
    AddDimension {
        #[arg(short, long)]
        cube: PathBuf,

        /// Dimension name, e.g. PRODUTO
        #[arg(short, long)]
        name: String,

        /// Comma-separated values, e.g. "CAMISA,CALÇA"
        #[arg(long)]
        values: String,
    },
    /// Append a fact with one value per dimension
    AddFact {
        #[arg(short, long)]
        cube: PathBuf,

        /// Dimension value as DIM=VALUE; repeat for every dimension
        #[arg(short, long = "set", value_parser = parse_key_value)]
        set: Vec<(String, String)>,

        /// The measure
        #[arg(short, long, allow_hyphen_values = true)]
        value: String,
    },
    /// Group the cube by 1 to 3 dimensions and print the result
    Aggregate {
        #[arg(short, long)]
        cube: PathBuf,

        /// Comma-separated dimension names, e.g. "PRODUTO,REGIÃO"
        #[arg(short, long)]
        by: String,

        /// sum, avg or count. Defaults to the configured measure.
        #[arg(short, long)]
        measure: Option<Measure>,

        /// Slice as DIM=VALUE; repeatable
        #[arg(short, long = "filter", value_parser = parse_key_value)]
        filter: Vec<(String, String)>,

        /// reject or skip facts lacking a needed dimension. Defaults to the configured policy.
        #[arg(long)]
        missing_keys: Option<MissingKeyPolicy>,

        /// Print the result as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
}

fn parse_key_value(input: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected DIM=VALUE, got '{input}'"))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return Err(format!("expected DIM=VALUE, got '{input}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

pub fn run_command(command: Commands) -> Result<()> {
    run_with_settings(command, load_app_config().settings)
}

fn run_with_settings(command: Commands, settings: AppSettings) -> Result<()> {
    match command {
        Commands::Sample { output } => handle_sample(&output, settings),
        Commands::Inspect { cube } => handle_inspect(&cube, settings),
        Commands::AddDimension { cube, name, values } => {
            let mut ctl = open_cube(&cube, settings, true)?;
            println!("{}", ctl.add_dimension(&name, &values)?);
            store_cube(&ctl, &cube)
        }
        Commands::AddFact { cube, set, value } => {
            let mut ctl = open_cube(&cube, settings, false)?;
            let selections: BTreeMap<String, String> = set.into_iter().collect();
            println!("{}", ctl.add_fact(&selections, &value)?);
            store_cube(&ctl, &cube)
        }
        Commands::Aggregate {
            cube,
            by,
            measure,
            filter,
            missing_keys,
            json,
        } => {
            let measure = measure.unwrap_or(settings.default_measure);
            let mut ctl = open_cube(&cube, settings, false)?;
            if let Some(policy) = missing_keys {
                ctl.settings_mut().missing_keys = policy;
            }
            ctl.apply_filters(&filter.into_iter().collect())?;

            let result = ctl.aggregate(&by, measure)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render_report(&result, ctl.store().filters()));
            }
            Ok(())
        }
    }
}

fn open_cube(path: &Path, settings: AppSettings, create: bool) -> Result<CubeController> {
    let mut ctl = CubeController::new(settings);
    if create && !path.exists() {
        println!("Creating new cube at {}", path.display());
        return Ok(ctl);
    }
    ctl.load_cube(path)
        .with_context(|| format!("Failed to open cube {}", path.display()))?;
    Ok(ctl)
}

fn store_cube(ctl: &CubeController, path: &Path) -> Result<()> {
    write_snapshot(path, &ctl.store().export_snapshot())?;
    println!(
        "Saved {} ({} dimensions, {} facts)",
        path.display(),
        ctl.store().dimensions().len(),
        ctl.store().facts().len()
    );
    Ok(())
}

fn handle_sample(output: &Path, settings: AppSettings) -> Result<()> {
    let mut ctl = CubeController::new(settings);
    println!("{}", ctl.generate_sample());
    ctl.save_cube(output)?;
    println!("Saved {}", output.display());
    Ok(())
}

fn handle_inspect(path: &Path, settings: AppSettings) -> Result<()> {
    let ctl = open_cube(path, settings, false)?;
    let store = ctl.store();
    println!("Cube: {}", path.display());
    println!("Facts: {}", store.facts().len());
    println!("Dimensions: {}", store.dimensions().len());
    for dim in store.dimensions() {
        println!("  {} ({}): {}", dim.name, dim.values.len(), dim.values.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;
    use cubelet::cube::read_snapshot;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value(" PRODUTO = CAMISA "),
            Ok(("PRODUTO".to_owned(), "CAMISA".to_owned()))
        );
        assert!(parse_key_value("PRODUTO").is_err());
        assert!(parse_key_value("=CAMISA").is_err());
    }

    #[test]
    fn test_parse_aggregate_arguments() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "cubelet", "aggregate", "--cube", "c.json", "--by", "PRODUTO,REGIÃO", "--measure",
            "avg", "--filter", "MÊS=JAN", "--missing-keys", "skip",
        ])?;
        let Some(Commands::Aggregate {
            measure,
            filter,
            missing_keys,
            json,
            ..
        }) = cli.command
        else {
            anyhow::bail!("expected the aggregate command");
        };
        assert_eq!(measure, Some(Measure::Avg));
        assert_eq!(filter, vec![("MÊS".to_owned(), "JAN".to_owned())]);
        assert_eq!(missing_keys, Some(MissingKeyPolicy::Skip));
        assert!(!json);
        Ok(())
    }

    #[test]
    fn test_build_cube_from_commands() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let cube = dir.path().join("shop.json");
        let settings = AppSettings::default;

        run_with_settings(
            Commands::AddDimension {
                cube: cube.clone(),
                name: "PRODUTO".to_owned(),
                values: "CAMISA, CALÇA".to_owned(),
            },
            settings(),
        )?;
        for (product, value) in [("CAMISA", "100"), ("CAMISA", "200"), ("CALÇA", "50")] {
            run_with_settings(
                Commands::AddFact {
                    cube: cube.clone(),
                    set: vec![("PRODUTO".to_owned(), product.to_owned())],
                    value: value.to_owned(),
                },
                settings(),
            )?;
        }

        let snapshot = read_snapshot(&cube)?;
        assert_eq!(snapshot.facts.len(), 3);

        let bad_fact = Commands::AddFact {
            cube: cube.clone(),
            set: vec![("PRODUTO".to_owned(), "TENIS".to_owned())],
            value: "10".to_owned(),
        };
        assert!(run_with_settings(bad_fact, settings()).is_err());
        assert_eq!(read_snapshot(&cube)?.facts.len(), 3);

        run_with_settings(
            Commands::Aggregate {
                cube,
                by: "PRODUTO".to_owned(),
                measure: None,
                filter: Vec::new(),
                missing_keys: None,
                json: true,
            },
            settings(),
        )?;
        Ok(())
    }

    #[test]
    fn test_sample_then_inspect() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let cube = dir.path().join("sample.json");
        run_with_settings(
            Commands::Sample {
                output: cube.clone(),
            },
            AppSettings::default(),
        )?;
        assert_eq!(read_snapshot(&cube)?.facts.len(), 75);
        run_with_settings(Commands::Inspect { cube }, AppSettings::default())
    }

    #[test]
    fn test_missing_cube_is_an_error() {
        let result = run_with_settings(
            Commands::Inspect {
                cube: PathBuf::from("definitely/not/here.json"),
            },
            AppSettings::default(),
        );
        assert!(result.is_err());
    }
}
