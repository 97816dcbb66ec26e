// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ifc-slim - reduce and clean up IFC building models.
//!
//! One flag per pipeline switch; numeric flags take a value. The whole
//! pipeline runs synchronously and either commits the optimized file (exit
//! code 0) or reports a single failure reason (exit code 1).
//!
//! ```bash
//! ifc-slim input.ifc output.ifc --merge-cartesian --lossy-rounding 2
//! ifc-slim input.ifc output.ifc --conservative --json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use ifc_slim_passes::{ifczip_path, optimize, Externals, OptimizeOptions};

#[derive(Debug, Parser)]
#[command(name = "ifc-slim", version, about = "Optimize IFC files")]
struct Cli {
    /// Input IFC file
    input: PathBuf,
    /// Output IFC file
    output: PathBuf,

    /// Convert to a target schema before optimizing (e.g. IFC2X3, IFC4)
    #[arg(long, value_name = "SCHEMA")]
    convert_schema: Option<String>,

    /// Round CartesianPoint coordinates to this many decimal digits
    #[arg(long, value_name = "PREC")]
    lossy_rounding: Option<u32>,

    /// Also write a gzip-compressed .ifczip copy next to the output
    #[arg(long)]
    ifczip_compress: bool,

    /// Merge duplicate CartesianPoints
    #[arg(long)]
    merge_cartesian: bool,

    /// Merge duplicate PropertySets
    #[arg(long)]
    dedupe_property_sets: bool,

    /// Merge duplicate ClassificationReferences
    #[arg(long)]
    dedupe_classifications: bool,

    /// Remove "-" placeholder properties
    #[arg(long)]
    remove_dash_props: bool,

    /// Remove spaces nothing references
    #[arg(long)]
    remove_unused_spaces: bool,

    /// Keep only the first owner history record
    #[arg(long)]
    remove_metadata: bool,

    /// Null out empty/default attribute values
    #[arg(long)]
    remove_empty_attributes: bool,

    /// Remove property sets with no attached properties
    #[arg(long)]
    remove_unused_property_sets: bool,

    /// Remove materials nothing references
    #[arg(long)]
    remove_unused_materials: bool,

    /// Remove classification references nothing references
    #[arg(long)]
    remove_unused_classifications: bool,

    /// Remove elements with a volume below this threshold (m^3)
    #[arg(long, value_name = "VOLUME")]
    remove_small_elements: Option<f64>,

    /// Remove entities nothing references
    #[arg(long)]
    remove_orphaned_entities: bool,

    /// Merge shape representations with identical item lists
    #[arg(long)]
    deduplicate_geometry: bool,

    /// Remove spatial elements that contain nothing
    #[arg(long)]
    flatten_spatial_structure: bool,

    /// Start from the conservative preset (non-lossy cleanups enabled)
    #[arg(long)]
    conservative: bool,

    /// Print the stats as JSON instead of one line per counter
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn options(&self) -> OptimizeOptions {
        let mut options = if self.conservative {
            OptimizeOptions::conservative()
        } else {
            OptimizeOptions::default()
        };

        options.convert_schema = self.convert_schema.clone();
        if self.lossy_rounding.is_some() {
            options.lossy_rounding = self.lossy_rounding;
        }
        if self.remove_small_elements.is_some() {
            options.remove_small_elements = self.remove_small_elements;
        }
        options.ifczip_compress |= self.ifczip_compress;
        options.merge_cartesian |= self.merge_cartesian;
        options.dedupe_property_sets |= self.dedupe_property_sets;
        options.dedupe_classifications |= self.dedupe_classifications;
        options.remove_dash_props |= self.remove_dash_props;
        options.remove_unused_spaces |= self.remove_unused_spaces;
        options.remove_metadata |= self.remove_metadata;
        options.remove_empty_attributes |= self.remove_empty_attributes;
        options.remove_unused_property_sets |= self.remove_unused_property_sets;
        options.remove_unused_materials |= self.remove_unused_materials;
        options.remove_unused_classifications |= self.remove_unused_classifications;
        options.remove_orphaned_entities |= self.remove_orphaned_entities;
        options.deduplicate_geometry |= self.deduplicate_geometry;
        options.flatten_spatial_structure |= self.flatten_spatial_structure;
        options
    }
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("optimization failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let options = cli.options();
    let input_size = file_size_mb(&cli.input)?;

    let stats = optimize(&cli.input, &cli.output, &options, &Externals::default())?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        for (key, count) in stats.iter() {
            println!("{key}: {count}");
        }
    }

    // report the archive when one was requested, the plain file otherwise
    let report_path = if options.ifczip_compress {
        ifczip_path(&cli.output)
    } else {
        cli.output.clone()
    };
    let output_size = file_size_mb(&report_path)?;
    let percent = if input_size > 0.0 {
        (1.0 - output_size / input_size) * 100.0
    } else {
        0.0
    };
    tracing::info!(
        output = %report_path.display(),
        input_mb = format!("{input_size:.2}"),
        output_mb = format!("{output_size:.2}"),
        reduction_percent = format!("{percent:.2}"),
        "optimized"
    );
    Ok(())
}

fn file_size_mb(path: &Path) -> anyhow::Result<f64> {
    let metadata =
        std::fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    Ok(metadata.len() as f64 / (1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_onto_options() {
        let cli = Cli::parse_from([
            "ifc-slim",
            "in.ifc",
            "out.ifc",
            "--merge-cartesian",
            "--lossy-rounding",
            "2",
            "--remove-small-elements",
            "0.001",
        ]);
        let options = cli.options();
        assert!(options.merge_cartesian);
        assert_eq!(options.lossy_rounding, Some(2));
        assert_eq!(options.remove_small_elements, Some(0.001));
        assert!(!options.remove_metadata);
    }

    #[test]
    fn test_conservative_combines_with_flags() {
        let cli = Cli::parse_from([
            "ifc-slim",
            "in.ifc",
            "out.ifc",
            "--conservative",
            "--remove-metadata",
        ]);
        let options = cli.options();
        assert!(options.merge_cartesian, "preset flag stays on");
        assert!(options.remove_metadata, "extra flag layered on top");
        assert!(options.lossy_rounding.is_none());
    }
}
