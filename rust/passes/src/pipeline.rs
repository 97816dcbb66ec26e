// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline orchestrator.
//!
//! Sequences the text-level transforms, the graph passes and the output
//! boundary in one fixed order. Later passes observe the graph already
//! pruned by earlier ones — orphan removal in particular only catches what
//! the targeted prunes left behind. The whole pipeline runs synchronously
//! on the calling thread; the model is never shared.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use ifc_slim_core::{IfcType, Model};

use crate::convert::SchemaMigrator;
use crate::error::{OptimizeError, Result};
use crate::volume::VolumeSource;
use crate::{archive, cleanup, dedupe, prune, rounding, volume};

/// Flat pipeline configuration. Every switch defaults to off; absence of a
/// value means the corresponding step is skipped entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeOptions {
    /// Target schema for the external migrator (e.g. "IFC2X3", "IFC4")
    pub convert_schema: Option<String>,
    /// Decimal digits kept by the text-level coordinate rounding
    pub lossy_rounding: Option<u32>,
    /// Write a gzip `.ifczip` copy next to the output
    pub ifczip_compress: bool,
    pub merge_cartesian: bool,
    pub dedupe_property_sets: bool,
    pub dedupe_classifications: bool,
    pub remove_dash_props: bool,
    pub remove_unused_spaces: bool,
    pub remove_metadata: bool,
    pub remove_empty_attributes: bool,
    pub remove_unused_property_sets: bool,
    pub remove_unused_materials: bool,
    pub remove_unused_classifications: bool,
    /// Minimum volume; elements strictly below it are removed
    pub remove_small_elements: Option<f64>,
    pub remove_orphaned_entities: bool,
    pub deduplicate_geometry: bool,
    pub flatten_spatial_structure: bool,
    /// Sentinel value the placeholder cleaner matches against
    pub placeholder: String,
    /// Reference expansion depth of the structural key (0 = compare
    /// references by identifier)
    pub structural_key_depth: u32,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            convert_schema: None,
            lossy_rounding: None,
            ifczip_compress: false,
            merge_cartesian: false,
            dedupe_property_sets: false,
            dedupe_classifications: false,
            remove_dash_props: false,
            remove_unused_spaces: false,
            remove_metadata: false,
            remove_empty_attributes: false,
            remove_unused_property_sets: false,
            remove_unused_materials: false,
            remove_unused_classifications: false,
            remove_small_elements: None,
            remove_orphaned_entities: false,
            deduplicate_geometry: false,
            flatten_spatial_structure: false,
            placeholder: "-".to_string(),
            structural_key_depth: 0,
        }
    }
}

impl OptimizeOptions {
    /// Named preset: duplicate merging and unused-object pruning only,
    /// nothing lossy. Callers opt into this explicitly instead of getting
    /// an implicit fallback configuration.
    pub fn conservative() -> Self {
        Self {
            merge_cartesian: true,
            dedupe_property_sets: true,
            dedupe_classifications: true,
            remove_unused_property_sets: true,
            remove_unused_materials: true,
            remove_unused_classifications: true,
            remove_orphaned_entities: true,
            ..Self::default()
        }
    }
}

/// External collaborators the pipeline may call out to
#[derive(Default)]
pub struct Externals<'a> {
    pub schema_migrator: Option<&'a dyn SchemaMigrator>,
    pub volume_source: Option<&'a dyn VolumeSource>,
}

/// Per-pass counts, keyed by fixed stat names; present only for steps that
/// actually ran
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Stats(BTreeMap<&'static str, u64>);

impl Stats {
    /// Record a count under a stat key, adding to any earlier value
    pub fn record(&mut self, key: &'static str, count: usize) {
        *self.0.entry(key).or_insert(0) += count as u64;
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.0.iter().map(|(&key, &count)| (key, count))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Intermediate files from the text-level stages. Removed on drop so the
/// failure path cleans up too.
#[derive(Default)]
struct TempFiles(Vec<PathBuf>);

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in &self.0 {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove temp file");
                }
            }
        }
    }
}

/// Run the full optimization pipeline from `input_path` to `output_path`.
///
/// On success the transformed graph is committed to `output_path` (plus a
/// sibling `.ifczip` when compression is on) and the per-pass stats are
/// returned. On failure nothing is committed and intermediate files are
/// cleaned up.
pub fn optimize(
    input_path: &Path,
    output_path: &Path,
    options: &OptimizeOptions,
    externals: &Externals,
) -> Result<Stats> {
    let started = Instant::now();
    let mut temp = TempFiles::default();
    let mut current_input = input_path.to_path_buf();

    // 1. Optional schema conversion (external)
    if let Some(target) = &options.convert_schema {
        let migrator = externals.schema_migrator.ok_or(OptimizeError::NoMigrator)?;
        let raw = fs::read(&current_input).map_err(|e| OptimizeError::io(&current_input, e))?;
        let converted = migrator
            .migrate(&raw, target)
            .map_err(OptimizeError::SchemaConversion)?;
        let staged = append_suffix(&current_input, ".conv.ifc");
        fs::write(&staged, converted).map_err(|e| OptimizeError::io(&staged, e))?;
        temp.0.push(staged.clone());
        current_input = staged;
        tracing::info!(schema = %target, "schema conversion complete");
    }

    // 2. Optional lossy coordinate rounding (text level)
    if let Some(precision) = options.lossy_rounding {
        let raw =
            fs::read_to_string(&current_input).map_err(|e| OptimizeError::io(&current_input, e))?;
        let rounded = rounding::round_coordinates(&raw, precision);
        let staged = append_suffix(&current_input, ".round.ifc");
        fs::write(&staged, rounded).map_err(|e| OptimizeError::io(&staged, e))?;
        temp.0.push(staged.clone());
        current_input = staged;
        tracing::info!(precision, "applied lossy coordinate rounding");
    }

    // 3. Load the graph
    tracing::info!(input = %current_input.display(), "loading model");
    let mut model = Model::open(&current_input)?;
    tracing::info!(entities = model.len(), "model loaded");

    // 4. Graph passes, fixed order
    let mut stats = Stats::default();

    if options.merge_cartesian {
        stats.record("merged_points", dedupe::merge_cartesian_points(&mut model)?);
    }
    if options.dedupe_property_sets {
        stats.record(
            "dup_psets",
            dedupe::dedupe_by_structural_key(
                &mut model,
                &IfcType::IfcPropertySet,
                options.structural_key_depth,
            )?,
        );
    }
    if options.dedupe_classifications {
        stats.record(
            "dup_class",
            dedupe::dedupe_by_structural_key(
                &mut model,
                &IfcType::IfcClassificationReference,
                options.structural_key_depth,
            )?,
        );
    }
    if options.remove_dash_props {
        stats.record(
            "dash_props",
            cleanup::remove_placeholder_properties(&mut model, &options.placeholder)?,
        );
    }
    if options.remove_unused_spaces {
        stats.record("spaces", prune::remove_unused_spaces(&mut model)?);
    }
    if options.remove_metadata {
        stats.record("metadata", cleanup::remove_metadata(&mut model)?);
    }
    if options.remove_empty_attributes {
        stats.record("empty_attrs", cleanup::remove_empty_attributes(&mut model));
    }
    if options.remove_unused_property_sets {
        stats.record("psets_unused", prune::remove_unused_property_sets(&mut model));
    }
    if options.remove_unused_materials {
        stats.record("materials_unused", prune::remove_unused_materials(&mut model));
    }
    if options.remove_unused_classifications {
        stats.record("class_unused", prune::remove_unused_classifications(&mut model));
    }
    if let Some(min_volume) = options.remove_small_elements {
        match externals.volume_source {
            Some(source) => stats.record(
                "small_elems",
                volume::remove_small_elements(&mut model, min_volume, source),
            ),
            None => {
                tracing::warn!("no volume source configured, small-element removal skipped");
                stats.record("small_elems", 0);
            }
        }
    }
    if options.remove_orphaned_entities {
        stats.record("orphans", prune::remove_orphaned_entities(&mut model));
    }
    if options.deduplicate_geometry {
        stats.record("dup_geo", dedupe::deduplicate_geometry(&mut model));
    }
    if options.flatten_spatial_structure {
        stats.record("spatial", prune::flatten_spatial_structure(&mut model));
    }

    // 5. Commit: serialize to a staging sibling, then rename into place so
    //    no partial output ever lands on the final path
    let staged = append_suffix(output_path, ".tmp");
    temp.0.push(staged.clone());
    model.write(&staged)?;
    fs::rename(&staged, output_path).map_err(|e| OptimizeError::io(output_path, e))?;

    if options.ifczip_compress {
        let zip_path = ifczip_path(output_path);
        archive::write_ifczip(output_path, &zip_path)
            .map_err(|e| OptimizeError::io(&zip_path, e))?;
        tracing::info!(path = %zip_path.display(), "wrote ifczip archive");
    }

    tracing::info!(
        output = %output_path.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "optimization complete"
    );
    Ok(stats)
}

/// Path of the archival copy written next to `output_path`
pub fn ifczip_path(output_path: &Path) -> PathBuf {
    append_suffix(output_path, ".ifczip")
}

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}
