// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end pipeline tests over on-disk fixtures.

use std::fs;
use std::path::PathBuf;

use ifc_slim_core::Model;
use ifc_slim_passes::{ifczip_path, optimize, Externals, OptimizeOptions, SchemaMigrator};

const FIXTURE: &str = "\
ISO-10303-21;
HEADER;
FILE_DESCRIPTION((''),'2;1');
FILE_NAME('fixture.ifc','',(''),(''),'','','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('proj',#2,'Project',$,$,$,$,$,$);
#2=IFCOWNERHISTORY($,$,$,$,$,$,$,$);
#3=IFCOWNERHISTORY($,$,$,$,$,$,$,$);
#4=IFCBUILDING('bldg',#2,'Building',$,$,$,$,$,.ELEMENT.,$,$,$);
#5=IFCRELAGGREGATES('agg',#2,$,$,#1,(#4));
#6=IFCWALL('wall1',#3,'Wall',$,$,$,$,$);
#7=IFCRELCONTAINEDINSPATIALSTRUCTURE('cont',#2,$,$,(#6),#4);
#10=IFCCARTESIANPOINT((1.00001,2.,3.));
#11=IFCCARTESIANPOINT((1.,2.,3.));
#12=IFCAXIS2PLACEMENT3D(#10,$,$);
#13=IFCAXIS2PLACEMENT3D(#11,$,$);
#20=IFCSPACE('space',#2,'Lonely',$,$,#21,$,$,.ELEMENT.,.INTERNAL.,$);
#21=IFCLOCALPLACEMENT($,$);
#30=IFCPROPERTYSET('pset1',#2,'Pset_Dash',$,(#31));
#31=IFCPROPERTYSINGLEVALUE('Status',$,IFCTEXT('-'),$);
#32=IFCRELDEFINESBYPROPERTIES('def',#2,$,$,(#6),#30);
#40=IFCMATERIAL('Unused material');
ENDSEC;
END-ISO-10303-21;
";

fn scratch(tag: &str) -> (PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!("ifc-slim-test-{}-{}", tag, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    (dir.join("input.ifc"), dir.join("output.ifc"))
}

#[test]
fn full_pipeline_run() {
    let (input, output) = scratch("full");
    fs::write(&input, FIXTURE).unwrap();

    let options = OptimizeOptions {
        lossy_rounding: Some(2),
        ifczip_compress: true,
        merge_cartesian: true,
        remove_dash_props: true,
        remove_unused_spaces: true,
        remove_metadata: true,
        remove_unused_materials: true,
        remove_orphaned_entities: true,
        ..OptimizeOptions::default()
    };

    let stats = optimize(&input, &output, &options, &Externals::default()).unwrap();

    // the two points only coincide after rounding
    assert_eq!(stats.get("merged_points"), Some(1));
    assert_eq!(stats.get("dash_props"), Some(1));
    assert_eq!(stats.get("spaces"), Some(1));
    assert_eq!(stats.get("metadata"), Some(1));
    assert_eq!(stats.get("materials_unused"), Some(1));
    // the two axis placements and the space's placement end up orphaned
    assert_eq!(stats.get("orphans"), Some(3));
    // disabled steps contribute nothing
    assert_eq!(stats.get("dup_psets"), None);

    let result = Model::open(&output).unwrap();
    assert!(result.verify_integrity().is_empty());
    for gone in [3, 11, 12, 13, 20, 21, 30, 31, 32, 40] {
        assert!(result.get(gone).is_none(), "#{} should be gone", gone);
    }
    for kept in [1, 2, 4, 5, 6, 7, 10] {
        assert!(result.get(kept).is_some(), "#{} should survive", kept);
    }
    // the surviving wall was retargeted onto the senior history
    assert_eq!(result.get(6).unwrap().get_ref(1), Some(2));
    // coordinates carry the rounded values
    assert_eq!(
        result.get(10).unwrap().coordinates().unwrap().as_slice(),
        &[1.0, 2.0, 3.0]
    );

    // archival copy, gzip magic
    let zipped = fs::read(ifczip_path(&output)).unwrap();
    assert_eq!(&zipped[..2], &[0x1f, 0x8b]);

    // the rounding temp file was cleaned up
    let mut round_tmp = input.as_os_str().to_os_string();
    round_tmp.push(".round.ifc");
    assert!(!PathBuf::from(round_tmp).exists());
}

#[test]
fn disabled_pipeline_is_a_copy_with_stats_empty() {
    let (input, output) = scratch("noop");
    fs::write(&input, FIXTURE).unwrap();

    let stats = optimize(
        &input,
        &output,
        &OptimizeOptions::default(),
        &Externals::default(),
    )
    .unwrap();

    assert!(stats.is_empty());
    let result = Model::open(&output).unwrap();
    assert_eq!(result.len(), 17);
    assert!(result.verify_integrity().is_empty());
}

#[test]
fn conservative_preset_keeps_structure() {
    let (input, output) = scratch("conservative");
    fs::write(&input, FIXTURE).unwrap();

    let stats = optimize(
        &input,
        &output,
        &OptimizeOptions::conservative(),
        &Externals::default(),
    )
    .unwrap();

    // exact coordinates differ, nothing merges without rounding
    assert_eq!(stats.get("merged_points"), Some(0));

    let result = Model::open(&output).unwrap();
    assert!(result.verify_integrity().is_empty());
    // spatial containment intact
    for kept in [1, 4, 5, 6, 7] {
        assert!(result.get(kept).is_some(), "#{} should survive", kept);
    }
}

#[test]
fn schema_conversion_requires_a_migrator() {
    let (input, output) = scratch("nomigrator");
    fs::write(&input, FIXTURE).unwrap();

    let options = OptimizeOptions {
        convert_schema: Some("IFC2X3".to_string()),
        ..OptimizeOptions::default()
    };
    let result = optimize(&input, &output, &options, &Externals::default());

    assert!(result.is_err());
    assert!(!output.exists(), "nothing committed on failure");
}

#[test]
fn schema_migrator_runs_first() {
    struct Passthrough;
    impl SchemaMigrator for Passthrough {
        fn migrate(&self, input: &[u8], target_schema: &str) -> Result<Vec<u8>, String> {
            assert_eq!(target_schema, "IFC4");
            Ok(input.to_vec())
        }
    }

    let (input, output) = scratch("migrator");
    fs::write(&input, FIXTURE).unwrap();

    let options = OptimizeOptions {
        convert_schema: Some("IFC4".to_string()),
        ..OptimizeOptions::default()
    };
    let externals = Externals {
        schema_migrator: Some(&Passthrough),
        ..Externals::default()
    };

    optimize(&input, &output, &options, &externals).unwrap();
    assert!(output.exists());

    // conversion temp file cleaned up
    let mut conv_tmp = input.as_os_str().to_os_string();
    conv_tmp.push(".conv.ifc");
    assert!(!PathBuf::from(conv_tmp).exists());
}

#[test]
fn failing_migrator_aborts_before_anything_is_written() {
    struct Broken;
    impl SchemaMigrator for Broken {
        fn migrate(&self, _input: &[u8], _target_schema: &str) -> Result<Vec<u8>, String> {
            Err("unsupported schema".to_string())
        }
    }

    let (input, output) = scratch("brokenmigrator");
    fs::write(&input, FIXTURE).unwrap();

    let options = OptimizeOptions {
        convert_schema: Some("IFC9X9".to_string()),
        ..OptimizeOptions::default()
    };
    let externals = Externals {
        schema_migrator: Some(&Broken),
        ..Externals::default()
    };

    let err = optimize(&input, &output, &options, &externals).unwrap_err();
    assert!(err.to_string().contains("schema conversion failed"));
    assert!(!output.exists());
}

#[test]
fn malformed_input_fails_before_mutation() {
    let (input, output) = scratch("malformed");
    fs::write(&input, "DATA;\n#1=IFCWALL('unterminated;\n").unwrap();

    let result = optimize(
        &input,
        &output,
        &OptimizeOptions::default(),
        &Externals::default(),
    );

    assert!(result.is_err());
    assert!(!output.exists());
}
