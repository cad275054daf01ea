// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fs::File;
use std::io::{BufReader, Write};

use phx_compat::phpp::xl::CellBook;
use phx_compat::{open_hbjson, open_wufi_xml, to_phpp, to_wufi_xml, ErrorCode};

const HOUSE_MODEL: &str = r#"{
    "identifier": "model_1",
    "display_name": "Test House",
    "units": "Meters",
    "properties": {
        "energy": {
            "materials": [
                {"type": "EnergyMaterial", "identifier": "concrete",
                 "thickness": 0.2, "conductivity": 1.8, "density": 2400.0,
                 "specific_heat": 880.0},
                {"type": "EnergyMaterialNoMass", "identifier": "batt_r13",
                 "r_value": 2.29}
            ],
            "constructions": [
                {"type": "OpaqueConstructionAbridged", "identifier": "ext_wall",
                 "materials": ["concrete", "batt_r13"]},
                {"type": "WindowConstructionAbridged", "identifier": "double_low_e",
                 "frame": {"width": 0.1, "u_factor": 1.2},
                 "glazing": {"u_factor": 0.9, "shgc": 0.4}}
            ]
        }
    },
    "rooms": [
        {
            "identifier": "room_1",
            "display_name": "Living",
            "properties": {"ph": {
                "ph_bldg_segment": {"identifier": "seg_a", "display_name": "Segment A"},
                "spaces": [{"name": "living", "floor_area": 20.0,
                            "weighted_floor_area": 18.0, "v_sup": 30.0}],
                "vent_sched": {"identifier": "vent_default",
                               "high": {"period_operating_hours": 24.0,
                                        "period_operation_speed": 1.0}}
            }},
            "faces": [
                {
                    "identifier": "face_1",
                    "face_type": "Wall",
                    "boundary_condition": {"type": "Outdoors"},
                    "geometry": {"boundary": [[0,0,0],[4,0,0],[4,0,2.5],[0,0,2.5]]},
                    "properties": {"energy": {"construction": "ext_wall"}},
                    "apertures": [
                        {
                            "identifier": "window_1",
                            "geometry": {"boundary": [[1,0,0.8],[2,0,0.8],[2,0,1.8],[1,0,1.8]]},
                            "properties": {"energy": {"construction": "double_low_e"}}
                        }
                    ]
                }
            ]
        },
        {
            "identifier": "room_2",
            "display_name": "Bedroom",
            "properties": {"ph": {
                "ph_bldg_segment": {"identifier": "seg_a"}
            }},
            "faces": [
                {
                    "identifier": "face_2",
                    "face_type": "Wall",
                    "boundary_condition": {"type": "Outdoors"},
                    "geometry": {"boundary": [[4,0,0],[8,0,0],[8,0,2.5],[4,0,2.5]]},
                    "properties": {"energy": {"construction": "ext_wall"}}
                }
            ]
        }
    ]
}"#;

fn imported_project() -> phx_compat::model::Project {
    let mut reader = BufReader::new(HOUSE_MODEL.as_bytes());
    open_hbjson(&mut reader).unwrap()
}

#[test]
fn wufi_roundtrip_through_a_file_preserves_the_tree() {
    let project = imported_project();
    let (xml, _) = to_wufi_xml(&project).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(xml.as_bytes()).unwrap();
    file.flush().unwrap();

    let reopened = File::open(file.path()).unwrap();
    let mut reader = BufReader::new(reopened);
    let reimported = open_wufi_xml(&mut reader).unwrap();

    assert_eq!(reimported.materials.len(), project.materials.len());
    assert_eq!(reimported.assembly_types.len(), project.assembly_types.len());
    assert_eq!(reimported.window_types.len(), project.window_types.len());
    assert_eq!(
        reimported.ventilation_patterns.len(),
        project.ventilation_patterns.len()
    );
    assert_eq!(reimported.segments().len(), 1);

    let before = &project.segments()[0];
    let after = &reimported.segments()[0];
    assert_eq!(after.name, before.name);
    assert_eq!(after.building.zones().len(), before.building.zones().len());
    assert_eq!(
        after.building.components().len(),
        before.building.components().len()
    );
    let windowed: Vec<_> = after
        .building
        .components()
        .iter()
        .filter(|c| !c.apertures().is_empty())
        .collect();
    assert_eq!(windowed.len(), 1);
    assert_eq!(windowed[0].apertures()[0].window_type_key, "double_low_e");
}

#[test]
fn shared_assembly_is_emitted_once_with_two_references() {
    let project = imported_project();
    let (xml, _) = to_wufi_xml(&project).unwrap();

    assert_eq!(xml.matches("<Assembly>").count(), 1);
    assert_eq!(xml.matches("<IdentNrAssembly>1</IdentNrAssembly>").count(), 2);

    // both referencing components observe the identical catalog entry
    let mut reader = BufReader::new(xml.as_bytes());
    let reimported = open_wufi_xml(&mut reader).unwrap();
    for component in reimported.segments()[0].building.components() {
        assert_eq!(component.assembly_key.as_deref(), Some("ext_wall"));
    }
}

#[test]
fn wufi_export_is_byte_identical() {
    let project = imported_project();
    let (first, _) = to_wufi_xml(&project).unwrap();
    let (second, _) = to_wufi_xml(&project).unwrap();
    assert_eq!(first, second);
}

#[test]
fn dangling_assembly_reference_aborts_reimport() {
    let project = imported_project();
    let (xml, _) = to_wufi_xml(&project).unwrap();
    let broken = xml.replace(
        "<IdentNrAssembly>1</IdentNrAssembly>",
        "<IdentNrAssembly>7</IdentNrAssembly>",
    );
    assert_ne!(xml, broken);

    let mut reader = BufReader::new(broken.as_bytes());
    let err = open_wufi_xml(&mut reader).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnresolvedReference);
    assert!(err.get_details().unwrap().contains("assembly"));
}

#[test]
fn dangling_hbjson_assembly_key_names_the_key() {
    let doc = HOUSE_MODEL.replace(
        "\"properties\": {\"energy\": {\"construction\": \"ext_wall\"}}",
        "\"properties\": {\"energy\": {\"construction\": \"no_such_assembly\"}}",
    );
    let mut reader = BufReader::new(doc.as_bytes());
    let err = open_hbjson(&mut reader).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnresolvedReference);
    assert!(err.get_details().unwrap().contains("no_such_assembly"));
}

#[test]
fn phpp_export_write_list_is_identical() {
    let project = imported_project();

    let mut first = CellBook::new();
    first.set_cell("Data", "B2", "9.6a EN");
    let warnings = to_phpp(&project, &mut first).unwrap();

    let mut second = CellBook::new();
    second.set_cell("Data", "B2", "9.6a EN");
    to_phpp(&project, &mut second).unwrap();

    assert_eq!(first.writes, second.writes);
    assert!(!first.writes.is_empty());
    // the aperture has no Areas row; the export still completes
    assert!(warnings.iter().any(|w| w.details.contains("window_1")));
}

#[test]
fn phpp_version_mismatch_is_fatal_before_writes() {
    let project = imported_project();
    let mut book = CellBook::new();
    book.set_cell("Data", "B2", "10.3 EN");
    let err = to_phpp(&project, &mut book).unwrap_err();
    assert_eq!(err.code, ErrorCode::WrongDocumentVersion);
    assert!(book.writes.is_empty());
}
