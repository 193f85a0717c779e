//! End-to-end round-trip coverage (seed scenario S5 plus invariant 1/4).

use idat::{ArrayMeta, FileHeader, Model, ProbeMatrix, RunInfoEntry, SectionCode, SectionEntry, SectionTable};
use std::io::Cursor;

fn minimal_model() -> Model {
    let header = FileHeader::new("IDAT".to_string(), 3).unwrap();

    let index_order: Vec<SectionEntry> = SectionCode::ALL
        .iter()
        .enumerate()
        .map(|(i, &code)| SectionEntry {
            code,
            file_offset: i as u64,
        })
        .collect();
    let sections = SectionTable::from_index_order(index_order);

    let probes = ProbeMatrix {
        probe_ids: vec![10, 20],
        std_devs: vec![1, 2],
        mean_intensities: vec![100, 200],
        n_beads: vec![3, 4],
        mid_block: vec![10, 20],
    };

    let meta = ArrayMeta::new(
        0,
        "manifest-name".to_string(),
        "203927450093".to_string(),
        "BeadChip 8x5".to_string(),
        "R01C01".to_string(),
        "old-manifest".to_string(),
        "sample-42".to_string(),
        "a test sample".to_string(),
        "plate-7".to_string(),
        "A01".to_string(),
        [9, 8, 7, 6],
        "opaque".to_string(),
    )
    .unwrap();

    Model::new(header, sections, 2, probes, meta, Vec::<RunInfoEntry>::new()).unwrap()
}

#[test]
fn s5_minimal_file_round_trips_byte_identically() {
    let model = minimal_model();

    let mut first_bytes = Vec::new();
    idat::write_to(&mut first_bytes, &model).unwrap();

    let parsed = idat::Reader::from_reader(Cursor::new(first_bytes.clone()))
        .read()
        .unwrap();

    let mut second_bytes = Vec::new();
    idat::write_to(&mut second_bytes, &parsed).unwrap();

    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn run_info_entries_survive_a_round_trip() {
    let mut model = minimal_model();
    model.run_info.push(RunInfoEntry {
        fields: [
            "Extract".to_string(),
            "2024-01-01".to_string(),
            "12:00".to_string(),
            "scanner-a".to_string(),
            "v1.0".to_string(),
        ],
    });

    let mut bytes = Vec::new();
    idat::write_to(&mut bytes, &model).unwrap();
    let parsed = idat::Reader::from_reader(Cursor::new(bytes)).read().unwrap();

    assert_eq!(parsed.run_info.len(), 1);
    assert_eq!(parsed.run_info[0].fields[0], "Extract");
    assert_eq!(parsed.run_info[0].fields[3], "scanner-a");
}

#[test]
fn large_unicode_strings_round_trip_through_the_varint_boundary() {
    let mut model = minimal_model();
    // Push the manifest past the one-byte varint boundary (127 bytes) so the
    // encoded length prefix grows to two bytes.
    model.meta.manifest = "\u{1F9EC}".repeat(40);

    let mut bytes = Vec::new();
    idat::write_to(&mut bytes, &model).unwrap();
    let parsed = idat::Reader::from_reader(Cursor::new(bytes)).read().unwrap();

    assert_eq!(parsed.meta.manifest, model.meta.manifest);
}
