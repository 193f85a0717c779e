//! Shared fixture used by unit tests across modules (seed scenario S5).

use crate::model::{ArrayMeta, FileHeader, Model, ProbeMatrix, RunInfoEntry, SectionEntry, SectionTable};
use crate::section::SectionCode;

/// Builds the minimal two-probe model described as S5 in the testable
/// properties: N=2, barcode "203927450093", chip_label "R01C01", empty run
/// info. Section order matches `SectionCode::ALL`.
pub fn minimal_model() -> Model {
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
        "manifest".to_string(),
        "203927450093".to_string(),
        "BeadChip 8x5".to_string(),
        "R01C01".to_string(),
        "old-style-manifest".to_string(),
        "sample-1".to_string(),
        "description".to_string(),
        "plate-1".to_string(),
        "A01".to_string(),
        [1, 0, 0, 0],
        "unknown-2".to_string(),
    )
    .unwrap();

    let run_info: Vec<RunInfoEntry> = Vec::new();

    Model::new(header, sections, 2, probes, meta, run_info).unwrap()
}
