//! The in-memory representation of a parsed IDAT file, and the constructors
//! that enforce its per-field and cross-section invariants.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{InvariantError, Result};
use crate::section::SectionCode;

/// Implementation-chosen ceiling bounding vector allocations before any large
/// allocation is attempted, per the file-declared probe count.
pub const MAX_PROBES: u32 = 1 << 24;

/// Same kind of ceiling for `ARRAY_RUN_INFO`'s file-declared entry count,
/// which is not bounded by `n_probes`.
pub const MAX_RUN_INFO_ENTRIES: u32 = 1 << 20;

fn barcode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+$").unwrap())
}

fn chip_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^R[0-9]+C[0-9]+$").unwrap())
}

const SUPPORTED_CHIP_TYPE: &str = "BeadChip 8x5";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: String,
    pub version: u64,
}

impl FileHeader {
    pub fn new(magic: String, version: u64) -> Result<Self> {
        if magic != "IDAT" {
            return Err(crate::error::FormatError::BadMagic {
                found: {
                    let mut bytes = [0u8; 4];
                    let src = magic.as_bytes();
                    let n = src.len().min(4);
                    bytes[..n].copy_from_slice(&src[..n]);
                    bytes
                },
            }
            .into());
        }
        if version != 3 {
            return Err(crate::error::FormatError::UnsupportedVersion { found: version }.into());
        }
        Ok(Self { magic, version })
    }
}

/// A single entry in the file's table of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    pub code: SectionCode,
    pub file_offset: u64,
}

/// The two preserved orderings of the section table: the order entries appear
/// in the table of contents, and the order their bodies appear in the file.
#[derive(Debug, Clone, Default)]
pub struct SectionTable {
    pub index_order: Vec<SectionEntry>,
    pub physical_order: Vec<SectionEntry>,
}

impl SectionTable {
    pub fn from_index_order(index_order: Vec<SectionEntry>) -> Self {
        let mut physical_order = index_order.clone();
        physical_order.sort_by_key(|e| e.file_offset);
        Self {
            index_order,
            physical_order,
        }
    }
}

/// Record-of-arrays per-probe columns: each column serializes contiguously,
/// matching the on-disk columnar layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeMatrix {
    pub probe_ids: Vec<u32>,
    pub std_devs: Vec<u16>,
    pub mean_intensities: Vec<u16>,
    pub n_beads: Vec<u8>,
    pub mid_block: Vec<u32>,
}

impl ProbeMatrix {
    pub fn len(&self) -> usize {
        self.probe_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probe_ids.is_empty()
    }

    /// Validates strictly-increasing probe ids and probe_ids == mid_block
    /// pointwise, per spec invariants 5 and the PROBE_MID_BLOCK contract.
    pub fn validate(&self) -> Result<()> {
        if let Some(&first) = self.probe_ids.first() {
            if first == 0 {
                return Err(InvariantError::ProbeIdsNotIncreasing {
                    index: 0,
                    prev: 0,
                    next: first,
                }
                .into());
            }
        }
        for (i, w) in self.probe_ids.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(InvariantError::ProbeIdsNotIncreasing {
                    index: i + 1,
                    prev: w[0],
                    next: w[1],
                }
                .into());
            }
        }
        if self.mid_block.len() != self.probe_ids.len() {
            return Err(InvariantError::MidBlockCountMismatch {
                expected: self.probe_ids.len() as u32,
                found: self.mid_block.len() as u32,
            }
            .into());
        }
        for (i, (id, mid)) in self.probe_ids.iter().zip(self.mid_block.iter()).enumerate() {
            if id != mid {
                return Err(InvariantError::MidBlockMismatch {
                    index: i,
                    mid_block: *mid,
                    probe_id: *id,
                }
                .into());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayMeta {
    pub red_green: u32,
    pub manifest: String,
    pub barcode: String,
    pub chip_type: String,
    pub chip_label: String,
    pub old_style_manifest: String,
    pub sample_id: String,
    pub description: String,
    pub plate: String,
    pub well: String,
    pub unknown_1: [u8; 4],
    pub unknown_2: String,
}

impl ArrayMeta {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        red_green: u32,
        manifest: String,
        barcode: String,
        chip_type: String,
        chip_label: String,
        old_style_manifest: String,
        sample_id: String,
        description: String,
        plate: String,
        well: String,
        unknown_1: [u8; 4],
        unknown_2: String,
    ) -> Result<Self> {
        if !barcode_regex().is_match(&barcode) {
            return Err(InvariantError::BadBarcode { value: barcode }.into());
        }
        if !chip_label_regex().is_match(&chip_label) {
            return Err(InvariantError::BadChipLabel { value: chip_label }.into());
        }
        if chip_type != SUPPORTED_CHIP_TYPE {
            return Err(InvariantError::UnsupportedChipType { value: chip_type }.into());
        }
        Ok(Self {
            red_green,
            manifest,
            barcode,
            chip_type,
            chip_label,
            old_style_manifest,
            sample_id,
            description,
            plate,
            well,
            unknown_1,
            unknown_2,
        })
    }
}

/// One entry of `ARRAY_RUN_INFO`: five consecutive length-prefixed strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunInfoEntry {
    pub fields: [String; 5],
}

/// A fully populated, validated IDAT sample.
#[derive(Debug, Clone)]
pub struct Model {
    pub header: FileHeader,
    pub sections: SectionTable,
    pub n_probes: u32,
    pub probes: ProbeMatrix,
    pub meta: ArrayMeta,
    pub run_info: Vec<RunInfoEntry>,
}

impl Model {
    /// Assembles and cross-validates a Model. This is the single place the
    /// probe-count-matches-matrix-rows invariant is enforced.
    pub fn new(
        header: FileHeader,
        sections: SectionTable,
        n_probes: u32,
        probes: ProbeMatrix,
        meta: ArrayMeta,
        run_info: Vec<RunInfoEntry>,
    ) -> Result<Self> {
        if n_probes > MAX_PROBES {
            return Err(InvariantError::ProbeCountTooLarge(n_probes, MAX_PROBES).into());
        }
        if run_info.len() as u32 > MAX_RUN_INFO_ENTRIES {
            return Err(InvariantError::RunInfoCountTooLarge(
                run_info.len() as u32,
                MAX_RUN_INFO_ENTRIES,
            )
            .into());
        }
        if probes.len() as u32 != n_probes {
            return Err(InvariantError::ProbeCountMismatch {
                rows: probes.len() as u32,
                n_probes,
            }
            .into());
        }
        probes.validate()?;
        Ok(Self {
            header,
            sections,
            n_probes,
            probes,
            meta,
            run_info,
        })
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# manifest:             '{}'", self.meta.manifest)?;
        writeln!(
            f,
            "# manifest (old style): '{}'",
            self.meta.old_style_manifest
        )?;
        writeln!(f, "# sample id:            '{}'", self.meta.sample_id)?;
        writeln!(f, "# description:          '{}'", self.meta.description)?;
        writeln!(f, "# plate:                '{}'", self.meta.plate)?;
        writeln!(f, "# well:                 '{}'", self.meta.well)?;
        writeln!(f, "# unknown #2:           '{}'", self.meta.unknown_2)?;
        writeln!(f, "# run info entries:     {}", self.run_info.len())?;
        write!(
            f,
            "\n{} v{}: {}_{} (R/G: {}, {}) [{} probes]",
            self.header.magic,
            self.header.version,
            self.meta.barcode,
            self.meta.chip_label,
            self.meta.red_green,
            self.meta.chip_type,
            self.n_probes
        )
    }
}
