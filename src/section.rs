//! The section registry: numeric codes drawn straight off the wire, their
//! symbolic names, and the per-section body shape a decoder/encoder needs.
//!
//! A single enum with `TryFrom<u16>`/`From<SectionCode> for u16` stands in for
//! what the original tooling kept as two parallel name<->code dictionaries.

use crate::error::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionCode {
    ProbeIds,
    ProbeStdDevs,
    ProbeMeanIntensities,
    ProbeNBeads,
    ProbeMidBlock,
    ArrayRunInfo,
    ArrayRedGreen,
    ArrayManifest,
    ArrayBarcode,
    ArrayChipType,
    ArrayChipLabel,
    ArrayOldStyleManifest,
    ArraySampleId,
    ArrayDescription,
    ArrayPlate,
    ArrayWell,
    ArrayUnknown1,
    ArrayUnknown2,
    ArrayNProbes,
}

/// The decode/encode strategy for a section's body, independent of its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// A single little-endian u32.
    ScalarU32,
    /// A length-prefixed UTF-8 string.
    StringScalar,
    /// Four raw bytes, opaque.
    FixedTuple4,
    /// `element_size * n_probes` bytes of little-endian elements.
    NumericVector { element_size: u8 },
    /// A u32 count prefix (expected to equal n_probes) then that many u32s.
    SizedVector,
    /// A u32 count then that many 5-tuples of length-prefixed strings.
    RunInfoList,
}

impl SectionCode {
    pub const ALL: [SectionCode; 19] = [
        SectionCode::ProbeIds,
        SectionCode::ProbeStdDevs,
        SectionCode::ProbeMeanIntensities,
        SectionCode::ProbeNBeads,
        SectionCode::ProbeMidBlock,
        SectionCode::ArrayRunInfo,
        SectionCode::ArrayRedGreen,
        SectionCode::ArrayManifest,
        SectionCode::ArrayBarcode,
        SectionCode::ArrayChipType,
        SectionCode::ArrayChipLabel,
        SectionCode::ArrayOldStyleManifest,
        SectionCode::ArraySampleId,
        SectionCode::ArrayDescription,
        SectionCode::ArrayPlate,
        SectionCode::ArrayWell,
        SectionCode::ArrayUnknown1,
        SectionCode::ArrayUnknown2,
        SectionCode::ArrayNProbes,
    ];

    pub fn code(self) -> u16 {
        match self {
            SectionCode::ProbeIds => 102,
            SectionCode::ProbeStdDevs => 103,
            SectionCode::ProbeMeanIntensities => 104,
            SectionCode::ProbeNBeads => 107,
            SectionCode::ProbeMidBlock => 200,
            SectionCode::ArrayRunInfo => 300,
            SectionCode::ArrayRedGreen => 400,
            SectionCode::ArrayManifest => 401,
            SectionCode::ArrayBarcode => 402,
            SectionCode::ArrayChipType => 403,
            SectionCode::ArrayChipLabel => 404,
            SectionCode::ArrayOldStyleManifest => 405,
            SectionCode::ArraySampleId => 406,
            SectionCode::ArrayDescription => 407,
            SectionCode::ArrayPlate => 408,
            SectionCode::ArrayWell => 409,
            SectionCode::ArrayUnknown1 => 410,
            SectionCode::ArrayUnknown2 => 510,
            SectionCode::ArrayNProbes => 1000,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SectionCode::ProbeIds => "PROBE_IDS",
            SectionCode::ProbeStdDevs => "PROBE_STD_DEVS",
            SectionCode::ProbeMeanIntensities => "PROBE_MEAN_INTENSITIES",
            SectionCode::ProbeNBeads => "PROBE_N_BEADS",
            SectionCode::ProbeMidBlock => "PROBE_MID_BLOCK",
            SectionCode::ArrayRunInfo => "ARRAY_RUN_INFO",
            SectionCode::ArrayRedGreen => "ARRAY_RED_GREEN",
            SectionCode::ArrayManifest => "ARRAY_MANIFEST",
            SectionCode::ArrayBarcode => "ARRAY_BARCODE",
            SectionCode::ArrayChipType => "ARRAY_CHIP_TYPE",
            SectionCode::ArrayChipLabel => "ARRAY_CHIP_LABEL",
            SectionCode::ArrayOldStyleManifest => "ARRAY_OLD_STYLE_MANIFEST",
            SectionCode::ArraySampleId => "ARRAY_SAMPLE_ID",
            SectionCode::ArrayDescription => "ARRAY_DESCRIPTION",
            SectionCode::ArrayPlate => "ARRAY_PLATE",
            SectionCode::ArrayWell => "ARRAY_WELL",
            SectionCode::ArrayUnknown1 => "ARRAY_UNKNOWN_1",
            SectionCode::ArrayUnknown2 => "ARRAY_UNKNOWN_2",
            SectionCode::ArrayNProbes => "ARRAY_N_PROBES",
        }
    }

    pub fn body_kind(self) -> BodyKind {
        match self {
            SectionCode::ProbeIds => BodyKind::NumericVector { element_size: 4 },
            SectionCode::ProbeStdDevs => BodyKind::NumericVector { element_size: 2 },
            SectionCode::ProbeMeanIntensities => BodyKind::NumericVector { element_size: 2 },
            SectionCode::ProbeNBeads => BodyKind::NumericVector { element_size: 1 },
            SectionCode::ProbeMidBlock => BodyKind::SizedVector,
            SectionCode::ArrayRunInfo => BodyKind::RunInfoList,
            SectionCode::ArrayRedGreen => BodyKind::ScalarU32,
            SectionCode::ArrayManifest
            | SectionCode::ArrayBarcode
            | SectionCode::ArrayChipType
            | SectionCode::ArrayChipLabel
            | SectionCode::ArrayOldStyleManifest
            | SectionCode::ArraySampleId
            | SectionCode::ArrayDescription
            | SectionCode::ArrayPlate
            | SectionCode::ArrayWell
            | SectionCode::ArrayUnknown2 => BodyKind::StringScalar,
            SectionCode::ArrayUnknown1 => BodyKind::FixedTuple4,
            SectionCode::ArrayNProbes => BodyKind::ScalarU32,
        }
    }
}

impl TryFrom<u16> for SectionCode {
    type Error = FormatError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        SectionCode::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(FormatError::UnknownSectionCode { code, index: 0 })
    }
}

impl From<SectionCode> for u16 {
    fn from(section: SectionCode) -> u16 {
        section.code()
    }
}
