use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong reading, writing or mixing an IDAT file.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("usage error: {0}")]
    Usage(#[from] UsageError),
}

#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("bad magic: expected \"IDAT\", found {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("unsupported version: expected 3, found {found}")]
    UnsupportedVersion { found: u64 },

    #[error("unknown section code {code} at table entry {index}")]
    UnknownSectionCode { code: u16, index: usize },

    #[error("string length {found} exceeds the implementation ceiling of {limit}")]
    StringLengthOverflow { found: u64, limit: u64 },

    #[error("string body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

#[derive(thiserror::Error, Debug)]
pub enum InvariantError {
    #[error("probe ids are not strictly increasing at index {index} ({prev} >= {next})")]
    ProbeIdsNotIncreasing { index: usize, prev: u32, next: u32 },

    #[error("probe_mid_block count {found} does not equal declared probe count {expected}")]
    MidBlockCountMismatch { expected: u32, found: u32 },

    #[error(
        "probe_mid_block differs from probe_ids at index {index} ({mid_block} != {probe_id})"
    )]
    MidBlockMismatch {
        index: usize,
        mid_block: u32,
        probe_id: u32,
    },

    #[error("ProbeMatrix has {rows} rows but n_probes is {n_probes}")]
    ProbeCountMismatch { rows: u32, n_probes: u32 },

    #[error("barcode {value:?} does not match ^[0-9]+$")]
    BadBarcode { value: String },

    #[error("chip label {value:?} does not match ^R[0-9]+C[0-9]+$")]
    BadChipLabel { value: String },

    #[error("unsupported chip type {value:?}, only \"BeadChip 8x5\" is supported")]
    UnsupportedChipType { value: String },

    #[error("probe count {0} exceeds the implementation ceiling of {1}")]
    ProbeCountTooLarge(u32, u32),

    #[error("run info entry count {0} exceeds the implementation ceiling of {1}")]
    RunInfoCountTooLarge(u32, u32),
}

#[derive(thiserror::Error, Debug)]
pub enum UsageError {
    #[error("mixer fraction {0} is outside [0, 1]")]
    FractionOutOfRange(f64),

    #[error("incompatible magic between reference and admixture samples")]
    IncompatibleMagic,

    #[error("incompatible version between reference and admixture samples")]
    IncompatibleVersion,

    #[error("incompatible chip type between reference and admixture samples")]
    IncompatibleChipType,

    #[error(
        "reference and admixture samples have different probe counts ({reference} != {admixture})"
    )]
    ProbeCountMismatch { reference: u32, admixture: u32 },

    #[error("reference and admixture samples address different probes at index {index}")]
    ProbeIdentityMismatch { index: usize },
}
