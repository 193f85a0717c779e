//! Opens an IDAT file, walks its table of contents, and populates a [`Model`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{FormatError, InvariantError, Result};
use crate::model::{
    ArrayMeta, FileHeader, Model, ProbeMatrix, RunInfoEntry, SectionEntry, SectionTable,
    MAX_PROBES, MAX_RUN_INFO_ENTRIES,
};
use crate::primitives;
use crate::section::SectionCode;

/// Reads an IDAT file end to end from a `Read + Seek` source, seeking to each
/// section's recorded offset before reading its body rather than assuming
/// streaming adjacency.
pub struct Reader<R> {
    inner: R,
}

impl Reader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        trace!("opening IDAT file {}", path.as_ref().display());
        let file = File::open(path)?;
        Ok(Self {
            inner: BufReader::new(file),
        })
    }
}

impl<R: Read + Seek> Reader<R> {
    pub fn from_reader(inner: R) -> Self {
        Self { inner }
    }

    pub fn read(&mut self) -> Result<Model> {
        let header = self.read_header()?;
        let (index_order, offsets) = self.read_section_table()?;
        let sections = SectionTable::from_index_order(index_order);

        let n_probes_offset = *offsets
            .get(&SectionCode::ArrayNProbes)
            .ok_or(FormatError::UnknownSectionCode {
                code: SectionCode::ArrayNProbes.code(),
                index: 0,
            })?;
        self.inner.seek(SeekFrom::Start(n_probes_offset))?;
        let n_probes = primitives::read_u32(&mut self.inner)?;
        debug!("n_probes = {}", n_probes);
        if n_probes > MAX_PROBES {
            return Err(InvariantError::ProbeCountTooLarge(n_probes, MAX_PROBES).into());
        }

        let probes = self.read_probe_matrix(&offsets, n_probes)?;
        let meta = self.read_array_meta(&offsets)?;
        let run_info = self.read_run_info(&offsets)?;

        Model::new(header, sections, n_probes, probes, meta, run_info)
    }

    fn read_header(&mut self) -> Result<FileHeader> {
        self.inner.seek(SeekFrom::Start(0))?;
        let magic = primitives::read_char_block(&mut self.inner, 4)?;
        self.inner.seek(SeekFrom::Start(4))?;
        let version = primitives::read_u64(&mut self.inner)?;
        FileHeader::new(magic, version)
    }

    fn read_section_table(
        &mut self,
    ) -> Result<(Vec<SectionEntry>, HashMap<SectionCode, u64>)> {
        self.inner.seek(SeekFrom::Start(12))?;
        let k = primitives::read_u32(&mut self.inner)?;

        self.inner.seek(SeekFrom::Start(16))?;
        let mut index_order = Vec::with_capacity(k as usize);
        let mut offsets = HashMap::with_capacity(k as usize);
        for i in 0..k as usize {
            let raw_code = primitives::read_u16(&mut self.inner)?;
            let file_offset = primitives::read_u64(&mut self.inner)?;
            let code = SectionCode::try_from(raw_code)
                .map_err(|_| FormatError::UnknownSectionCode { code: raw_code, index: i })?;
            index_order.push(SectionEntry { code, file_offset });
            offsets.insert(code, file_offset);
        }
        Ok((index_order, offsets))
    }

    fn seek_to(&mut self, offsets: &HashMap<SectionCode, u64>, section: SectionCode) -> Result<()> {
        let offset = *offsets
            .get(&section)
            .ok_or(FormatError::UnknownSectionCode {
                code: section.code(),
                index: 0,
            })?;
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn read_probe_matrix(
        &mut self,
        offsets: &HashMap<SectionCode, u64>,
        n_probes: u32,
    ) -> Result<ProbeMatrix> {
        let n = n_probes as usize;

        self.seek_to(offsets, SectionCode::ProbeIds)?;
        let probe_ids = self.read_u32_vector(n)?;

        self.seek_to(offsets, SectionCode::ProbeStdDevs)?;
        let std_devs = self.read_u16_vector(n)?;

        self.seek_to(offsets, SectionCode::ProbeMeanIntensities)?;
        let mean_intensities = self.read_u16_vector(n)?;

        self.seek_to(offsets, SectionCode::ProbeNBeads)?;
        let n_beads = self.read_u8_vector(n)?;

        self.seek_to(offsets, SectionCode::ProbeMidBlock)?;
        let mid_block_count = primitives::read_u32(&mut self.inner)?;
        if mid_block_count != n_probes {
            return Err(InvariantError::MidBlockCountMismatch {
                expected: n_probes,
                found: mid_block_count,
            }
            .into());
        }
        let mid_block = self.read_u32_vector(n)?;

        let matrix = ProbeMatrix {
            probe_ids,
            std_devs,
            mean_intensities,
            n_beads,
            mid_block,
        };
        matrix.validate()?;
        Ok(matrix)
    }

    fn read_u8_vector(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_u16_vector(&mut self, n: usize) -> Result<Vec<u16>> {
        let mut raw = vec![0u8; n * 2];
        self.inner.read_exact(&mut raw)?;
        Ok(raw.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect())
    }

    fn read_u32_vector(&mut self, n: usize) -> Result<Vec<u32>> {
        let mut raw = vec![0u8; n * 4];
        self.inner.read_exact(&mut raw)?;
        Ok(raw
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    fn read_array_meta(&mut self, offsets: &HashMap<SectionCode, u64>) -> Result<ArrayMeta> {
        self.seek_to(offsets, SectionCode::ArrayRedGreen)?;
        let red_green = primitives::read_u32(&mut self.inner)?;

        self.seek_to(offsets, SectionCode::ArrayManifest)?;
        let manifest = primitives::read_string(&mut self.inner)?;

        self.seek_to(offsets, SectionCode::ArrayBarcode)?;
        let barcode = primitives::read_string(&mut self.inner)?;

        self.seek_to(offsets, SectionCode::ArrayChipType)?;
        let chip_type = primitives::read_string(&mut self.inner)?;

        self.seek_to(offsets, SectionCode::ArrayChipLabel)?;
        let chip_label = primitives::read_string(&mut self.inner)?;

        self.seek_to(offsets, SectionCode::ArrayOldStyleManifest)?;
        let old_style_manifest = primitives::read_string(&mut self.inner)?;

        self.seek_to(offsets, SectionCode::ArrayUnknown1)?;
        let mut unknown_1 = [0u8; 4];
        self.inner.read_exact(&mut unknown_1)?;

        self.seek_to(offsets, SectionCode::ArraySampleId)?;
        let sample_id = primitives::read_string(&mut self.inner)?;

        self.seek_to(offsets, SectionCode::ArrayDescription)?;
        let description = primitives::read_string(&mut self.inner)?;

        self.seek_to(offsets, SectionCode::ArrayPlate)?;
        let plate = primitives::read_string(&mut self.inner)?;

        self.seek_to(offsets, SectionCode::ArrayWell)?;
        let well = primitives::read_string(&mut self.inner)?;

        self.seek_to(offsets, SectionCode::ArrayUnknown2)?;
        let unknown_2 = primitives::read_string(&mut self.inner)?;

        ArrayMeta::new(
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
        )
    }

    fn read_run_info(&mut self, offsets: &HashMap<SectionCode, u64>) -> Result<Vec<RunInfoEntry>> {
        self.seek_to(offsets, SectionCode::ArrayRunInfo)?;
        let count = primitives::read_u32(&mut self.inner)?;
        if count > MAX_RUN_INFO_ENTRIES {
            return Err(InvariantError::RunInfoCountTooLarge(count, MAX_RUN_INFO_ENTRIES).into());
        }
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let fields = [
                primitives::read_string(&mut self.inner)?,
                primitives::read_string(&mut self.inner)?,
                primitives::read_string(&mut self.inner)?,
                primitives::read_string(&mut self.inner)?,
                primitives::read_string(&mut self.inner)?,
            ];
            entries.push(RunInfoEntry { fields });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::write_to;
    use std::io::Cursor;

    #[test]
    fn reads_a_round_tripped_minimal_file() {
        let model = crate::test_support::minimal_model();
        let mut buf = Vec::new();
        write_to(&mut buf, &model).unwrap();
        let mut reader = Reader::from_reader(Cursor::new(buf));
        let parsed = reader.read().unwrap();
        assert_eq!(parsed.n_probes, 2);
        assert_eq!(parsed.probes.probe_ids, vec![10, 20]);
        assert_eq!(parsed.meta.barcode, "203927450093");
    }

    #[test]
    fn s1_bad_magic_is_a_format_error() {
        let mut bytes = vec![b'X', b'D', b'A', b'T'];
        bytes.extend_from_slice(&3u64.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let mut reader = Reader::from_reader(Cursor::new(bytes));
        assert!(matches!(
            reader.read(),
            Err(crate::Error::Format(FormatError::BadMagic { .. }))
        ));
    }

    #[test]
    fn s2_bad_version_is_a_format_error() {
        let mut bytes = vec![b'I', b'D', b'A', b'T'];
        bytes.extend_from_slice(&4u64.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let mut reader = Reader::from_reader(Cursor::new(bytes));
        assert!(matches!(
            reader.read(),
            Err(crate::Error::Format(FormatError::UnsupportedVersion { .. }))
        ));
    }

    #[test]
    fn s6_mismatched_mid_block_is_an_invariant_error_at_parse_time() {
        // Hand-build the table of contents and bodies so PROBE_MID_BLOCK
        // disagrees with PROBE_IDS ([10, 30] vs [10, 20]) the way a
        // corrupted file would, bypassing Model::new's own validation.
        let sections = [
            SectionCode::ArrayNProbes,
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
        ];

        let mut bodies: Vec<(SectionCode, Vec<u8>)> = Vec::new();
        bodies.push((SectionCode::ArrayNProbes, 2u32.to_le_bytes().to_vec()));
        bodies.push((SectionCode::ProbeIds, {
            let mut b = Vec::new();
            b.extend_from_slice(&10u32.to_le_bytes());
            b.extend_from_slice(&20u32.to_le_bytes());
            b
        }));
        bodies.push((SectionCode::ProbeStdDevs, {
            let mut b = Vec::new();
            b.extend_from_slice(&1u16.to_le_bytes());
            b.extend_from_slice(&2u16.to_le_bytes());
            b
        }));
        bodies.push((SectionCode::ProbeMeanIntensities, {
            let mut b = Vec::new();
            b.extend_from_slice(&100u16.to_le_bytes());
            b.extend_from_slice(&200u16.to_le_bytes());
            b
        }));
        bodies.push((SectionCode::ProbeNBeads, vec![3, 4]));
        bodies.push((SectionCode::ProbeMidBlock, {
            let mut b = Vec::new();
            b.extend_from_slice(&2u32.to_le_bytes());
            b.extend_from_slice(&10u32.to_le_bytes());
            b.extend_from_slice(&30u32.to_le_bytes()); // mismatch: probe_ids has 20 here
            b
        }));
        bodies.push((SectionCode::ArrayRunInfo, 0u32.to_le_bytes().to_vec()));
        bodies.push((SectionCode::ArrayRedGreen, 0u32.to_le_bytes().to_vec()));
        for (code, value) in [
            (SectionCode::ArrayManifest, "m"),
            (SectionCode::ArrayBarcode, "203927450093"),
            (SectionCode::ArrayChipType, "BeadChip 8x5"),
            (SectionCode::ArrayChipLabel, "R01C01"),
            (SectionCode::ArrayOldStyleManifest, "o"),
            (SectionCode::ArraySampleId, "s"),
            (SectionCode::ArrayDescription, "d"),
            (SectionCode::ArrayPlate, "p"),
            (SectionCode::ArrayWell, "w"),
            (SectionCode::ArrayUnknown2, "u"),
        ] {
            let mut buf = Vec::new();
            primitives::write_string(&mut buf, value).unwrap();
            bodies.push((code, buf));
        }
        bodies.push((SectionCode::ArrayUnknown1, vec![0, 0, 0, 0]));

        let body_of = |code: SectionCode| bodies.iter().find(|(c, _)| *c == code).unwrap().1.clone();

        let header_size = 4u64 + 8 + 4;
        let toc_entry_size = 2u64 + 8;
        let mut offset = header_size + toc_entry_size * sections.len() as u64;
        let mut offsets = HashMap::new();
        for &code in &sections {
            offsets.insert(code, offset);
            offset += body_of(code).len() as u64;
        }

        let mut file = Vec::new();
        file.extend_from_slice(b"IDAT");
        file.extend_from_slice(&3u64.to_le_bytes());
        file.extend_from_slice(&(sections.len() as u32).to_le_bytes());
        for &code in &sections {
            file.extend_from_slice(&code.code().to_le_bytes());
            file.extend_from_slice(&offsets[&code].to_le_bytes());
        }
        for &code in &sections {
            file.extend_from_slice(&body_of(code));
        }

        let mut reader = Reader::from_reader(Cursor::new(file));
        assert!(matches!(
            reader.read(),
            Err(crate::Error::Invariant(InvariantError::MidBlockMismatch { .. }))
        ));
    }

    #[test]
    fn oversized_probe_count_is_rejected_before_any_vector_is_allocated() {
        // Only ARRAY_N_PROBES is present in the table; the reader must reject
        // the declared count right after reading it, before it ever looks up
        // (or needs) any other section's offset.
        let n_probes_code = SectionCode::ArrayNProbes.code();
        let header_size = 4u64 + 8 + 4;
        let toc_entry_size = 2u64 + 8;
        let body_offset = header_size + toc_entry_size;

        let mut file = Vec::new();
        file.extend_from_slice(b"IDAT");
        file.extend_from_slice(&3u64.to_le_bytes());
        file.extend_from_slice(&1u32.to_le_bytes());
        file.extend_from_slice(&n_probes_code.to_le_bytes());
        file.extend_from_slice(&body_offset.to_le_bytes());
        file.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

        let mut reader = Reader::from_reader(Cursor::new(file));
        assert!(matches!(
            reader.read(),
            Err(crate::Error::Invariant(InvariantError::ProbeCountTooLarge(
                0xFFFF_FFFF,
                MAX_PROBES
            )))
        ));
    }
}
