//! Serializes a [`Model`] back into IDAT bytes, reconstructing the section
//! table's physical offsets from scratch per §4.4.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::model::Model;
use crate::primitives::{self, encoded_string_length};
use crate::section::SectionCode;
use crate::Result;

/// Header (4 + 8 + 4) plus the table-of-contents entry width (2 + 8) per
/// section, per the wire layout in spec §6.
const HEADER_SIZE: u64 = 4 + 8 + 4;
const TOC_ENTRY_SIZE: u64 = 2 + 8;

pub fn write_to_path<P: AsRef<Path>>(path: P, model: &Model) -> Result<()> {
    let body_sizes = section_body_sizes(model);
    trace!("writing IDAT file {}", path.as_ref().display());
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_to_inner(&mut writer, model, &body_sizes)?;
    writer.flush()?;
    Ok(())
}

pub fn write_to<W: Write>(writer: &mut W, model: &Model) -> Result<()> {
    let body_sizes = section_body_sizes(model);
    write_to_inner(writer, model, &body_sizes)
}

/// Computes every section's serialized body size before anything is written,
/// so that the full table of contents can be emitted in one pass. Sizes are
/// looked up by `SectionCode` in the order `ALL` declares them (the original
/// order `section_body_sizes` builds them in doesn't matter; the returned
/// slice is keyed by code, not position).
fn section_body_sizes(model: &Model) -> Vec<(SectionCode, u64)> {
    let n = model.n_probes as u64;
    SectionCode::ALL
        .iter()
        .map(|&code| {
            let size = match code {
                SectionCode::ArrayNProbes => 4,
                SectionCode::ProbeIds => 4 * n,
                SectionCode::ProbeStdDevs => 2 * n,
                SectionCode::ProbeMeanIntensities => 2 * n,
                SectionCode::ProbeNBeads => n,
                SectionCode::ProbeMidBlock => 4 + 4 * n,
                SectionCode::ArrayRunInfo => {
                    4 + model
                        .run_info
                        .iter()
                        .flat_map(|e| e.fields.iter())
                        .map(|s| encoded_string_length(s))
                        .sum::<u64>()
                }
                SectionCode::ArrayRedGreen => 4,
                SectionCode::ArrayManifest => encoded_string_length(&model.meta.manifest),
                SectionCode::ArrayBarcode => encoded_string_length(&model.meta.barcode),
                SectionCode::ArrayChipType => encoded_string_length(&model.meta.chip_type),
                SectionCode::ArrayChipLabel => encoded_string_length(&model.meta.chip_label),
                SectionCode::ArrayOldStyleManifest => {
                    encoded_string_length(&model.meta.old_style_manifest)
                }
                SectionCode::ArraySampleId => encoded_string_length(&model.meta.sample_id),
                SectionCode::ArrayDescription => encoded_string_length(&model.meta.description),
                SectionCode::ArrayPlate => encoded_string_length(&model.meta.plate),
                SectionCode::ArrayWell => encoded_string_length(&model.meta.well),
                SectionCode::ArrayUnknown1 => 4,
                SectionCode::ArrayUnknown2 => encoded_string_length(&model.meta.unknown_2),
            };
            (code, size)
        })
        .collect()
}

fn size_of(body_sizes: &[(SectionCode, u64)], code: SectionCode) -> u64 {
    body_sizes
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| *s)
        .expect("section_body_sizes covers every SectionCode")
}

fn write_to_inner<W: Write>(
    writer: &mut W,
    model: &Model,
    body_sizes: &[(SectionCode, u64)],
) -> Result<()> {
    let k = model.sections.index_order.len() as u32;

    primitives::write_char_block(writer, &model.header.magic)?;
    primitives::write_u64(writer, model.header.version)?;
    primitives::write_u32(writer, k)?;

    // The first body begins right after the header and the table of
    // contents; each subsequent body in physical order begins where the
    // previous one ended.
    let mut physical_offset = HEADER_SIZE + TOC_ENTRY_SIZE * k as u64;
    let mut recomputed_offsets = std::collections::HashMap::with_capacity(model.sections.physical_order.len());
    for entry in &model.sections.physical_order {
        recomputed_offsets.insert(entry.code, physical_offset);
        physical_offset += size_of(body_sizes, entry.code);
    }

    for entry in &model.sections.index_order {
        let offset = recomputed_offsets[&entry.code];
        primitives::write_u16(writer, entry.code.code())?;
        primitives::write_u64(writer, offset)?;
    }

    for entry in &model.sections.physical_order {
        write_section_body(writer, model, entry.code)?;
    }

    Ok(())
}

fn write_section_body<W: Write>(writer: &mut W, model: &Model, code: SectionCode) -> Result<()> {
    match code {
        SectionCode::ArrayNProbes => primitives::write_u32(writer, model.n_probes)?,
        SectionCode::ProbeIds => write_u32_vector(writer, &model.probes.probe_ids)?,
        SectionCode::ProbeStdDevs => write_u16_vector(writer, &model.probes.std_devs)?,
        SectionCode::ProbeMeanIntensities => {
            write_u16_vector(writer, &model.probes.mean_intensities)?
        }
        SectionCode::ProbeNBeads => writer.write_all(&model.probes.n_beads)?,
        SectionCode::ProbeMidBlock => {
            primitives::write_u32(writer, model.n_probes)?;
            write_u32_vector(writer, &model.probes.mid_block)?;
        }
        SectionCode::ArrayRunInfo => {
            primitives::write_u32(writer, model.run_info.len() as u32)?;
            for entry in &model.run_info {
                for field in &entry.fields {
                    primitives::write_string(writer, field)?;
                }
            }
        }
        SectionCode::ArrayRedGreen => primitives::write_u32(writer, model.meta.red_green)?,
        SectionCode::ArrayManifest => primitives::write_string(writer, &model.meta.manifest)?,
        SectionCode::ArrayBarcode => primitives::write_string(writer, &model.meta.barcode)?,
        SectionCode::ArrayChipType => primitives::write_string(writer, &model.meta.chip_type)?,
        SectionCode::ArrayChipLabel => primitives::write_string(writer, &model.meta.chip_label)?,
        SectionCode::ArrayOldStyleManifest => {
            primitives::write_string(writer, &model.meta.old_style_manifest)?
        }
        SectionCode::ArraySampleId => primitives::write_string(writer, &model.meta.sample_id)?,
        SectionCode::ArrayDescription => {
            primitives::write_string(writer, &model.meta.description)?
        }
        SectionCode::ArrayPlate => primitives::write_string(writer, &model.meta.plate)?,
        SectionCode::ArrayWell => primitives::write_string(writer, &model.meta.well)?,
        SectionCode::ArrayUnknown1 => writer.write_all(&model.meta.unknown_1)?,
        SectionCode::ArrayUnknown2 => primitives::write_string(writer, &model.meta.unknown_2)?,
    }
    Ok(())
}

fn write_u16_vector<W: Write>(writer: &mut W, values: &[u16]) -> Result<()> {
    let mut buf = Vec::with_capacity(values.len() * 2);
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    writer.write_all(&buf)?;
    Ok(())
}

fn write_u32_vector<W: Write>(writer: &mut W, values: &[u32]) -> Result<()> {
    let mut buf = Vec::with_capacity(values.len() * 4);
    for v in values {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    writer.write_all(&buf)?;
    Ok(())
}
