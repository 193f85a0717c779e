//! Composes a reference sample with an admixture sample at a given fraction.
//!
//! The compatibility contract (magic/version/chip-type/probe-identity) is
//! mandatory; the numeric blend policy is this repository's resolution of
//! the open question spec.md left for the mixer (see DESIGN.md).

use crate::error::UsageError;
use crate::model::{Model, ProbeMatrix};
use crate::Result;

/// Mixes `reference` with `admixture` at `fraction` (the admixture's share,
/// 0.0 = pure reference, 1.0 = pure admixture).
pub fn mix(reference: &Model, admixture: &Model, fraction: f64) -> Result<Model> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(UsageError::FractionOutOfRange(fraction).into());
    }
    if reference.header.magic != admixture.header.magic {
        return Err(UsageError::IncompatibleMagic.into());
    }
    if reference.header.version != admixture.header.version {
        return Err(UsageError::IncompatibleVersion.into());
    }
    if reference.meta.chip_type != admixture.meta.chip_type {
        return Err(UsageError::IncompatibleChipType.into());
    }
    if reference.n_probes != admixture.n_probes {
        return Err(UsageError::ProbeCountMismatch {
            reference: reference.n_probes,
            admixture: admixture.n_probes,
        }
        .into());
    }
    for (i, (r, a)) in reference
        .probes
        .probe_ids
        .iter()
        .zip(admixture.probes.probe_ids.iter())
        .enumerate()
    {
        if r != a {
            return Err(UsageError::ProbeIdentityMismatch { index: i }.into());
        }
    }

    let probes = blend_probe_matrix(&reference.probes, &admixture.probes, fraction);

    Model::new(
        reference.header.clone(),
        reference.sections.clone(),
        reference.n_probes,
        probes,
        reference.meta.clone(),
        reference.run_info.clone(),
    )
}

fn blend(reference: f64, admixture: f64, fraction: f64) -> f64 {
    reference * (1.0 - fraction) + admixture * fraction
}

fn blend_probe_matrix(reference: &ProbeMatrix, admixture: &ProbeMatrix, fraction: f64) -> ProbeMatrix {
    let n = reference.len();
    let mut std_devs = Vec::with_capacity(n);
    let mut mean_intensities = Vec::with_capacity(n);
    let mut n_beads = Vec::with_capacity(n);

    for i in 0..n {
        std_devs.push(
            blend(
                reference.std_devs[i] as f64,
                admixture.std_devs[i] as f64,
                fraction,
            )
            .round()
            .clamp(0.0, u16::MAX as f64) as u16,
        );
        mean_intensities.push(
            blend(
                reference.mean_intensities[i] as f64,
                admixture.mean_intensities[i] as f64,
                fraction,
            )
            .round()
            .clamp(0.0, u16::MAX as f64) as u16,
        );
        n_beads.push(
            blend(
                reference.n_beads[i] as f64,
                admixture.n_beads[i] as f64,
                fraction,
            )
            .round()
            .clamp(0.0, u8::MAX as f64) as u8,
        );
    }

    ProbeMatrix {
        probe_ids: reference.probe_ids.clone(),
        std_devs,
        mean_intensities,
        n_beads,
        mid_block: reference.mid_block.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_fraction_out_of_range() {
        let model = crate::test_support::minimal_model();
        assert!(mix(&model, &model, 1.5).is_err());
        assert!(mix(&model, &model, -0.1).is_err());
    }

    #[test]
    fn rejects_incompatible_version() {
        let reference = crate::test_support::minimal_model();
        let mut admixture = reference.clone();
        admixture.header.version = 4;
        assert!(mix(&reference, &admixture, 0.5).is_err());
    }

    #[test]
    fn pure_reference_blend_reproduces_reference_values() {
        let reference = crate::test_support::minimal_model();
        let admixture = reference.clone();
        let mixed = mix(&reference, &admixture, 0.0).unwrap();
        assert_eq!(mixed.probes.mean_intensities, reference.probes.mean_intensities);
        assert_eq!(mixed.probes.std_devs, reference.probes.std_devs);
    }

    #[test]
    fn blend_at_half_fraction_averages_intensities() {
        let mut reference = crate::test_support::minimal_model();
        reference.probes.mean_intensities = vec![100, 200];
        let mut admixture = reference.clone();
        admixture.probes.mean_intensities = vec![300, 400];
        let mixed = mix(&reference, &admixture, 0.5).unwrap();
        assert_eq!(mixed.probes.mean_intensities, vec![200, 300]);
    }

    #[test]
    fn section_ordering_is_copied_from_reference() {
        let reference = crate::test_support::minimal_model();
        let admixture = reference.clone();
        let mixed = mix(&reference, &admixture, 0.3).unwrap();
        assert_eq!(
            mixed.sections.index_order,
            reference.sections.index_order
        );
    }
}
