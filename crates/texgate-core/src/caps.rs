//! Capability table
//!
//! Supported sample counts per (multisample target, sized internal format), populated once
//! from the context limits and never modified afterwards.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::config::{Limits, SampleCountOverride};
use crate::enums::TextureTarget;
use crate::format::{FormatCategory, InternalFormat};

/// Descending sample counts for one entry
pub type SampleCounts = SmallVec<[u32; 5]>;

/// A pair of formats whose sample-count sets break the subset assumption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetViolation {
    pub target: TextureTarget,
    /// Format with fewer (or equally many) counts
    pub smaller: InternalFormat,
    /// Format expected to support every count of `smaller`
    pub larger: InternalFormat,
    /// Count supported by `smaller` but missing from `larger`
    pub missing: u32,
}

/// Per-format sample-count capabilities
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    entries: AHashMap<(TextureTarget, InternalFormat), SampleCounts>,
}

impl CapabilityTable {
    pub const TARGETS: [TextureTarget; 2] = [
        TextureTarget::Texture2DMultisample,
        TextureTarget::Texture2DMultisampleArray,
    ];

    /// Build the table from limits, then apply driver overrides
    pub fn from_limits(limits: &Limits, overrides: &[SampleCountOverride]) -> Self {
        let mut entries = AHashMap::new();

        for target in Self::TARGETS {
            for format in InternalFormat::ALL {
                let Some(category) = format.category() else {
                    continue;
                };
                let cap = Self::category_cap(limits, category);
                entries.insert((target, format), powers_of_two_descending(cap));
            }
        }

        for entry in overrides {
            entries.insert(
                (entry.target, entry.format),
                entry.counts.iter().copied().collect(),
            );
        }

        tracing::debug!(
            entries = entries.len(),
            overrides = overrides.len(),
            "Built sample capability table"
        );

        Self { entries }
    }

    /// Per-category sample cap
    pub fn category_cap(limits: &Limits, category: FormatCategory) -> u32 {
        match category {
            FormatCategory::Color => limits.max_color_texture_samples.min(limits.max_samples),
            FormatCategory::Integer => limits.max_integer_samples,
            FormatCategory::DepthStencil => {
                limits.max_depth_texture_samples.min(limits.max_samples)
            }
        }
    }

    /// Supported sample counts, descending. `None` if the pair has no entry.
    pub fn query(&self, target: TextureTarget, format: InternalFormat) -> Option<&[u32]> {
        self.entries
            .get(&(target, format))
            .map(|counts| counts.as_slice())
    }

    /// Largest supported sample count
    pub fn max_samples(&self, target: TextureTarget, format: InternalFormat) -> Option<u32> {
        self.query(target, format)
            .and_then(|counts| counts.first().copied())
    }

    /// One sample count usable for every format at once: the smallest per-format maximum.
    ///
    /// Relies on the subset assumption; see [`CapabilityTable::subset_violations`].
    pub fn common_max_samples(
        &self,
        target: TextureTarget,
        formats: &[InternalFormat],
    ) -> Option<u32> {
        formats
            .iter()
            .map(|&format| self.max_samples(target, format))
            .try_fold(u32::MAX, |acc, max| max.map(|max| acc.min(max)))
            .filter(|&common| common != u32::MAX)
    }

    /// Pairs of formats that break the subset assumption. Reported, never corrected.
    pub fn subset_violations(&self, target: TextureTarget) -> Vec<SubsetViolation> {
        let mut rows: Vec<(InternalFormat, &SampleCounts)> = self
            .entries
            .iter()
            .filter(|((t, _), _)| *t == target)
            .map(|((_, format), counts)| (*format, counts))
            .collect();
        rows.sort_by_key(|(format, _)| format.raw());

        let mut violations = Vec::new();
        for (smaller, small_counts) in &rows {
            for (larger, large_counts) in &rows {
                if smaller == larger || large_counts.len() < small_counts.len() {
                    continue;
                }
                if let Some(&missing) = small_counts
                    .iter()
                    .find(|count| !large_counts.contains(count))
                {
                    violations.push(SubsetViolation {
                        target,
                        smaller: *smaller,
                        larger: *larger,
                        missing,
                    });
                }
            }
        }
        violations
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = (TextureTarget, InternalFormat, &[u32])> {
        self.entries
            .iter()
            .map(|((target, format), counts)| (*target, *format, counts.as_slice()))
    }
}

fn powers_of_two_descending(cap: u32) -> SampleCounts {
    let mut counts = SampleCounts::new();
    let mut count = 1u32;
    while count <= cap {
        counts.push(count);
        count *= 2;
    }
    counts.reverse();
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CapabilityTable {
        CapabilityTable::from_limits(&Limits::d3d11(), &[])
    }

    #[test]
    fn test_counts_are_descending() {
        let table = table();
        for (_, _, counts) in table.iter() {
            assert!(!counts.is_empty());
            assert!(counts.windows(2).all(|pair| pair[0] > pair[1]));
            assert_eq!(*counts.last().unwrap(), 1);
        }
    }

    #[test]
    fn test_max_samples_in_range() {
        let table = table();
        for target in CapabilityTable::TARGETS {
            for format in InternalFormat::ALL.iter().filter(|f| f.is_renderable()) {
                let max = table.max_samples(target, *format).unwrap();
                assert!(max >= 1);
                assert!(max < i32::MAX as u32);
            }
        }
    }

    #[test]
    fn test_category_caps() {
        let table = table();
        let target = TextureTarget::Texture2DMultisample;
        assert_eq!(table.query(target, InternalFormat::Rgba8), Some(&[8, 4, 2, 1][..]));
        assert_eq!(table.max_samples(target, InternalFormat::Rgba8UI), Some(4));
        assert_eq!(table.max_samples(target, InternalFormat::DepthComponent24), Some(8));
    }

    #[test]
    fn test_non_power_of_two_cap() {
        assert_eq!(powers_of_two_descending(6).as_slice(), &[4, 2, 1]);
        assert_eq!(powers_of_two_descending(1).as_slice(), &[1]);
    }

    #[test]
    fn test_missing_entries() {
        let table = table();
        assert!(table.query(TextureTarget::Texture2D, InternalFormat::Rgba8).is_none());
        assert!(table.query(TextureTarget::Texture2DMultisample, InternalFormat::Rgba).is_none());
        assert!(table
            .query(TextureTarget::Texture2DMultisample, InternalFormat::Rgba32F)
            .is_none());
    }

    #[test]
    fn test_common_max_is_smallest_maximum() {
        let table = table();
        let target = TextureTarget::Texture2DMultisampleArray;

        let common = table.common_max_samples(
            target,
            &[
                InternalFormat::Rgba8,
                InternalFormat::DepthComponent24,
                InternalFormat::Depth24Stencil8,
            ],
        );
        assert_eq!(common, Some(8));

        // The integer format's counts are a subset of RGBA8's
        let common = table.common_max_samples(target, &[InternalFormat::Rgba8, InternalFormat::R8I]);
        assert_eq!(common, table.max_samples(target, InternalFormat::R8I));

        assert_eq!(table.common_max_samples(target, &[]), None);
        assert_eq!(
            table.common_max_samples(target, &[InternalFormat::Rgba8, InternalFormat::Rgba]),
            None
        );
    }

    #[test]
    fn test_overrides_replace_generated_entries() {
        let overrides = [SampleCountOverride {
            target: TextureTarget::Texture2DMultisample,
            format: InternalFormat::Rgba8,
            counts: vec![8, 2],
        }];
        let table = CapabilityTable::from_limits(&Limits::d3d11(), &overrides);
        assert_eq!(
            table.query(TextureTarget::Texture2DMultisample, InternalFormat::Rgba8),
            Some(&[8, 2][..])
        );
        assert_eq!(
            table.query(TextureTarget::Texture2DMultisampleArray, InternalFormat::Rgba8),
            Some(&[8, 4, 2, 1][..])
        );
    }

    #[test]
    fn test_subset_violations_are_reported() {
        let target = TextureTarget::Texture2DMultisample;
        assert!(table().subset_violations(target).is_empty());

        let overrides = [SampleCountOverride {
            target,
            format: InternalFormat::Rgba8UI,
            counts: vec![4, 3],
        }];
        let table = CapabilityTable::from_limits(&Limits::d3d11(), &overrides);
        let violations = table.subset_violations(target);
        assert!(!violations.is_empty());
        assert!(violations
            .iter()
            .all(|v| v.smaller == InternalFormat::Rgba8UI && v.missing == 3));

        // The data itself is left alone
        assert_eq!(table.query(target, InternalFormat::Rgba8UI), Some(&[4, 3][..]));
    }
}
