//! Standard sample positions
//!
//! Fixed sub-pixel sample locations of the D3D standard multisample pattern, for 1, 2, 4, 8
//! and 16 samples. Counts in between use the next larger pattern.

use glam::Vec2;

/// Largest sample count with a standard pattern
pub const MAX_PATTERN_SAMPLES: u32 = 16;

const PATTERN_1: [[f32; 2]; 1] = [[0.5, 0.5]];

const PATTERN_2: [[f32; 2]; 2] = [[0.75, 0.75], [0.25, 0.25]];

const PATTERN_4: [[f32; 2]; 4] = [[0.375, 0.125], [0.875, 0.375], [0.125, 0.625], [0.625, 0.875]];

const PATTERN_8: [[f32; 2]; 8] = [
    [0.5625, 0.3125],
    [0.4375, 0.6875],
    [0.8125, 0.5625],
    [0.3125, 0.1875],
    [0.1875, 0.8125],
    [0.0625, 0.4375],
    [0.6875, 0.9375],
    [0.9375, 0.0625],
];

const PATTERN_16: [[f32; 2]; 16] = [
    [0.5625, 0.5625],
    [0.4375, 0.3125],
    [0.3125, 0.625],
    [0.75, 0.4375],
    [0.1875, 0.375],
    [0.625, 0.8125],
    [0.8125, 0.6875],
    [0.6875, 0.1875],
    [0.375, 0.875],
    [0.5, 0.0625],
    [0.25, 0.125],
    [0.125, 0.75],
    [0.0, 0.5],
    [0.9375, 0.25],
    [0.875, 0.9375],
    [0.0625, 0.0],
];

fn pattern_for(samples: u32) -> Option<&'static [[f32; 2]]> {
    // ceil(log2(samples)) selects the pattern
    match samples.checked_next_power_of_two()? {
        1 => Some(&PATTERN_1),
        2 => Some(&PATTERN_2),
        4 => Some(&PATTERN_4),
        8 => Some(&PATTERN_8),
        16 => Some(&PATTERN_16),
        _ => None,
    }
}

/// Position of sample `index` in a pixel with `samples` samples.
///
/// Returns `None` when `index >= samples` or no pattern covers `samples`.
pub fn sample_position(samples: u32, index: u32) -> Option<Vec2> {
    if index >= samples {
        return None;
    }
    let pattern = pattern_for(samples)?;
    pattern
        .get(index as usize)
        .map(|&[x, y]| Vec2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sample_is_centered() {
        assert_eq!(sample_position(1, 0), Some(Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn test_non_power_of_two_uses_next_pattern() {
        assert_eq!(sample_position(3, 2), Some(Vec2::new(0.125, 0.625)));
        assert_eq!(sample_position(4, 2), sample_position(3, 2));
    }

    #[test]
    fn test_index_bounds() {
        assert!(sample_position(4, 4).is_none());
        assert!(sample_position(0, 0).is_none());
        assert!(sample_position(32, 0).is_none());
        assert_eq!(sample_position(16, 15), Some(Vec2::new(0.0625, 0.0)));
    }

    #[test]
    fn test_positions_inside_pixel() {
        for samples in 1..=MAX_PATTERN_SAMPLES {
            for index in 0..samples {
                let p = sample_position(samples, index).unwrap();
                assert!((0.0..1.0).contains(&p.x));
                assert!((0.0..1.0).contains(&p.y));
            }
        }
    }
}
