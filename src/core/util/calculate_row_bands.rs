use std::num::NonZeroU32;
use std::ops::Range;

/// Splits `0..rows` into at most `max_bands` contiguous bands whose starts
/// are multiples of `step`, so a band never cuts through a `step`-tall block.
///
/// Bands differ in size by at most one block; the first bands take the
/// remainder.
#[must_use]
pub fn calculate_row_bands(rows: u32, step: NonZeroU32, max_bands: NonZeroU32) -> Vec<Range<u32>> {
    let step = step.get();
    let blocks = rows.div_ceil(step);
    if blocks == 0 {
        return Vec::new();
    }

    let bands = max_bands.get().min(blocks);
    let blocks_per_band = blocks / bands;
    let remainder = blocks % bands;

    let mut result = Vec::with_capacity(bands as usize);
    let mut start_block = 0;

    for band in 0..bands {
        let extra = u32::from(band < remainder);
        let end_block = start_block + blocks_per_band + extra;

        let start = start_block * step;
        let end = end_block.saturating_mul(step).min(rows);
        result.push(start..end);

        start_block = end_block;
    }

    result
}
