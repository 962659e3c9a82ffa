//! Multi-shot prompt assembly and shot-cut placement.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::frames::{align_frame_count, align_frame_index};

/// Phrase that marks a global caption as already stating its shot count.
pub const SHOT_COUNT_MARKER: &str = "This scene contains";

/// Separator placed between consecutive per-shot captions.
pub const SHOT_SEPARATOR: &str = " [shot cut] ";

/// Prefix of the global caption section.
pub const GLOBAL_CAPTION_TAG: &str = "[global caption]";

/// Prefix of the per-shot caption section.
pub const PER_SHOT_CAPTION_TAG: &str = "[per shot caption]";

/// Normalized multi-shot request ready for the inference engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MultiShotRequest {
    /// Fully assembled prompt
    pub prompt: String,
    /// Ascending, unique, aligned cut indices strictly inside `(0, num_frames)`
    pub shot_cut_frames: Vec<i64>,
    /// Aligned total frame count
    pub num_frames: u32,
}

/// Build a [`MultiShotRequest`] from a scene description.
///
/// Custom cut frames, when given and non-empty, are aligned one by one and
/// taken as absolute frame indices. Otherwise cuts are spread evenly over the
/// aligned total. Either way the result is deduplicated, sorted and clipped to
/// the open interval `(0, num_frames)`.
pub fn build_multishot_request(
    global_caption: &str,
    shot_captions: &[String],
    total_frames: u32,
    custom_cut_frames: Option<&[i64]>,
) -> MultiShotRequest {
    let prompt = assemble_prompt(global_caption, shot_captions);
    let num_frames = align_frame_count(total_frames);

    let raw_cuts = match custom_cut_frames {
        Some(custom) if !custom.is_empty() => custom.iter().copied().map(align_frame_index).collect(),
        _ => default_cut_frames(num_frames, shot_captions.len()),
    };

    MultiShotRequest {
        prompt,
        shot_cut_frames: canonicalize_cuts(raw_cuts, num_frames),
        num_frames,
    }
}

/// Assemble the global caption and per-shot captions into one prompt.
pub fn assemble_prompt(global_caption: &str, shot_captions: &[String]) -> String {
    let global = if global_caption.contains(SHOT_COUNT_MARKER) {
        global_caption.to_string()
    } else {
        format!(
            "{} {} {} shots.",
            global_caption.trim(),
            SHOT_COUNT_MARKER,
            shot_captions.len()
        )
    };

    format!(
        "{} {} {} {}",
        GLOBAL_CAPTION_TAG,
        global,
        PER_SHOT_CAPTION_TAG,
        shot_captions.join(SHOT_SEPARATOR)
    )
}

/// Evenly spaced, aligned cut indices for `num_shots` shots.
///
/// Boundary `i` sits at `round(i * num_frames / num_shots)` (ties to even)
/// before alignment. Returns nothing for zero or one shot.
pub fn default_cut_frames(num_frames: u32, num_shots: usize) -> Vec<i64> {
    if num_shots < 2 {
        return Vec::new();
    }

    let step = f64::from(num_frames) / num_shots as f64;
    (1..num_shots)
        .map(|i| {
            let approx = (i as f64 * step).round_ties_even() as i64;
            align_frame_index(approx)
        })
        .collect()
}

/// Deduplicate, sort and keep only cuts strictly inside `(0, num_frames)`.
pub fn canonicalize_cuts(mut cuts: Vec<i64>, num_frames: u32) -> Vec<i64> {
    cuts.sort_unstable();
    cuts.dedup();
    cuts.retain(|&frame| frame > 0 && frame < i64::from(num_frames));
    cuts
}
