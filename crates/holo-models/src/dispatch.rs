//! Assembly of the parameter set handed to the inference engine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{RequestError, RequestResult};
use crate::frames::{align_frame_count, align_frame_index};
use crate::multishot::build_multishot_request;
use crate::request::{GenerationInput, GenerationOptions};

/// Named parameters of one engine call. Unset optional fields are omitted
/// from the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PipelineParams {
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,

    pub seed: u64,
    pub tiled: bool,
    pub height: u32,
    pub width: u32,
    pub num_inference_steps: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_frames: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_cut_frames: Option<Vec<i64>>,
}

impl PipelineParams {
    /// Number of shots implied by the cut list.
    pub fn shot_count(&self) -> usize {
        self.shot_cut_frames.as_ref().map_or(1, |cuts| cuts.len() + 1)
    }
}

/// Merge the base options with the mode-specific fields.
///
/// Structured input goes through the multi-shot builder. Raw input only has
/// its frame count and each cut aligned; cut lists are otherwise passed as
/// given, with no sorting or filtering.
pub fn build_pipeline_params(
    input: &GenerationInput,
    options: &GenerationOptions,
) -> RequestResult<PipelineParams> {
    let (prompt, num_frames, shot_cut_frames) = match input {
        GenerationInput::Structured(structured) => {
            let request = build_multishot_request(
                &structured.global_caption,
                &structured.shot_captions,
                structured.total_frames,
                structured.custom_shot_cut_frames.as_deref(),
            );
            (
                request.prompt,
                Some(request.num_frames),
                Some(request.shot_cut_frames),
            )
        }
        GenerationInput::Raw(raw) => (
            raw.prompt.clone(),
            raw.num_frames.map(align_frame_count),
            raw.shot_cut_frames
                .as_ref()
                .map(|cuts| cuts.iter().copied().map(align_frame_index).collect()),
        ),
    };

    if prompt.trim().is_empty() {
        return Err(RequestError::EmptyPrompt);
    }

    Ok(PipelineParams {
        prompt,
        negative_prompt: options.negative_prompt.clone(),
        seed: options.seed,
        tiled: options.tiled,
        height: options.height,
        width: options.width,
        num_inference_steps: options.num_inference_steps,
        num_frames,
        shot_cut_frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{RawInput, StructuredInput};

    fn raw(prompt: &str) -> GenerationInput {
        GenerationInput::Raw(RawInput {
            prompt: prompt.to_string(),
            num_frames: None,
            shot_cut_frames: None,
        })
    }

    #[test]
    fn test_raw_prompt_only_has_no_frame_fields() {
        let params = build_pipeline_params(&raw("a cat on a roof"), &GenerationOptions::default()).unwrap();
        let json = serde_json::to_value(&params).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object["prompt"], "a cat on a roof");
        assert_eq!(object["seed"], 0);
        assert_eq!(object["tiled"], true);
        assert_eq!(object["height"], 480);
        assert_eq!(object["width"], 832);
        assert_eq!(object["num_inference_steps"], 50);
        assert!(!object.contains_key("num_frames"));
        assert!(!object.contains_key("shot_cut_frames"));
        assert!(!object.contains_key("negative_prompt"));
    }

    #[test]
    fn test_raw_fields_are_aligned_without_canonicalizing() {
        let input = GenerationInput::Raw(RawInput {
            prompt: "p".to_string(),
            num_frames: Some(100),
            shot_cut_frames: Some(vec![80, 40, 40, 500]),
        });
        let params = build_pipeline_params(&input, &GenerationOptions::default()).unwrap();
        assert_eq!(params.num_frames, Some(101));
        assert_eq!(params.shot_cut_frames, Some(vec![81, 41, 41, 501]));
    }

    #[test]
    fn test_structured_merges_multishot_output() {
        let input = GenerationInput::Structured(StructuredInput {
            global_caption: "scene".to_string(),
            shot_captions: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            total_frames: 97,
            custom_shot_cut_frames: None,
        });
        let options = GenerationOptions {
            negative_prompt: Some("low quality".to_string()),
            seed: 7,
            ..Default::default()
        };
        let params = build_pipeline_params(&input, &options).unwrap();

        assert!(params.prompt.starts_with("[global caption] scene This scene contains 3 shots."));
        assert_eq!(params.num_frames, Some(97));
        assert_eq!(params.shot_cut_frames, Some(vec![33, 65]));
        assert_eq!(params.negative_prompt.as_deref(), Some("low quality"));
        assert_eq!(params.seed, 7);
        assert_eq!(params.shot_count(), 3);
    }

    #[test]
    fn test_blank_prompt_is_rejected() {
        let err = build_pipeline_params(&raw("   "), &GenerationOptions::default()).unwrap_err();
        assert_eq!(err, RequestError::EmptyPrompt);
    }
}
