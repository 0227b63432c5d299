//! Deterministic rendition selection.
//!
//! Selection is container-based only: muxed audio+video is preferred over
//! video-only, and mp4 over other containers within each group, falling
//! back to the upstream's own ordering. No bitrate or resolution
//! negotiation.

use thiserror::Error;

use crate::types::{Composition, Rendition};

/// Container preferred within each composition group.
const PREFERRED_CONTAINER: &str = "mp4";

/// Selection failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Neither a muxed nor a video-only rendition exists.
    #[error("No suitable video format found")]
    NoSuitableFormat,
}

/// Picks the single rendition to deliver.
///
/// Deterministic and total: the same slice in the same order always
/// yields the same choice.
///
/// # Errors
/// - `SelectionError::NoSuitableFormat` - No muxed or video-only rendition
pub fn select_rendition(renditions: &[Rendition]) -> Result<&Rendition, SelectionError> {
    preferred_in_group(renditions, Composition::AudioVideo)
        .or_else(|| preferred_in_group(renditions, Composition::VideoOnly))
        .ok_or(SelectionError::NoSuitableFormat)
}

/// First preferred-container rendition in the group, else the group's
/// first rendition in given order.
fn preferred_in_group(renditions: &[Rendition], composition: Composition) -> Option<&Rendition> {
    let mut group = renditions
        .iter()
        .filter(|rendition| rendition.composition == composition)
        .peekable();

    let first = *group.peek()?;
    Some(
        group
            .find(|rendition| rendition.container == PREFERRED_CONTAINER)
            .unwrap_or(first),
    )
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn rendition(itag: u64, container: &str, composition: Composition) -> Rendition {
        Rendition {
            itag,
            container: container.to_string(),
            composition,
            content_length: Some(1000),
            quality_label: None,
            mime_type: format!("video/{container}"),
            stream_url: format!("https://r1.example/{itag}"),
        }
    }

    #[test]
    fn test_prefers_muxed_mp4_over_everything() {
        let renditions = vec![
            rendition(247, "webm", Composition::VideoOnly),
            rendition(43, "webm", Composition::AudioVideo),
            rendition(18, "mp4", Composition::AudioVideo),
            rendition(137, "mp4", Composition::VideoOnly),
        ];

        let selected = select_rendition(&renditions).unwrap();
        assert_eq!(selected.itag, 18);
    }

    #[test]
    fn test_muxed_non_mp4_beats_video_only_mp4() {
        let renditions = vec![
            rendition(137, "mp4", Composition::VideoOnly),
            rendition(43, "webm", Composition::AudioVideo),
        ];

        let selected = select_rendition(&renditions).unwrap();
        assert_eq!(selected.itag, 43);
    }

    #[test]
    fn test_falls_back_to_video_only_with_mp4_preference() {
        let renditions = vec![
            rendition(247, "webm", Composition::VideoOnly),
            rendition(137, "mp4", Composition::VideoOnly),
            rendition(140, "mp4", Composition::AudioOnly),
        ];

        let selected = select_rendition(&renditions).unwrap();
        assert_eq!(selected.itag, 137);
    }

    #[test]
    fn test_first_in_order_wins_without_preferred_container() {
        let renditions = vec![
            rendition(43, "webm", Composition::AudioVideo),
            rendition(36, "3gpp", Composition::AudioVideo),
        ];

        let selected = select_rendition(&renditions).unwrap();
        assert_eq!(selected.itag, 43);
    }

    #[test]
    fn test_audio_only_set_has_no_suitable_format() {
        let renditions = vec![rendition(140, "mp4", Composition::AudioOnly)];

        assert_eq!(
            select_rendition(&renditions),
            Err(SelectionError::NoSuitableFormat)
        );
        assert_eq!(select_rendition(&[]), Err(SelectionError::NoSuitableFormat));
    }

    fn arbitrary_rendition() -> impl Strategy<Value = Rendition> {
        (
            0u64..400,
            prop::sample::select(vec!["mp4", "webm", "3gpp"]),
            prop::sample::select(vec![
                Composition::AudioVideo,
                Composition::VideoOnly,
                Composition::AudioOnly,
            ]),
        )
            .prop_map(|(itag, container, composition)| rendition(itag, container, composition))
    }

    proptest! {
        #[test]
        fn test_selection_is_deterministic(renditions in prop::collection::vec(arbitrary_rendition(), 0..12)) {
            let first = select_rendition(&renditions);
            let second = select_rendition(&renditions);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn test_muxed_mp4_always_wins_when_present(renditions in prop::collection::vec(arbitrary_rendition(), 0..12)) {
            if let Ok(selected) = select_rendition(&renditions) {
                let muxed_mp4_exists = renditions.iter().any(|r| {
                    r.composition == Composition::AudioVideo && r.container == "mp4"
                });
                if muxed_mp4_exists {
                    prop_assert_eq!(selected.composition, Composition::AudioVideo);
                    prop_assert_eq!(&selected.container, "mp4");
                }
            }
        }
    }
}
