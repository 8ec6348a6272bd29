use marquee_model::{MediaStream, SUBTITLES_DISABLED};

/// Pick the audio stream to request.
///
/// An override wins even if no listed stream carries that index. Then the
/// first stream matching the preferred language, then the server default,
/// then the first stream. `None` only when there is no audio at all.
pub fn select_audio_stream(
    streams: &[MediaStream],
    override_index: Option<i32>,
    preferred_language: Option<&str>,
) -> Option<i32> {
    if let Some(index) = override_index {
        return Some(index);
    }

    if let Some(language) = preferred_language.filter(|l| !l.trim().is_empty())
        && let Some(stream) = streams.iter().find(|s| s.matches_language(language))
    {
        return Some(stream.index);
    }

    streams
        .iter()
        .find(|s| s.is_default)
        .or_else(|| streams.first())
        .map(|s| s.index)
}

/// Pick the subtitle stream to request.
///
/// Same order as audio, except there is no first-stream fallback: without
/// an override, a language match or a server default, subtitles stay off.
/// An override of [`SUBTITLES_DISABLED`] turns them off explicitly.
pub fn select_subtitle_stream(
    streams: &[MediaStream],
    override_index: Option<i32>,
    preferred_language: Option<&str>,
) -> Option<i32> {
    if let Some(index) = override_index {
        return (index != SUBTITLES_DISABLED).then_some(index);
    }

    if let Some(language) = preferred_language.filter(|l| !l.trim().is_empty())
        && let Some(stream) = streams.iter().find(|s| s.matches_language(language))
    {
        return Some(stream.index);
    }

    streams.iter().find(|s| s.is_default).map(|s| s.index)
}

/// Label for the currently selected stream, "Off" for no subtitles
pub fn format_selected(streams: &[MediaStream], index: Option<i32>) -> String {
    match index {
        None => "Off".to_string(),
        Some(index) => streams
            .iter()
            .find(|s| s.index == index)
            .map(MediaStream::display_label)
            .unwrap_or_else(|| format!("Track {}", index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio() -> Vec<MediaStream> {
        vec![
            MediaStream::audio(1, Some("eng"), true),
            MediaStream::audio(2, Some("spa"), false),
        ]
    }

    #[test]
    fn audio_defaults_to_server_default() {
        assert_eq!(select_audio_stream(&audio(), None, None), Some(1));
    }

    #[test]
    fn audio_prefers_language_case_insensitively() {
        assert_eq!(select_audio_stream(&audio(), None, Some("SPA")), Some(2));
        assert_eq!(select_audio_stream(&audio(), None, Some("jpn")), Some(1));
    }

    #[test]
    fn audio_falls_back_to_first_stream() {
        let streams = vec![
            MediaStream::audio(3, Some("fre"), false),
            MediaStream::audio(4, Some("ger"), false),
        ];
        assert_eq!(select_audio_stream(&streams, None, None), Some(3));
        assert_eq!(select_audio_stream(&[], None, Some("eng")), None);
    }

    #[test]
    fn override_beats_preference() {
        assert_eq!(select_audio_stream(&audio(), Some(7), Some("spa")), Some(7));
    }

    #[test]
    fn subtitles_never_force_enabled() {
        let streams = vec![
            MediaStream::subtitle(3, Some("eng"), false),
            MediaStream::subtitle(4, Some("spa"), false),
        ];
        assert_eq!(select_subtitle_stream(&streams, None, None), None);
        assert_eq!(select_subtitle_stream(&streams, None, Some("spa")), Some(4));

        let with_default = vec![MediaStream::subtitle(5, Some("eng"), true)];
        assert_eq!(select_subtitle_stream(&with_default, None, None), Some(5));
    }

    #[test]
    fn subtitle_override_can_disable() {
        let streams = vec![MediaStream::subtitle(5, Some("eng"), true)];
        assert_eq!(
            select_subtitle_stream(&streams, Some(SUBTITLES_DISABLED), Some("eng")),
            None
        );
    }

    #[test]
    fn selected_label() {
        assert_eq!(format_selected(&audio(), None), "Off");
        assert_eq!(format_selected(&audio(), Some(9)), "Track 9");
    }
}
