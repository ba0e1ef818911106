//! YouTube caption retrieval.
//!
//! The watch page lists the available caption tracks; the chosen track's
//! timed-text XML is downloaded and flattened into one line of text.

use std::borrow::Cow;

use puzzler_core::ExtractError;
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesText, Event};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

const WATCH_URL: &str = "https://www.youtube.com/watch";

/// Caption retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// Caption language code
    #[serde(default = "YouTubeConfig::default_language")]
    pub language: String,

    /// User-Agent header
    #[serde(default = "YouTubeConfig::default_user_agent")]
    pub user_agent: String,
}

impl YouTubeConfig {
    fn default_language() -> String {
        "en".to_string()
    }

    fn default_user_agent() -> String {
        "Mozilla/5.0 (compatible; puzzler/1.0)".to_string()
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            language: Self::default_language(),
            user_agent: Self::default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    /// `"asr"` for auto-generated tracks
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn matches_language(&self, language: &str) -> bool {
        self.language_code == language
            || self
                .language_code
                .strip_prefix(language)
                .is_some_and(|rest| rest.starts_with('-'))
    }
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Video id from a watch URL (`v=` parameter), a `youtu.be` short link,
/// a `/shorts/` or `/embed/` path, or a bare id.
pub fn video_id_from_url(input: &str) -> Result<String, ExtractError> {
    let input = input.trim();
    let invalid = || ExtractError::InvalidYouTubeUrl(input.to_string());

    let Ok(url) = Url::parse(input) else {
        if is_video_id(input) {
            return Ok(input.to_string());
        }
        // Scheme-less links such as `youtube.com/watch?v=...`
        return input
            .rsplit_once("v=")
            .map(|(_, rest)| rest.split('&').next().unwrap_or_default())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(invalid);
    };

    if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
        if !id.is_empty() {
            return Ok(id.into_owned());
        }
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let id = match (url.host_str(), segments.as_slice()) {
        (Some("youtu.be"), [id, ..]) => Some(*id),
        (_, ["shorts" | "embed" | "live", id, ..]) => Some(*id),
        _ => None,
    };

    id.map(str::to_string).ok_or_else(invalid)
}

/// Locate the `"captionTracks": [...]` array in the watch page.
fn caption_tracks(page: &str) -> Vec<CaptionTrack> {
    const MARKER: &str = "\"captionTracks\":";

    let Some(start) = page.find(MARKER) else {
        return Vec::new();
    };
    let Some(array) = json_array_at(&page[start + MARKER.len()..]) else {
        return Vec::new();
    };

    serde_json::from_str(array).unwrap_or_else(|e| {
        debug!("Unreadable caption track list: {e}");
        Vec::new()
    })
}

/// Slice the JSON array starting at the first `[` of `text`, honouring
/// nested brackets and string literals.
fn json_array_at(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Manually authored tracks win over auto-generated ones.
fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .filter(|track| track.matches_language(language))
        .min_by_key(|track| track.is_generated())
}

/// Caption text escapes its markup twice (`&amp;#39;`). The reader undoes
/// the first level; one more pass undoes the second. Text that is not valid
/// escaped markup after the first pass (a literal `&`) is kept as is.
fn decode_caption_text(text: &BytesText<'_>) -> String {
    let once = text
        .unescape()
        .map_or_else(|_| String::from_utf8_lossy(text).into_owned(), Cow::into_owned);
    let twice = unescape(&once).map(Cow::into_owned).ok();
    twice.unwrap_or(once)
}

/// Decoded caption segments in order, blank ones dropped.
fn caption_segments(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                current = Some(String::new());
            }
            Ok(Event::Text(ref e)) => {
                if let Some(segment) = current.as_mut() {
                    segment.push_str(&decode_caption_text(e));
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                if let Some(segment) = current.take() {
                    let segment = segment.split_whitespace().collect::<Vec<_>>().join(" ");
                    if !segment.is_empty() {
                        segments.push(segment);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!("Caption XML ended early: {e}");
                break;
            }
            _ => {}
        }
    }

    segments
}

/// Fetches caption transcripts for YouTube videos.
pub struct YouTubeTranscripts {
    client: Client,
    config: YouTubeConfig,
}

impl YouTubeTranscripts {
    pub fn new(config: YouTubeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, ExtractError> {
        self.client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .header(
                reqwest::header::ACCEPT_LANGUAGE,
                format!("{},en;q=0.8", self.config.language),
            )
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ExtractError::Network(e.to_string()))?
            .text()
            .await
            .map_err(|e| ExtractError::Network(e.to_string()))
    }

    /// Transcript of the video behind `url`, segments joined with spaces.
    pub async fn fetch_transcript(&self, url: &str) -> Result<String, ExtractError> {
        let video_id = video_id_from_url(url)?;
        info!("Fetching captions for video {video_id}");

        let page = self
            .get_text(&format!("{WATCH_URL}?v={video_id}"))
            .await?;
        let tracks = caption_tracks(&page);
        debug!("Video {video_id} lists {} caption tracks", tracks.len());

        let Some(track) = select_track(&tracks, &self.config.language) else {
            return Err(ExtractError::NoCaptions { video_id });
        };

        let xml = self
            .get_text(&track.base_url.replace("&fmt=srv3", ""))
            .await?;
        let segments = caption_segments(&xml);
        if segments.is_empty() {
            return Err(ExtractError::NoCaptions { video_id });
        }

        info!("Loaded {} caption segments for {video_id}", segments.len());
        Ok(segments.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(input: &str) -> Option<String> {
        video_id_from_url(input).ok()
    }

    #[test]
    fn video_id_variants() {
        let expected = Some("dQw4w9WgXcQ".to_string());
        assert_eq!(id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), expected);
        assert_eq!(id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42"), expected);
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ?t=3"), expected);
        assert_eq!(id("https://www.youtube.com/shorts/dQw4w9WgXcQ"), expected);
        assert_eq!(id("youtube.com/watch?v=dQw4w9WgXcQ&list=x"), expected);
        assert_eq!(id("  dQw4w9WgXcQ "), expected);
    }

    #[test]
    fn rejects_links_without_video() {
        assert!(matches!(
            video_id_from_url("https://www.youtube.com/feed/trending"),
            Err(ExtractError::InvalidYouTubeUrl(_))
        ));
        assert!(matches!(
            video_id_from_url("hello world"),
            Err(ExtractError::InvalidYouTubeUrl(_))
        ));
    }

    const PAGE: &str = r#"var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=de","name":{"runs":[{"text":"German [auto]"}]},"languageCode":"de","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en&kind=asr","name":{"simpleText":"English (auto-generated)"},"languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en-GB","name":{"simpleText":"English (UK)"},"languageCode":"en-GB"}],"audioTracks":[]}}};"#;

    #[test]
    fn reads_caption_tracks_from_page() {
        let tracks = caption_tracks(PAGE);
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].language_code, "de");
        assert_eq!(
            tracks[1].base_url,
            "https://www.youtube.com/api/timedtext?v=abc&lang=en&kind=asr"
        );
    }

    #[test]
    fn prefers_manual_english_track() {
        let tracks = caption_tracks(PAGE);
        let track = select_track(&tracks, "en").map(|t| t.language_code.as_str());
        assert_eq!(track, Some("en-GB"));
        assert!(select_track(&tracks, "fr").is_none());
        assert!(select_track(&tracks, "e").is_none());
    }

    #[test]
    fn page_without_captions_has_no_tracks() {
        assert!(caption_tracks("<html>no player here</html>").is_empty());
        assert!(caption_tracks(r#""captionTracks": [ unterminated"#).is_empty());
    }

    #[test]
    fn array_slicing_respects_strings() {
        let text = r#": [{"a": "]}[\"x"}, [1, 2]] trailing ]"#;
        assert_eq!(json_array_at(text), Some(r#"[{"a": "]}[\"x"}, [1, 2]]"#));
    }

    #[test]
    fn caption_xml_is_decoded_and_joined() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0.5" dur="2.1">Today we&amp;#39;ll talk
about &lt;cells&gt;</text>
            <text start="2.6" dur="1.0">   </text>
            <text start="3.6" dur="1.0">Tom &amp;amp; Jerry &#x263A;</text>
        </transcript>"#;
        let segments = caption_segments(xml);
        assert_eq!(segments, vec!["Today we'll talk about <cells>", "Tom & Jerry \u{263A}"]);
    }

    #[test]
    fn self_closing_text_elements_are_skipped() {
        let xml = r#"<transcript><text start="0" dur="1"/><text start="1" dur="2">Cells divide.</text></transcript>"#;
        assert_eq!(caption_segments(xml), vec!["Cells divide."]);
    }

    #[test]
    fn literal_ampersands_survive_second_pass() {
        let xml = r#"<transcript><text start="0" dur="1">Q&amp;A &amp;bogus; time</text></transcript>"#;
        assert_eq!(caption_segments(xml), vec!["Q&A &bogus; time"]);
    }

    #[test]
    fn text_outside_caption_elements_is_ignored() {
        let xml = r#"<transcript>stray<text start="0" dur="1">Kept</text>tail</transcript>"#;
        assert_eq!(caption_segments(xml), vec!["Kept"]);
    }

    #[test]
    fn config_defaults_to_english() {
        let config = YouTubeConfig::default();
        assert_eq!(config.language, "en");
        assert!(config.user_agent.contains("puzzler"));
    }

    #[tokio::test]
    async fn invalid_url_fails_before_network() {
        let transcripts = YouTubeTranscripts::new(YouTubeConfig::default());
        let result = transcripts.fetch_transcript("not a link").await;
        assert!(matches!(result, Err(ExtractError::InvalidYouTubeUrl(_))));
    }
}
