//! YouTube caption access through the public watch page and the innertube player endpoint.

use std::time::Duration;

use quick_xml::escape::resolve_html5_entity;
use reqwest::{blocking::Client, header};
use serde::Deserialize;

use crate::{
    foundation::error::{MediaError, MediaResult},
    transcripts::{
        model::{Segment, TrackListing, TranscriptTrack},
        source::TranscriptSource,
    },
};

const WATCH_URL: &str = "https://www.youtube.com/watch";
const PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "20.10.38";

pub struct YoutubeSource {
    client: Client,
}

impl YoutubeSource {
    pub fn new() -> MediaResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US"),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MediaError::transcript(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }

    fn api_key(&self, video_id: &str) -> MediaResult<String> {
        let html = self
            .client
            .get(WATCH_URL)
            .query(&[("v", video_id)])
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| MediaError::transcript(format!("watch page request failed: {e}")))?;

        if html.contains("class=\"g-recaptcha\"") {
            return Err(MediaError::transcript(
                "request blocked by a captcha (too many requests from this IP)",
            ));
        }
        extract_api_key(&html)
            .ok_or_else(|| MediaError::transcript("could not find INNERTUBE_API_KEY on watch page"))
    }

    fn player(&self, video_id: &str, api_key: &str) -> MediaResult<PlayerResponse> {
        let body = serde_json::json!({
            "context": { "client": { "clientName": CLIENT_NAME, "clientVersion": CLIENT_VERSION } },
            "videoId": video_id,
        });
        self.client
            .post(PLAYER_URL)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<PlayerResponse>())
            .map_err(|e| MediaError::transcript(format!("player request failed: {e}")))
    }
}

impl TranscriptSource for YoutubeSource {
    fn list(&self, video_id: &str) -> MediaResult<TrackListing> {
        let key = self.api_key(video_id)?;
        let player = self.player(video_id, &key)?;
        listing_from_player(player)
    }

    fn fetch(
        &self,
        track: &TranscriptTrack,
        translate_to: Option<&str>,
    ) -> MediaResult<Vec<Segment>> {
        if translate_to.is_some() && !track.translatable {
            return Err(MediaError::transcript(format!(
                "'{}' transcript is not translatable",
                track.language_code
            )));
        }
        let url = timedtext_url(&track.url, translate_to);
        let xml = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| MediaError::transcript(format!("timed text request failed: {e}")))?;
        parse_timedtext(&xml)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
    #[serde(default)]
    translation_languages: Vec<TranslationLanguage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    kind: Option<String>,
    name: Option<RenderedText>,
    #[serde(default)]
    is_translatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationLanguage {
    language_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderedText {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl RenderedText {
    fn flatten(&self) -> String {
        match &self.simple_text {
            Some(s) => s.clone(),
            None => self.runs.iter().map(|r| r.text.as_str()).collect(),
        }
    }
}

fn listing_from_player(player: PlayerResponse) -> MediaResult<TrackListing> {
    if let Some(status) = &player.playability_status
        && status.status != "OK"
    {
        return Err(MediaError::transcript(format!(
            "video is unplayable ({}): {}",
            status.status,
            status.reason.as_deref().unwrap_or("no reason given")
        )));
    }

    let Some(renderer) = player
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
    else {
        return Err(MediaError::transcript("transcripts are disabled for this video"));
    };

    let tracks = renderer
        .caption_tracks
        .into_iter()
        .map(|t| TranscriptTrack {
            language_name: t
                .name
                .as_ref()
                .map(RenderedText::flatten)
                .unwrap_or_else(|| t.language_code.clone()),
            language_code: t.language_code,
            generated: t.kind.as_deref() == Some("asr"),
            translatable: t.is_translatable,
            url: t.base_url,
        })
        .collect();

    Ok(TrackListing {
        tracks,
        translation_languages: renderer
            .translation_languages
            .into_iter()
            .map(|l| l.language_code)
            .collect(),
    })
}

fn extract_api_key(html: &str) -> Option<String> {
    const MARKER: &str = "\"INNERTUBE_API_KEY\":";
    let rest = &html[html.find(MARKER)? + MARKER.len()..];
    let rest = rest.trim_start().strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

fn timedtext_url(base: &str, translate_to: Option<&str>) -> String {
    let mut url = base.replace("&fmt=srv3", "");
    if let Some(lang) = translate_to {
        url.push_str("&tlang=");
        url.push_str(lang);
    }
    url
}

/// Parse the `<transcript><text start dur>..</text></transcript>` format.
pub fn parse_timedtext(xml: &str) -> MediaResult<Vec<Segment>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| MediaError::transcript(format!("timed text XML parse error: {e}")))?;

    let mut segments = Vec::new();
    for node in doc
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "text")
    {
        let raw: String = node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();
        let text = strip_tags(&unescape_html(&raw));
        if text.trim().is_empty() {
            continue;
        }
        let attr = |name: &str| {
            node.attribute(name)
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(0.0)
        };
        segments.push(Segment {
            start: attr("start"),
            duration: attr("dur"),
            text,
        });
    }
    Ok(segments)
}

/// Caption text is HTML-escaped a second time inside the XML.
///
/// Text with an unknown or unterminated entity is kept as it is.
fn unescape_html(s: &str) -> String {
    match quick_xml::escape::unescape_with(s, resolve_html5_entity) {
        Ok(text) => text.into_owned(),
        Err(e) => {
            tracing::debug!(error = %e, "caption text left escaped");
            s.to_string()
        }
    }
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
