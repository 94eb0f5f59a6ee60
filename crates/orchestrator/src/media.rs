//! Prompt cleanup and option parsing for media requests.

use assistant_core::VideoOptions;
use regex::Regex;
use std::sync::LazyLock;

/// Leading request phrasing stripped before the prompt goes to a media
/// service: courtesy words, the generation verb, articles, and the
/// media noun, e.g. "can you generate an image of".
static MEDIA_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:can you |could you |please )*(?:generate|create|make|draw|paint|render|animate)\s+(?:me\s+)?(?:an?\s+)?(?:ultra\s+)?(?:image|picture|photo|illustration|drawing|wallpaper|video|clip|animation)?\s*(?:of|showing|with)?\s*",
    )
    .expect("media prefix regex")
});

/// Clip durations the video service accepts, in seconds.
const ALLOWED_DURATIONS: [u32; 3] = [4, 6, 8];

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,3})\s*(?:seconds?|secs?|s)\b").expect("duration regex"));

/// Strip request phrasing from a media message, leaving the subject.
///
/// "generate an ultra image of a cat" becomes "a cat". Falls back to
/// the whole message when stripping would leave nothing.
pub fn clean_media_prompt(message: &str) -> String {
    let trimmed = message.trim();
    let stripped = MEDIA_PREFIX_RE.replace(trimmed, "");
    let cleaned = stripped
        .trim()
        .trim_start_matches([':', ','])
        .trim()
        .to_string();

    if cleaned.is_empty() {
        trimmed.to_string()
    } else {
        cleaned
    }
}

/// Pull video options out of the request text.
///
/// Recognizes resolution (720p/1080p), aspect ratio (explicit or via
/// portrait/landscape/square), clip duration limited to the service's
/// supported lengths, and audio on/off phrasing. Anything unrecognized
/// stays unset so the service applies its defaults.
pub fn parse_video_options(message: &str) -> VideoOptions {
    let lower = message.to_lowercase();
    let mut options = VideoOptions::default();

    if lower.contains("1080p") {
        options.resolution = Some("1080p".to_string());
    } else if lower.contains("720p") {
        options.resolution = Some("720p".to_string());
    }

    if lower.contains("9:16") || lower.contains("portrait") || lower.contains("vertical") {
        options.aspect_ratio = Some("9:16".to_string());
    } else if lower.contains("16:9") || lower.contains("landscape") || lower.contains("widescreen")
    {
        options.aspect_ratio = Some("16:9".to_string());
    } else if lower.contains("1:1") || lower.contains("square") {
        options.aspect_ratio = Some("1:1".to_string());
    }

    if let Some(captures) = DURATION_RE.captures(&lower) {
        if let Some(secs) = captures.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
            if ALLOWED_DURATIONS.contains(&secs) {
                options.duration_secs = Some(secs);
            }
        }
    }

    if lower.contains("no audio")
        || lower.contains("without audio")
        || lower.contains("without sound")
        || lower.contains("muted")
        || lower.contains("silent")
    {
        options.audio = Some(false);
    } else if lower.contains("with audio") || lower.contains("with sound") {
        options.audio = Some(true);
    }

    options
}
