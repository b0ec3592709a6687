//! Fixed keyword lexicons and the known social-media output dimensions.
//!
//! These are policy constants: the decision logic never embeds its own
//! token lists. Matching is case-insensitive substring membership.

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;

pub const SCREENSHOT_KEYWORDS: [&str; 8] = [
    "screenshot",
    "screen_shot",
    "capture",
    "screencap",
    "screencast",
    "prtsc",
    "snap",
    "ss-",
];

pub const EDITING_SOFTWARE: [&str; 17] = [
    "photoshop",
    "lightroom",
    "gimp",
    "canva",
    "snapseed",
    "picsart",
    "vsco",
    "remini",
    "faceapp",
    "meitu",
    "capcut",
    "b612",
    "beautyplus",
    "illustrator",
    "coreldraw",
    "polarr",
    "pixlr",
];

pub const SOCIAL_PLATFORMS: [&str; 11] = [
    "instagram",
    "facebook",
    "twitter",
    "tiktok",
    "whatsapp",
    "telegram",
    "discord",
    "line",
    "wechat",
    "reddit",
    "messenger",
];

pub const AI_GENERATORS: [&str; 7] = [
    "midjourney",
    "stable diffusion",
    "dall-e",
    "novelai",
    "firefly",
    "bing image creator",
    "comfyui",
];

pub const SCREENSHOT_SOFTWARE: [&str; 7] = [
    "sharex",
    "snipping tool",
    "mac os x",
    "gnome-screenshot",
    "spectacle",
    "android",
    "screenshot",
];

pub const KNOWN_OUTPUT_LONG_EDGES: [u32; 8] = [720, 800, 1024, 1080, 1280, 1350, 1600, 2048];

const EXPLICIT_OUTPUT_PAIR: (u32, u32) = (720, 1280);

fn build_matcher(tokens: &[&str]) -> AhoCorasick {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(tokens)
        .expect("lexicon tokens are valid patterns")
}

static SCREENSHOT_MATCHER: LazyLock<AhoCorasick> =
    LazyLock::new(|| build_matcher(&SCREENSHOT_KEYWORDS));
static EDITING_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| build_matcher(&EDITING_SOFTWARE));
static SOCIAL_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| build_matcher(&SOCIAL_PLATFORMS));
static AI_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| build_matcher(&AI_GENERATORS));
static SCREENSHOT_SOFTWARE_MATCHER: LazyLock<AhoCorasick> =
    LazyLock::new(|| build_matcher(&SCREENSHOT_SOFTWARE));

pub fn has_screenshot_keyword(text: &str) -> bool {
    SCREENSHOT_MATCHER.is_match(text)
}

pub fn names_editing_software(text: &str) -> bool {
    EDITING_MATCHER.is_match(text)
}

pub fn names_social_platform(text: &str) -> bool {
    SOCIAL_MATCHER.is_match(text)
}

pub fn names_ai_generator(text: &str) -> bool {
    AI_MATCHER.is_match(text)
}

pub fn names_screenshot_software(text: &str) -> bool {
    SCREENSHOT_SOFTWARE_MATCHER.is_match(text)
}

/// Social platforms and messengers emit a small set of long-edge sizes;
/// 720x1280 is matched as a pair in either orientation.
pub fn matches_known_output_dimensions(width: u32, height: u32) -> bool {
    let long_edge = width.max(height);
    let short_edge = width.min(height);
    KNOWN_OUTPUT_LONG_EDGES.contains(&long_edge)
        || (short_edge == EXPLICIT_OUTPUT_PAIR.0 && long_edge == EXPLICIT_OUTPUT_PAIR.1)
}
