/*!
 * Language code to synthesizer voice resolution.
 *
 * The rendering service speaks with Azure neural voices. Each supported
 * language (and a few regional variants) maps to exactly one voice id.
 * Lookups are case-insensitive and fall back from a regional code
 * (`fr-CA`) to its base language (`fr`) before giving up.
 */

use std::collections::HashMap;
use std::sync::LazyLock;

/// Code used when a language has no voice of its own
pub const FALLBACK_LANGUAGE: &str = "en";

/// Voice of the fallback language
pub const FALLBACK_VOICE: &str = "en-US-JennyNeural";

static VOICES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("ar", "ar-SA-ZariyahNeural"),
        ("bg", "bg-BG-KalinaNeural"),
        ("ca", "ca-ES-JoanaNeural"),
        ("cs", "cs-CZ-VlastaNeural"),
        ("da", "da-DK-ChristelNeural"),
        ("de", "de-DE-KatjaNeural"),
        ("el", "el-GR-AthinaNeural"),
        (FALLBACK_LANGUAGE, FALLBACK_VOICE),
        ("en-au", "en-AU-NatashaNeural"),
        ("en-gb", "en-GB-SoniaNeural"),
        ("es", "es-ES-ElviraNeural"),
        ("es-mx", "es-MX-DaliaNeural"),
        ("fa", "fa-IR-DilaraNeural"),
        ("fi", "fi-FI-NooraNeural"),
        ("fr", "fr-FR-DeniseNeural"),
        ("fr-ca", "fr-CA-SylvieNeural"),
        ("he", "he-IL-HilaNeural"),
        ("hi", "hi-IN-SwaraNeural"),
        ("hr", "hr-HR-GabrijelaNeural"),
        ("hu", "hu-HU-NoemiNeural"),
        ("id", "id-ID-GadisNeural"),
        ("it", "it-IT-ElsaNeural"),
        ("ja", "ja-JP-NanamiNeural"),
        ("ko", "ko-KR-SunHiNeural"),
        ("ms", "ms-MY-YasminNeural"),
        ("nb", "nb-NO-PernilleNeural"),
        ("nl", "nl-NL-ColetteNeural"),
        ("no", "nb-NO-PernilleNeural"),
        ("pl", "pl-PL-AgnieszkaNeural"),
        ("pt", "pt-BR-FranciscaNeural"),
        ("pt-pt", "pt-PT-RaquelNeural"),
        ("ro", "ro-RO-AlinaNeural"),
        ("ru", "ru-RU-SvetlanaNeural"),
        ("sk", "sk-SK-ViktoriaNeural"),
        ("sv", "sv-SE-SofieNeural"),
        ("sw", "sw-KE-ZuriNeural"),
        ("th", "th-TH-PremwadeeNeural"),
        ("tr", "tr-TR-EmelNeural"),
        ("uk", "uk-UA-PolinaNeural"),
        ("vi", "vi-VN-HoaiMyNeural"),
        ("zh", "zh-CN-XiaoxiaoNeural"),
        ("zh-tw", "zh-TW-HsiaoChenNeural"),
    ])
});

/// Voices used for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceAssignment {
    /// Voice speaking the source-language words
    pub source_voice_id: String,
    /// Voice speaking the target-language words
    pub target_voice_id: String,
}

impl VoiceAssignment {
    /// Resolve both voices from their language codes
    pub fn for_languages(source_language: &str, target_language: &str) -> Self {
        Self {
            source_voice_id: resolve_voice(source_language).to_string(),
            target_voice_id: resolve_voice(target_language).to_string(),
        }
    }
}

/// Lowercase, trim and unify the region separator
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase().replace('_', "-")
}

/// Exact match first, then the base language before the first `-`
fn lookup(code: &str) -> Option<&'static str> {
    let normalized = normalize_code(code);
    if let Some(voice) = VOICES.get(normalized.as_str()) {
        return Some(*voice);
    }

    let base = normalized.split('-').next().unwrap_or_default();
    VOICES.get(base).copied()
}

/// Voice id for a language code, falling back to the English voice
pub fn resolve_voice(code: &str) -> &'static str {
    lookup(code).unwrap_or(FALLBACK_VOICE)
}

/// Whether a language code has a voice without falling back
pub fn is_supported(code: &str) -> bool {
    lookup(code).is_some()
}

/// All codes present in the voice table, sorted
pub fn supported_codes() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = VOICES.keys().copied().collect();
    codes.sort_unstable();
    codes
}
