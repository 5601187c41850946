//! Language codes understood by the DeepL translation API.

/// App language code to DeepL language code.
const DEEPL_CODES: &[(&str, &str)] = &[
    ("en", "EN"),
    ("es", "ES"),
    ("fr", "FR"),
    ("de", "DE"),
    ("it", "IT"),
    ("pt", "PT"),
    ("ru", "RU"),
    ("ja", "JA"),
    ("ko", "KO"),
    ("zh", "ZH"),
    ("ar", "AR"),
    ("hi", "HI"),
    ("tr", "TR"),
    ("pl", "PL"),
    ("nl", "NL"),
    ("sv", "SV"),
    ("da", "DA"),
    ("no", "NB"),
    ("fi", "FI"),
    ("cs", "CS"),
    ("sk", "SK"),
    ("sl", "SL"),
    ("et", "ET"),
    ("lv", "LV"),
    ("lt", "LT"),
    ("bg", "BG"),
    ("ro", "RO"),
    ("el", "EL"),
    ("hu", "HU"),
    ("uk", "UK"),
    ("id", "ID"),
];

/// Source code meaning "let DeepL detect it".
pub const AUTO_DETECT: &str = "auto";

pub fn deepl_code(app_code: &str) -> Option<&'static str> {
    DEEPL_CODES
        .iter()
        .find(|(code, _)| *code == app_code)
        .map(|(_, deepl)| *deepl)
}

pub fn is_supported(app_code: &str) -> bool {
    app_code == AUTO_DETECT || deepl_code(app_code).is_some()
}

pub fn supported_languages() -> impl Iterator<Item = &'static str> {
    DEEPL_CODES.iter().map(|(code, _)| *code)
}
