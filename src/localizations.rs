use std::collections::HashMap;

use unic_langid::LanguageIdentifier;

const FALLBACK_LANG: &str = "zh-CN";

// Simple in-memory translations
#[derive(Default)]
pub struct Translations {
    strings: HashMap<&'static str, &'static str>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: &'static str) {
        self.strings.insert(key, value);
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.strings.get(key).copied()
    }
}

/// Labels for the window chrome. Status and error text come from the
/// controller and are not translated.
pub struct Localizations {
    translations: HashMap<&'static str, Translations>,
    current_lang: &'static str,
}

impl Localizations {
    pub fn new(lang: &LanguageIdentifier) -> Self {
        let mut translations = HashMap::new();

        let mut zh = Translations::new();
        zh.insert("app-title", "视频下载器");
        zh.insert("url-label", "视频URL:");
        zh.insert("url-placeholder", "请输入视频URL");
        zh.insert("check-button", "获取格式");
        zh.insert("check-busy", "获取中...");
        zh.insert("format-label", "选择格式:");
        zh.insert("format-placeholder", "请选择格式...");
        zh.insert("best-button", "推荐格式");
        zh.insert("download-button", "下载");
        zh.insert("progress-title", "下载进度");
        zh.insert("alert-title", "提示");
        zh.insert("alert-ok", "确定");
        translations.insert("zh-CN", zh);

        let mut en = Translations::new();
        en.insert("app-title", "Video Downloader");
        en.insert("url-label", "Video URL:");
        en.insert("url-placeholder", "Enter video URL");
        en.insert("check-button", "Get formats");
        en.insert("check-busy", "Loading...");
        en.insert("format-label", "Format:");
        en.insert("format-placeholder", "Choose a format...");
        en.insert("best-button", "Recommended");
        en.insert("download-button", "Download");
        en.insert("progress-title", "Progress");
        en.insert("alert-title", "Notice");
        en.insert("alert-ok", "OK");
        translations.insert("en-US", en);

        let current_lang = match lang.language.as_str() {
            "en" => "en-US",
            _ => FALLBACK_LANG,
        };

        Self {
            translations,
            current_lang,
        }
    }

    pub fn current_lang(&self) -> &str {
        self.current_lang
    }

    pub fn lookup_single_language(&self, key: &str) -> Option<String> {
        self.translations
            .get(self.current_lang)
            .and_then(|t| t.lookup(key))
            .or_else(|| {
                // Fallback to Chinese if the current language doesn't have the key
                self.translations
                    .get(FALLBACK_LANG)
                    .and_then(|t| t.lookup(key))
            })
            .map(|s| s.to_string())
    }

    /// Lookup that never fails, returning the key itself when missing.
    pub fn text(&self, key: &str) -> String {
        self.lookup_single_language(key)
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unic_langid::langid;

    #[test]
    fn picks_language_from_identifier() {
        assert_eq!(Localizations::new(&langid!("en-GB")).current_lang(), "en-US");
        assert_eq!(Localizations::new(&langid!("zh-TW")).current_lang(), "zh-CN");
        assert_eq!(Localizations::new(&langid!("de-DE")).current_lang(), "zh-CN");
    }

    #[test]
    fn lookup_translates_and_falls_back() {
        let en = Localizations::new(&langid!("en-US"));
        assert_eq!(en.text("download-button"), "Download");
        assert_eq!(en.text("missing-key"), "missing-key");

        let zh = Localizations::new(&langid!("zh-CN"));
        assert_eq!(zh.text("check-button"), "获取格式");
    }
}
