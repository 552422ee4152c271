//! 语言识别模块
//! 只区分俄语（主语言）与哈萨克语（次语言），用于挑选回退应答

use serde::{Deserialize, Serialize};

/// 支持的语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportedLanguage {
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "kk")]
    Kazakh,
}

impl SupportedLanguage {
    pub const PRIMARY: SupportedLanguage = SupportedLanguage::Russian;
    pub const SECONDARY: SupportedLanguage = SupportedLanguage::Kazakh;

    pub fn code(&self) -> &'static str {
        match self {
            SupportedLanguage::Russian => "ru",
            SupportedLanguage::Kazakh => "kk",
        }
    }
}

impl std::fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// 语言特征：专有字母 + 常用词
#[derive(Debug)]
pub struct LanguageMarkers {
    pub language: SupportedLanguage,
    pub letters: &'static [char],
    pub words: &'static [&'static str],
}

impl LanguageMarkers {
    /// 文本是否带有该语言的特征
    pub fn matches(&self, text: &str) -> bool {
        if text.chars().any(|c| self.letters.contains(&c)) {
            return true;
        }

        text.split_whitespace().any(|raw| {
            let word = raw
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            self.words.contains(&word.as_str())
        })
    }
}

/// 哈萨克语西里尔字母中俄语没有的字母，以及俄语里不会出现的常用词
pub static KAZAKH_MARKERS: LanguageMarkers = LanguageMarkers {
    language: SupportedLanguage::Kazakh,
    letters: &[
        'ә', 'ғ', 'қ', 'ң', 'ө', 'ұ', 'ү', 'һ', 'і',
        'Ә', 'Ғ', 'Қ', 'Ң', 'Ө', 'Ұ', 'Ү', 'Һ', 'І',
    ],
    words: &[
        "мен", "сен", "керек", "туралы", "бойынша", "деген", "жауап", "болады", "рахмет",
    ],
};

/// 识别文本语言，未命中次语言特征时返回主语言
pub fn detect_language(text: &str) -> SupportedLanguage {
    if KAZAKH_MARKERS.matches(text) {
        KAZAKH_MARKERS.language
    } else {
        SupportedLanguage::PRIMARY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_letter() {
        assert_eq!(detect_language("Қазақстан астанасы қай қала?"), SupportedLanguage::Kazakh);
        assert_eq!(detect_language("ұбт"), SupportedLanguage::Kazakh);
    }

    #[test]
    fn test_detect_by_word() {
        assert_eq!(detect_language("Физика туралы айтып бер"), SupportedLanguage::Kazakh);
        assert_eq!(detect_language("РАХМЕТ!"), SupportedLanguage::Kazakh);
    }

    #[test]
    fn test_word_must_be_whole() {
        // "менеджер" 只包含 "мен" 作为前缀
        assert_eq!(detect_language("Кто такой менеджер?"), SupportedLanguage::Russian);
    }

    #[test]
    fn test_shared_words_stay_russian() {
        // "бар" 在俄语中也是常用词（压强单位）
        assert_eq!(detect_language("Что такое бар в физике?"), SupportedLanguage::Russian);
        assert_eq!(detect_language("Сколько паскалей в 1 бар ?"), SupportedLanguage::Russian);
    }

    #[test]
    fn test_defaults_to_primary() {
        assert_eq!(detect_language("Что такое ЕНТ?"), SupportedLanguage::Russian);
        assert_eq!(detect_language("hello"), SupportedLanguage::Russian);
        assert_eq!(detect_language(""), SupportedLanguage::Russian);
    }

    #[test]
    fn test_codes() {
        assert_eq!(SupportedLanguage::PRIMARY.code(), "ru");
        assert_eq!(SupportedLanguage::SECONDARY.to_string(), "kk");
    }
}
