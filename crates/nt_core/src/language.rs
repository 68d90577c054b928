use whatlang::Lang;

/// Detects the language of article text.
pub trait LanguageDetector {
    /// Returns an ISO 639-1 code when possible, `None` when detection fails.
    fn detect(&self, text: &str) -> Option<String>;
}

/// Detector backed by `whatlang` trigram models.
#[derive(Debug, Clone, Default)]
pub struct WhatlangDetector {
    require_reliable: bool,
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat low-confidence guesses as failures.
    pub fn with_reliability(mut self, required: bool) -> Self {
        self.require_reliable = required;
        self
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        let info = whatlang::detect(text)?;
        if self.require_reliable && !info.is_reliable() {
            return None;
        }
        let lang = info.lang();
        Some(iso_639_1(lang).unwrap_or_else(|| lang.code()).to_string())
    }
}

/// Two-letter code for the languages whatlang reports with three letters.
fn iso_639_1(lang: Lang) -> Option<&'static str> {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Por => "pt",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Pol => "pl",
        Lang::Ces => "cs",
        Lang::Slk => "sk",
        Lang::Slv => "sl",
        Lang::Hrv => "hr",
        Lang::Srp => "sr",
        Lang::Bul => "bg",
        Lang::Ron => "ro",
        Lang::Hun => "hu",
        Lang::Ell => "el",
        Lang::Tur => "tr",
        Lang::Swe => "sv",
        Lang::Dan => "da",
        Lang::Nob => "nb",
        Lang::Fin => "fi",
        Lang::Est => "et",
        Lang::Lav => "lv",
        Lang::Lit => "lt",
        Lang::Cat => "ca",
        Lang::Lat => "la",
        Lang::Epo => "eo",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Pes => "fa",
        Lang::Hin => "hi",
        Lang::Ben => "bn",
        Lang::Urd => "ur",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh",
        Lang::Vie => "vi",
        Lang::Tha => "th",
        Lang::Ind => "id",
        Lang::Afr => "af",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH: &str = "The government announced a new budget for public schools and \
        hospitals this week, and the opposition promised to challenge it in the senate.";
    const SPANISH: &str = "El gobierno anunció un nuevo presupuesto para las escuelas y los \
        hospitales públicos esta semana.";

    #[test]
    fn test_detects_common_languages() {
        let detector = WhatlangDetector::new();
        assert_eq!(detector.detect(ENGLISH).as_deref(), Some("en"));
        assert_eq!(detector.detect(SPANISH).as_deref(), Some("es"));
    }

    #[test]
    fn test_reliability_rejects_weak_guesses() {
        let strict = WhatlangDetector::new().with_reliability(true);
        assert_eq!(strict.detect(ENGLISH).as_deref(), Some("en"));

        let short = "no se";
        let reliable = whatlang::detect(short).map_or(false, |info| info.is_reliable());
        assert_eq!(strict.detect(short).is_some(), reliable);
    }

    #[test]
    fn test_empty_text_fails() {
        assert_eq!(WhatlangDetector::new().detect("   "), None);
    }
}
