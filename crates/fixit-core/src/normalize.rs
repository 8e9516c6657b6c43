/// Canonical form of OCR text, used for both stored keys and queries.
///
/// Lower-cases, folds the typographic apostrophe, drops everything except
/// ASCII letters, digits, dots and whitespace, then collapses whitespace.
/// Dots survive so version numbers and file names stay recognisable.
pub fn normalize(text: &str) -> String {
    let text = text.to_lowercase().replace('\u{2019}', "'");

    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '.' || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_quote_invariance() {
        assert_eq!(normalize("Error\u{2019}s Code"), normalize("error's code"));
        assert_eq!(normalize("Error\u{2019}s Code"), "errors code");
    }

    #[test]
    fn test_dots_survive_punctuation_stripping() {
        assert_eq!(normalize("file.txt, error!"), "file.txt error");
        assert_eq!(normalize("Python 3.11.4 (x64)"), "python 3.11.4 x64");
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(normalize("  Disk\n\tfull \r\n on   C:  "), "disk full on c");
    }

    #[test]
    fn test_empty_and_symbol_only_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!! ??? ---"), "");
    }

    #[test]
    fn test_non_ascii_letters_are_dropped() {
        assert_eq!(normalize("Fehler: Datei \u{fc}berschrieben"), "fehler datei berschrieben");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "Error: Disk Full on C:",
            "  The system can\u{2019}t find the file specified. (0x80070002) ",
            "ÄÖÜ İstanbul \u{00a0} tabs\tand\nnewlines",
            "v1.2.3...final!!",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }
}
