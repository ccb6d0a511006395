//! Heuristic English-language detection.
//!
//! A handful of keyword and attribute checks, each short-circuiting on the
//! first positive signal. There is no formal model behind this and no
//! accuracy target; the thresholds live in configuration so a calibrated
//! strategy can replace this one without touching the collection loop.

use scraper::{Html, Selector};

use crate::config::ClassifierConfig;

/// Common English function words checked against titles and body text.
const FUNCTION_WORDS: &[&str] = &[
    "the", "and", "for", "with", "you", "your", "this", "that", "from", "have", "are", "was",
    "not", "but", "all", "can", "what", "when", "how", "about",
];

/// Common English navigation labels.
const NAV_WORDS: &[&str] = &[
    "home", "about", "contact", "blog", "archive", "search", "posts", "projects", "tags", "now",
];

/// Input to a classification: the page title plus raw document HTML.
pub struct PageSample<'a> {
    pub title: &'a str,
    pub html: &'a str,
}

/// What the classifier concluded, with a markdown note describing the
/// signal that decided it.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub is_english: bool,
    pub notes: String,
}

impl Detection {
    fn english(notes: impl Into<String>) -> Self {
        Self {
            is_english: true,
            notes: notes.into(),
        }
    }

    fn non_english(notes: impl Into<String>) -> Self {
        Self {
            is_english: false,
            notes: notes.into(),
        }
    }
}

/// Pluggable classification strategy.
pub trait LanguageClassifier {
    fn classify(&self, page: &PageSample<'_>) -> Detection;
}

/// The default keyword/attribute heuristic.
pub struct HeuristicClassifier {
    config: ClassifierConfig,
}

impl HeuristicClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    fn classify_inner(&self, page: &PageSample<'_>) -> anyhow::Result<Detection> {
        let document = Html::parse_document(page.html);

        // 1. Declared language attribute wins outright.
        if let Some(lang) = declared_language(&document) {
            if lang.to_ascii_lowercase().starts_with("en") {
                return Ok(Detection::english(format!("declared language `{}`", lang)));
            }
        }

        // 2. English function words in the title.
        let title_hits = distinct_matches(page.title, FUNCTION_WORDS);
        if title_hits >= self.config.title_word_min {
            return Ok(Detection::english(format!(
                "{} English function words in title",
                title_hits
            )));
        }

        // 3. Function-word density over sampled visible text.
        let sample = sample_text(&document, self.config.sample_chars)?;
        let words: Vec<&str> = sample
            .split_whitespace()
            .take(self.config.word_cap)
            .collect();
        if !words.is_empty() {
            let hits = words
                .iter()
                .filter(|w| FUNCTION_WORDS.contains(&normalize(w).as_str()))
                .count();
            let fraction = hits as f64 / words.len() as f64;
            if fraction >= self.config.text_fraction {
                return Ok(Detection::english(format!(
                    "{:.0}% English function words in sampled text ({} of {})",
                    fraction * 100.0,
                    hits,
                    words.len()
                )));
            }
        }

        // 4. English navigation labels.
        let nav_hits = distinct_matches(&nav_text(&document)?, NAV_WORDS);
        if nav_hits >= self.config.nav_word_min {
            return Ok(Detection::english(format!(
                "{} English navigation words",
                nav_hits
            )));
        }

        Ok(Detection::non_english(
            "no English signals in language attribute, title, text sample, or navigation",
        ))
    }
}

impl LanguageClassifier for HeuristicClassifier {
    fn classify(&self, page: &PageSample<'_>) -> Detection {
        // Benefit of the doubt: a failure inside detection classifies the
        // page as English rather than discarding it.
        self.classify_inner(page).unwrap_or_else(|e| {
            Detection::english(format!("detection failed ({}), assumed English", e))
        })
    }
}

fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("bad selector `{}`: {}", css, e))
}

fn declared_language(document: &Html) -> Option<String> {
    let html_sel = Selector::parse("html").ok()?;
    document
        .select(&html_sel)
        .next()
        .and_then(|el| el.value().attr("lang"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Lowercase a token and strip anything that is not a letter.
fn normalize(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase()
}

/// Count how many distinct words from `list` appear in `text`.
fn distinct_matches(text: &str, list: &[&str]) -> usize {
    let words: std::collections::HashSet<String> =
        text.split_whitespace().map(normalize).collect();
    list.iter().filter(|w| words.contains(**w)).count()
}

/// Visible text from the structural elements, capped by character count.
fn sample_text(document: &Html, cap: usize) -> anyhow::Result<String> {
    let sel = selector("p, h1, h2, h3, nav, main, article")?;
    let mut sample = String::new();
    for element in document.select(&sel) {
        for chunk in element.text() {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            if !sample.is_empty() {
                sample.push(' ');
            }
            sample.push_str(chunk);
            if sample.len() >= cap {
                return Ok(sample);
            }
        }
    }
    Ok(sample)
}

/// Concatenated link text from the navigation.
fn nav_text(document: &Html) -> anyhow::Result<String> {
    let sel = selector("nav a")?;
    let mut text = String::new();
    for element in document.select(&sel) {
        for chunk in element.text() {
            text.push_str(chunk);
            text.push(' ');
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> HeuristicClassifier {
        HeuristicClassifier::new(ClassifierConfig::default())
    }

    #[test]
    fn test_declared_language_decides_immediately() {
        // Content is deliberately non-English; the lang attribute must
        // short-circuit before any sampling happens.
        let html = r#"<html lang="en-GB"><body><p>zxqv brmpt lorgh</p></body></html>"#;
        let page = PageSample { title: "zxqv", html };

        let first = classifier().classify(&page);
        assert!(first.is_english);
        assert!(first.notes.contains("declared language"));

        // Deterministic on fixed input.
        let second = classifier().classify(&page);
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_english_lang_attribute_falls_through() {
        let html = r#"<html lang="de"><body><p>Impressum Datenschutz</p></body></html>"#;
        let page = PageSample {
            title: "Startseite",
            html,
        };
        let detection = classifier().classify(&page);
        assert!(!detection.is_english);
    }

    #[test]
    fn test_title_function_words() {
        let html = "<html><body></body></html>";
        let page = PageSample {
            title: "Notes from the road, and what I learned",
            html,
        };
        let detection = classifier().classify(&page);
        assert!(detection.is_english);
        assert!(detection.notes.contains("title"));
    }

    #[test]
    fn test_sampled_text_density() {
        let html = r#"<html><body>
            <p>This is the story of a site that you and all of your friends
            can read, because it was written for the web with all the usual
            words that are common in English prose.</p>
        </body></html>"#;
        let page = PageSample { title: "x", html };
        let detection = classifier().classify(&page);
        assert!(detection.is_english);
    }

    #[test]
    fn test_nav_words_rescue_sparse_pages() {
        let html = r#"<html><body>
            <nav><a href="/">Home</a><a href="/blog">Blog</a><a href="/a">Archiv</a></nav>
            <p>zzz qqq</p>
        </body></html>"#;
        let page = PageSample { title: "zzz", html };
        let detection = classifier().classify(&page);
        assert!(detection.is_english);
        assert!(detection.notes.contains("navigation"));
    }

    #[test]
    fn test_no_signal_means_non_english() {
        let html = r#"<html><body>
            <nav><a href="/">Startseite</a><a href="/b">Uber</a></nav>
            <p>Willkommen auf meiner Seite. Hier schreibe ich regelmaessig.</p>
        </body></html>"#;
        let page = PageSample {
            title: "Meine Seite",
            html,
        };
        let detection = classifier().classify(&page);
        assert!(!detection.is_english);
    }
}
