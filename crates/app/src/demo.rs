//! Built-in sample content for `--demo`.

use lingo_core::model::{Difficulty, Language};
use services::InMemoryBackend;
use services::api::{QuizDto, WordPairDto};

pub const USERNAME: &str = "demo";
pub const PASSWORD: &str = "demo-pass";

const WORDS: [(Language, &[(&str, &str)]); 4] = [
    (
        Language::Fr,
        &[
            ("chat", "cat"),
            ("chien", "dog"),
            ("pain", "bread"),
            ("eau", "water"),
            ("maison", "house"),
            ("livre", "book"),
        ],
    ),
    (
        Language::Es,
        &[
            ("gato", "cat"),
            ("perro", "dog"),
            ("pan", "bread"),
            ("agua", "water"),
            ("casa", "house"),
        ],
    ),
    (
        Language::De,
        &[
            ("Katze", "cat"),
            ("Hund", "dog"),
            ("Brot", "bread"),
            ("Wasser", "water"),
            ("Haus", "house"),
        ],
    ),
    (
        Language::It,
        &[
            ("gatto", "cat"),
            ("cane", "dog"),
            ("pane", "bread"),
            ("acqua", "water"),
            ("casa", "house"),
        ],
    ),
];

const KEYBOARDS: [(Language, &[&str]); 4] = [
    (Language::Fr, &["é", "è", "ê", "à", "ç", "ù"]),
    (Language::Es, &["ñ", "á", "é", "í", "ó", "ú"]),
    (Language::De, &["ä", "ö", "ü", "ß"]),
    (Language::It, &["à", "è", "é", "ì", "ò", "ù"]),
];

/// Bingo levels for French. Other languages play the main vocabulary at
/// every level.
const FRENCH_BINGO: [(Difficulty, &[(&str, &str)]); 2] = [
    (
        Difficulty::Medium,
        &[
            ("fenêtre", "window"),
            ("voiture", "car"),
            ("fromage", "cheese"),
            ("pomme", "apple"),
        ],
    ),
    (
        Difficulty::Hard,
        &[
            ("bibliothèque", "library"),
            ("épicerie", "grocery"),
            ("grenouille", "frog"),
            ("parapluie", "umbrella"),
            ("chaussette", "sock"),
            ("écureuil", "squirrel"),
            ("boulangerie", "bakery"),
            ("citrouille", "pumpkin"),
            ("horloge", "clock"),
        ],
    ),
];

/// Every game gets the same vocabulary: quiz questions ask for the meaning
/// of each word with two neighbouring meanings as distractors.
pub fn backend() -> InMemoryBackend {
    let mut backend = InMemoryBackend::new().with_user(USERNAME, PASSWORD, "user");

    for (language, words) in WORDS {
        let pairs: Vec<WordPairDto> = words
            .iter()
            .map(|(word, translation)| WordPairDto {
                word: (*word).to_string(),
                translation: Some((*translation).to_string()),
            })
            .collect();

        let quizzes = words
            .iter()
            .enumerate()
            .map(|(i, (word, translation))| {
                let mut options: Vec<String> = (0..3)
                    .map(|offset| words[(i + offset) % words.len()].1.to_string())
                    .collect();
                options.rotate_left(i % 3);
                QuizDto {
                    question: format!("What does \"{word}\" mean?"),
                    options,
                    answer: (*translation).to_string(),
                    language: language.code().to_string(),
                }
            })
            .collect();

        backend = backend
            .with_quizzes(language, quizzes)
            .with_words(language, pairs.clone())
            .with_flashcards(language, pairs, 4)
            .with_guess_words(language, words);

        let entries: Vec<(&str, Option<&str>)> =
            words.iter().map(|(word, translation)| (*word, Some(*translation))).collect();
        backend = backend.with_dictionary(language, &entries);
        for level in Difficulty::ALL {
            let french = FRENCH_BINGO
                .iter()
                .find(|(known, _)| language == Language::Fr && *known == level);
            backend = match french {
                Some((_, list)) => backend.with_bingo_words(language, level, list),
                None => backend.with_bingo_words(language, level, words),
            };
        }
    }

    for (language, keys) in KEYBOARDS {
        backend = backend.with_keyboard(language, keys);
    }
    backend
}
