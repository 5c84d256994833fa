use serde::{Deserialize, Serialize};

use lingo_core::model::Language;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDto {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPairDto {
    pub word: String,
    #[serde(default)]
    pub translation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenWordDto {
    pub hidden_word: String,
    #[serde(default)]
    pub meaning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessDto {
    pub hidden_word: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardDto {
    #[serde(default)]
    pub keyboard: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlashcardPageDto {
    #[serde(default)]
    pub flashcards: Vec<WordPairDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginDto {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BingoWordDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BingoWordsDto {
    #[serde(default)]
    pub words: Vec<BingoWordDto>,
}

/// Body of `POST /api/bingo/check-translation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationCheck {
    pub word_id: String,
    pub language: Language,
    pub user_translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationVerdictDto {
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub correct_translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DictionaryDto {
    #[serde(default)]
    pub translation: Option<String>,
}

/// Error payload the backend attaches to non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_payload_uses_camel_case() {
        let dto: GuessDto =
            serde_json::from_str(r#"{"hiddenWord":"_ a _","meaning":"cat","success":true}"#)
                .unwrap();
        assert_eq!(dto.hidden_word, "_ a _");
        assert!(dto.success);
    }

    #[test]
    fn missing_optional_fields_default() {
        let pair: WordPairDto = serde_json::from_str(r#"{"word":"pain"}"#).unwrap();
        assert_eq!(pair.translation, None);

        let page: FlashcardPageDto = serde_json::from_str("{}").unwrap();
        assert!(page.flashcards.is_empty());

        let login: LoginDto =
            serde_json::from_str(r#"{"token":"t","username":"ana"}"#).unwrap();
        assert_eq!(login.role, None);
    }

    #[test]
    fn bingo_payloads_use_mongo_ids_and_camel_case() {
        let words: BingoWordsDto =
            serde_json::from_str(r#"{"words":[{"_id":"w1","word":"chat"}]}"#).unwrap();
        assert_eq!(words.words[0].id, "w1");

        let check = TranslationCheck {
            word_id: "w1".into(),
            language: Language::Fr,
            user_translation: "cat".into(),
        };
        assert_eq!(
            serde_json::to_value(&check).unwrap(),
            serde_json::json!({"wordId":"w1","language":"fr","userTranslation":"cat"})
        );

        let verdict: TranslationVerdictDto =
            serde_json::from_str(r#"{"isCorrect":false,"correctTranslation":"cat"}"#).unwrap();
        assert!(!verdict.is_correct);

        let entry: DictionaryDto = serde_json::from_str("{}").unwrap();
        assert_eq!(entry.translation, None);
    }
}
