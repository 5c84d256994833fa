//! Wire-level checks of `HttpBackend` against a one-shot local server.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use lingo_core::model::{Difficulty, Language, LoadError, PageNumber, WordIndex};
use services::api::TranslationCheck;
use services::{ApiConfig, ApiError, AuthBackend, ContentLoader, ContentSource, HttpBackend};

/// One request as the server saw it. Header names are lowercased.
#[derive(Debug)]
struct Seen {
    line: String,
    headers: HashMap<String, String>,
    body: String,
}

impl Seen {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Answer one connection per canned response, in order, then hand back
/// what was received.
async fn serve(replies: Vec<(u16, &'static str)>) -> (HttpBackend, JoinHandle<Vec<Seen>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for (status, body) in replies {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);

            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let mut headers = HashMap::new();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).await.unwrap();
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                }
            }
            let length: usize = headers
                .get("content-length")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let mut request_body = vec![0; length];
            reader.read_exact(&mut request_body).await.unwrap();

            let response = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                reason(status),
                body.len()
            );
            let stream = reader.get_mut();
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            seen.push(Seen {
                line: line.trim_end().to_string(),
                headers,
                body: String::from_utf8(request_body).unwrap(),
            });
        }
        seen
    });

    let config = ApiConfig::new(&format!("http://{addr}")).unwrap();
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    (HttpBackend::with_client(config, client), handle)
}

#[tokio::test]
async fn guess_round_sends_query_and_bearer_token() {
    let (backend, server) = serve(vec![
        (200, r#"{"hiddenWord":"_ _ _","meaning":"water"}"#),
        (200, r#"{"hiddenWord":"_ a _","meaning":"water","success":true}"#),
    ])
    .await;

    let start = backend
        .start_guess("tok", Language::Fr, WordIndex::new(2))
        .await
        .unwrap();
    assert_eq!(start.hidden_word, "_ _ _");
    let guess = backend.guess_letter("tok", 'a').await.unwrap();
    assert!(guess.success);

    let seen = server.await.unwrap();
    assert_eq!(seen[0].line, "GET /api/guessWords/start?lang=fr&index=2 HTTP/1.1");
    assert_eq!(seen[0].header("authorization"), Some("Bearer tok"));
    assert_eq!(seen[1].line, "POST /api/guessWords/guess/a HTTP/1.1");
    assert_eq!(seen[1].header("authorization"), Some("Bearer tok"));
}

#[tokio::test]
async fn keyboard_is_fetched_without_a_token() {
    let (backend, server) = serve(vec![(200, r#"{"keyboard":["ä","ö"]}"#)]).await;

    let keyboard = backend.keyboard(Language::De).await.unwrap();
    assert_eq!(keyboard.keyboard, vec!["ä", "ö"]);

    let seen = server.await.unwrap();
    assert_eq!(seen[0].line, "GET /api/keyboards/de HTTP/1.1");
    assert_eq!(seen[0].header("authorization"), None);
}

#[tokio::test]
async fn flashcards_ask_for_the_page() {
    let (backend, server) = serve(vec![(
        200,
        r#"{"flashcards":[{"word":"casa","translation":"house"}]}"#,
    )])
    .await;

    let page = backend
        .flashcards("tok", Language::Es, PageNumber::new(3))
        .await
        .unwrap();
    assert_eq!(page.flashcards.len(), 1);

    let seen = server.await.unwrap();
    assert_eq!(seen[0].line, "GET /api/flashcards/es?page=3 HTTP/1.1");
    assert_eq!(seen[0].header("authorization"), Some("Bearer tok"));
}

#[tokio::test]
async fn error_body_message_is_kept() {
    let (backend, server) = serve(vec![
        (500, r#"{"message":"Database down"}"#),
        (500, ""),
    ])
    .await;

    let err = backend.quizzes("tok", Language::It).await.unwrap_err();
    assert!(
        matches!(&err, ApiError::ServerRejected { status: 500, message } if message == "Database down"),
        "{err:?}"
    );
    assert_eq!(err.user_message(), "Database down");

    let err = backend.drag_words("tok", Language::It).await.unwrap_err();
    assert!(
        matches!(&err, ApiError::ServerRejected { status: 500, message } if message == "Internal Server Error"),
        "{err:?}"
    );
    server.await.unwrap();
}

#[tokio::test]
async fn missing_guess_word_maps_to_not_found() {
    let (backend, server) = serve(vec![(404, r#"{"message":"No word found"}"#)]).await;
    let loader = ContentLoader::new(Arc::new(backend));

    let err = loader
        .guess_start("tok", Language::Fr, WordIndex::new(7))
        .await
        .unwrap_err();
    assert_eq!(err, LoadError::NotFound);

    let seen = server.await.unwrap();
    assert_eq!(seen[0].line, "GET /api/guessWords/start?lang=fr&index=7 HTTP/1.1");
}

#[tokio::test]
async fn login_posts_credentials_as_json() {
    let (backend, server) = serve(vec![(
        200,
        r#"{"token":"t-1","username":"ana","role":"admin"}"#,
    )])
    .await;

    let login = backend.login("ana", "secret1").await.unwrap();
    assert_eq!(login.role.as_deref(), Some("admin"));

    let seen = server.await.unwrap();
    assert_eq!(seen[0].line, "POST /api/auth/login HTTP/1.1");
    assert_eq!(seen[0].header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(body, serde_json::json!({"username":"ana","password":"secret1"}));
}

#[tokio::test]
async fn bingo_endpoints_are_public() {
    let (backend, server) = serve(vec![
        (200, r#"{"words":[{"_id":"w1","word":"Hund"}]}"#),
        (200, r#"{"isCorrect":true,"correctTranslation":"dog"}"#),
    ])
    .await;

    let words = backend
        .bingo_words(Difficulty::Hard, Language::De)
        .await
        .unwrap();
    assert_eq!(words.words[0].id, "w1");
    let verdict = backend
        .check_translation(&TranslationCheck {
            word_id: "w1".into(),
            language: Language::De,
            user_translation: "dog".into(),
        })
        .await
        .unwrap();
    assert!(verdict.is_correct);

    let seen = server.await.unwrap();
    assert_eq!(seen[0].line, "GET /api/bingo/words?level=hard&language=de HTTP/1.1");
    assert_eq!(seen[0].header("authorization"), None);
    assert_eq!(seen[1].line, "POST /api/bingo/check-translation HTTP/1.1");
    assert_eq!(seen[1].header("authorization"), None);
    let body: serde_json::Value = serde_json::from_str(&seen[1].body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"wordId":"w1","language":"de","userTranslation":"dog"})
    );
}

#[tokio::test]
async fn dictionary_search_encodes_the_word() {
    let (backend, server) = serve(vec![
        (200, r#"{"translation":"potato"}"#),
        (404, r#"{"message":"Word not found"}"#),
    ])
    .await;

    let found = backend
        .search_word("pomme de terre", Language::Fr)
        .await
        .unwrap();
    assert_eq!(found.translation.as_deref(), Some("potato"));
    let err = backend.search_word("xyz", Language::Fr).await.unwrap_err();
    assert_eq!(err.user_message(), "Word not found");

    let seen = server.await.unwrap();
    assert_eq!(
        seen[0].line,
        "GET /api/words/search?word=pomme+de+terre&language=fr HTTP/1.1"
    );
    assert_eq!(seen[0].header("authorization"), None);
}
