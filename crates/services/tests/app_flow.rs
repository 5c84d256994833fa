use lingo_core::model::{Difficulty, Language, Theme};
use lingo_core::session::LoadOutcome;
use lingo_core::time::fixed_clock;
use services::api::QuizDto;
use services::{ApiConfig, ApiError, AppServices, InMemoryBackend, RegisterDraft};
use storage::repository::Storage;

fn backend() -> InMemoryBackend {
    InMemoryBackend::new().with_quizzes(
        Language::Es,
        vec![QuizDto {
            question: "gato means?".into(),
            options: vec!["cat".into(), "dog".into()],
            answer: "cat".into(),
            language: "es".into(),
        }],
    )
}

#[tokio::test]
async fn register_login_play_logout() {
    let services = AppServices::with_backend(&Storage::in_memory(), backend(), fixed_clock());
    let auth = services.auth();

    let mut quiz = services.quiz(Language::Es);
    let err = quiz.start().await.unwrap_err();
    assert!(err.is_fatal());

    auth.register(&RegisterDraft {
        username: "ana".into(),
        email: "ana@example.com".into(),
        password: "secret1".into(),
    })
    .await
    .unwrap();
    let identity = auth.login("ana", "secret1").await.unwrap();
    assert_eq!(identity.role, "user");

    assert_eq!(
        quiz.start().await.unwrap(),
        LoadOutcome::Applied { items: 1 }
    );
    assert!(quiz.submit_answer("CAT").unwrap().is_correct);

    auth.logout().await.unwrap();
    let mut again = services.quiz(Language::Es);
    assert!(again.start().await.unwrap_err().is_fatal());
}

#[tokio::test]
async fn bingo_and_dictionary_work_without_login() {
    let backend = backend()
        .with_bingo_words(
            Language::Es,
            Difficulty::Medium,
            &[("gato", "cat"), ("perro", "dog"), ("casa", "house"), ("pan", "bread"), ("sol", "sun")],
        )
        .with_dictionary(Language::Es, &[("agua", Some("water"))]);
    let services = AppServices::with_backend(&Storage::in_memory(), backend, fixed_clock());
    assert!(services.auth().current_identity().await.unwrap().is_none());

    let mut bingo = services.bingo(Language::Es).with_difficulty(Difficulty::Medium);
    assert_eq!(bingo.start().await.unwrap(), LoadOutcome::Applied { items: 1 });
    let view = bingo.view();
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].len(), 2);

    let cell = bingo
        .grid()
        .unwrap()
        .cells()
        .iter()
        .position(|cell| cell.word().word() == "perro")
        .unwrap();
    let feedback = bingo.answer(cell, "Dog").await.unwrap();
    assert!(feedback.attempt.is_correct);
    assert_eq!(bingo.view().score_label, "Score: 10");

    let mut dictionary = services.dictionary(Language::Es);
    dictionary.search("agua").await.unwrap();
    let view = dictionary.view();
    assert_eq!(view.translation.as_deref(), Some("water"));
    assert_eq!(view.error, None);
}

#[tokio::test]
async fn short_password_fails_validation() {
    let services = AppServices::with_backend(&Storage::in_memory(), backend(), fixed_clock());
    let err = services
        .auth()
        .register(&RegisterDraft {
            username: "ana".into(),
            email: "ana@example.com".into(),
            password: "123".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationFailure(_)));
}

#[tokio::test]
async fn preferences_survive_in_sqlite() {
    let url = "sqlite:file:memdb_app_prefs?mode=memory&cache=shared";
    let config = ApiConfig::new("http://localhost:9").unwrap();
    let services = AppServices::new_sqlite(url, config.clone(), fixed_clock())
        .await
        .unwrap();

    let prefs = services.prefs();
    prefs.set_selected_language(Language::It).await.unwrap();
    prefs.set_theme(Theme::Dark).await.unwrap();

    let reopened = AppServices::new_sqlite(url, config, fixed_clock())
        .await
        .unwrap();
    let prefs = reopened.prefs();
    assert_eq!(prefs.selected_language().await.unwrap(), Language::It);
    assert_eq!(prefs.theme(false).await.unwrap(), Theme::Dark);
}
