//! Terminal front end for the game pages. Each loop redraws from the
//! controller's view after every action.

use std::io::{self, Write};

use lingo_core::model::{Difficulty, Language};
use lingo_core::session::LoadOutcome;
use services::view::{
    BingoView, CardState, CellState, DictionaryView, DragDropView, FlashcardsView, GuessView,
    QuizView,
};
use services::{AppServices, ControllerError};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line-oriented input from stdin.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `label` and read one trimmed line. `None` at end of input.
    pub async fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        print!("{label}");
        io::stdout().flush()?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }
}

/// Navigation commands shared by every page.
enum Input {
    Quit,
    Next,
    Previous,
    Restart,
    Language(Language),
    Other(String),
}

fn parse_input(line: String) -> Input {
    match line.as_str() {
        "q" | "quit" => Input::Quit,
        "n" | "next" => Input::Next,
        "p" | "prev" | "previous" => Input::Previous,
        "r" | "restart" => Input::Restart,
        _ => match line.strip_prefix("l ").map(str::parse::<Language>) {
            Some(Ok(language)) => Input::Language(language),
            _ => Input::Other(line),
        },
    }
}

/// Print a recoverable error, or return it when the page must end.
fn report(err: ControllerError) -> Result<(), ControllerError> {
    if err.is_fatal() {
        println!("{} Run `login` first.", err.user_message());
        return Err(err);
    }
    println!("{}", err.user_message());
    Ok(())
}

fn announce(outcome: &LoadOutcome) {
    if let LoadOutcome::Failed(err) = outcome {
        println!("{}", err.user_message());
    }
}

const NAV_HELP: &str = "n=next p=previous r=restart l <code>=language q=quit";

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

pub async fn quiz(
    services: &AppServices,
    language: Language,
    prompt: &mut Prompt,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut quiz = services.quiz(language);
    match quiz.start().await {
        Ok(outcome) => announce(&outcome),
        Err(err) => {
            report(err)?;
        }
    }

    loop {
        let view = quiz.view();
        render_quiz(&view);
        let Some(line) = prompt.ask("> ").await? else {
            break;
        };
        let result = match parse_input(line) {
            Input::Quit => break,
            Input::Next => quiz.advance().map(drop),
            Input::Previous => quiz.retreat().map(drop),
            Input::Restart => quiz.restart(),
            Input::Language(language) => {
                services.prefs().set_selected_language(language).await?;
                quiz.change_language(language).await.map(|o| announce(&o))
            }
            Input::Other(answer) => {
                let answer = match (answer.parse::<usize>(), &view.question) {
                    (Ok(n), Some(question)) if (1..=question.options.len()).contains(&n) => {
                        question.options[n - 1].clone()
                    }
                    _ => answer,
                };
                quiz.submit_answer(&answer).map(|attempt| {
                    if !attempt.counted {
                        println!("Already answered.");
                    } else if attempt.is_correct {
                        println!("Correct!");
                    } else {
                        println!("Wrong.");
                    }
                })
            }
        };
        if let Err(err) = result {
            report(err)?;
        }
    }
    quiz.leave();
    Ok(())
}

fn render_quiz(view: &QuizView) {
    println!();
    println!("[{}] {} | {}", view.language.display_name(), view.correct_label, view.incorrect_label);
    if let Some(text) = &view.completion {
        println!("{text}");
        println!("p=previous r=restart l <code>=language q=quit");
        return;
    }
    match &view.question {
        Some(question) => {
            println!("Question {}/{}: {}", question.number, question.total, question.prompt);
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}. {option}", i + 1);
            }
            println!("Pick a number or type the answer. {NAV_HELP}");
        }
        None => println!("No questions loaded. {NAV_HELP}"),
    }
}

//
// ─── DRAG AND DROP ─────────────────────────────────────────────────────────────
//

pub async fn drag(
    services: &AppServices,
    language: Language,
    prompt: &mut Prompt,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut game = services.drag_drop(language);
    match game.start().await {
        Ok(outcome) => announce(&outcome),
        Err(err) => {
            report(err)?;
        }
    }

    loop {
        game.tick();
        render_drag(&game.view());
        let Some(line) = prompt.ask("> ").await? else {
            break;
        };
        let result = match parse_input(line) {
            Input::Quit => break,
            Input::Next => game.advance().map(drop),
            Input::Previous => game.retreat().map(drop),
            Input::Restart => game.restart(),
            Input::Language(language) => {
                services.prefs().set_selected_language(language).await?;
                game.change_language(language).await.map(|o| announce(&o))
            }
            Input::Other(line) => match parse_drop(&line) {
                Some((source, target)) => game.drop_word(source, target).map(|feedback| {
                    if feedback.page_complete {
                        println!("Page complete! Press n for more words.");
                    } else if feedback.attempt.is_correct {
                        println!("Match!");
                    } else {
                        println!("No match.");
                    }
                }),
                None => {
                    println!("Type a word number and a label letter, e.g. `1 b`.");
                    Ok(())
                }
            },
        };
        if let Err(err) = result {
            report(err)?;
        }
    }
    game.leave();
    Ok(())
}

/// `"2 c"` means drop word 2 on label c.
fn parse_drop(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let source: usize = parts.next()?.parse().ok()?;
    let mut letter = parts.next()?.chars();
    let target = letter.next()?.to_ascii_lowercase();
    if letter.next().is_some() || parts.next().is_some() || !target.is_ascii_lowercase() {
        return None;
    }
    Some((source.checked_sub(1)?, usize::from(target as u8 - b'a')))
}

fn marker(state: CardState) -> &'static str {
    match state {
        CardState::Idle => " ",
        CardState::Matched => "✓",
        CardState::Mismatch => "✗",
    }
}

fn render_drag(view: &DragDropView) {
    println!();
    println!(
        "[{}] {} | {} {}",
        view.language.display_name(),
        view.correct_label,
        view.incorrect_label,
        view.page_label
    );
    if view.sources.is_empty() {
        println!("No words showing. {NAV_HELP}");
        return;
    }
    for (i, card) in view.sources.iter().enumerate() {
        println!("  {}. [{}] {}", i + 1, marker(card.state), card.label);
    }
    for (i, card) in view.targets.iter().enumerate() {
        let letter = char::from(b'a'.saturating_add(u8::try_from(i).unwrap_or(u8::MAX)));
        println!("  {letter}) [{}] {}", marker(card.state), card.label);
    }
    println!("Drop with `<number> <letter>`. {NAV_HELP}");
}

//
// ─── GUESS WORD ────────────────────────────────────────────────────────────────
//

pub async fn guess(
    services: &AppServices,
    language: Language,
    prompt: &mut Prompt,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut game = services.guess_word(language);
    game.load_keyboard(language).await;
    match game.start().await {
        Ok(outcome) => announce(&outcome),
        Err(err) => {
            report(err)?;
        }
    }

    loop {
        render_guess(&game.view());
        let Some(line) = prompt.ask("letter> ").await? else {
            break;
        };
        let result = match parse_input(line) {
            Input::Quit => break,
            Input::Next => game.next_word().await.map(|o| announce(&o)),
            Input::Previous => game
                .previous_word()
                .await
                .map(|o| o.iter().for_each(announce)),
            Input::Restart => game.start().await.map(|o| announce(&o)),
            Input::Language(language) => {
                services.prefs().set_selected_language(language).await?;
                game.change_language(language).await.map(|o| announce(&o))
            }
            Input::Other(letter) => game.guess(&letter).await.map(drop),
        };
        if let Err(err) = result {
            report(err)?;
        }
    }
    game.leave();
    Ok(())
}

fn render_guess(view: &GuessView) {
    println!();
    println!(
        "[{}] Word {} | {}",
        view.language.display_name(),
        view.word_number,
        view.score_label
    );
    println!("  {}", view.mask);
    if !view.meaning.is_empty() {
        println!("  {}", view.meaning);
    }
    if !view.keys.is_empty() {
        println!("  Extra keys: {}", view.keys.join(" "));
    }
    if let Some(message) = &view.message {
        println!("{message}");
    }
    println!("Type one letter. r=start again {NAV_HELP}");
}

//
// ─── FLASHCARDS ────────────────────────────────────────────────────────────────
//

pub async fn flashcards(
    services: &AppServices,
    language: Language,
    prompt: &mut Prompt,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pager = services.flashcards(language);
    match pager.load_current().await {
        Ok(outcome) => announce(&outcome),
        Err(err) => {
            report(err)?;
        }
    }

    loop {
        render_flashcards(&pager.view());
        let Some(line) = prompt.ask("> ").await? else {
            break;
        };
        let result = match parse_input(line) {
            Input::Quit => break,
            Input::Next => pager.next_page().await.map(|o| announce(&o)),
            Input::Previous => pager
                .previous_page()
                .await
                .map(|o| o.iter().for_each(announce)),
            Input::Restart => pager.load_current().await.map(|o| announce(&o)),
            Input::Language(language) => {
                services.prefs().set_selected_language(language).await?;
                pager.change_language(language).await.map(|o| announce(&o))
            }
            Input::Other(line) => match line.parse::<usize>() {
                Ok(n) if n > 0 => pager.flip(n - 1).map(drop),
                _ => {
                    println!("Type a card number to flip it.");
                    Ok(())
                }
            },
        };
        if let Err(err) = result {
            report(err)?;
        }
    }
    pager.leave();
    Ok(())
}

fn render_flashcards(view: &FlashcardsView) {
    println!();
    println!("[{}] Page {}", view.language.display_name(), view.page);
    if let Some(text) = view.empty_text {
        println!("  {text}");
    }
    for (i, card) in view.cards.iter().enumerate() {
        let face = if card.flipped {
            card.translation.as_str()
        } else {
            card.word.as_str()
        };
        println!("  {}. {face}", i + 1);
    }
    println!("Type a card number to flip it. {NAV_HELP}");
}

//
// ─── BINGO ─────────────────────────────────────────────────────────────────────
//

pub async fn bingo(
    services: &AppServices,
    language: Language,
    level: Difficulty,
    prompt: &mut Prompt,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut game = services.bingo(language).with_difficulty(level);
    match game.start().await {
        Ok(outcome) => announce(&outcome),
        Err(err) => {
            report(err)?;
        }
    }

    loop {
        render_bingo(&game.view());
        let Some(line) = prompt.ask("> ").await? else {
            break;
        };
        if let Some(level) = line.strip_prefix("d ") {
            match level.parse::<Difficulty>() {
                Ok(level) => announce(&game.change_difficulty(level).await),
                Err(err) => println!("{err}"),
            }
            continue;
        }
        let result = match parse_input(line) {
            Input::Quit => break,
            Input::Next | Input::Previous => {
                println!("Bingo has a single card. Press r to clear it.");
                Ok(())
            }
            Input::Restart => game.restart(),
            Input::Language(language) => {
                services.prefs().set_selected_language(language).await?;
                announce(&game.change_language(language).await);
                Ok(())
            }
            Input::Other(line) => match parse_answer(&line) {
                Some((cell, translation)) => {
                    if let Some(question) = game.prompt(cell) {
                        println!("{question}");
                    }
                    game.answer(cell, translation).await.map(|feedback| {
                        if !feedback.attempt.counted {
                            println!("Already answered, not scored again.");
                        }
                    })
                }
                None => {
                    println!("Type a cell number and your translation, e.g. `2 house`.");
                    Ok(())
                }
            },
        };
        if let Err(err) = result {
            report(err)?;
        }
    }
    game.leave();
    Ok(())
}

/// `"4 the house"` answers cell 4 with "the house".
fn parse_answer(line: &str) -> Option<(usize, &str)> {
    let (cell, translation) = line.split_once(char::is_whitespace)?;
    let cell: usize = cell.parse().ok()?;
    Some((cell.checked_sub(1)?, translation.trim()))
}

fn render_bingo(view: &BingoView) {
    println!();
    println!(
        "[{}] Level: {} | {}",
        view.language.display_name(),
        view.difficulty.label(),
        view.score_label
    );
    if view.rows.is_empty() {
        println!("No card loaded. d <easy|medium|hard>=level r=restart l <code>=language q=quit");
        return;
    }
    let width = view.rows.first().map_or(0, Vec::len);
    for (r, row) in view.rows.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(c, cell)| {
                let mark = match cell.state {
                    CellState::Open => " ",
                    CellState::Correct => "✓",
                    CellState::Incorrect => "✗",
                };
                format!("{:>2}.[{mark}] {:<12}", r * width + c + 1, cell.word)
            })
            .collect();
        println!("  {}", cells.join(" "));
    }
    if let Some(message) = &view.message {
        println!("{message}");
    }
    println!("Answer with `<number> <translation>`. d <level>=level r=restart l <code>=language q=quit");
}

//
// ─── DICTIONARY ────────────────────────────────────────────────────────────────
//

pub async fn dictionary(
    services: &AppServices,
    language: Language,
    prompt: &mut Prompt,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = services.dictionary(language);
    loop {
        render_dictionary(&page.view());
        let Some(line) = prompt.ask("word> ").await? else {
            break;
        };
        let result = match parse_input(line) {
            Input::Quit => break,
            Input::Language(language) => {
                services.prefs().set_selected_language(language).await?;
                page.change_language(language);
                Ok(())
            }
            Input::Other(word) => page.search(&word).await.map(drop),
            Input::Next | Input::Previous | Input::Restart => {
                println!("Type a word to look it up.");
                Ok(())
            }
        };
        if let Err(err) = result {
            report(err)?;
        }
    }
    page.leave();
    Ok(())
}

fn render_dictionary(view: &DictionaryView) {
    println!();
    println!("[{}] Dictionary", view.language.display_name());
    if let (Some(word), Some(translation)) = (&view.word, &view.translation) {
        println!("  {word}: {translation}");
    }
    if let Some(error) = &view.error {
        println!("  {error}");
    }
    println!("Type a word to look it up. l <code>=language q=quit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_input_is_number_then_letter() {
        assert_eq!(parse_drop("1 a"), Some((0, 0)));
        assert_eq!(parse_drop("3 D"), Some((2, 3)));
        assert_eq!(parse_drop("0 a"), None);
        assert_eq!(parse_drop("1 ab"), None);
        assert_eq!(parse_drop("a 1"), None);
    }

    #[test]
    fn bingo_answer_is_cell_then_translation() {
        assert_eq!(parse_answer("2 house"), Some((1, "house")));
        assert_eq!(parse_answer("4 the  house "), Some((3, "the  house")));
        assert_eq!(parse_answer("0 cat"), None);
        assert_eq!(parse_answer("cat"), None);
    }

    #[test]
    fn language_command_needs_a_known_code() {
        assert!(matches!(parse_input("l es".into()), Input::Language(Language::Es)));
        assert!(matches!(parse_input("l xx".into()), Input::Other(_)));
        assert!(matches!(parse_input("q".into()), Input::Quit));
    }
}
