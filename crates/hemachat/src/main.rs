//! A terminal chat with the Anemia AI Assistant.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use hemachat::SessionBuilder;
use hemachat::core::conversation::{Role, Turn};
use hemachat_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum SessionEvent {
    Idle,
    Turn(Turn),
}

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let api_key = env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty());

    let builder = match api_key {
        Some(api_key) => {
            let mut config_builder =
                OpenAIConfigBuilder::with_api_key(api_key);
            if let Ok(model) = env::var("OPENAI_MODEL") {
                config_builder = config_builder.with_model(model);
            }
            if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
                config_builder = config_builder.with_base_url(base_url);
            }
            let model_provider = OpenAIProvider::new(config_builder.build());
            SessionBuilder::with_model_provider(model_provider)
        }
        // Without a key the page still renders, but submissions go
        // nowhere.
        None => SessionBuilder::unconfigured(),
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let session = builder
        .on_idle({
            let event_tx = event_tx.clone();
            move || {
                event_tx.send(SessionEvent::Idle).ok();
            }
        })
        .on_turn({
            let event_tx = event_tx.clone();
            move |turn| {
                event_tx.send(SessionEvent::Turn(turn.clone())).ok();
            }
        })
        .build();

    println!();
    println!("{}", "Welcome to the Anemia AI Assistant".bold());
    println!();

    // The greeting has been emitted during the build, render it before
    // the first prompt.
    while let Ok(event) = event_rx.try_recv() {
        if let SessionEvent::Turn(turn) = event {
            print_turn(&turn);
        }
    }

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    'outer: loop {
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        session.send_message(line.trim());

        let mut progress_bar = None;

        loop {
            // Create a new progress bar if it has been finished.
            progress_bar
                .get_or_insert_with(|| {
                    let progress_bar = ProgressBar::new_spinner();
                    progress_bar.set_style(progress_style.clone());
                    progress_bar.set_message("🤔 Thinking...");
                    progress_bar
                })
                .inc(1);

            let sleep = sleep(Duration::from_millis(100));
            let event = select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        break 'outer;
                    };
                    event
                },
                _ = sleep => {
                    continue;
                }
            };

            // Finish the progress bar before printing anything else.
            if let Some(progress_bar) = &progress_bar {
                progress_bar.finish_and_clear();
            }
            progress_bar = None;

            match event {
                SessionEvent::Turn(turn) => print_turn(&turn),
                SessionEvent::Idle => {
                    break;
                }
            }
        }
    }
}

fn print_turn(turn: &Turn) {
    if turn.role() == Role::Assistant {
        println!(
            "{}🩸 {}",
            BAR_CHAR.bright_red(),
            turn.content().bright_white()
        );
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
