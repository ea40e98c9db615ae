//! A terminal front end for the career assistant.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use career_chat::render;
use career_chat::{Dashboard, DashboardBuilder};
use career_chat_core::{Error, ErrorKind};
use career_chat_http_backend::{HttpBackend, HttpBackendConfig};
use career_chat_model::{Credentials, Message, Role};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt, BufReader, Stdin};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum ChatEvent {
    Reply(Message),
    Idle,
}

enum Command<'a> {
    Chat(&'a str),
    History,
    Open(&'a str),
    Metrics,
    Help,
    Quit,
}

const BAR_CHAR: &str = "▎";

const HELP_TEXT: &str = "\
/history     list your past conversations
/open <id>   replay a past conversation
/metrics     show your engagement metrics
/help        show this help
/quit        leave
Anything else is sent to Asha.";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = HttpBackendConfig::from_env();
    let backend = match HttpBackend::new(config) {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("failed to set up the backend client: {err}");
            return;
        }
    };

    let mut input = Input::new();
    let email = match env::var("CAREER_CHAT_EMAIL") {
        Ok(email) => email,
        Err(_) => {
            prompt("Email: ");
            let Some(line) = input.read_line().await else {
                return;
            };
            line.trim().to_owned()
        }
    };
    let password = match env::var("CAREER_CHAT_PASSWORD") {
        Ok(password) => password,
        Err(_) => {
            prompt("Password: ");
            let Some(password) = input.read_password().await else {
                return;
            };
            password
        }
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let dashboard = DashboardBuilder::with_backend(backend)
        .on_message({
            let event_tx = event_tx.clone();
            move |msg| {
                // The user's own messages are already on the screen.
                if msg.role == Role::Assistant {
                    event_tx.send(ChatEvent::Reply(msg.clone())).ok();
                }
            }
        })
        .on_idle({
            let event_tx = event_tx.clone();
            move || {
                event_tx.send(ChatEvent::Idle).ok();
            }
        })
        .sign_in(&Credentials { email, password })
        .await;
    let mut dashboard = match dashboard {
        Ok(dashboard) => dashboard,
        Err(err) => {
            eprintln!("{} {}", "Sign-in failed:".bright_red(), err.reason());
            return;
        }
    };

    if let Some(user) = dashboard.user().user() {
        println!("Signed in as {}.", user.display_name().bright_white().bold());
    }
    match dashboard.chat().snapshot().await {
        Ok(snapshot) => snapshot.messages.iter().for_each(print_message),
        Err(err) => warn!("failed to take a snapshot: {err}"),
    }
    println!("{}", "Type /help for the commands.".dimmed());

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    loop {
        prompt("> ");

        let Some(line) = input.read_line().await else {
            break;
        };
        match parse_command(line.trim()) {
            Command::Quit => break,
            Command::Help => println!("{HELP_TEXT}"),
            Command::History => show_history(&mut dashboard).await,
            Command::Open(id) => {
                let view = dashboard.open_transcript(id).await;
                println!("{}", render::transcript(&view));
            }
            Command::Metrics => match dashboard.open_performance().await {
                Ok(view) => println!("{}", render::performance(&view)),
                Err(err) => print_rejection(&err),
            },
            Command::Chat(text) => {
                if let Err(err) = dashboard.send_message(text).await {
                    print_rejection(&err);
                    continue;
                }
                if !wait_for_reply(&mut event_rx, &progress_style).await {
                    break;
                }
            }
        }
    }
}

/// Shows a spinner until the turn in flight has finished, printing the
/// reply. Returns `false` if the session is gone.
async fn wait_for_reply(
    event_rx: &mut mpsc::UnboundedReceiver<ChatEvent>,
    progress_style: &ProgressStyle,
) -> bool {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(progress_style.clone());
    progress_bar.set_message("Asha is typing...");

    loop {
        progress_bar.inc(1);

        let sleep = sleep(Duration::from_millis(100));
        let event = select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    progress_bar.finish_and_clear();
                    return false;
                };
                event
            },
            _ = sleep => {
                continue;
            }
        };

        // Finish the progress bar before printing anything else.
        progress_bar.finish_and_clear();
        match event {
            ChatEvent::Reply(msg) => print_message(&msg),
            ChatEvent::Idle => return true,
        }
    }
}

async fn show_history(dashboard: &mut Dashboard) {
    if let Err(err) = dashboard.refresh_conversations().await {
        print_rejection(&err);
        return;
    }
    println!("{}", render::conversation_list(dashboard.conversations()));
}

fn parse_command(line: &str) -> Command<'_> {
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };
    match name {
        "/quit" | "/exit" => Command::Quit,
        "/help" => Command::Help,
        "/history" => Command::History,
        "/open" => Command::Open(arg),
        "/metrics" => Command::Metrics,
        _ => Command::Chat(line),
    }
}

fn print_message(msg: &Message) {
    let bar = match msg.role {
        Role::User => BAR_CHAR.bright_green().to_string(),
        Role::Assistant => BAR_CHAR.bright_cyan().to_string(),
    };
    for line in render::message(msg).lines() {
        println!("{bar}{line}");
    }
    println!();
}

fn print_rejection(err: &Error) {
    match err.kind() {
        ErrorKind::ValidationRejected => {
            println!("{}", err.reason().yellow());
        }
        _ => println!("{}", err.reason().bright_red()),
    }
}

fn prompt(text: &str) {
    print!("{text}");
    std::io::stdout().flush().ok();
}

/// Line input from stdin, shared by the whole session so that lines pasted
/// ahead of time are not lost between reads.
struct Input {
    stdin: BufReader<Stdin>,
}

impl Input {
    fn new() -> Self {
        Self {
            stdin: BufReader::new(io::stdin()),
        }
    }

    async fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();

        match self.stdin.read_line(&mut line).await {
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

    /// Reads a line without echoing it, falling back to plain input when
    /// there is no terminal to read from.
    async fn read_password(&mut self) -> Option<String> {
        // A pasted password is already buffered, and already on the screen.
        if !self.stdin.buffer().is_empty() {
            return self.read_line().await.map(|line| line.trim_end().to_owned());
        }

        match tokio::task::spawn_blocking(read_hidden_line).await {
            Ok(Ok(password)) => password,
            Ok(Err(err)) => {
                debug!("cannot hide the input: {err}");
                self.read_line().await.map(|line| line.trim_end().to_owned())
            }
            Err(err) => {
                error!("error reading input: {}", err);
                None
            }
        }
    }
}

fn read_hidden_line() -> std::io::Result<Option<String>> {
    terminal::enable_raw_mode()?;
    let line = read_keys();
    let restored = terminal::disable_raw_mode();
    println!();
    restored?;
    line
}

fn read_keys() -> std::io::Result<Option<String>> {
    let mut line = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(Some(line)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c' | 'd')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Ok(None);
            }
            KeyCode::Char(c) => line.push(c),
            KeyCode::Backspace => {
                line.pop();
            }
            _ => {}
        }
    }
}
