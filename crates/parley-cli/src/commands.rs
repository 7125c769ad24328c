//! Command handlers. Each returns once its work is done; failures bubble
//! up to `main` for printing.

use std::io::Write;

use parley_config::ParleyConfig;
use parley_session::{RegisterOutcome, Registration, SessionError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::app::App;
use crate::cli::{Command, KeyAction};
use crate::error::CliError;
use crate::{prompt, render};

pub async fn run(app: &App, config: &ParleyConfig, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { username } => login(app, &username).await,
        Command::Register { username, email } => register(app, username, email).await,
        Command::Logout => {
            app.session.end_session();
            println!("Signed out.");
            Ok(())
        }
        Command::History => history(app).await,
        Command::Send { text } => send(app, &text.join(" ")).await,
        Command::Clear => {
            app.chat.clear().await?;
            println!("Conversation cleared.");
            Ok(())
        }
        Command::Chat => chat(app).await,
        Command::Key { action } => key(app, action).await,
        Command::Models => {
            let catalog = app.settings.available_models().await?;
            println!("{}", render::models(&catalog));
            Ok(())
        }
        Command::UseModel { model } => {
            let selected = app.settings.select_model(&model).await?;
            println!("Now using {selected}.");
            Ok(())
        }
        Command::Config => {
            println!("{}", parley_config::config_to_json(config));
            Ok(())
        }
    }
}

async fn login(app: &App, username: &str) -> Result<(), CliError> {
    let password = prompt::read_secret("Password: ")?;
    app.session.authenticate(username, &password).await?;
    println!("Signed in as {username}.");
    Ok(())
}

async fn register(app: &App, username: String, email: String) -> Result<(), CliError> {
    let password = prompt::read_secret("Password: ")?;
    let password_confirm = prompt::read_secret("Confirm password: ")?;
    let registration = Registration {
        username,
        email,
        password,
        password_confirm,
    };

    match app.session.register(&registration).await {
        Ok(RegisterOutcome::SignedIn { account }) => {
            println!("Account {} created. Signed in.", account.username);
            Ok(())
        }
        Ok(RegisterOutcome::CreatedSignInFailed { account, reason }) => {
            println!(
                "Account {} created, but signing in failed: {reason}\nRun `parley login {}` to sign in.",
                account.username, account.username
            );
            Ok(())
        }
        Err(SessionError::Rejected(errors)) => {
            eprintln!("Registration rejected:");
            for line in render::server_errors(&errors) {
                eprintln!("  {line}");
            }
            Err(SessionError::Rejected(errors).into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn history(app: &App) -> Result<(), CliError> {
    let count = app.chat.load().await?;
    if count == 0 {
        println!("No messages yet.");
    }
    for exchange in app.chat.exchanges() {
        println!("{}", render::exchange(&exchange));
    }
    Ok(())
}

async fn send(app: &App, text: &str) -> Result<(), CliError> {
    let exchange = app.chat.submit(text).await?;
    println!("{}", exchange.response_text.unwrap_or_default());
    Ok(())
}

async fn key(app: &App, action: KeyAction) -> Result<(), CliError> {
    match action {
        KeyAction::Status => {
            let status = app.settings.key_status().await?;
            println!("{}", render::key_status(&status));
        }
        KeyAction::Set { key, model } => {
            let status = app.settings.save_key(&key, model.as_deref()).await?;
            println!("Key saved.\n{}", render::key_status(&status));
        }
        KeyAction::Delete => {
            app.settings.delete_key().await?;
            println!("Key removed.");
        }
    }
    Ok(())
}

/// Interactive loop. Chat failures are reported and the loop continues,
/// except an ended session, which stops it.
async fn chat(app: &App) -> Result<(), CliError> {
    history(app).await?;
    println!("Type a message, or /history, /clear, /quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                for exchange in app.chat.exchanges() {
                    println!("{}", render::exchange(&exchange));
                }
            }
            "/clear" => match app.chat.clear().await {
                Ok(()) => println!("Conversation cleared."),
                Err(e) => eprintln!("error: {e}"),
            },
            _ => match app.chat.submit(&line).await {
                Ok(exchange) => println!("{}\n", exchange.response_text.unwrap_or_default()),
                Err(e) if e.is_unauthenticated() => return Err(e.into()),
                Err(e) => eprintln!("error: {e}"),
            },
        }
    }

    debug!("chat loop finished");
    Ok(())
}
