use clap::{Parser, Subcommand};

/// Parley: chat with an LLM backend from the terminal.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (debug, info, warn, error) or a full filter
    /// directive.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Backend base URL override.
    #[arg(long)]
    pub api_url: Option<String>,

    /// Keep credentials in memory only for this run.
    #[arg(long)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in; the password is read from stdin.
    Login { username: String },
    /// Create an account and sign in with it.
    Register { username: String, email: String },
    /// Forget the stored credentials.
    Logout,
    /// Print the conversation history.
    History,
    /// Send one message and print the reply.
    Send {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Reset the server-side conversation.
    Clear,
    /// Interactive session: every line is sent as a message.
    Chat,
    /// Manage the provider API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// List the models available with the saved key.
    Models,
    /// Switch to another model.
    UseModel { model: String },
    /// Print the effective configuration as JSON.
    Config,
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Show whether a key is saved and which model is selected.
    Status,
    /// Save or replace the key.
    Set {
        key: String,
        #[arg(long)]
        model: Option<String>,
    },
    /// Remove the saved key.
    Delete,
}

pub fn parse() -> Args {
    Args::parse()
}
