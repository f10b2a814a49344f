// UI layer: command-line parsing with `clap`, prompts with `dialoguer`
// and a spinner from `indicatif` while a request is in flight.

use crate::config::Config;
use crate::ops::{Operations, SignupOutcome};
use crate::types::{BalanceResponse, SendResponse, StatusResponse};
use crate::Error;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Bitcoin Efectivo CLI - Interact with the Bitcoin Efectivo network
///
/// Token-based access to the Bitcoin Efectivo API. The token obtained by
/// `be signup` is stored under ~/.be and reused by the other commands.
#[derive(Parser, Debug)]
#[command(name = "be", version, about, long_about = None)]
pub struct Cli {
    /// API base URL
    #[arg(long, env = "BE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Settings file (default is $HOME/.be/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new account and generate an API token
    Signup,
    /// Check account status and token validity
    Status,
    /// Send Bitcoin Efectivo to an address (amount in satoshis)
    Send {
        #[arg(allow_negative_numbers = true)]
        amount: i64,
        address: String,
        /// Optional message to include with the transaction
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Show the account balance
    Balance,
    /// Remove the locally stored token
    Logout,
}

/// Run one command to completion, printing its report to stdout.
pub fn run(cli: Cli, config: &Config) -> crate::Result<()> {
    let ops = Operations::new(config);
    match cli.command {
        Command::Signup => {
            let outcome = ops.signup(prompt_signup)?;
            print_signup(&outcome);
        }
        Command::Status => {
            let resp = with_spinner("Checking status...", || ops.status())?;
            print_status(&resp);
        }
        Command::Send {
            amount,
            address,
            message,
        } => {
            let msg = format!("Sending {} satoshis to {}...", amount, address);
            let resp = with_spinner(&msg, || ops.send(amount, &address, message.as_deref()))?;
            print_send(&resp);
        }
        Command::Balance => {
            let resp = with_spinner("Fetching balance...", || ops.balance())?;
            print_balance(&resp);
        }
        Command::Logout => {
            ops.logout()?;
            println!("{} Local credentials removed", "✓".green());
        }
    }
    Ok(())
}

/// Ask for username and email. Validation happens in `ops`.
fn prompt_signup() -> crate::Result<(String, String)> {
    let read = |prompt: &str, field: &str| -> crate::Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| Error::Input(format!("{}: {}", field, e)))
    };
    let username = read("Enter username", "username")?;
    let email = read("Enter email", "email")?;
    println!("Creating account...");
    Ok((username, email))
}

fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    spinner.finish_and_clear();
    out
}

fn fmt_time(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn print_signup(outcome: &SignupOutcome) {
    let record = outcome.record();
    match outcome {
        SignupOutcome::AlreadySignedUp(_) => {
            println!("{} Already signed up and token is valid", "✓".green());
        }
        SignupOutcome::Created { .. } => {
            println!("{} Account created successfully!", "✓".green());
        }
    }
    println!("User ID: {}", record.user_id);
    println!("Token expires: {}", fmt_time(&record.expires_at));
    if let SignupOutcome::Created { message, .. } = outcome {
        if !message.is_empty() {
            println!("Message: {}", message);
        }
    }
}

fn print_status(resp: &StatusResponse) {
    println!("Status: {}", resp.status);
    println!("User ID: {}", resp.user_id);

    if resp.token_valid {
        println!("{} Token is valid", "✓".green());
        println!("Token expires: {}", fmt_time(&resp.expires_at));
    } else {
        println!("{} Token is invalid", "❌".red());
        println!("Run 'be signup' to refresh your token");
    }

    println!("\nRate Limit:");
    println!("  Limit: {} requests", resp.rate_limit.limit);
    println!("  Remaining: {} requests", resp.rate_limit.remaining);
    println!("  Reset: {}", fmt_time(&resp.rate_limit.reset_at));

    println!("\nServer Time: {}", fmt_time(&resp.server_time));
}

fn print_send(resp: &SendResponse) {
    println!("{} Transaction sent successfully!", "✓".green());
    println!("Transaction ID: {}", resp.transaction_id);
    println!("Status: {}", resp.status);
    if !resp.message.is_empty() {
        println!("Message: {}", resp.message);
    }
}

fn print_balance(resp: &BalanceResponse) {
    println!("Balance: {} satoshis", resp.balance);
    println!("User ID: {}", resp.user_id);
    println!("As of: {}", fmt_time(&resp.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn send_accepts_message_and_negative_amount() {
        let cli = Cli::try_parse_from(["be", "send", "-5", "addr1", "-m", "hi"]).unwrap();
        match cli.command {
            Command::Send {
                amount,
                address,
                message,
            } => {
                assert_eq!(amount, -5);
                assert_eq!(address, "addr1");
                assert_eq!(message.as_deref(), Some("hi"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["be", "status", "--api-url", "http://localhost:3000", "-v"])
            .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:3000"));
        assert!(cli.verbose);
    }
}
