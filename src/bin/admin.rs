//! CLI administration tool for app-starter.
//!
//! Provides commands for checking configuration, issuing tokens and sending
//! test emails without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Validate the environment and print a summary
//! cargo run --bin admin -- config check
//!
//! # Convert a human readable duration to milliseconds
//! cargo run --bin admin -- duration 15m
//!
//! # Issue an access/refresh pair for a subject
//! cargo run --bin admin -- token issue --sub user-1 --email ada@example.com
//!
//! # Send a test email through the queue and worker
//! cargo run --bin admin -- mail send --to ada@example.com --subject Hi --html "<p>Hi</p>"
//! cargo run --bin admin -- mail send --to ada@example.com --subject Welcome \
//!     --template welcome --context '{"name": "Ada"}'
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; `.env` is loaded when present.
//!
//! # Features
//!
//! - **Config Tools**: Validation with every failing key listed
//! - **Token Issuing**: Access and refresh tokens signed with the configured secrets
//! - **Mail Testing**: Runs the real queue, retry loop and SMTP transport locally
//! - **Interactive Prompts**: User-friendly CLI with confirmation dialogs
//! - **Colored Output**: Terminal-friendly formatting using `colored` crate

use app_starter::application::services::{MailerQueue, TokenPayload, TokenService};
use app_starter::config::{self, Config, ConfigError};
use app_starter::domain::email_job::SendMailOptions;
use app_starter::infrastructure::mailer::{EmailProcessor, SmtpTransport, TemplateRenderer};
use app_starter::utils::duration::{format_duration_ms, parse_duration_ms};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use std::sync::Arc;

/// CLI tool for managing app-starter.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Configuration tools
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Parse a duration such as "15m" or "7d"
    Duration {
        /// Value to parse
        value: String,
    },

    /// Manage JWT tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Email tools
    Mail {
        #[command(subcommand)]
        action: MailAction,
    },
}

/// Configuration subcommands.
#[derive(Subcommand)]
enum ConfigAction {
    /// Validate environment variables and print a summary
    Check,
}

/// Token subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Issue an access/refresh token pair
    Issue {
        /// Token subject (prompted when omitted)
        #[arg(short, long)]
        sub: Option<String>,

        /// Optional email claim
        #[arg(short, long)]
        email: Option<String>,
    },
}

/// Mail subcommands.
#[derive(Subcommand)]
enum MailAction {
    /// Queue one email and wait for the worker to deliver it
    Send(SendArgs),
}

#[derive(Args)]
struct SendArgs {
    /// Recipient address
    #[arg(long)]
    to: String,

    /// Subject line
    #[arg(long)]
    subject: String,

    /// Raw HTML body
    #[arg(long, conflicts_with = "template", required_unless_present = "template")]
    html: Option<String>,

    /// Template name under MAIL_TEMPLATE_DIR (without .html)
    #[arg(long, requires = "context")]
    template: Option<String>,

    /// Template context as a JSON object
    #[arg(long)]
    context: Option<String>,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Check => check_config()?,
        },
        Commands::Duration { value } => show_duration(&value)?,
        Commands::Token { action } => match action {
            TokenAction::Issue { sub, email } => issue_token(&load_config()?, sub, email)?,
        },
        Commands::Mail { action } => match action {
            MailAction::Send(args) => send_mail(&load_config()?, args).await?,
        },
    }

    Ok(())
}

fn load_config() -> Result<Config> {
    config::load_from_env().context("Invalid configuration, run `admin config check` for details")
}

/// Validates the environment and lists every failing key.
fn check_config() -> Result<()> {
    println!("{}", "🔧 Configuration Check".bright_blue().bold());
    println!();

    match config::load_from_env() {
        Ok(config) => {
            println!("  App:        {} ({})", config.app.name.cyan(), config.app.env.as_str());
            println!("  Listen:     {}", config.app.listen_addr().cyan());
            println!(
                "  Cache:      {}",
                if config.is_cache_enabled() { "redis" } else { "in-memory" }.cyan()
            );
            println!(
                "  Tokens:     access {}, refresh {}",
                format_duration_ms(config.auth.jwt_access_expires_in.ms).cyan(),
                format_duration_ms(config.auth.jwt_refresh_expires_in.ms).cyan()
            );
            println!(
                "  Mail queue: {}",
                if config.queue.enabled { "enabled".green() } else { "disabled".yellow() }
            );
            println!(
                "  Pagination: default {} / max {} per page",
                config.pagination.default_per_page, config.pagination.max_per_page
            );
            println!();
            println!("{}", "✅ Configuration is valid".green().bold());
            Ok(())
        }
        Err(e) => {
            print_config_error(&e);
            anyhow::bail!("configuration check failed")
        }
    }
}

fn print_config_error(error: &ConfigError) {
    let issues = error.issues();

    if issues.is_empty() {
        println!("  {}", error.to_string().red());
    } else {
        for issue in issues {
            println!("  {:<32} {}", issue.key.bright_white().bold(), issue.message.red());
        }
    }
    println!();
    println!("{}", "❌ Configuration is invalid".red().bold());
}

/// Prints the millisecond value of a duration string.
fn show_duration(value: &str) -> Result<()> {
    let ms = parse_duration_ms(value).with_context(|| format!("Cannot parse '{}'", value))?;

    println!(
        "  {} = {} ms ({})",
        value.cyan(),
        ms.to_string().bright_white().bold(),
        format_duration_ms(ms).bright_black()
    );

    Ok(())
}

/// Issues an access/refresh pair signed with the configured secrets.
///
/// # Flow
///
/// 1. Prompt for the subject (or use `--sub`)
/// 2. Sign both tokens
/// 3. Display them with lifetimes and a usage example
fn issue_token(config: &Config, sub: Option<String>, email: Option<String>) -> Result<()> {
    println!("{}", "🔑 Issue Token Pair".bright_blue().bold());
    println!();

    let sub = match sub {
        Some(s) => s,
        None => Input::new()
            .with_prompt("Subject (user id)")
            .interact_text()?,
    };

    let tokens = TokenService::from_config(&config.auth);
    let pair = tokens
        .issue_pair(&TokenPayload { sub: sub.clone(), email })
        .map_err(|e| anyhow::anyhow!("Failed to issue tokens: {}", e))?;

    println!("{}", "Token details:".bright_white().bold());
    println!("  Subject: {}", sub.cyan());
    println!(
        "  Access ({}):  {}",
        format_duration_ms(config.auth.jwt_access_expires_in.ms),
        pair.access_token.bright_yellow()
    );
    println!(
        "  Refresh ({}): {}",
        format_duration_ms(config.auth.jwt_refresh_expires_in.ms),
        pair.refresh_token.bright_yellow()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://{}/api/v1/auth/me",
        pair.access_token.bright_yellow(),
        config.app.listen_addr()
    );
    println!();

    Ok(())
}

/// Sends one email through the same queue, retry loop and transport the
/// server uses, then reports the outcome.
async fn send_mail(config: &Config, args: SendArgs) -> Result<()> {
    println!("{}", "✉️  Send Email".bright_blue().bold());
    println!();

    let context = match &args.context {
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(raw).context("--context must be valid JSON")?;
            anyhow::ensure!(value.is_object(), "--context must be a JSON object");
            value
        }
        None => serde_json::json!({}),
    };

    println!("  SMTP:    {}:{}", config.mailer.host.cyan(), config.mailer.port);
    println!("  From:    {}", config.mailer.from_mailbox().cyan());
    println!("  To:      {}", args.to.cyan());
    println!("  Subject: {}", args.subject.cyan());
    match &args.template {
        Some(name) => println!("  Template: {}", name.cyan()),
        None => println!("  Body:    {}", "raw HTML".bright_black()),
    }
    println!();

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt("Send this email?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let templates = TemplateRenderer::load(&config.mailer.template_dir);
    if let Some(name) = &args.template {
        anyhow::ensure!(
            templates.has_template(name),
            "Template '{}' not found in {}",
            name,
            config.mailer.template_dir
        );
    }

    let transport = SmtpTransport::new(&config.mailer)?;
    let processor = EmailProcessor::new(Arc::new(transport), Arc::new(templates));

    let mut queue_config = config.queue.clone();
    queue_config.enabled = true;
    queue_config.remove_on_fail = queue_config.remove_on_fail.max(1);
    let (queue, worker) = MailerQueue::start(&queue_config, Arc::new(processor));
    let worker = worker.context("Email worker did not start")?;

    match (args.template, args.html) {
        (Some(template), _) => queue.queue_template(args.to, args.subject, template, context)?,
        (None, Some(html)) => queue.queue_mail(SendMailOptions {
            to: args.to,
            subject: args.subject,
            html,
            text: None,
        })?,
        (None, None) => anyhow::bail!("Either --html or --template is required"),
    };

    println!(
        "{}",
        format!("⏳ Delivering (up to {} attempts)...", queue_config.attempts).bright_black()
    );

    let failed = queue.failed_jobs().clone();
    drop(queue);
    worker.await.context("Email worker crashed")?;

    match failed.list().await.pop() {
        None => {
            println!("{}", "✅ Email sent successfully!".green().bold());
            Ok(())
        }
        Some(job) => {
            println!(
                "{} after {} attempt(s): {}",
                "❌ Delivery failed".red().bold(),
                job.attempts,
                job.error.to_string().red()
            );
            anyhow::bail!("email was not delivered")
        }
    }
}
