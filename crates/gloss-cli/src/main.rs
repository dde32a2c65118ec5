//! Gloss CLI - persistent, optionally encrypted annotations on documents
//!
//! The command-line front end to `gloss-core`. An XHTML file stands in for
//! the live page an annotation host would provide.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod security;
mod ui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{anchor, annotate, keychain, misc, record};
use crate::constants::env_vars;
use crate::ui::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli).await {
        let hint = errors::error_hint(&e);
        print_error(&ctx.ui(false), &format!("{:#}", e), hint.as_deref());
        std::process::exit(errors::exit_code(&e));
    }
}

/// Logs go to stderr; `GLOSS_LOG` takes a filter directive, `-v` raises the default.
fn init_tracing(verbose: u8) {
    let default = if verbose == 0 { "warn" } else { "debug" };
    let filter = EnvFilter::try_from_env(env_vars::LOG).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(ctx: &AppContext<'_>, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Record(args)) => record::handle_record(ctx, &args.command).await,
        Some(Commands::Anchor(args)) => anchor::handle_anchor(ctx, &args.command),
        Some(Commands::Annotate(args)) => annotate::handle_annotate(ctx, &args.command).await,
        Some(Commands::Keychain(args)) => keychain::handle_keychain(ctx, &args.command),
        Some(Commands::Completions(args)) => misc::handle_completions(args),
        None => {
            print_quickstart();
            Ok(())
        }
    }
}

fn print_quickstart() {
    println!("Gloss - annotations that survive reloads");
    println!();
    println!("Quickstart:");
    println!("  gloss annotate highlight https://example.com --file page.xhtml --quote \"text\"");
    println!("  gloss annotate note https://example.com --file page.xhtml --text \"remember\"");
    println!("  gloss annotate show https://example.com --file page.xhtml");
    println!("  gloss annotate pages");
    println!();
    println!("Records are encrypted when {} is set.", env_vars::PASSPHRASE);
    println!("Run `gloss --help` for all commands.");
}
