//! Terminal host for the rewriting core.
//!
//! Drives the same extension surface a mail composer would embed, with
//! stdin as the compose area and stdout as the insertion target:
//!
//! ```bash
//! redraft prompts
//! redraft models
//! redraft set-model gpt-4o-mini
//! echo "hi there" | redraft transform formal
//! ```
//!
//! Logging goes to stderr; raise it with `RUST_LOG=redraft=debug`.

use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::debug;

use redraft::actions::Activation;
use redraft::config::ConfigPaths;
use redraft::extension::ComposerExtension;
use redraft::host::{AlertKind, ComposerHost, ContentKind, HostError};
use redraft::llm::TransformClient;
use redraft::orchestrator::Outcome;

#[derive(Parser, Debug)]
#[command(author, version, about = "AI text rewriting for mail composers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the configured rewriting prompts
    Prompts,
    /// List the models offered by the service
    Models,
    /// Select the model used for rewriting
    SetModel {
        /// Model id, e.g. gpt-4o-mini
        model: String,
    },
    /// Rewrite stdin with a prompt and print the result
    Transform {
        /// Id of the prompt to apply
        prompt: String,
        /// Model to use, remembered for next time
        #[arg(long)]
        model: Option<String>,
    },
}

/// Composer host backed by the terminal. The "compose area" is the text
/// read from stdin; insertions go to stdout, everything else to stderr.
struct TerminalHost {
    source_text: String,
}

#[async_trait(?Send)]
impl ComposerHost for TerminalHost {
    async fn content(&self, _kind: ContentKind) -> Result<String, HostError> {
        Ok(self.source_text.clone())
    }

    fn insert_content(&self, text: &str, _kind: ContentKind) {
        println!("{text}");
    }

    fn submit_alert(&self, kind: AlertKind, message: &str) {
        match kind {
            AlertKind::Info => eprintln!("note: {message}"),
            AlertKind::Error => eprintln!("error: {message}"),
        }
    }

    fn show_wait_indicator(&self, model: &str) {
        eprintln!("Rewriting with {model} may take a little longer. Please wait...");
    }

    fn dismiss_wait_indicator(&self) {}

    fn is_alive(&self) -> bool {
        true
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("redraft=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Bootstrap before any runtime exists; model discovery blocks.
    let client = TransformClient::new()?;
    let extension = ComposerExtension::bootstrap(ConfigPaths::per_user(), Arc::new(client));

    match cli.command {
        Command::Prompts => {
            let registry = extension.registry();
            let registry = registry.borrow();
            if registry.prompts().is_empty() {
                println!("No prompts configured");
            } else {
                for prompt in registry.prompts() {
                    println!("{:<20} {}", prompt.id, prompt.display_name);
                }
            }
        }
        Command::Models => {
            let registry = extension.registry();
            let registry = registry.borrow();
            if registry.models().is_empty() {
                println!("No models discovered (is an api key configured?)");
            } else {
                for model in registry.models() {
                    if model.id == registry.selected_model() {
                        println!("* {}", model.id);
                    } else {
                        println!("  {}", model.id);
                    }
                }
            }
        }
        Command::SetModel { model } => {
            extension.registry().borrow_mut().set_selected_model(&model);
            println!("Selected model: {model}");
        }
        Command::Transform { prompt, model } => {
            if let Some(model) = model {
                extension.registry().borrow_mut().set_selected_model(&model);
            }
            let source_text = std::io::read_to_string(std::io::stdin())?;
            let actions = extension.build_actions(Rc::new(TerminalHost { source_text }));
            let Some(Activation::Transform(invocation)) =
                actions.activate(&format!("redraft-prompt-{prompt}"))
            else {
                anyhow::bail!("unknown prompt '{prompt}', try `redraft prompts`");
            };

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let outcome = runtime.block_on(invocation.run());
            debug!(outcome = ?outcome, "Transform finished");
            if matches!(outcome, Outcome::Failed | Outcome::Aborted) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
