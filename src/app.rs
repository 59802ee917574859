use crate::analytics::load_dashboard;
use crate::api::ApiClient;
use crate::chat::{Conversation, QuickAsks, SendOutcome};
use crate::commands::{Command, HELP};
use crate::render;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Front-end state for one interactive session.
pub struct App {
    client: ApiClient,
    pub conversation: Conversation,
    pub quick_asks: QuickAsks,
    pub backend_ok: Option<bool>,
}

impl App {
    pub fn new(client: ApiClient) -> App {
        App {
            client,
            conversation: Conversation::new(),
            quick_asks: QuickAsks::default(),
            backend_ok: None,
        }
    }

    pub async fn check_health(&mut self) {
        self.backend_ok = Some(match self.client.health().await {
            Ok(health) => {
                log::debug!("health status: {}", health.status);
                true
            }
            Err(e) => {
                log::warn!("health check failed: {}", e);
                false
            }
        });
    }

    pub fn status_line(&self) -> String {
        format!(
            "{}  {}",
            "Product Recommendations".bold(),
            render::health_label(self.backend_ok)
        )
    }

    pub async fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Empty => {}
            Command::Quit => return Flow::Quit,
            Command::Help => println!("{}", HELP),
            Command::Unknown(line) => {
                println!("{} {}", "Unknown command:".yellow(), line);
                println!("{}", "Type /help for the list of commands.".dimmed());
            }
            Command::Chat(text) => self.chat(&text).await,
            Command::Ask(n) => match self.quick_asks.pick(n) {
                Some(prompt) => self.chat(prompt).await,
                None => println!("{}", format!("No suggested question #{}", n).yellow()),
            },
            Command::QuickNext => {
                self.quick_asks.next();
                println!("{}", render::render_quick_asks(&self.quick_asks));
            }
            Command::QuickPrev => {
                self.quick_asks.prev();
                println!("{}", render::render_quick_asks(&self.quick_asks));
            }
            Command::QuickPick => self.pick_quick_ask().await,
            Command::Health => {
                with_spinner("Checking...", self.check_health()).await;
                println!("{}", self.status_line());
            }
            Command::Search(query) => self.search(&query).await,
            Command::Similar(id) => self.similar(&id).await,
            Command::Analytics => self.analytics().await,
        }
        Flow::Continue
    }

    async fn chat(&mut self, text: &str) {
        println!("{}", "You".yellow().bold());
        println!("  {}", text);

        let outcome = with_spinner(
            "Finding the best recommendations for you...",
            self.conversation.send(&self.client, text),
        )
        .await;

        match outcome {
            SendOutcome::Ignored => return,
            SendOutcome::Replied | SendOutcome::Failed(_) => {}
        }

        if let Some(last) = self.conversation.visible_messages().last() {
            if let Some(bubble) = render::render_message(last) {
                println!("{}", bubble);
            }
        }
        if matches!(outcome, SendOutcome::Replied) {
            println!("\n{}", render::render_cards(self.conversation.recommendations()));
        }
    }

    async fn pick_quick_ask(&mut self) {
        let prompts = self.quick_asks.all().to_vec();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Try asking")
            .items(&prompts)
            .default(0)
            .interact_opt();

        match selection {
            Ok(Some(i)) => self.chat(prompts[i]).await,
            Ok(None) => {}
            Err(e) => log::warn!("quick-ask picker failed: {}", e),
        }
    }

    async fn search(&mut self, query: &str) {
        let top_k = self.client.default_top_k();
        match with_spinner("Searching...", self.client.search_products(query, top_k, true)).await {
            Ok(results) => {
                let timing = results
                    .processing_time
                    .map(|t| format!(" in {:.2}s", t))
                    .unwrap_or_default();
                println!(
                    "{}",
                    format!("{} result(s) for \"{}\"{}", results.total_results, results.query, timing)
                        .dimmed()
                );
                println!("{}", render::render_cards(&results.recommendations));
            }
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }

    async fn similar(&mut self, id: &str) {
        let top_k = self.client.similar_top_k();
        match with_spinner("Finding similar...", self.client.similar_products(id, top_k)).await {
            Ok(similar) => {
                println!("{}", format!("Similar to {}", similar.product_id).dimmed());
                println!("{}", render::render_cards(&similar.items));
            }
            Err(e) => {
                log::error!("similar products for {} failed: {}", id, e);
                println!("{} {}", "Error:".red(), e);
            }
        }
    }

    async fn analytics(&mut self) {
        match with_spinner("Loading analytics...", load_dashboard(&self.client)).await {
            Ok(dashboard) => println!("{}", render::render_dashboard(&dashboard)),
            Err(e) => {
                log::error!("analytics failed: {}", e);
                println!("{} {}", "Error:".red(), e);
            }
        }
    }
}

/// Awaits `fut` while a spinner with `message` ticks on stderr.
async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    let output = fut.await;
    pb.finish_and_clear();
    output
}
