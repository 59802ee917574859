use anyhow::Context;
use colored::Colorize;
use ikarus::{
    api::ApiClient,
    app::{App, Flow},
    commands::Command,
    config::Config,
    constants::API_DOCS_URL,
    logging::init_logging,
    render,
};
use rustyline::{error::ReadlineError, DefaultEditor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_logging(&config.log_level);
    log::info!("using recommendation service at {}", config.api_base_url);

    let client = ApiClient::new(&config).context("failed to build API client")?;
    let mut app = App::new(client);

    println!("{}", "Ikarus · AI-Powered Furniture Discovery".bold().cyan());
    println!("{}", format!("API Docs: {}", API_DOCS_URL).dimmed());
    app.check_health().await;
    println!("{}\n", app.status_line());
    println!("{}\n", render::render_quick_asks(&app.quick_asks));
    println!(
        "{}",
        "Describe what you need (e.g., modern wooden dining table under ₹3000), or /help.".dimmed()
    );

    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;
    loop {
        match editor.readline("› ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                if app.handle(Command::parse(&line)).await == Flow::Quit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read input"),
        }
    }

    Ok(())
}
