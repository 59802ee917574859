// src/commands.rs

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    Search(String),
    Similar(String),
    Analytics,
    Health,
    QuickPick,
    QuickNext,
    QuickPrev,
    Ask(usize),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub const HELP: &str = "\
Type a message to chat with the assistant, or one of:
  /search <query>   natural-language product search
  /similar <id>     products similar to the given product id
  /analytics        dataset analytics dashboard
  /health           check the recommendation service
  /quick            pick a suggested question
  /next, /prev      page through suggested questions
  /ask <n>          send suggested question n
  /help             show this help
  /quit             exit";

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if !line.starts_with('/') {
            return Command::Chat(line.to_string());
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        match (name, arg) {
            ("/search", q) if !q.is_empty() => Command::Search(q.to_string()),
            ("/similar", id) if !id.is_empty() => Command::Similar(id.to_string()),
            ("/analytics", _) => Command::Analytics,
            ("/health", _) => Command::Health,
            ("/quick", _) => Command::QuickPick,
            ("/next", _) => Command::QuickNext,
            ("/prev", _) => Command::QuickPrev,
            ("/ask", n) => match n.parse() {
                Ok(n) => Command::Ask(n),
                Err(_) => Command::Unknown(line.to_string()),
            },
            ("/help", _) | ("/?", _) => Command::Help,
            ("/quit", _) | ("/exit", _) | ("/q", _) => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}
