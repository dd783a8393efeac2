/// Log tags identify the subsystem that produced an entry
use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Quotes,
    Jupiter,
    Raydium,
    Okx,
    Store,
    Tokens,
    Other(String),
}

impl LogTag {
    /// Key used by `--debug <key>` and the `enabled_tags` filter
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Quotes => "quotes".to_string(),
            LogTag::Jupiter => "jupiter".to_string(),
            LogTag::Raydium => "raydium".to_string(),
            LogTag::Okx => "okx".to_string(),
            LogTag::Store => "store".to_string(),
            LogTag::Tokens => "tokens".to_string(),
            LogTag::Other(s) => s.to_lowercase(),
        }
    }

    pub fn to_plain_string(&self) -> String {
        self.to_debug_key().to_uppercase()
    }

    pub(super) fn colorize(&self, padded: String) -> ColoredString {
        match self {
            LogTag::System => padded.bright_yellow().bold(),
            LogTag::Config => padded.yellow().bold(),
            LogTag::Quotes => padded.bright_cyan().bold(),
            LogTag::Jupiter => padded.bright_green().bold(),
            LogTag::Raydium => padded.bright_magenta().bold(),
            LogTag::Okx => padded.bright_blue().bold(),
            LogTag::Store => padded.cyan().bold(),
            LogTag::Tokens => padded.green().bold(),
            LogTag::Other(_) => padded.white().bold(),
        }
    }
}
