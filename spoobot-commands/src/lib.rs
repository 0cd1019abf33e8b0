//! Command cooldowns, report sessions and snippet generation for SpooBot

pub mod cooldown;
pub mod session;
pub mod snippets;

pub use cooldown::{CooldownCheck, CooldownConfigError, CooldownManager, RateWindow};
pub use session::{ChartSelection, ExportSelection, ReportSession};
pub use snippets::{CodeSnippet, SnippetLanguage, SnippetRequest};
