//! /get-code command: API usage snippets per language

use crate::bot::{Context, Error};
use crate::embeds;
use poise::serenity_prelude as serenity;
use spoobot_commands::snippets::{self, SnippetLanguage, SnippetRequest};

/// Slash command choice wrapper for the snippet languages
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum LanguageChoice {
    #[name = "Python-Requests"]
    PythonRequests,
    #[name = "Python-Aiohttp"]
    PythonAiohttp,
    #[name = "C"]
    C,
    #[name = "C#"]
    CSharp,
    #[name = "Clojure"]
    Clojure,
    #[name = "Go"]
    Go,
    #[name = "HTTP"]
    Http,
    #[name = "Java"]
    Java,
    #[name = "JavaScript-Fetch"]
    JavaScriptFetch,
    #[name = "JavaScript-XMLHttpRequest"]
    JavaScriptXhr,
    #[name = "Kotlin"]
    Kotlin,
    #[name = "Node.js-Requests"]
    NodeRequests,
    #[name = "Node.js-Axios"]
    NodeAxios,
    #[name = "Node.js-Unirest"]
    NodeUnirest,
    #[name = "PHP"]
    Php,
    #[name = "R"]
    R,
    #[name = "Ruby"]
    Ruby,
    #[name = "Shell"]
    Shell,
    #[name = "Rust"]
    Rust,
}

impl From<LanguageChoice> for SnippetLanguage {
    fn from(choice: LanguageChoice) -> Self {
        match choice {
            LanguageChoice::PythonRequests => SnippetLanguage::PythonRequests,
            LanguageChoice::PythonAiohttp => SnippetLanguage::PythonAiohttp,
            LanguageChoice::C => SnippetLanguage::C,
            LanguageChoice::CSharp => SnippetLanguage::CSharp,
            LanguageChoice::Clojure => SnippetLanguage::Clojure,
            LanguageChoice::Go => SnippetLanguage::Go,
            LanguageChoice::Http => SnippetLanguage::Http,
            LanguageChoice::Java => SnippetLanguage::Java,
            LanguageChoice::JavaScriptFetch => SnippetLanguage::JavaScriptFetch,
            LanguageChoice::JavaScriptXhr => SnippetLanguage::JavaScriptXhr,
            LanguageChoice::Kotlin => SnippetLanguage::Kotlin,
            LanguageChoice::NodeRequests => SnippetLanguage::NodeRequests,
            LanguageChoice::NodeAxios => SnippetLanguage::NodeAxios,
            LanguageChoice::NodeUnirest => SnippetLanguage::NodeUnirest,
            LanguageChoice::Php => SnippetLanguage::Php,
            LanguageChoice::R => SnippetLanguage::R,
            LanguageChoice::Ruby => SnippetLanguage::Ruby,
            LanguageChoice::Shell => SnippetLanguage::Shell,
            LanguageChoice::Rust => SnippetLanguage::Rust,
        }
    }
}

/// Get the code to use the spoo.me API in your preferred language 🔗
#[poise::command(slash_command, guild_only, rename = "get-code")]
pub async fn get_code(
    ctx: Context<'_>,
    #[description = "The language of the code"] language: LanguageChoice,
    #[description = "The URL to shorten"] url: String,
    #[description = "The custom alias for the URL"] alias: Option<String>,
    #[description = "The maximum number of clicks for the URL"] max_clicks: Option<u32>,
    #[description = "The password for the URL"] password: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;

    let language: SnippetLanguage = language.into();
    let request = SnippetRequest {
        url,
        alias,
        max_clicks,
        password,
    };

    let snippet = language.generate(&request);
    let warnings = snippets::soft_warnings(&request);
    let warning_lines: Vec<String> = warnings
        .iter()
        .map(|warning| format!("- ```{}```", warning))
        .collect();

    // Embed descriptions cap at 4096 characters; longer snippets fall back
    // to a plain message
    let block = format!("```{}\n\n{}\n\n```", snippet.syntax, snippet.code);
    if block.len() <= 4096 {
        let mut embed = serenity::CreateEmbed::new()
            .title(format!("{} code to use spoo.me's API", language.name()))
            .description(block)
            .color(embeds::color(ctx.data(), |c| &c.primary))
            .footer(embeds::requested_by(&ctx))
            .timestamp(serenity::Timestamp::now());

        if !warning_lines.is_empty() {
            embed = embed.field("Soft Warnings", warning_lines.join("\n"), false);
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
    } else {
        let mut message = format!(
            "## {} code to use spoo.me's API\n```{}\n{}```",
            language.name(),
            snippet.syntax,
            snippet.code
        );
        if !warning_lines.is_empty() {
            message.push_str("\n\nSoft Warnings\n");
            message.push_str(&warning_lines.join("\n"));
        }
        ctx.send(poise::CreateReply::default().content(message))
            .await?;
    }

    Ok(())
}
