//! API code snippet generation
//!
//! Generates ready-to-run client code for the shortening API in a number of
//! languages, plus the soft validation warnings shown alongside a snippet
//! when the supplied parameters look off.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("Invalid URL regex pattern")
});

static ALIAS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid alias regex pattern"));

/// Parameters embedded into a generated snippet
#[derive(Debug, Clone, Default)]
pub struct SnippetRequest {
    pub url: String,
    pub alias: Option<String>,
    pub max_clicks: Option<u32>,
    pub password: Option<String>,
}

impl SnippetRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Payload fields in wire order: url first, optional fields after
    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("url", self.url.clone())];
        if let Some(alias) = &self.alias {
            fields.push(("alias", alias.clone()));
        }
        if let Some(password) = &self.password {
            fields.push(("password", password.clone()));
        }
        if let Some(max_clicks) = self.max_clicks {
            fields.push(("max-clicks", max_clicks.to_string()));
        }
        fields
    }

    /// The payload as an indented JSON object literal
    fn json_object(&self, indent: &str) -> String {
        let body = self
            .fields()
            .iter()
            .map(|(key, value)| {
                format!("{}{}: {}", indent, quote(key), quote(value))
            })
            .collect::<Vec<_>>()
            .join(",\n");
        format!("{{\n{}\n}}", body)
    }

    /// The payload as `key=value&...` form data
    fn form_data(&self) -> String {
        self.fields()
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// A generated snippet with its syntax-highlighting tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSnippet {
    pub code: String,
    pub syntax: &'static str,
}

/// Supported snippet target languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnippetLanguage {
    PythonRequests,
    PythonAiohttp,
    C,
    CSharp,
    Clojure,
    Go,
    Http,
    Java,
    JavaScriptFetch,
    JavaScriptXhr,
    Kotlin,
    NodeRequests,
    NodeAxios,
    NodeUnirest,
    Php,
    R,
    Ruby,
    Shell,
    Rust,
}

impl SnippetLanguage {
    /// All supported languages, in menu order
    pub const ALL: [SnippetLanguage; 19] = [
        SnippetLanguage::PythonRequests,
        SnippetLanguage::PythonAiohttp,
        SnippetLanguage::C,
        SnippetLanguage::CSharp,
        SnippetLanguage::Clojure,
        SnippetLanguage::Go,
        SnippetLanguage::Http,
        SnippetLanguage::Java,
        SnippetLanguage::JavaScriptFetch,
        SnippetLanguage::JavaScriptXhr,
        SnippetLanguage::Kotlin,
        SnippetLanguage::NodeRequests,
        SnippetLanguage::NodeAxios,
        SnippetLanguage::NodeUnirest,
        SnippetLanguage::Php,
        SnippetLanguage::R,
        SnippetLanguage::Ruby,
        SnippetLanguage::Shell,
        SnippetLanguage::Rust,
    ];

    /// Display name, also used as the slash command choice
    pub fn name(&self) -> &'static str {
        match self {
            SnippetLanguage::PythonRequests => "Python-Requests",
            SnippetLanguage::PythonAiohttp => "Python-Aiohttp",
            SnippetLanguage::C => "C",
            SnippetLanguage::CSharp => "C#",
            SnippetLanguage::Clojure => "Clojure",
            SnippetLanguage::Go => "Go",
            SnippetLanguage::Http => "HTTP",
            SnippetLanguage::Java => "Java",
            SnippetLanguage::JavaScriptFetch => "JavaScript-Fetch",
            SnippetLanguage::JavaScriptXhr => "JavaScript-XMLHttpRequest",
            SnippetLanguage::Kotlin => "Kotlin",
            SnippetLanguage::NodeRequests => "Node.js-Requests",
            SnippetLanguage::NodeAxios => "Node.js-Axios",
            SnippetLanguage::NodeUnirest => "Node.js-Unirest",
            SnippetLanguage::Php => "PHP",
            SnippetLanguage::R => "R",
            SnippetLanguage::Ruby => "Ruby",
            SnippetLanguage::Shell => "Shell",
            SnippetLanguage::Rust => "Rust",
        }
    }

    /// Parse a choice value back into a language
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|lang| lang.name() == name)
    }

    /// Markdown syntax highlighting tag for the code block
    pub fn syntax(&self) -> &'static str {
        match self {
            SnippetLanguage::PythonRequests | SnippetLanguage::PythonAiohttp => "python",
            SnippetLanguage::C => "c",
            SnippetLanguage::CSharp => "csharp",
            SnippetLanguage::Clojure => "clojure",
            SnippetLanguage::Go => "go",
            SnippetLanguage::Http => "http",
            SnippetLanguage::Java => "java",
            SnippetLanguage::JavaScriptFetch
            | SnippetLanguage::JavaScriptXhr
            | SnippetLanguage::NodeRequests
            | SnippetLanguage::NodeAxios
            | SnippetLanguage::NodeUnirest => "javascript",
            SnippetLanguage::Kotlin => "kotlin",
            SnippetLanguage::Php => "php",
            SnippetLanguage::R => "r",
            SnippetLanguage::Ruby => "ruby",
            SnippetLanguage::Shell => "bash",
            SnippetLanguage::Rust => "rust",
        }
    }

    /// Generate the snippet for this language
    pub fn generate(&self, request: &SnippetRequest) -> CodeSnippet {
        let code = match self {
            SnippetLanguage::PythonRequests => python_requests(request),
            SnippetLanguage::PythonAiohttp => python_aiohttp(request),
            SnippetLanguage::C => c_curl(request),
            SnippetLanguage::CSharp => csharp(request),
            SnippetLanguage::Clojure => clojure(request),
            SnippetLanguage::Go => go(request),
            SnippetLanguage::Http => raw_http(request),
            SnippetLanguage::Java => java(request),
            SnippetLanguage::JavaScriptFetch => js_fetch(request),
            SnippetLanguage::JavaScriptXhr => js_xhr(request),
            SnippetLanguage::Kotlin => kotlin(request),
            SnippetLanguage::NodeRequests => node_requests(request),
            SnippetLanguage::NodeAxios => node_axios(request),
            SnippetLanguage::NodeUnirest => node_unirest(request),
            SnippetLanguage::Php => php(request),
            SnippetLanguage::R => r_lang(request),
            SnippetLanguage::Ruby => ruby(request),
            SnippetLanguage::Shell => shell(request),
            SnippetLanguage::Rust => rust(request),
        };
        CodeSnippet {
            code,
            syntax: self.syntax(),
        }
    }
}

/// Non-fatal problems with snippet parameters; the API may still reject
/// them server-side
pub fn soft_warnings(request: &SnippetRequest) -> Vec<String> {
    let mut warnings = Vec::new();

    if !URL_REGEX.is_match(&request.url) {
        warnings.push(format!(
            "'{}' is not a valid URL, the API might return an error",
            truncate(&request.url)
        ));
    }

    if let Some(alias) = &request.alias {
        if !ALIAS_REGEX.is_match(alias) {
            warnings.push(format!(
                "'{}' is not a valid alias, the API might return an error",
                truncate(alias)
            ));
        }
        if alias.len() > 15 {
            warnings.push(format!(
                "'{}' is too long, the API will strip it to 15 characters",
                truncate(alias)
            ));
        }
    }

    if let Some(password) = &request.password {
        if !valid_password(password) {
            warnings.push(format!(
                "'{}' is not a valid password, the API might return an error. \
                 Passwords must be at least 8 characters with a letter, a number \
                 and a non-consecutive '@' or '.'",
                truncate(password)
            ));
        }
    }

    warnings
}

/// Password rules enforced by the service: length >= 8, at least one
/// letter, one digit and one of '@'/'.', with no two specials adjacent
fn valid_password(password: &str) -> bool {
    if password.len() < 8 {
        return false;
    }
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| c == '@' || c == '.');
    let consecutive_specials = password
        .as_bytes()
        .windows(2)
        .any(|pair| matches!(pair, [b'@' | b'.', b'@' | b'.']));
    has_letter && has_digit && has_special && !consecutive_specials
}

fn truncate(value: &str) -> String {
    if value.len() > 150 {
        format!("{}...", &value[..150])
    } else {
        value.to_string()
    }
}

// ============================================================================
// Language templates
// ============================================================================

fn python_requests(request: &SnippetRequest) -> String {
    format!(
        r#"import requests

url = "https://spoo.me/"

payload = {payload}
headers = {{
    "Accept": "application/json",
}}

response = requests.post(url, data=payload, headers=headers)

if response.status_code == 200:
    print(response.json())
else:
    print(response.text)"#,
        payload = request.json_object("    ")
    )
}

fn python_aiohttp(request: &SnippetRequest) -> String {
    format!(
        r#"import aiohttp
import asyncio

url = "https://spoo.me/"

payload = {payload}
headers = {{
    "Accept": "application/json",
}}

async def main():
    async with aiohttp.ClientSession() as session:
        async with session.post(url, data=payload, headers=headers) as response:
            if response.status == 200:
                print(await response.json())
            else:
                print(await response.text())

asyncio.run(main())"#,
        payload = request.json_object("    ")
    )
}

fn c_curl(request: &SnippetRequest) -> String {
    format!(
        r#"#include <stdio.h>
#include <curl/curl.h>

int main(void) {{
    CURL *curl = curl_easy_init();
    if (curl) {{
        struct curl_slist *headers = NULL;
        headers = curl_slist_append(headers, "Accept: application/json");

        curl_easy_setopt(curl, CURLOPT_URL, "https://spoo.me/");
        curl_easy_setopt(curl, CURLOPT_HTTPHEADER, headers);
        curl_easy_setopt(curl, CURLOPT_POSTFIELDS, "{form}");

        CURLcode res = curl_easy_perform(curl);
        if (res != CURLE_OK)
            fprintf(stderr, "request failed: %s\n", curl_easy_strerror(res));

        curl_slist_free_all(headers);
        curl_easy_cleanup(curl);
    }}
    return 0;
}}"#,
        form = request.form_data()
    )
}

fn csharp(request: &SnippetRequest) -> String {
    let pairs = request
        .fields()
        .iter()
        .map(|(key, value)| {
            format!(
                "            {{ {}, {} }},",
                quote(key),
                quote(value)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"using System.Net.Http;

class Program
{{
    static async Task Main()
    {{
        using var client = new HttpClient();
        client.DefaultRequestHeaders.Add("Accept", "application/json");

        var payload = new Dictionary<string, string>
        {{
{pairs}
        }};

        var response = await client.PostAsync(
            "https://spoo.me/", new FormUrlEncodedContent(payload));

        Console.WriteLine(await response.Content.ReadAsStringAsync());
    }}
}}"#
    )
}

fn clojure(request: &SnippetRequest) -> String {
    let pairs = request
        .fields()
        .iter()
        .map(|(key, value)| format!("               {} {}", quote(key), quote(value)))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"(require '[clj-http.client :as client])

(client/post "https://spoo.me/"
  {{:headers {{"Accept" "application/json"}}
   :form-params
   {{
{pairs}
   }}}})"#
    )
}

fn go(request: &SnippetRequest) -> String {
    let sets = request
        .fields()
        .iter()
        .map(|(key, value)| format!("    payload.Set({}, {})", quote(key), quote(value)))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"package main

import (
    "fmt"
    "io"
    "net/http"
    "net/url"
    "strings"
)

func main() {{
    payload := url.Values{{}}
{sets}

    req, _ := http.NewRequest("POST", "https://spoo.me/", strings.NewReader(payload.Encode()))
    req.Header.Set("Accept", "application/json")
    req.Header.Set("Content-Type", "application/x-www-form-urlencoded")

    resp, err := http.DefaultClient.Do(req)
    if err != nil {{
        panic(err)
    }}
    defer resp.Body.Close()

    body, _ := io.ReadAll(resp.Body)
    fmt.Println(string(body))
}}"#
    )
}

fn raw_http(request: &SnippetRequest) -> String {
    let form = request.form_data();
    format!(
        "POST / HTTP/1.1\n\
         Host: spoo.me\n\
         Accept: application/json\n\
         Content-Type: application/x-www-form-urlencoded\n\
         Content-Length: {}\n\
         \n\
         {}",
        form.len(),
        form
    )
}

fn java(request: &SnippetRequest) -> String {
    format!(
        r#"import java.net.URI;
import java.net.http.HttpClient;
import java.net.http.HttpRequest;
import java.net.http.HttpResponse;

public class ShortenUrl {{
    public static void main(String[] args) throws Exception {{
        HttpClient client = HttpClient.newHttpClient();

        HttpRequest request = HttpRequest.newBuilder()
            .uri(URI.create("https://spoo.me/"))
            .header("Accept", "application/json")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .POST(HttpRequest.BodyPublishers.ofString("{form}"))
            .build();

        HttpResponse<String> response =
            client.send(request, HttpResponse.BodyHandlers.ofString());
        System.out.println(response.body());
    }}
}}"#,
        form = request.form_data()
    )
}

fn js_fetch(request: &SnippetRequest) -> String {
    format!(
        r#"const payload = new URLSearchParams({payload});

fetch("https://spoo.me/", {{
  method: "POST",
  headers: {{ Accept: "application/json" }},
  body: payload,
}})
  .then((response) => response.json())
  .then((data) => console.log(data))
  .catch((error) => console.error(error));"#,
        payload = request.json_object("  ")
    )
}

fn js_xhr(request: &SnippetRequest) -> String {
    format!(
        r#"const xhr = new XMLHttpRequest();
xhr.open("POST", "https://spoo.me/");
xhr.setRequestHeader("Accept", "application/json");
xhr.setRequestHeader("Content-Type", "application/x-www-form-urlencoded");

xhr.onload = () => console.log(xhr.responseText);
xhr.onerror = () => console.error("request failed");

xhr.send("{form}");"#,
        form = request.form_data()
    )
}

fn kotlin(request: &SnippetRequest) -> String {
    let adds = request
        .fields()
        .iter()
        .map(|(key, value)| format!("        .add({}, {})", quote(key), quote(value)))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"import okhttp3.FormBody
import okhttp3.OkHttpClient
import okhttp3.Request

fun main() {{
    val client = OkHttpClient()

    val body = FormBody.Builder()
{adds}
        .build()

    val request = Request.Builder()
        .url("https://spoo.me/")
        .header("Accept", "application/json")
        .post(body)
        .build()

    client.newCall(request).execute().use {{ response ->
        println(response.body?.string())
    }}
}}"#
    )
}

fn node_requests(request: &SnippetRequest) -> String {
    format!(
        r#"const request = require("request");

const options = {{
  method: "POST",
  url: "https://spoo.me/",
  headers: {{ Accept: "application/json" }},
  form: {payload},
}};

request(options, (error, response, body) => {{
  if (error) throw error;
  console.log(body);
}});"#,
        payload = request.json_object("    ")
    )
}

fn node_axios(request: &SnippetRequest) -> String {
    format!(
        r#"const axios = require("axios");

const payload = new URLSearchParams({payload});

axios
  .post("https://spoo.me/", payload, {{
    headers: {{ Accept: "application/json" }},
  }})
  .then((response) => console.log(response.data))
  .catch((error) => console.error(error));"#,
        payload = request.json_object("  ")
    )
}

fn node_unirest(request: &SnippetRequest) -> String {
    format!(
        r#"const unirest = require("unirest");

unirest
  .post("https://spoo.me/")
  .headers({{ Accept: "application/json" }})
  .send({payload})
  .then((response) => console.log(response.body));"#,
        payload = request.json_object("  ")
    )
}

fn php(request: &SnippetRequest) -> String {
    format!(
        r#"<?php

$curl = curl_init();

curl_setopt_array($curl, [
    CURLOPT_URL => "https://spoo.me/",
    CURLOPT_RETURNTRANSFER => true,
    CURLOPT_POST => true,
    CURLOPT_POSTFIELDS => "{form}",
    CURLOPT_HTTPHEADER => ["Accept: application/json"],
]);

$response = curl_exec($curl);
curl_close($curl);

echo $response;"#,
        form = request.form_data()
    )
}

fn r_lang(request: &SnippetRequest) -> String {
    let pairs = request
        .fields()
        .iter()
        .map(|(key, value)| format!("  `{}` = {}", key, quote(value)))
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        r#"library(httr)

payload <- list(
{pairs}
)

response <- POST(
  "https://spoo.me/",
  body = payload,
  encode = "form",
  add_headers(Accept = "application/json")
)

print(content(response))"#
    )
}

fn ruby(request: &SnippetRequest) -> String {
    let pairs = request
        .fields()
        .iter()
        .map(|(key, value)| format!("  {} => {}", quote(key), quote(value)))
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        r#"require "net/http"
require "uri"

uri = URI("https://spoo.me/")

payload = {{
{pairs}
}}

response = Net::HTTP.post_form(uri, payload)
puts response.body"#
    )
}

fn shell(request: &SnippetRequest) -> String {
    let data = request
        .fields()
        .iter()
        .map(|(key, value)| format!("  -d \"{}={}\"", key, value))
        .collect::<Vec<_>>()
        .join(" \\\n");
    format!(
        "curl -X POST \"https://spoo.me/\" \\\n  -H \"Accept: application/json\" \\\n{}",
        data
    )
}

fn rust(request: &SnippetRequest) -> String {
    let pairs = request
        .fields()
        .iter()
        .map(|(key, value)| format!("        ({}, {}),", quote(key), quote(value)))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"use reqwest::Client;

#[tokio::main]
async fn main() -> Result<(), reqwest::Error> {{
    let params = [
{pairs}
    ];

    let response = Client::new()
        .post("https://spoo.me/")
        .header("Accept", "application/json")
        .form(&params)
        .send()
        .await?;

    println!("{{}}", response.text().await?);
    Ok(())
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> SnippetRequest {
        SnippetRequest {
            url: "https://example.com/page".to_string(),
            alias: Some("mylink".to_string()),
            max_clicks: Some(100),
            password: Some("Secret.123".to_string()),
        }
    }

    #[test]
    fn test_language_name_roundtrip() {
        for language in SnippetLanguage::ALL {
            assert_eq!(SnippetLanguage::from_name(language.name()), Some(language));
        }
        assert_eq!(SnippetLanguage::from_name("COBOL"), None);
    }

    #[test]
    fn test_every_language_embeds_the_url() {
        let request = full_request();
        for language in SnippetLanguage::ALL {
            let snippet = language.generate(&request);
            assert!(
                snippet.code.contains("https://example.com/page"),
                "{} snippet is missing the URL",
                language.name()
            );
            assert!(!snippet.syntax.is_empty());
        }
    }

    #[test]
    fn test_optional_fields_are_omitted_when_absent() {
        let request = SnippetRequest::new("https://example.com");
        for language in SnippetLanguage::ALL {
            let snippet = language.generate(&request);
            assert!(
                !snippet.code.contains("alias"),
                "{} snippet leaked an absent alias",
                language.name()
            );
            assert!(
                !snippet.code.contains("max-clicks"),
                "{} snippet leaked absent max-clicks",
                language.name()
            );
        }
    }

    #[test]
    fn test_optional_fields_are_present_when_supplied() {
        let snippet = SnippetLanguage::PythonRequests.generate(&full_request());
        assert!(snippet.code.contains("mylink"));
        assert!(snippet.code.contains("max-clicks"));
        assert!(snippet.code.contains("Secret.123"));
        assert_eq!(snippet.syntax, "python");
    }

    #[test]
    fn test_form_data_ordering() {
        let form = full_request().form_data();
        assert_eq!(
            form,
            "url=https://example.com/page&alias=mylink&password=Secret.123&max-clicks=100"
        );
    }

    #[test]
    fn test_http_snippet_content_length() {
        let request = SnippetRequest::new("https://example.com");
        let snippet = SnippetLanguage::Http.generate(&request);
        let form = request.form_data();
        assert!(snippet
            .code
            .contains(&format!("Content-Length: {}", form.len())));
        assert!(snippet.code.ends_with(&form));
    }

    #[test]
    fn test_soft_warnings_clean_request() {
        assert!(soft_warnings(&full_request()).is_empty());
    }

    #[test]
    fn test_soft_warnings_bad_url() {
        let request = SnippetRequest::new("not a url");
        let warnings = soft_warnings(&request);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not a valid URL"));
    }

    #[test]
    fn test_soft_warnings_long_alias() {
        let mut request = full_request();
        request.alias = Some("averyveryverylongalias".to_string());
        let warnings = soft_warnings(&request);
        assert!(warnings.iter().any(|w| w.contains("too long")));
    }

    #[test]
    fn test_password_rules() {
        assert!(valid_password("Secret.123"));
        assert!(valid_password("hunter2@x"));

        assert!(!valid_password("short.1")); // too short
        assert!(!valid_password("NoDigits.here")); // no digit
        assert!(!valid_password("12345678.")); // no letter
        assert!(!valid_password("Secret123")); // no special
        assert!(!valid_password("Secret..123")); // consecutive specials
    }
}
