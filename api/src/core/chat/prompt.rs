//! Prompt parsing and assembly.
//!
//! Inbound text may start with a conversation code (`#abc rest of message`)
//! and the remaining body may start with a search directive
//! (`/search query`). The assembled prompt is always
//! instruction → context blocks → `Current message:` + body.

use conversation_store::CODE_LEN;

/// Marks a leading conversation code.
pub const CODE_MARKER: char = '#';

/// Prefix that turns the body into a web-search query.
pub const SEARCH_DIRECTIVE: &str = "/search";

/// Prompt split into an optional code and the message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPrompt<'a> {
    pub code: Option<&'a str>,
    pub body: &'a str,
}

/// Splits `#code body`; any other input is all body. `None` when nothing
/// but whitespace (or a bare code) remains.
///
/// Only a token shaped like an issued code ([`CODE_LEN`] ASCII
/// alphanumerics) is taken as a code, so `#rustlang is great` stays whole.
pub fn parse_prompt(raw: &str) -> Option<ParsedPrompt<'_>> {
    let trimmed = raw.trim();
    let split = trimmed.strip_prefix(CODE_MARKER).and_then(|rest| {
        let (code, body) = rest
            .split_once(char::is_whitespace)
            .unwrap_or((rest, ""));
        is_code(code).then(|| ParsedPrompt {
            code: Some(code),
            body: body.trim(),
        })
    });
    let parsed = split.unwrap_or(ParsedPrompt {
        code: None,
        body: trimmed,
    });
    (!parsed.body.is_empty()).then_some(parsed)
}

fn is_code(token: &str) -> bool {
    token.len() == CODE_LEN && token.chars().all(|c| c.is_ascii_alphanumeric())
}

/// If `body` starts with [`SEARCH_DIRECTIVE`] (case-insensitive, followed by
/// whitespace or end), returns the query after it, trimmed (possibly empty).
pub fn search_query(body: &str) -> Option<&str> {
    let head = body.get(..SEARCH_DIRECTIVE.len())?;
    if !head.eq_ignore_ascii_case(SEARCH_DIRECTIVE) {
        return None;
    }
    let rest = &body[SEARCH_DIRECTIVE.len()..];
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() => Some(rest.trim()),
        Some(_) => None,
    }
}

/// One block of supplementary context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptContext {
    /// The previous answer in this conversation.
    Conversation(String),
    /// Summarised web-search snippets.
    Search(String),
}

/// Per-request prompt sent to the model ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredPrompt {
    pub instruction: String,
    pub context: Vec<PromptContext>,
    pub body: String,
}

impl StructuredPrompt {
    pub fn new(max_chars: usize, context: Vec<PromptContext>, body: impl Into<String>) -> Self {
        Self {
            instruction: format!(
                "You are a helpful chat assistant. Reply in plain text using at most {max_chars} characters."
            ),
            context,
            body: body.into(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = self.instruction.clone();
        for block in &self.context {
            match block {
                PromptContext::Conversation(prev) => {
                    out.push_str("\n\nYour previous reply in this conversation:\n");
                    out.push_str(prev);
                }
                PromptContext::Search(results) => {
                    out.push_str("\n\nWeb search results:\n");
                    out.push_str(results);
                }
            }
        }
        out.push_str("\n\nCurrent message: ");
        out.push_str(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_prompt_has_no_code() {
        let p = parse_prompt("  hello there ").unwrap();
        assert_eq!(p, ParsedPrompt { code: None, body: "hello there" });
    }

    #[test]
    fn leading_code_is_split_off() {
        let p = parse_prompt("#aB3   what next?").unwrap();
        assert_eq!(p.code, Some("aB3"));
        assert_eq!(p.body, "what next?");
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(parse_prompt(""), None);
        assert_eq!(parse_prompt("   \t"), None);
        assert_eq!(parse_prompt("#abc"), None);
        assert_eq!(parse_prompt("#abc   "), None);
    }

    #[test]
    fn bare_marker_means_no_code() {
        let p = parse_prompt("# hi").unwrap();
        assert_eq!(p.code, None);
        assert_eq!(p.body, "# hi");
    }

    #[test]
    fn hashtag_words_stay_in_the_body() {
        let p = parse_prompt("#rustlang hi").unwrap();
        assert_eq!(p, ParsedPrompt { code: None, body: "#rustlang hi" });

        let p = parse_prompt("#a-b what").unwrap();
        assert_eq!(p.code, None);
        assert_eq!(p.body, "#a-b what");

        assert_eq!(parse_prompt("#rustlang").unwrap().body, "#rustlang");
    }

    #[test]
    fn search_directive() {
        assert_eq!(search_query("/search rust 2024"), Some("rust 2024"));
        assert_eq!(search_query("/SEARCH   weather"), Some("weather"));
        assert_eq!(search_query("/search"), Some(""));
        assert_eq!(search_query("/searching for x"), None);
        assert_eq!(search_query("tell me"), None);
        assert_eq!(search_query("/se"), None);
    }

    #[test]
    fn render_orders_sections() {
        let p = StructuredPrompt::new(
            100,
            vec![
                PromptContext::Conversation("prev".into()),
                PromptContext::Search("1. hit".into()),
            ],
            "now",
        );
        let text = p.render();
        let i = text.find("at most 100 characters").unwrap();
        let c = text.find("prev").unwrap();
        let s = text.find("1. hit").unwrap();
        let b = text.find("Current message: now").unwrap();
        assert!(i < c && c < s && s < b);
    }

    #[test]
    fn render_without_context() {
        let text = StructuredPrompt::new(10, Vec::new(), "hi").render();
        assert!(!text.contains("previous reply"));
        assert!(text.ends_with("Current message: hi"));
    }
}
