use redlens_core::Corpus;

/// Fixed system prompt for every summarization request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that analyzes Reddit user histories to create a concise, insightful summary. Be objective and base your analysis strictly on the provided text.";

const USERNAME_TOKEN: &str = "{username}";
const USER_DATA_TOKEN: &str = "{user_data}";

const DEFAULT_TEMPLATE: &str = r#"Please analyze the following collection of recent Reddit posts and comments from the user u/{username}.
Based *only* on this data, generate a summary that covers:
1.  **Main Interests:** What are the recurring topics, hobbies, or communities they engage with?
2.  **Overall Tone:** Do they seem helpful, argumentative, humorous, or technical?
3.  **Activity Pattern:** What kind of content do they typically post or comment on?

Keep the summary to about 3-4 paragraphs.

--- USER DATA ---
{user_data}
--- END USER DATA ---"#;

/// Which template text a request renders with, decided once per request.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptTemplate {
    Custom(String),
    Default,
}

impl PromptTemplate {
    /// An empty custom prompt counts as absent.
    pub fn resolve(custom_prompt: Option<&str>) -> Self {
        match custom_prompt {
            Some(text) if !text.is_empty() => PromptTemplate::Custom(text.to_string()),
            _ => PromptTemplate::Default,
        }
    }

    /// Renders the user prompt for one request.
    ///
    /// A custom template substitutes `{username}` and `{user_data}` when it
    /// contains at least one of the tokens. A custom template with neither
    /// token gets the username and corpus appended, so the model always
    /// receives the data it is asked about.
    pub fn render(&self, username: &str, corpus: &Corpus) -> String {
        match self {
            PromptTemplate::Custom(template) => {
                if template.contains(USERNAME_TOKEN) || template.contains(USER_DATA_TOKEN) {
                    template
                        .replace(USERNAME_TOKEN, username)
                        .replace(USER_DATA_TOKEN, corpus.as_str())
                } else {
                    format!("{}\n\nUser: u/{}\nData: {}", template, username, corpus)
                }
            }
            PromptTemplate::Default => DEFAULT_TEMPLATE
                .replace(USERNAME_TOKEN, username)
                .replace(USER_DATA_TOKEN, corpus.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Corpus {
        Corpus::from_text("Post Title: Hi\n---\nComment: Nice").unwrap()
    }

    #[test]
    fn test_missing_and_empty_custom_prompts_resolve_to_default() {
        assert_eq!(PromptTemplate::resolve(None), PromptTemplate::Default);
        assert_eq!(PromptTemplate::resolve(Some("")), PromptTemplate::Default);
        assert_eq!(
            PromptTemplate::resolve(Some("Summarize {user_data}")),
            PromptTemplate::Custom("Summarize {user_data}".to_string())
        );
    }

    #[test]
    fn test_default_template_wraps_corpus_in_markers() {
        let rendered = PromptTemplate::Default.render("spez", &corpus());
        assert!(rendered.contains("the user u/spez."));
        assert!(rendered.contains("--- USER DATA ---\nPost Title: Hi\n---\nComment: Nice\n--- END USER DATA ---"));
        assert!(rendered.contains("**Main Interests:**"));
        assert!(rendered.contains("3-4 paragraphs"));
    }

    #[test]
    fn test_custom_template_substitutes_both_tokens() {
        let template = PromptTemplate::resolve(Some("Who is {username}? Data: {user_data}"));
        let rendered = template.render("spez", &corpus());
        assert_eq!(
            rendered,
            "Who is spez? Data: Post Title: Hi\n---\nComment: Nice"
        );
    }

    #[test]
    fn test_custom_template_with_one_token_is_substituted_verbatim() {
        let template = PromptTemplate::resolve(Some("Summarize u/{username} briefly."));
        let rendered = template.render("spez", &corpus());
        assert_eq!(rendered, "Summarize u/spez briefly.");
    }

    #[test]
    fn test_custom_template_without_tokens_gets_data_appended() {
        let template = PromptTemplate::resolve(Some("Summarize this person."));
        let rendered = template.render("spez", &corpus());
        assert_eq!(
            rendered,
            "Summarize this person.\n\nUser: u/spez\nData: Post Title: Hi\n---\nComment: Nice"
        );
    }

    #[test]
    fn test_repeated_tokens_are_all_replaced() {
        let template = PromptTemplate::resolve(Some("{username} and {username} again"));
        let rendered = template.render("spez", &corpus());
        assert_eq!(rendered, "spez and spez again");
    }

    #[test]
    fn test_braces_without_recognized_tokens_still_fall_back() {
        let template = PromptTemplate::resolve(Some("Summarize {as bullet points} please."));
        let rendered = template.render("spez", &corpus());
        assert_eq!(
            rendered,
            "Summarize {as bullet points} please.\n\nUser: u/spez\nData: Post Title: Hi\n---\nComment: Nice"
        );
    }

    #[test]
    fn test_corpus_braces_are_inert_during_substitution() {
        let data = Corpus::from_text("Comment: try { risky() } and say {username}").unwrap();
        let template = PromptTemplate::resolve(Some("About {username}: {user_data}"));
        let rendered = template.render("spez", &data);
        assert_eq!(
            rendered,
            "About spez: Comment: try { risky() } and say {username}"
        );
    }
}
