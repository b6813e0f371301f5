use anyhow::Result;
use indoc::formatdoc;

use crate::prompt::site_catalog::CATALOG_MARKDOWN;
use crate::prompt::LanguageModel;

/// Maps a free-form question to the canonical English name of the site it asks about
pub struct NameResolver<M: LanguageModel> {
    model: M,
}

impl<M: LanguageModel> NameResolver<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Ask the model for the site's canonical name.
    ///
    /// The reply is trimmed and returned as is; an empty string means the
    /// model could not name a site.
    pub async fn resolve(&self, question: &str) -> Result<String> {
        let prompt = build_resolution_prompt(question);
        let reply = self.model.invoke(&prompt).await?;
        let name = reply.trim().to_string();

        tracing::info!("Resolved heritage name: {:?}", name);
        Ok(name)
    }
}

pub fn build_resolution_prompt(question: &str) -> String {
    formatdoc! {"
        You are an expert on the World Heritage sites of China.

        The user will ask a question about exactly one of the sites below.
        Work out which site the question is about and reply with its official
        English name as used by UNESCO.

        {catalog}
        Rules:
        - Reply with the English site name only.
        - Do not add explanations, punctuation or quotation marks.

        Example:
        Question: 颐和园是什么时候建造的？
        Answer: Summer Palace, an Imperial Garden in Beijing

        Question: {question}
        Answer:",
        catalog = CATALOG_MARKDOWN.as_str(),
        question = question,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubModel {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl StubModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for StubModel {
        async fn invoke(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn invoke(&self, _prompt: &str) -> Result<String> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_resolve_trims_model_output() {
        let resolver = NameResolver::new(StubModel::replying("  Mount Taishan \n"));
        let name = resolver.resolve("泰山有多高？").await.unwrap();
        assert_eq!(name, "Mount Taishan");
    }

    #[tokio::test]
    async fn test_prompt_carries_question_and_catalog() {
        let resolver = NameResolver::new(StubModel::replying("Summer Palace"));
        resolver.resolve("颐和园在哪里？").await.unwrap();

        let prompts = resolver.model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Question: 颐和园在哪里？"));
        assert!(prompts[0].contains("## Natural heritage (14)"));
        assert!(prompts[0].trim_end().ends_with("Answer:"));
    }

    #[tokio::test]
    async fn test_empty_reply_resolves_to_empty_name() {
        let resolver = NameResolver::new(StubModel::replying("   "));
        assert_eq!(resolver.resolve("随便问问").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let resolver = NameResolver::new(FailingModel);
        let err = resolver.resolve("长城有多长？").await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
