use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::app::{Result, TributaryError};
use crate::config::LoaderConfig;
use crate::domain::{Content, FetchDefinition, MemoryContent};
use crate::fetcher::ContentLoader;
use crate::parser::{ContentParser, HtmlContentParser};

/// Response header telling the loader to pass the body through unparsed.
pub const NO_COMPOSITION_HEADER: &str = "x-no-composition";

pub struct HttpContentLoader {
    client: Client,
    user_agent: HeaderValue,
    /// Content-type prefixes in lookup order
    parsers: Vec<(String, Arc<dyn ContentParser>)>,
}

impl HttpContentLoader {
    pub fn new() -> Result<Self> {
        Self::with_config(&LoaderConfig::default())
    }

    pub fn with_config(config: &LoaderConfig) -> Result<Self> {
        let client = Client::builder()
            .gzip(config.gzip)
            .brotli(config.brotli)
            .build()?;
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|e| {
            TributaryError::Config(format!("invalid user agent {:?}: {}", config.user_agent, e))
        })?;

        let html: Arc<dyn ContentParser> = Arc::new(HtmlContentParser::new());

        Ok(Self {
            client,
            user_agent,
            parsers: vec![("text/html".to_string(), html)],
        })
    }

    /// Register a parser for responses whose content type starts with
    /// `content_type`. Later registrations take precedence.
    pub fn with_parser(
        mut self,
        content_type: impl Into<String>,
        parser: Arc<dyn ContentParser>,
    ) -> Self {
        self.parsers.insert(0, (content_type.into(), parser));
        self
    }

    // prefix match, the header may carry a charset
    fn parser_for(&self, content_type: &str) -> Option<&Arc<dyn ContentParser>> {
        self.parsers
            .iter()
            .find(|(prefix, _)| content_type.starts_with(prefix.as_str()))
            .map(|(_, parser)| parser)
    }

    async fn fetch(&self, def: &FetchDefinition) -> Result<MemoryContent> {
        let url = Url::parse(&def.url)?;

        let mut headers = def.headers.clone();
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, self.user_agent.clone());
        }

        let mut request = self
            .client
            .request(def.method.clone(), url)
            .headers(headers)
            .timeout(def.timeout);
        if let Some(body) = &def.body {
            request = request.body(body.clone());
        }

        let mut response = request.send().await?;

        if let Some(processor) = &def.response_processor {
            processor.process(&mut response, &def.url)?;
        }

        let status = response.status();
        if !(200..=399).contains(&status.as_u16()) {
            return Err(TributaryError::HttpStatus {
                status,
                url: def.url.clone(),
            });
        }

        let mut content = MemoryContent::new(def.url.clone());
        content.status_code = status;
        content.headers = response.headers().clone();

        let skip_composition = response
            .headers()
            .get(NO_COMPOSITION_HEADER)
            .is_some_and(|v| !v.is_empty());
        let parser = if skip_composition {
            None
        } else {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            self.parser_for(content_type)
        };

        // read the whole body so the connection can be reused
        let body = response.bytes().await?;

        match parser {
            Some(parser) => {
                let parsing_start = Instant::now();
                parser.parse(&mut content, &body)?;
                tracing::debug!(
                    full_url = %content.url,
                    duration = ?parsing_start.elapsed(),
                    "content parsing"
                );
            }
            None => content.raw = Some(body.to_vec()),
        }

        Ok(content)
    }
}

#[async_trait]
impl ContentLoader for HttpContentLoader {
    async fn load(&self, def: &FetchDefinition) -> Result<Arc<dyn Content>> {
        let start = Instant::now();
        let result = self.fetch(def).await;

        match &result {
            Ok(content) => tracing::debug!(
                method = %def.method,
                url = %def.url,
                status = content.status_code.as_u16(),
                duration = ?start.elapsed(),
                "call"
            ),
            Err(e) => tracing::debug!(
                method = %def.method,
                url = %def.url,
                status = e.status_code().as_u16(),
                duration = ?start.elapsed(),
                error = %e,
                "call failed"
            ),
        }

        result.map(|content| Arc::new(content) as Arc<dyn Content>)
    }
}
