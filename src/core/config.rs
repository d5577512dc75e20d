use std::env;
use std::fmt;

/// SQS refuses to hand out more than ten messages per receive call.
pub const MAX_BATCH_SIZE: usize = 10;

pub const DEFAULT_BATCH_SIZE: usize = 4;
pub const DEFAULT_MODEL: &str = "gpt-35-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2023-05-15";
pub const DEFAULT_MAIL_SUBJECT: &str = "English Mail Summarize Master";
pub const DEFAULT_SMTP_HOST: &str = "smtp.office365.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// What to do with a queue item whose summary could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Remove every acquired item, summarized or not.
    Always,
    /// Leave failed items in the queue so they are redelivered later.
    SkipFailed,
}

/// Sampling knobs sent with every transform request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f64,
    pub max_tokens: i64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 800,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

/// Where chat-completion requests go.
#[derive(Clone, PartialEq, Eq)]
pub enum TransformEndpoint {
    OpenAi {
        base_url: String,
        org_id: Option<String>,
    },
    Azure {
        resource_url: String,
        api_version: String,
    },
}

#[derive(Clone)]
pub struct TransformConfig {
    pub endpoint: TransformEndpoint,
    pub api_key: String,
    pub model: String,
    pub sampling: SamplingParams,
}

#[derive(Clone)]
pub struct MailConfig {
    pub account: String,
    pub password: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Mail the digest even when every item in the batch failed to summarize.
    pub send_empty_digest: bool,
}

/// Knobs the batch processor reads on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub batch_size: usize,
    pub removal_policy: RemovalPolicy,
    pub summarize_concurrency: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            removal_policy: RemovalPolicy::Always,
            summarize_concurrency: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub queue_url: String,
    pub batch: BatchSettings,
    pub transform: TransformConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| format!("{name}: environment variable not found"))
        };

        let batch_size = parse_or(&lookup, "MAX_MESSAGES", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(format!(
                "MAX_MESSAGES: must be between 1 and {MAX_BATCH_SIZE}, got {batch_size}"
            ));
        }

        let summarize_concurrency = parse_or(&lookup, "SUMMARIZE_CONCURRENCY", 1usize)?;
        if summarize_concurrency == 0 || summarize_concurrency > batch_size {
            return Err(format!(
                "SUMMARIZE_CONCURRENCY: must be between 1 and {batch_size}, got {summarize_concurrency}"
            ));
        }

        let removal_policy = if parse_or(&lookup, "REMOVE_FAILED_ITEMS", true)? {
            RemovalPolicy::Always
        } else {
            RemovalPolicy::SkipFailed
        };

        let endpoint = match lookup("AOAI_BASE").filter(|v| !v.trim().is_empty()) {
            Some(resource_url) => TransformEndpoint::Azure {
                resource_url,
                api_version: lookup("AOAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
            },
            None => TransformEndpoint::OpenAi {
                base_url: lookup("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                org_id: lookup("OPENAI_ORG_ID"),
            },
        };

        let api_key = lookup("AOAI_APIKEY")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| required("OPENAI_API_KEY"), Ok)?;

        let recipients: Vec<String> = required("MAIL_TO")?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if recipients.is_empty() {
            return Err("MAIL_TO: no recipient addresses given".to_string());
        }

        Ok(Self {
            queue_url: required("DIGEST_QUEUE_URL")?,
            batch: BatchSettings {
                batch_size,
                removal_policy,
                summarize_concurrency,
            },
            transform: TransformConfig {
                endpoint,
                api_key,
                model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                sampling: SamplingParams::default(),
            },
            mail: MailConfig {
                account: required("MAIL_ACCOUNT")?,
                password: required("MAIL_PASSWORD")?,
                recipients,
                subject: lookup("MAIL_SUBJECT").unwrap_or_else(|| DEFAULT_MAIL_SUBJECT.to_string()),
                smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                smtp_port: parse_or(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
                send_empty_digest: parse_or(&lookup, "SEND_EMPTY_DIGEST", true)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| format!("{name}: invalid value {raw:?}: {e}")),
        _ => Ok(default),
    }
}

// Secrets stay out of the logs.
impl fmt::Debug for TransformEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformEndpoint::OpenAi { base_url, org_id } => f
                .debug_struct("OpenAi")
                .field("base_url", base_url)
                .field("org_id", &org_id.as_ref().map(|_| "<set>"))
                .finish(),
            TransformEndpoint::Azure {
                resource_url,
                api_version,
            } => f
                .debug_struct("Azure")
                .field("resource_url", resource_url)
                .field("api_version", api_version)
                .finish(),
        }
    }
}

impl fmt::Debug for TransformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("sampling", &self.sampling)
            .finish()
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .field("recipients", &self.recipients)
            .field("subject", &self.subject)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("send_empty_digest", &self.send_empty_digest)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DIGEST_QUEUE_URL", "https://sqs.us-east-1.amazonaws.com/123/digest"),
            ("OPENAI_API_KEY", "sk-test"),
            ("MAIL_ACCOUNT", "bot@example.com"),
            ("MAIL_PASSWORD", "hunter2"),
            ("MAIL_TO", "a@example.com, b@example.com"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AppConfig, String> {
        AppConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.batch, BatchSettings::default());
        assert_eq!(config.transform.model, DEFAULT_MODEL);
        assert_eq!(config.transform.sampling, SamplingParams::default());
        assert_eq!(config.mail.subject, DEFAULT_MAIL_SUBJECT);
        assert_eq!(config.mail.smtp_port, DEFAULT_SMTP_PORT);
        assert!(config.mail.send_empty_digest);
        assert_eq!(
            config.mail.recipients,
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
        assert!(matches!(
            config.transform.endpoint,
            TransformEndpoint::OpenAi { .. }
        ));
    }

    #[test]
    fn test_azure_endpoint_selected_when_base_set() {
        let mut vars = base_vars();
        vars.remove("OPENAI_API_KEY");
        vars.insert("AOAI_BASE", "https://my-resource.openai.azure.com");
        vars.insert("AOAI_APIKEY", "azure-key");
        let config = load(&vars).unwrap();
        assert_eq!(config.transform.api_key, "azure-key");
        match config.transform.endpoint {
            TransformEndpoint::Azure {
                resource_url,
                api_version,
            } => {
                assert_eq!(resource_url, "https://my-resource.openai.azure.com");
                assert_eq!(api_version, DEFAULT_AZURE_API_VERSION);
            }
            TransformEndpoint::OpenAi { .. } => panic!("expected Azure endpoint"),
        }
    }

    #[test]
    fn test_missing_required_variable() {
        let mut vars = base_vars();
        vars.remove("DIGEST_QUEUE_URL");
        let err = load(&vars).unwrap_err();
        assert!(err.starts_with("DIGEST_QUEUE_URL"), "got: {err}");
    }

    #[test]
    fn test_batch_size_bounds() {
        for bad in ["0", "11", "four"] {
            let mut vars = base_vars();
            vars.insert("MAX_MESSAGES", bad);
            let err = load(&vars).unwrap_err();
            assert!(err.starts_with("MAX_MESSAGES"), "got: {err}");
        }
    }

    #[test]
    fn test_concurrency_cannot_exceed_batch() {
        let mut vars = base_vars();
        vars.insert("MAX_MESSAGES", "2");
        vars.insert("SUMMARIZE_CONCURRENCY", "3");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_skip_failed_removal_policy() {
        let mut vars = base_vars();
        vars.insert("REMOVE_FAILED_ITEMS", "false");
        let config = load(&vars).unwrap();
        assert_eq!(config.batch.removal_policy, RemovalPolicy::SkipFailed);
    }

    #[test]
    fn test_empty_digest_suppression() {
        let mut vars = base_vars();
        vars.insert("SEND_EMPTY_DIGEST", "false");
        let config = load(&vars).unwrap();
        assert!(!config.mail.send_empty_digest);

        vars.insert("SEND_EMPTY_DIGEST", "sometimes");
        let err = load(&vars).unwrap_err();
        assert!(err.starts_with("SEND_EMPTY_DIGEST"), "got: {err}");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&base_vars()).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-test"));
        assert!(!rendered.contains("hunter2"));
    }
}
