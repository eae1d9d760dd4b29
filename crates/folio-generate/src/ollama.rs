//! Ollama text generation client
//!
//! Talks to a local [Ollama](https://ollama.com) server over its HTTP API,
//! one non-streaming `/api/generate` request per section.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use folio_config::GeneratorSettings;

use crate::client::TextGenerator;
use crate::error::{GenerateError, Result};

/// Default Ollama server URL
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Timeout for the reachability check
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default = "default_done")]
    done: bool,
}

fn default_done() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Result of [`OllamaClient::check_connection`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// Whether the configured model is installed on the server
    pub model_available: bool,
    /// Models the server reported
    pub available_models: Vec<String>,
}

/// Client for an Ollama server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// Base URL of the server, without trailing slash
    base_url: String,
    model: String,
    temperature: f32,
    client: Client,
}

impl OllamaClient {
    /// Create a client for `base_url` using `model`
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::from_settings(&GeneratorSettings {
            url: base_url.into(),
            model: model.into(),
            ..GeneratorSettings::default()
        })
    }

    /// Create a client from generator settings
    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self> {
        // Accept a full endpoint URL as well as the server root
        let base_url = settings
            .url
            .trim_end_matches('/')
            .trim_end_matches("/api/generate")
            .to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            model: settings.model.clone(),
            temperature: settings.temperature,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Model name as listed by the server (`name:latest` when untagged)
    pub fn model_tag(&self) -> String {
        if self.model.contains(':') {
            self.model.clone()
        } else {
            format!("{}:latest", self.model)
        }
    }

    /// Check that the server answers and whether the model is installed
    pub fn check_connection(&self) -> Result<ConnectionStatus> {
        let response = self
            .client
            .get(&self.base_url)
            .timeout(CHECK_TIMEOUT)
            .send()?;
        check_status(response)?;

        let tags_url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&tags_url).timeout(CHECK_TIMEOUT).send()?;
        let body = check_status(response)?.text()?;
        let tags: TagsResponse = serde_json::from_str(&body)?;

        let available_models: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        let model_tag = self.model_tag();
        let model_available = available_models.iter().any(|name| *name == model_tag);
        if model_available {
            tracing::info!(model = %self.model, "Ollama model found");
        } else {
            tracing::warn!(
                model = %self.model,
                checked_as = %model_tag,
                available = ?available_models,
                "Ollama model not found"
            );
        }

        Ok(ConnectionStatus {
            model_available,
            available_models,
        })
    }
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str, system_message: Option<&str>) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            system: system_message,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "sending prompt");

        let response = self.client.post(&url).json(&request).send()?;
        let body = check_status(response)?.text()?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;

        if !parsed.done {
            tracing::warn!("Ollama reports the generation may be incomplete (done: false)");
        }

        let text = parsed.response.trim();
        if text.is_empty() {
            return Err(GenerateError::Empty);
        }
        tracing::debug!(chars = text.len(), "generation finished");
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let message = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(GenerateError::ServerError {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve canned responses, one per connection, and return the request bodies
    fn serve(responses: Vec<(u16, String)>) -> (String, thread::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let mut bodies = Vec::new();
            for (status, body) in responses {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                    let lower = line.to_ascii_lowercase();
                    if let Some(value) = lower.strip_prefix("content-length:") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
                let mut request_body = vec![0u8; content_length];
                reader.read_exact(&mut request_body).unwrap();
                bodies.push(String::from_utf8(request_body).unwrap());

                let mut stream = stream;
                write!(
                    stream,
                    "HTTP/1.1 {} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                )
                .unwrap();
            }
            bodies
        });
        (url, handle)
    }

    #[test]
    fn test_generate_posts_request_and_trims_response() {
        let (url, server) = serve(vec![(
            200,
            r#"{"response":"  Generated body text.\n","done":true}"#.to_string(),
        )]);
        let client = OllamaClient::new(url, "mistral").unwrap();

        let text = client.generate("Write", Some("Be formal")).unwrap();
        assert_eq!(text, "Generated body text.");

        let bodies = server.join().unwrap();
        let request: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
        assert_eq!(request["model"], "mistral");
        assert_eq!(request["system"], "Be formal");
        assert_eq!(request["stream"], false);
        assert!((request["options"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_empty_response_is_an_error() {
        let (url, server) = serve(vec![(200, r#"{"response":"   ","done":true}"#.to_string())]);
        let client = OllamaClient::new(url, "mistral").unwrap();
        assert!(matches!(client.generate("x", None), Err(GenerateError::Empty)));
        server.join().unwrap();
    }

    #[test]
    fn test_server_error_status() {
        let (url, server) = serve(vec![(500, r#"{"error":"model not loaded"}"#.to_string())]);
        let client = OllamaClient::new(url, "mistral").unwrap();
        match client.generate("x", None) {
            Err(GenerateError::ServerError { status, message }) => {
                assert_eq!(status, 500);
                assert!(message.contains("model not loaded"));
            }
            other => panic!("expected server error, got {:?}", other),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_check_connection_reports_model() {
        let (url, server) = serve(vec![
            (200, "{}".to_string()),
            (
                200,
                r#"{"models":[{"name":"gemma3:latest"},{"name":"llama3:8b"}]}"#.to_string(),
            ),
        ]);
        let client = OllamaClient::new(url, "gemma3").unwrap();
        let status = client.check_connection().unwrap();
        assert!(status.model_available);
        assert_eq!(status.available_models.len(), 2);
        server.join().unwrap();
    }

    #[test]
    fn test_endpoint_url_is_reduced_to_server_root() {
        let client =
            OllamaClient::new("http://192.168.0.193:11434/api/generate", "gemma3:latest").unwrap();
        assert_eq!(client.base_url(), "http://192.168.0.193:11434");
        assert_eq!(client.model_tag(), "gemma3:latest");
    }

    #[test]
    fn test_unreachable_server_is_http_error() {
        // Bind then drop to get a port nothing listens on
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = OllamaClient::new(format!("http://127.0.0.1:{}", port), "m").unwrap();
        assert!(matches!(client.generate("x", None), Err(GenerateError::Http(_))));
    }
}
