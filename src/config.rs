use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Settings for the three remote AI providers. Base URLs default to the
/// hosted endpoints; override them for self-hosted gateways or tests.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Per-request HTTP timeout applied to every provider client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub stt: SttConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub tts: TtsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SttConfig {
    #[serde(default = "default_stt_base_url")]
    pub base_url: String,

    /// Delay between transcript job polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Give up on a transcript job after this many polls
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,

    /// Synthesis persona used when a request does not pick one
    #[serde(default = "default_tts_voice")]
    pub voice_id: String,

    #[serde(default = "default_tts_format")]
    pub format: String,

    #[serde(default = "default_tts_volume")]
    pub volume: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    /// Static audio clip served whenever a turn cannot be completed
    #[serde(default = "default_fallback_audio_path")]
    pub audio_path: String,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_stt_base_url() -> String {
    "https://api.assemblyai.com/v2".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_poll_attempts() -> u32 {
    60
}

fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_llm_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_tts_endpoint() -> String {
    "https://api.murf.ai/v1/speech/generate".to_string()
}

fn default_tts_voice() -> String {
    "en-US-natalie".to_string()
}

fn default_tts_format() -> String {
    "MP3".to_string()
}

fn default_tts_volume() -> String {
    "100%".to_string()
}

fn default_fallback_audio_path() -> String {
    "static/fallback.mp3".to_string()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            stt: SttConfig::default(),
            llm: LlmConfig::default(),
            tts: TtsConfig::default(),
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            base_url: default_stt_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_tts_endpoint(),
            voice_id: default_tts_voice(),
            format: default_tts_format(),
            volume: default_tts_volume(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            audio_path: default_fallback_audio_path(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// API keys for the remote providers, read from the environment at startup.
///
/// A missing key is not fatal: the affected client is simply not constructed
/// and every chat request short-circuits to the fallback response.
#[derive(Clone)]
pub struct ProviderKeys {
    pub assemblyai: Option<String>,
    pub gemini: Option<String>,
    pub murf: Option<String>,
}

impl std::fmt::Debug for ProviderKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redacted(key: &Option<String>) -> &'static str {
            if key.is_some() {
                "[REDACTED]"
            } else {
                "<unset>"
            }
        }

        f.debug_struct("ProviderKeys")
            .field("assemblyai", &redacted(&self.assemblyai))
            .field("gemini", &redacted(&self.gemini))
            .field("murf", &redacted(&self.murf))
            .finish()
    }
}

impl ProviderKeys {
    pub fn from_env() -> Self {
        Self {
            assemblyai: read_key("ASSEMBLYAI_API_KEY"),
            gemini: read_key("GEMINI_API_KEY"),
            murf: read_key("MURF_API_KEY"),
        }
    }
}

fn read_key(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
