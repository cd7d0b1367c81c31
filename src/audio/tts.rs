//! Speech synthesis over provider HTTP APIs

use crate::config::{AudioConfig, TtsProvider};
use crate::{Error, Result};

/// Synthesizes announcement speech via a hosted TTS provider
pub struct SpeechSynth {
    client: reqwest::Client,
    provider: TtsProvider,
    api_key: String,
    model: String,
    voice: String,
    speed: f32,
}

impl SpeechSynth {
    /// Build a synthesizer from the audio configuration.
    ///
    /// Returns `Ok(None)` when the provider is [`TtsProvider::Off`].
    /// API keys come from the environment only (`OPENAI_API_KEY` /
    /// `ELEVENLABS_API_KEY`), never from the config file.
    ///
    /// # Errors
    ///
    /// Returns an error when the selected provider's API key is missing.
    pub fn from_config(audio: &AudioConfig) -> Result<Option<Self>> {
        let key_var = match audio.provider {
            TtsProvider::Off => return Ok(None),
            TtsProvider::OpenAI => "OPENAI_API_KEY",
            TtsProvider::ElevenLabs => "ELEVENLABS_API_KEY",
        };

        let api_key = std::env::var(key_var)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config(format!("{key_var} required for TTS")))?;

        Ok(Some(Self {
            client: reqwest::Client::new(),
            provider: audio.provider,
            api_key,
            model: audio.model.clone(),
            voice: audio.voice.clone(),
            speed: audio.speed,
        }))
    }

    /// Synthesize `text` to MP3 bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider request fails or replies with a
    /// non-success status.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        match self.provider {
            TtsProvider::OpenAI => self.synthesize_openai(text).await,
            TtsProvider::ElevenLabs => self.synthesize_elevenlabs(text).await,
            TtsProvider::Off => unreachable!("Off never constructs a SpeechSynth"),
        }
    }

    async fn synthesize_openai(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&SpeechRequest {
                model: &self.model,
                input: text,
                voice: &self.voice,
                speed: self.speed,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn synthesize_elevenlabs(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!("https://api.elevenlabs.io/v1/text-to-speech/{}", self.voice);

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&SpeechRequest {
                text,
                model_id: &self.model,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_off_builds_nothing() {
        let audio = AudioConfig {
            provider: TtsProvider::Off,
            ..AudioConfig::default()
        };
        assert!(SpeechSynth::from_config(&audio).expect("off is not an error").is_none());
    }
}
