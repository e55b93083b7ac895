use {
	super::{saveImageBytes, Error, ImageGenerator, Request},
	base64::{engine::general_purpose::STANDARD, Engine as _},
	serde::{Deserialize, Serialize},
	std::io::ErrorKind,
	tracing::{debug, warn},
	ureq::Agent,
};

/// Base64 of a 4K PNG runs well past ureq's 10 MiB default.
const MAX_RESPONSE_BYTES: u64 = 128 * 1024 * 1024;

pub struct GeminiApi {
	url: String,
	apiKey: String,
}

#[derive(Serialize, Debug)]
pub struct GenerateContentRequest<'a> {
	pub contents: [Content<'a>; 1],
	pub generationConfig: GenerationConfig<'a>,
}

#[derive(Serialize, Debug)]
pub struct Content<'a> {
	pub parts: [TextPart<'a>; 1],
}

#[derive(Serialize, Debug)]
pub struct TextPart<'a> {
	pub text: &'a str,
}

#[derive(Serialize, Debug)]
pub struct GenerationConfig<'a> {
	pub responseModalities: [&'static str; 2],
	pub imageConfig: ImageConfig<'a>,
}

#[derive(Serialize, Debug)]
pub struct ImageConfig<'a> {
	pub imageSize: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub aspectRatio: Option<&'a str>,
}

#[derive(Deserialize, Debug, Default)]
pub struct GenerateContentResponse {
	#[serde(default)]
	pub candidates: Vec<Candidate>,
	pub promptFeedback: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
pub struct Candidate {
	pub content: Option<ResponseContent>,
	pub finishReason: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ResponseContent {
	#[serde(default)]
	pub parts: Vec<Part>,
}

#[derive(Deserialize, Debug)]
pub struct Part {
	pub text: Option<String>,
	pub inlineData: Option<Blob>,
}

#[derive(Deserialize, Debug)]
pub struct Blob {
	pub mimeType: String,
	pub data: String,
}

impl<'a> GenerateContentRequest<'a> {
	pub fn new(request: &'a Request) -> Self {
		GenerateContentRequest {
			contents: [Content { parts: [TextPart { text: &request.prompt }] }],
			generationConfig: GenerationConfig {
				responseModalities: ["TEXT", "IMAGE"],
				imageConfig: ImageConfig {
					imageSize: request.resolution.asStr(),
					aspectRatio: request.aspectRatio.as_deref(),
				},
			},
		}
	}
}

/// Bytes of the first inline image among the candidates' parts.
pub fn extractImage(response: &GenerateContentResponse) -> Result<Vec<u8>, Error> {
	let parts = || response.candidates.iter().filter_map(|c| c.content.as_ref()).flat_map(|c| c.parts.iter());
	if let Some(blob) = parts().find_map(|part| part.inlineData.as_ref()) {
		debug!(mimeType = %blob.mimeType, "inline image found");
		return Ok(STANDARD.decode(blob.data.trim())?);
	}
	let mut summary: Vec<String> = parts().filter_map(|part| part.text.clone()).collect();
	summary.extend(response.candidates.iter().filter_map(|c| c.finishReason.as_ref()).map(|r| format!("finishReason={r}")));
	if let Some(feedback) = &response.promptFeedback {
		summary.push(format!("promptFeedback={feedback}"));
	}
	if summary.is_empty() {
		summary.push("empty response".to_owned());
	}
	Err(Error::NoImage(summary.join("; ")))
}

impl GeminiApi {
	pub fn new(endpoint: &str, model: &str, apiKey: String) -> Self {
		GeminiApi { url: format!("{}/models/{model}:generateContent", endpoint.trim_end_matches('/')), apiKey }
	}

	pub fn url(&self) -> &str {
		&self.url
	}
}

fn transportError(err: ureq::Error, request: &Request) -> Error {
	match err {
		ureq::Error::Timeout(_) => Error::Timeout(request.timeout),
		ureq::Error::Io(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
			Error::Timeout(request.timeout)
		}
		err => Error::Transport(err.to_string()),
	}
}

impl ImageGenerator for GeminiApi {
	fn name(&self) -> &'static str {
		"gemini-api"
	}

	fn generate(&self, request: &Request) -> Result<(), Error> {
		let agent: Agent = Agent::config_builder()
			.timeout_global(Some(request.timeout))
			.http_status_as_error(false)
			.build()
			.into();
		debug!(url = %self.url, "POST generateContent");
		let mut response = agent
			.post(&self.url)
			.header("x-goog-api-key", &self.apiKey)
			.send_json(&GenerateContentRequest::new(request))
			.map_err(|err| transportError(err, request))?;
		let status = response.status();
		if !status.is_success() {
			let body = response.body_mut().read_to_string().unwrap_or_else(|err| {
				warn!("cannot read error body: {err}");
				String::new()
			});
			return Err(Error::Api { status: status.as_u16(), body });
		}
		let parsed: GenerateContentResponse = response
			.body_mut()
			.with_config()
			.limit(MAX_RESPONSE_BYTES)
			.read_json()
			.map_err(|err| transportError(err, request))?;
		saveImageBytes(&extractImage(&parsed)?, request)
	}
}
