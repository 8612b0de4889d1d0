//! Advertisement prompt construction.
//!
//! Builds one text-generation prompt per tone from a product request and hands it to
//! an external [`Completer`]. The completer is opaque: given a prompt and a token
//! budget it returns completion text. Nothing here performs I/O on its own.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{BanditError, Result};

/// Minimum number of keywords an ad request must carry.
pub const MIN_KEYWORDS: usize = 3;
/// Maximum number of keywords an ad request may carry.
pub const MAX_KEYWORDS: usize = 20;

/// Advertisement tone (one bandit arm per tone).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Tone {
    Persuasive,
    Exciting,
    Funny,
    Informative,
    Authoritative,
    Urgent,
}

impl Tone {
    /// Tones offered side by side to the user.
    pub const DEFAULT_SET: [Tone; 3] = [Tone::Persuasive, Tone::Exciting, Tone::Funny];

    pub const ALL: [Tone; 6] = [
        Tone::Persuasive,
        Tone::Exciting,
        Tone::Funny,
        Tone::Informative,
        Tone::Authoritative,
        Tone::Urgent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Persuasive => "persuasive",
            Tone::Exciting => "exciting",
            Tone::Funny => "funny",
            Tone::Informative => "informative",
            Tone::Authoritative => "authoritative",
            Tone::Urgent => "urgent",
        }
    }

    /// Sentence steering the generator toward this tone.
    fn directive(self, product: &str) -> String {
        match self {
            Tone::Persuasive => {
                "Make it persuasive for the reader to get the want of immediately purchasing it."
                    .to_string()
            }
            Tone::Exciting => format!(
                "Make it exciting for the reader to get excited about the {product} and get the \
                 want of immediately purchasing it."
            ),
            Tone::Funny => format!(
                "Make it slightly funny for the reader to get in a good mood and positively \
                 remember the {product}."
            ),
            other => format!("The tone should be {other}."),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = BanditError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            // "excited" was used interchangeably with "exciting".
            "excited" => Ok(Tone::Exciting),
            _ => Tone::ALL
                .into_iter()
                .find(|t| t.as_str() == s)
                .ok_or_else(|| BanditError::precondition(format!("unknown tone {s:?}"))),
        }
    }
}

/// Requested ad length; drives the completion token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AdLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl AdLength {
    pub fn max_tokens(self) -> u32 {
        match self {
            AdLength::Short => 240,
            AdLength::Medium => 480,
            AdLength::Long => 720,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdLength::Short => "short",
            AdLength::Medium => "medium",
            AdLength::Long => "long",
        }
    }

    /// Lenient parse: anything other than `short` or `long` is `Medium`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => AdLength::Short,
            "long" => AdLength::Long,
            _ => AdLength::Medium,
        }
    }
}

impl fmt::Display for AdLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a comma-separated keyword list, trimming blanks and dropping empties.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// What the user asked an ad for.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdRequest {
    pub product: String,
    pub keywords: Vec<String>,
    pub length: AdLength,
    pub organization: Option<String>,
}

impl AdRequest {
    pub fn new(product: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            product: product.into(),
            keywords,
            length: AdLength::default(),
            organization: None,
        }
    }

    pub fn with_length(mut self, length: AdLength) -> Self {
        self.length = length;
        self
    }

    /// Blank organization names are treated as absent.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        let org = organization.into();
        self.organization = if org.trim().is_empty() {
            None
        } else {
            Some(org)
        };
        self
    }

    /// Product must be non-blank and keywords within `MIN_KEYWORDS..=MAX_KEYWORDS`.
    pub fn validate(&self) -> Result<()> {
        if self.product.trim().is_empty() {
            return Err(BanditError::precondition("product name is empty"));
        }
        let n = self.keywords.len();
        if !(MIN_KEYWORDS..=MAX_KEYWORDS).contains(&n) {
            return Err(BanditError::precondition(format!(
                "expected {MIN_KEYWORDS} to {MAX_KEYWORDS} keywords, got {n}"
            )));
        }
        Ok(())
    }
}

/// Prompt text for one tone.
pub fn build_prompt(req: &AdRequest, tone: Tone) -> String {
    let mut prompt = format!(
        "Generate an advertisement prompt for {}. {} Keywords to include are {}. \
         The length should be {}.",
        req.product,
        tone.directive(&req.product),
        req.keywords.join(", "),
        req.length
    );
    if let Some(org) = &req.organization {
        prompt.push_str(&format!(" This advertisement is for {org}."));
    }
    prompt
}

/// External text-generation collaborator.
pub trait Completer {
    /// Complete `prompt` using at most `max_tokens` tokens.
    fn complete(&mut self, prompt: &str, max_tokens: u32) -> Result<String>;
}

impl<F> Completer for F
where
    F: FnMut(&str, u32) -> Result<String>,
{
    fn complete(&mut self, prompt: &str, max_tokens: u32) -> Result<String> {
        self(prompt, max_tokens)
    }
}

/// One generated ad, tagged with the tone that produced it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdCandidate {
    pub tone: Tone,
    pub prompt: String,
    pub text: String,
}

/// Generate one candidate per tone, in the order given.
///
/// Validates the request first. Completion text is trimmed. The first completer
/// failure aborts generation.
pub fn generate_candidates<C: Completer + ?Sized>(
    req: &AdRequest,
    tones: &[Tone],
    completer: &mut C,
) -> Result<Vec<AdCandidate>> {
    req.validate()?;
    let max_tokens = req.length.max_tokens();
    let mut out = Vec::with_capacity(tones.len());
    for &tone in tones {
        let prompt = build_prompt(req, tone);
        let text = completer.complete(&prompt, max_tokens).map_err(|e| match e {
            BanditError::Completion(_) => e,
            other => BanditError::Completion(other.to_string()),
        })?;
        tracing::debug!(
            %tone,
            max_tokens,
            bytes = text.len(),
            "generated ad candidate"
        );
        out.push(AdCandidate {
            tone,
            prompt,
            text: text.trim().to_string(),
        });
    }
    Ok(out)
}

/// `tones` in a presentation order drawn from `rng`.
///
/// The same generator state always yields the same order.
pub fn shuffled_tones<R: Rng + ?Sized>(tones: &[Tone], rng: &mut R) -> Vec<Tone> {
    let mut order = tones.to_vec();
    order.shuffle(rng);
    order
}

/// [`generate_candidates`] over `tones` in the order [`shuffled_tones`] draws.
///
/// An invalid request is rejected before `rng` is touched.
pub fn generate_shuffled_candidates<C, R>(
    req: &AdRequest,
    tones: &[Tone],
    completer: &mut C,
    rng: &mut R,
) -> Result<Vec<AdCandidate>>
where
    C: Completer + ?Sized,
    R: Rng + ?Sized,
{
    req.validate()?;
    let order = shuffled_tones(tones, rng);
    tracing::debug!(?order, "presentation order");
    generate_candidates(req, &order, completer)
}
