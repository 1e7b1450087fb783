//! Fabricated source generation.
//!
//! Sources are drawn from fixed per-category template pools with the topic
//! substituted into the title. All randomness comes from the caller's RNG so a
//! seeded generator reproduces a batch exactly.

use std::ops::RangeInclusive;

use rand::Rng;
use tracing::debug;

use super::types::{PublishedDate, ResearchSource, SourceCategory};
use crate::error::{SynthesisError, SynthesisResult};

const TOPIC_PLACEHOLDER: &str = "{topic}";

const ACADEMIC_TITLES: &[&str] = &[
    "A Comprehensive Survey of {topic}: Methods and Applications",
    "{topic}: Theoretical Foundations and Practical Implementations",
    "Advances in {topic}: A Systematic Review",
    "Understanding {topic}: Analysis and Future Directions",
    "The Evolution of {topic} in Modern Systems",
];

const ACADEMIC_AUTHORS: &[&str] = &[
    "Smith, J. et al.",
    "Johnson, M. & Chen, L.",
    "Williams, R. et al.",
    "Brown, A. & Davis, K.",
    "Martinez, C. et al.",
];

const ACADEMIC_DESCRIPTIONS: &[&str] = &[
    "Peer-reviewed academic paper presenting novel research findings and theoretical framework.",
    "Published in a top-tier conference proceedings with rigorous peer review.",
    "Comprehensive literature review synthesizing decades of research.",
    "Empirical study with quantitative analysis and statistical validation.",
    "Theoretical analysis with mathematical proofs and formal verification.",
];

const INDUSTRY_TITLES: &[&str] = &[
    "Best Practices for Implementing {topic} at Scale",
    "{topic} in Production: Lessons Learned",
    "Enterprise Guide to {topic} Architecture",
    "Optimizing {topic} for Performance and Reliability",
    "Real-World {topic} Case Studies",
];

const INDUSTRY_AUTHORS: &[&str] = &[
    "Google Cloud Team",
    "AWS Technical Writers",
    "Microsoft Research",
    "Meta Engineering",
    "Netflix Tech Blog",
];

const INDUSTRY_DESCRIPTIONS: &[&str] = &[
    "Industry white paper detailing production implementation strategies.",
    "Technical blog post from leading technology company.",
    "Enterprise architecture guide with proven design patterns.",
    "Case study demonstrating successful large-scale deployment.",
    "Engineering insights from high-traffic production systems.",
];

const DOCUMENTATION_TITLES: &[&str] = &[
    "Official {topic} Documentation and Reference",
    "{topic} Technical Specification v2.0",
    "Complete Guide to {topic} APIs",
    "{topic} Design Patterns and Examples",
    "Getting Started with {topic}: Official Tutorial",
];

const DOCUMENTATION_AUTHORS: &[&str] = &[
    "Official Documentation Team",
    "Core Maintainers",
    "Technical Standards Committee",
    "Open Source Contributors",
    "Project Steering Group",
];

const DOCUMENTATION_DESCRIPTIONS: &[&str] = &[
    "Comprehensive official documentation with API references.",
    "Technical specification defining standard protocols and interfaces.",
    "Community-maintained guide with extensive code examples.",
    "Tutorial series covering fundamental concepts and advanced topics.",
    "Reference implementation with detailed architecture documentation.",
];

struct TemplatePool {
    titles: &'static [&'static str],
    authors: &'static [&'static str],
    descriptions: &'static [&'static str],
}

fn pool_for(category: SourceCategory) -> TemplatePool {
    match category {
        SourceCategory::Academic => TemplatePool {
            titles: ACADEMIC_TITLES,
            authors: ACADEMIC_AUTHORS,
            descriptions: ACADEMIC_DESCRIPTIONS,
        },
        SourceCategory::Industry => TemplatePool {
            titles: INDUSTRY_TITLES,
            authors: INDUSTRY_AUTHORS,
            descriptions: INDUSTRY_DESCRIPTIONS,
        },
        SourceCategory::Documentation => TemplatePool {
            titles: DOCUMENTATION_TITLES,
            authors: DOCUMENTATION_AUTHORS,
            descriptions: DOCUMENTATION_DESCRIPTIONS,
        },
    }
}

/// Uniform pick from a non-empty static pool.
fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &'static [&'static str]) -> &'static str {
    pool[rng.gen_range(0..pool.len())]
}

/// Lowercase URL-safe slug of a topic.
///
/// Runs of characters outside `[a-z0-9]` collapse to a single `-`. Falls back
/// to `research` when nothing survives.
pub fn topic_slug(topic: &str) -> String {
    let mut slug = String::with_capacity(topic.len());
    let mut pending_dash = false;
    for ch in topic.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "research".to_string()
    } else {
        slug
    }
}

/// Bounds for the random parts of a source batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisLimits {
    pub batch_size: RangeInclusive<usize>,
    pub years: RangeInclusive<u16>,
    pub credibility: RangeInclusive<u8>,
}

impl Default for SynthesisLimits {
    fn default() -> Self {
        Self {
            batch_size: 8..=12,
            years: 2023..=2025,
            credibility: 7..=10,
        }
    }
}

impl SynthesisLimits {
    /// Reject ranges that cannot produce a usable batch.
    pub fn validate(&self) -> SynthesisResult<()> {
        if self.batch_size.is_empty() || *self.batch_size.start() == 0 {
            return Err(SynthesisError::InvalidLimits {
                message: format!(
                    "batch size range {:?} must be non-empty and start at 1 or more",
                    self.batch_size
                ),
            });
        }
        if self.years.is_empty() {
            return Err(SynthesisError::InvalidLimits {
                message: format!("year range {:?} is empty", self.years),
            });
        }
        if self.credibility.is_empty() || *self.credibility.end() > 10 {
            return Err(SynthesisError::InvalidLimits {
                message: format!(
                    "credibility range {:?} must be non-empty and within 0-10",
                    self.credibility
                ),
            });
        }
        Ok(())
    }
}

/// Generates ranked batches of fabricated sources.
#[derive(Debug, Clone, Default)]
pub struct SourceSynthesizer {
    limits: SynthesisLimits,
}

impl SourceSynthesizer {
    /// Create a synthesizer with the default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a synthesizer with custom limits
    pub fn with_limits(limits: SynthesisLimits) -> SynthesisResult<Self> {
        limits.validate()?;
        Ok(Self { limits })
    }

    /// Limits in effect
    pub fn limits(&self) -> &SynthesisLimits {
        &self.limits
    }

    /// Generate a batch for `topic`, sorted by credibility descending.
    ///
    /// The sort is stable, so equal scores keep generation order.
    pub fn generate<R: Rng + ?Sized>(&self, topic: &str, rng: &mut R) -> Vec<ResearchSource> {
        let count = rng.gen_range(self.limits.batch_size.clone());
        let slug = topic_slug(topic);

        let mut sources: Vec<ResearchSource> = (0..count)
            .map(|index| self.generate_one(topic, &slug, index, rng))
            .collect();

        sources.sort_by(|a, b| b.credibility.cmp(&a.credibility));

        debug!(topic = %topic, count, "Generated source batch");
        sources
    }

    fn generate_one<R: Rng + ?Sized>(
        &self,
        topic: &str,
        slug: &str,
        index: usize,
        rng: &mut R,
    ) -> ResearchSource {
        let category = SourceCategory::ALL[index % SourceCategory::ALL.len()];
        let pool = pool_for(category);

        let title = pick(rng, pool.titles).replacen(TOPIC_PLACEHOLDER, topic, 1);
        let author = pick(rng, pool.authors).to_string();
        let description = pick(rng, pool.descriptions).to_string();
        let published = PublishedDate::new(
            rng.gen_range(self.limits.years.clone()),
            rng.gen_range(1..=12),
        );
        let credibility = rng.gen_range(self.limits.credibility.clone());
        let number = index + 1;

        let url = match category {
            SourceCategory::Academic => format!(
                "https://journals.example.edu/{}/{}/paper-{}",
                slug, published.year, number
            ),
            SourceCategory::Industry => {
                format!("https://engineering.example.com/blog/{}-part-{}", slug, number)
            }
            SourceCategory::Documentation => {
                format!("https://docs.example.dev/{}/guide-{}", slug, number)
            }
        };

        ResearchSource {
            id: format!("source-{}", number),
            title,
            author,
            published,
            category,
            url,
            description,
            credibility,
        }
    }
}
