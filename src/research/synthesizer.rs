use rand::rngs::StdRng;

use super::report::ReportSynthesizer;
use super::sources::SourceSynthesizer;
use super::types::{ResearchReport, ResearchSource};
use crate::error::SynthesisResult;

/// Content generation used by the phase sequencer.
///
/// The sequencer calls `discover_sources` once when the searching phase
/// begins and `compile_report` once before publishing completion. Either
/// error ends the run in the failed phase.
pub trait ResearchSynthesizer: Send + Sync {
    /// Produce the full source batch for a run, in reveal order.
    fn discover_sources(&self, topic: &str, rng: &mut StdRng)
        -> SynthesisResult<Vec<ResearchSource>>;

    /// Build the final report.
    fn compile_report(
        &self,
        topic: &str,
        sources: &[ResearchSource],
    ) -> SynthesisResult<ResearchReport>;
}

/// Template-driven synthesizer backed by [`SourceSynthesizer`] and
/// [`ReportSynthesizer`].
#[derive(Debug, Clone, Default)]
pub struct TemplateSynthesizer {
    sources: SourceSynthesizer,
    report: ReportSynthesizer,
}

impl TemplateSynthesizer {
    /// Create a synthesizer with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a synthesizer around a configured source generator
    pub fn with_sources(sources: SourceSynthesizer) -> Self {
        Self {
            sources,
            report: ReportSynthesizer::new(),
        }
    }
}

impl ResearchSynthesizer for TemplateSynthesizer {
    fn discover_sources(
        &self,
        topic: &str,
        rng: &mut StdRng,
    ) -> SynthesisResult<Vec<ResearchSource>> {
        Ok(self.sources.generate(topic, rng))
    }

    fn compile_report(
        &self,
        topic: &str,
        sources: &[ResearchSource],
    ) -> SynthesisResult<ResearchReport> {
        Ok(self.report.generate(topic, sources))
    }
}
