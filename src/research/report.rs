//! Templated report assembly.
//!
//! All prose is fixed. Only the topic and the source count vary, and the topic
//! is inserted verbatim. Callers rendering into markup must escape it.

use super::types::{ReportSection, ResearchReport, ResearchSource};

/// Section titles, in report order.
pub const SECTION_TITLES: [&str; 5] = [
    "Overview",
    "Technical Architecture",
    "Implementation Strategies",
    "Challenges and Solutions",
    "Future Outlook",
];

/// Builds the fixed-shape report for a completed run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportSynthesizer;

impl ReportSynthesizer {
    /// Create a new report synthesizer
    pub fn new() -> Self {
        Self
    }

    /// Assemble the report for `topic` from the final source batch.
    pub fn generate(&self, topic: &str, sources: &[ResearchSource]) -> ResearchReport {
        let count = sources.len();

        ResearchReport {
            title: format!("Technical Analysis: {}", topic),
            executive_summary: format!(
                "This comprehensive research report examines {topic}, synthesizing insights from {count} \
                 authoritative sources including academic publications, industry white papers, and technical \
                 documentation. The analysis reveals key trends, implementation strategies, and future \
                 directions in this rapidly evolving domain."
            ),
            key_findings: key_findings(topic),
            sections: sections(topic),
            recommendations: RECOMMENDATIONS.iter().map(|r| r.to_string()).collect(),
            conclusion: format!(
                "{topic} offers substantial benefits for organizations seeking to modernize their technical \
                 infrastructure. While implementation requires careful planning and sustained effort, the \
                 long-term advantages in terms of efficiency, scalability, and maintainability make it a \
                 worthwhile investment. Success depends on strong leadership support, adequate resource \
                 allocation, and commitment to continuous learning and improvement."
            ),
        }
    }
}

/// Findings after the first, which is the only one naming the topic.
const GENERAL_FINDINGS: [&str; 4] = [
    "Industry leaders have identified scalability and security as primary challenges requiring immediate attention",
    "Emerging best practices emphasize automation, observability, and integration with existing infrastructure",
    "Cost optimization and performance tuning remain critical factors for successful implementation",
    "The technology landscape is rapidly evolving with new tools and frameworks emerging quarterly",
];

const IMPLEMENTATION_STRATEGIES: &str = "Successful deployments follow a phased approach: initial \
    proof-of-concept, limited production rollout, and gradual scaling. Organizations should prioritize \
    security hardening, performance benchmarking, and comprehensive documentation. Integration with \
    existing systems requires careful planning and often benefits from incremental migration strategies.";

const CHALLENGES_AND_SOLUTIONS: &str = "Common challenges include complexity in initial setup, learning \
    curve for development teams, and integration with legacy systems. However, these can be mitigated \
    through comprehensive training programs, adoption of standardized tooling, and engagement with \
    community best practices. Many organizations find that early investment in automation pays \
    significant dividends.";

const RECOMMENDATIONS: [&str; 6] = [
    "Begin with a small-scale pilot project to validate approach and build team expertise",
    "Invest in comprehensive training and certification programs for technical staff",
    "Establish clear governance policies and security standards before broad deployment",
    "Implement robust monitoring and observability from the outset",
    "Engage with community resources and consider managed service options for initial deployments",
    "Plan for iterative improvement and regular reassessment of implementation strategies",
];

fn key_findings(topic: &str) -> Vec<String> {
    std::iter::once(format!(
        "Current state of {topic} demonstrates significant maturation with widespread adoption across \
         enterprise environments"
    ))
    .chain(GENERAL_FINDINGS.iter().map(|f| f.to_string()))
    .collect()
}

fn sections(topic: &str) -> Vec<ReportSection> {
    let bodies = [
        format!(
            "{topic} represents a significant advancement in modern technical infrastructure. Our research \
             indicates that organizations implementing these technologies report improved efficiency, reduced \
             operational overhead, and enhanced system reliability. The fundamental principles underlying this \
             approach have been validated through extensive real-world deployments across diverse use cases."
        ),
        format!(
            "The architectural patterns associated with {topic} emphasize modularity, scalability, and \
             resilience. Key components include distributed processing layers, intelligent orchestration \
             systems, and robust monitoring frameworks. Leading implementations leverage containerization, \
             microservices patterns, and declarative configuration management to achieve optimal results."
        ),
        IMPLEMENTATION_STRATEGIES.to_string(),
        CHALLENGES_AND_SOLUTIONS.to_string(),
        format!(
            "The future of {topic} appears promising, with continued innovation in automation, AI-assisted \
             optimization, and enhanced security features. Industry analysts predict continued growth in \
             adoption rates, particularly in cloud-native environments. Emerging trends suggest increased \
             focus on sustainability, cost efficiency, and developer experience improvements."
        ),
    ];

    SECTION_TITLES
        .iter()
        .zip(bodies)
        .map(|(title, body)| ReportSection::new(*title, body))
        .collect()
}
