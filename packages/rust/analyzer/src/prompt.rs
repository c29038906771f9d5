//! Prompt construction for relevance analysis.

use scout_shared::{ExtractedContent, ProjectContext};

const SECTION_RULE: &str = "\n\n---\n\n";

/// Project spec then supplementary documents, each under its own heading.
pub fn render_context(context: &ProjectContext) -> String {
    let mut sections = vec![format!("## Project Specification\n\n{}", context.spec_text.trim())];
    sections.extend(
        context
            .supplementary_texts
            .iter()
            .map(|s| format!("## {}\n\n{}", s.kind.heading(), s.text.trim())),
    );
    sections.join(SECTION_RULE)
}

/// The single completion prompt for one (content, project) pair.
pub fn build_prompt(content: &ExtractedContent, context: &ProjectContext) -> String {
    format!(
        r#"You are a research analyst helping evaluate whether external content is relevant to a software project.

# Project Context
Project Name: {project}

{project_context}

# Content to Analyze
Title: {title}
Type: {content_type}
URL: {url}

Content:
{body}

# Your Task
Analyze how relevant this content is to the project above. Consider:
- Does it address problems the project is trying to solve?
- Does it describe techniques, patterns, or approaches applicable to the project?
- Does it contain insights that could improve the project's design or implementation?
- Does it cover related technologies or integrations mentioned in the project?

Respond with a JSON object in this exact format:
{{
  "relevance": "high" | "medium" | "low" | "none",
  "insights": [
    "Specific observation about how this content relates to the project"
  ],
  "suggestions": [
    "Specific actionable idea for the project based on this content"
  ]
}}

Guidelines for relevance levels:
- "high": Directly applicable to core project goals, describes similar systems, or offers immediately useful patterns
- "medium": Tangentially related, covers adjacent topics, or provides general practices that could help
- "low": Minimal connection to project goals
- "none": Unrelated to the project

Provide 2-4 insights and 1-3 suggestions. Be specific and reference both the content and project details.
Only output the JSON object, no other text."#,
        project = context.project_id,
        project_context = render_context(context),
        title = content.title,
        content_type = content.content_type,
        url = content.url,
        body = content.body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_shared::{ContentType, SupplementaryKind, SupplementaryText};

    fn context() -> ProjectContext {
        ProjectContext {
            project_id: "braindrive-lib".into(),
            spec_text: "Markdown project library.\n".into(),
            supplementary_texts: vec![
                SupplementaryText {
                    kind: SupplementaryKind::BuildPlan,
                    text: "Phase 1: logger".into(),
                },
                SupplementaryText {
                    kind: SupplementaryKind::Ideas,
                    text: "Voice capture".into(),
                },
            ],
        }
    }

    #[test]
    fn context_sections_in_order() {
        let rendered = render_context(&context());
        assert_eq!(
            rendered,
            "## Project Specification\n\nMarkdown project library.\n\n---\n\n## Build Plan\n\nPhase 1: logger\n\n---\n\n## Ideas\n\nVoice capture"
        );
    }

    #[test]
    fn prompt_carries_content_and_instructions() {
        let content = ExtractedContent {
            url: "https://example.com/some-article".into(),
            title: "Local AI".into(),
            body: "Body text here.".into(),
            content_type: ContentType::SocialPost,
        };
        let prompt = build_prompt(&content, &context());
        assert!(prompt.contains("Project Name: braindrive-lib"));
        assert!(prompt.contains("Type: social_post"));
        assert!(prompt.contains("URL: https://example.com/some-article"));
        assert!(prompt.contains("Body text here."));
        assert!(prompt.contains(r#""relevance": "high" | "medium" | "low" | "none""#));
        assert!(prompt.find("## Build Plan") < prompt.find("## Ideas"));
    }
}
