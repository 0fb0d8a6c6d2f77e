// Disclosure Statement
// AI-assistance disclosure wording by content type and detection band

use crate::models::{ContentType, DisclosurePlacement, DisclosureStatement, DisclosureStyle};

const SUBSTANTIAL_THRESHOLD: f64 = 70.0;
const ASSISTED_THRESHOLD: f64 = 40.0;

fn style_for(content_type: ContentType) -> DisclosureStyle {
    match content_type {
        ContentType::Academic => DisclosureStyle::Academic,
        ContentType::Marketing => DisclosureStyle::Marketing,
        ContentType::Blog | ContentType::General => DisclosureStyle::Blog,
    }
}

fn statement_for(style: DisclosureStyle, probability: f64) -> &'static str {
    let substantial = probability > SUBSTANTIAL_THRESHOLD;
    let assisted = probability > ASSISTED_THRESHOLD;
    match style {
        DisclosureStyle::Blog if substantial => {
            "This article was created with substantial assistance from AI tools and was reviewed and edited by our team."
        }
        DisclosureStyle::Blog if assisted => {
            "This article was written with the assistance of AI tools and edited by a human author."
        }
        DisclosureStyle::Blog => "AI-powered editing tools were used to help polish this article.",
        DisclosureStyle::Academic if substantial => {
            "Portions of this work were generated with the assistance of AI language models. All content has been reviewed and verified by the author(s)."
        }
        DisclosureStyle::Academic if assisted => {
            "AI language tools were used to assist in drafting sections of this work. The author(s) take full responsibility for its content."
        }
        DisclosureStyle::Academic => {
            "AI-based tools were used for language editing and proofreading of this manuscript."
        }
        DisclosureStyle::Marketing if substantial => {
            "This content was created with AI assistance and reviewed by our team."
        }
        DisclosureStyle::Marketing if assisted => "Created with help from AI tools.",
        DisclosureStyle::Marketing => "Edited with the help of AI tools.",
    }
}

fn alternatives_for(style: DisclosureStyle) -> [&'static str; 2] {
    match style {
        DisclosureStyle::Blog => [
            "Some parts of this post were drafted with AI and edited by the author.",
            "Written with a little help from AI writing tools.",
        ],
        DisclosureStyle::Academic => [
            "The author(s) acknowledge the use of AI-assisted tools in preparing this manuscript.",
            "Generative AI was used during the writing process; the author(s) reviewed all output.",
        ],
        DisclosureStyle::Marketing => [
            "Powered in part by AI.",
            "Our team used AI tools to help create this content.",
        ],
    }
}

/// Build the disclosure for `content_type` given the AI probability (0-100).
pub fn generate_disclosure(content_type: ContentType, ai_probability: f64) -> DisclosureStatement {
    let style = style_for(content_type);
    let placement = if ai_probability > SUBSTANTIAL_THRESHOLD {
        DisclosurePlacement::Both
    } else if style == DisclosureStyle::Academic {
        DisclosurePlacement::Beginning
    } else {
        DisclosurePlacement::End
    };

    DisclosureStatement {
        statement: statement_for(style, ai_probability).to_string(),
        style,
        placement,
        alternatives: alternatives_for(style).iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_uses_blog_style() {
        let d = generate_disclosure(ContentType::General, 10.0);
        assert_eq!(d.style, DisclosureStyle::Blog);
        assert_eq!(d.placement, DisclosurePlacement::End);
        assert_eq!(d.alternatives.len(), 2);
    }

    #[test]
    fn test_placement() {
        assert_eq!(
            generate_disclosure(ContentType::Academic, 50.0).placement,
            DisclosurePlacement::Beginning
        );
        assert_eq!(
            generate_disclosure(ContentType::Academic, 70.5).placement,
            DisclosurePlacement::Both
        );
        assert_eq!(
            generate_disclosure(ContentType::Marketing, 70.0).placement,
            DisclosurePlacement::End
        );
    }

    #[test]
    fn test_wording_follows_band() {
        let high = generate_disclosure(ContentType::Blog, 90.0).statement;
        let mid = generate_disclosure(ContentType::Blog, 55.0).statement;
        let low = generate_disclosure(ContentType::Blog, 40.0).statement;
        assert!(high.contains("substantial"));
        assert!(mid.contains("assistance"));
        assert!(low.contains("editing tools"));
        assert_ne!(high, mid);
        assert_ne!(mid, low);
    }
}
