use std::fmt::Write;

use crate::statement::TITLE;

const HEADING_PREFIXES: [&str; 3] = ["Condition:", "Name:", "Claim type"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paragraph {
    Title(String),
    Heading(String),
    Body(String),
    Spacer,
}

/// Splits statement text into the paragraph sequence the PDF and Word
/// converters lay out: a title, then one paragraph per line.
pub fn paragraphs(text: &str, title: Option<&str>) -> Vec<Paragraph> {
    let mut out = vec![Paragraph::Title(title.unwrap_or(TITLE).to_string())];

    for line in text.split('\n') {
        let trimmed = line.trim();
        let paragraph = if trimmed.is_empty() {
            Paragraph::Spacer
        } else if HEADING_PREFIXES
            .iter()
            .any(|prefix| trimmed.starts_with(prefix))
        {
            Paragraph::Heading(trimmed.to_string())
        } else {
            Paragraph::Body(trimmed.to_string())
        };
        out.push(paragraph);
    }

    out
}

pub fn to_markdown(paragraphs: &[Paragraph]) -> String {
    let mut output = String::new();

    for paragraph in paragraphs {
        match paragraph {
            Paragraph::Title(text) => {
                let _ = writeln!(output, "# {text}");
            }
            Paragraph::Heading(text) => {
                let _ = writeln!(output, "**{text}**");
            }
            Paragraph::Body(text) => {
                let _ = writeln!(output, "{text}");
            }
            Paragraph::Spacer => {
                let _ = writeln!(output);
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_are_detected_by_prefix() {
        let text = "STATEMENT IN SUPPORT OF CLAIM\n\nName: Jane Doe\nClaim type / request: PTSD\n  Condition: Migraines  \n- Number of logged days: 2";
        let paras = paragraphs(text, None);
        assert_eq!(paras[0], Paragraph::Title(TITLE.to_string()));
        assert_eq!(paras[1], Paragraph::Body(TITLE.to_string()));
        assert_eq!(paras[2], Paragraph::Spacer);
        assert_eq!(paras[3], Paragraph::Heading("Name: Jane Doe".to_string()));
        assert_eq!(
            paras[4],
            Paragraph::Heading("Claim type / request: PTSD".to_string())
        );
        assert_eq!(paras[5], Paragraph::Heading("Condition: Migraines".to_string()));
        assert_eq!(
            paras[6],
            Paragraph::Body("- Number of logged days: 2".to_string())
        );
    }

    #[test]
    fn custom_title_replaces_default() {
        let paras = paragraphs("", Some("My Statement"));
        assert_eq!(
            paras,
            vec![Paragraph::Title("My Statement".to_string()), Paragraph::Spacer]
        );
    }

    #[test]
    fn markdown_bolds_headings() {
        let md = to_markdown(&paragraphs("Name: Jane\nplain", None));
        assert_eq!(md, "# STATEMENT IN SUPPORT OF CLAIM\n**Name: Jane**\nplain\n");
    }
}
