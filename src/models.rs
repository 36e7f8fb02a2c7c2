use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "Untitled Note";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub content: String,
}

impl Note {
    /// Title as shown in the note list; empty titles read as "Untitled Note".
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_title_displays_placeholder() {
        let note = Note::default();
        assert_eq!(note.display_title(), "Untitled Note");
        assert_eq!(note.title, "");
    }

    #[test]
    fn serializes_title_before_content() {
        let note = Note {
            title: "A".to_string(),
            content: "x".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&note).unwrap(),
            r#"{"title":"A","content":"x"}"#
        );
    }
}
