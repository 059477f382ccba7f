//! An ordered collection of slides plus document properties.

use crate::slide::Slide;

/// A presentation deck
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deck {
    /// Presentation title (docProps/core.xml)
    pub title: Option<String>,

    /// Author recorded as creator
    pub author: Option<String>,

    /// All slides in the deck
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Create a new empty deck
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a deck with a title
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Add a slide, numbering it after the current last slide
    pub fn push(&mut self, mut slide: Slide) {
        slide.number = self.next_number();
        self.slides.push(slide);
    }

    /// Number the next pushed slide will get
    pub fn next_number(&self) -> u32 {
        self.slides.len() as u32 + 1
    }

    /// Get the number of slides
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Check if the deck is empty
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Slides whose title starts with `prefix`
    pub fn slides_titled<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Slide> + 'a {
        self.slides
            .iter()
            .filter(move |s| s.title.as_deref().is_some_and(|t| t.starts_with(prefix)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_renumbers() {
        let mut deck = Deck::with_title("Report").with_author("CSE");
        deck.push(Slide::title_slide(99, "Report", None));
        deck.push(Slide::content_slide(0, "Publications"));
        deck.push(Slide::content_slide(0, "Publications (continued)"));

        assert_eq!(deck.len(), 3);
        let numbers: Vec<u32> = deck.slides.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(deck.author.as_deref(), Some("CSE"));
    }

    #[test]
    fn test_slides_titled() {
        let mut deck = Deck::new();
        assert!(deck.is_empty());
        deck.push(Slide::content_slide(0, "Publications"));
        deck.push(Slide::content_slide(0, "Projects"));
        deck.push(Slide::content_slide(0, "Publications (continued)"));

        assert_eq!(deck.slides_titled("Publications").count(), 2);
        assert_eq!(deck.slides_titled("Workshops").count(), 0);
    }
}
