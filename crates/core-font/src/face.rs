//! Face identity and fallback chains.
//!
//! The delegated font engine is free to resolve a `Face` by family name plus
//! style however it likes (a system font cache, an embedded atlas, …); this
//! crate only needs enough of a handle to key the label-rendering glyph
//! cache and to pass to `bitmap`.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Face {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl Face {
    pub fn new(family: impl Into<String>) -> Self {
        Self { family: family.into(), bold: false, italic: false }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

/// An ordered fallback chain: `shape` tries the first face able to cover a
/// given codepoint, falling through the rest, matching how a text
/// symbolizer's `face-name` list is specified.
#[derive(Debug, Clone, Default)]
pub struct FaceSet {
    pub faces: Vec<Face>,
}

impl FaceSet {
    pub fn single(face: Face) -> Self {
        Self { faces: vec![face] }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}
