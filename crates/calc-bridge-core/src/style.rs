//! Cell formatting
//!
//! The bridge never inspects formatting; it only has to carry it through
//! freeze/unfreeze and sheet cloning untouched.

use ahash::AHashMap;

/// Formatting attached to a cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Style {
    /// Number format code (e.g., "0.00%")
    pub number_format: Option<String>,
    /// Bold font
    pub bold: bool,
    /// Italic font
    pub italic: bool,
    /// Background fill as RGB hex (e.g., "FFEE00")
    pub fill_color: Option<String>,
}

impl Style {
    /// Create a default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bold
    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set the number format
    pub fn number_format<S: Into<String>>(mut self, format: S) -> Self {
        self.number_format = Some(format.into());
        self
    }

    /// Set the background fill
    pub fn fill<S: Into<String>>(mut self, rgb: S) -> Self {
        self.fill_color = Some(rgb.into());
        self
    }
}

/// Deduplicating store of styles; cells reference styles by index
#[derive(Debug, Clone)]
pub struct StylePool {
    /// All unique styles (index 0 is default)
    styles: Vec<Style>,
    index_map: AHashMap<Style, u32>,
}

impl StylePool {
    /// Create a new pool with the default style at index 0
    pub fn new() -> Self {
        let mut index_map = AHashMap::new();
        index_map.insert(Style::default(), 0);
        Self {
            styles: vec![Style::default()],
            index_map,
        }
    }

    /// Get or create a style, returning its index
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        if let Some(&idx) = self.index_map.get(&style) {
            return idx;
        }
        let idx = self.styles.len() as u32;
        self.index_map.insert(style.clone(), idx);
        self.styles.push(style);
        idx
    }

    /// Get a style by index
    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// Number of unique styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// The pool always holds the default style
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}
