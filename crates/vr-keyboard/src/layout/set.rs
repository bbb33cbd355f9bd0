//! Selectable layout variants.

use super::Layout;

/// The layout variants a keyboard can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyboardVariant {
    /// Alphabetic layout.
    #[default]
    Main,
    /// First symbols page.
    Symbols1,
    /// Second symbols page.
    Symbols2,
}

/// The layouts of one keyboard, one per variant.
#[derive(Debug, Clone)]
pub struct LayoutSet {
    main: Layout,
    symbols1: Option<Layout>,
    symbols2: Option<Layout>,
}

impl LayoutSet {
    /// Creates a set with only the main layout.
    pub fn new(main: Layout) -> Self {
        Self {
            main,
            symbols1: None,
            symbols2: None,
        }
    }

    /// Adds the two symbol pages.
    pub fn with_symbols(mut self, symbols1: Layout, symbols2: Layout) -> Self {
        self.symbols1 = Some(symbols1);
        self.symbols2 = Some(symbols2);
        self
    }

    /// The alphabetic layout.
    pub fn main(&self) -> &Layout {
        &self.main
    }

    /// The layout for a variant, if the set has one.
    pub fn get(&self, variant: KeyboardVariant) -> Option<&Layout> {
        match variant {
            KeyboardVariant::Main => Some(&self.main),
            KeyboardVariant::Symbols1 => self.symbols1.as_ref(),
            KeyboardVariant::Symbols2 => self.symbols2.as_ref(),
        }
    }

    /// Mutable access to the layout for a variant.
    pub fn get_mut(&mut self, variant: KeyboardVariant) -> Option<&mut Layout> {
        match variant {
            KeyboardVariant::Main => Some(&mut self.main),
            KeyboardVariant::Symbols1 => self.symbols1.as_mut(),
            KeyboardVariant::Symbols2 => self.symbols2.as_mut(),
        }
    }
}
