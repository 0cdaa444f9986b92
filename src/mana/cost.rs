//! Colors, mana types and mana costs.
//!
//! A cost is stored as counts: generic, one count per color, and specific
//! colorless (`{C}`). [`ManaCost::symbols`] expands it into one
//! [`ManaSymbol`] per unit of mana, most constrained first, which is the
//! shape the solver matches against.

use serde::{Deserialize, Serialize};

/// The five colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [Color::White, Color::Blue, Color::Black, Color::Red, Color::Green];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    #[must_use]
    pub fn from_symbol(c: char) -> Option<Color> {
        Color::ALL.into_iter().find(|color| color.symbol() == c)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Color::White => "white",
            Color::Blue => "blue",
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
        };
        write!(f, "{name}")
    }
}

/// A set of colors, stored as five bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColorSet(u8);

impl ColorSet {
    pub const COLORLESS: ColorSet = ColorSet(0);

    #[must_use]
    pub fn of(colors: &[Color]) -> Self {
        colors.iter().copied().collect()
    }

    #[must_use]
    pub const fn single(color: Color) -> Self {
        ColorSet(1 << color.index())
    }

    #[must_use]
    pub const fn contains(self, color: Color) -> bool {
        self.0 & (1 << color.index()) != 0
    }

    pub fn insert(&mut self, color: Color) {
        self.0 |= 1 << color.index();
    }

    #[must_use]
    pub const fn union(self, other: ColorSet) -> ColorSet {
        ColorSet(self.0 | other.0)
    }

    #[must_use]
    pub const fn intersects(self, other: ColorSet) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn iter(self) -> impl Iterator<Item = Color> {
        Color::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        let mut set = ColorSet::default();
        for color in iter {
            set.insert(color);
        }
        set
    }
}

/// A kind of mana that can sit in a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ManaType {
    Colored(Color),
    Colorless,
}

impl ManaType {
    pub const ALL: [ManaType; 6] = [
        ManaType::Colored(Color::White),
        ManaType::Colored(Color::Blue),
        ManaType::Colored(Color::Black),
        ManaType::Colored(Color::Red),
        ManaType::Colored(Color::Green),
        ManaType::Colorless,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            ManaType::Colored(c) => c.index(),
            ManaType::Colorless => 5,
        }
    }
}

impl std::fmt::Display for ManaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManaType::Colored(c) => write!(f, "{{{}}}", c.symbol()),
            ManaType::Colorless => write!(f, "{{C}}"),
        }
    }
}

/// One unit of a cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ManaSymbol {
    /// Must be paid with mana of this color.
    Colored(Color),
    /// Must be paid with colorless mana (`{C}`).
    Colorless,
    /// Any mana.
    Generic,
}

impl ManaSymbol {
    /// Whether a unit of `mana` can pay this symbol.
    #[must_use]
    pub fn accepts(self, mana: ManaType) -> bool {
        match self {
            ManaSymbol::Colored(c) => mana == ManaType::Colored(c),
            ManaSymbol::Colorless => mana == ManaType::Colorless,
            ManaSymbol::Generic => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManaCostParseError {
    #[error("unterminated symbol in {0:?}")]
    Unterminated(String),

    #[error("unknown mana symbol {{{0}}}")]
    UnknownSymbol(String),
}

/// A mana cost.
///
/// ```
/// use ccg_kernel::mana::{Color, ManaCost};
///
/// let cost = ManaCost::parse("{2}{R}{R}").unwrap();
/// assert_eq!(cost.generic, 2);
/// assert_eq!(cost.colored_count(Color::Red), 2);
/// assert_eq!(cost.mana_value(), 4);
/// assert_eq!(cost.to_string(), "{2}{R}{R}");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u32,
    /// Indexed by `Color::index`.
    pub colored: [u32; 5],
    /// Specific colorless (`{C}`).
    pub colorless: u32,
}

impl ManaCost {
    pub const FREE: ManaCost = ManaCost { generic: 0, colored: [0; 5], colorless: 0 };

    #[must_use]
    pub fn generic(amount: u32) -> Self {
        Self { generic: amount, ..Self::FREE }
    }

    #[must_use]
    pub fn with_colored(mut self, color: Color, amount: u32) -> Self {
        self.colored[color.index()] += amount;
        self
    }

    #[must_use]
    pub fn with_colorless(mut self, amount: u32) -> Self {
        self.colorless += amount;
        self
    }

    /// Parse `{N}`, `{W}`, `{U}`, `{B}`, `{R}`, `{G}` and `{C}` symbols.
    pub fn parse(text: &str) -> Result<Self, ManaCostParseError> {
        let mut cost = ManaCost::FREE;
        let mut rest = text.trim();
        while !rest.is_empty() {
            let Some(body) = rest.strip_prefix('{') else {
                return Err(ManaCostParseError::Unterminated(text.to_string()));
            };
            let Some(end) = body.find('}') else {
                return Err(ManaCostParseError::Unterminated(text.to_string()));
            };
            let symbol = &body[..end];
            if let Ok(n) = symbol.parse::<u32>() {
                cost.generic += n;
            } else if symbol == "C" {
                cost.colorless += 1;
            } else {
                let mut chars = symbol.chars();
                match (chars.next().and_then(Color::from_symbol), chars.next()) {
                    (Some(color), None) => cost.colored[color.index()] += 1,
                    _ => return Err(ManaCostParseError::UnknownSymbol(symbol.to_string())),
                }
            }
            rest = &body[end + 1..];
        }
        Ok(cost)
    }

    #[must_use]
    pub fn colored_count(&self, color: Color) -> u32 {
        self.colored[color.index()]
    }

    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.generic + self.colorless + self.colored.iter().sum::<u32>()
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.mana_value() == 0
    }

    /// Colors of the cost's colored symbols.
    #[must_use]
    pub fn colors(&self) -> ColorSet {
        Color::ALL.into_iter().filter(|c| self.colored_count(*c) > 0).collect()
    }

    /// One symbol per unit: colored first, then `{C}`, then generic.
    #[must_use]
    pub fn symbols(&self) -> Vec<ManaSymbol> {
        let mut out = Vec::with_capacity(self.mana_value() as usize);
        for color in Color::ALL {
            out.extend(std::iter::repeat(ManaSymbol::Colored(color)).take(self.colored_count(color) as usize));
        }
        out.extend(std::iter::repeat(ManaSymbol::Colorless).take(self.colorless as usize));
        out.extend(std::iter::repeat(ManaSymbol::Generic).take(self.generic as usize));
        out
    }
}

impl std::fmt::Display for ManaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_free() {
            return write!(f, "{{0}}");
        }
        if self.generic > 0 {
            write!(f, "{{{}}}", self.generic)?;
        }
        for _ in 0..self.colorless {
            write!(f, "{{C}}")?;
        }
        for color in Color::ALL {
            for _ in 0..self.colored_count(color) {
                write!(f, "{{{}}}", color.symbol())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed() {
        let cost = ManaCost::parse("{3}{W}{U}{C}").unwrap();
        assert_eq!(cost.generic, 3);
        assert_eq!(cost.colored_count(Color::White), 1);
        assert_eq!(cost.colored_count(Color::Blue), 1);
        assert_eq!(cost.colorless, 1);
        assert_eq!(cost.mana_value(), 6);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(ManaCost::parse("{X}"), Err(ManaCostParseError::UnknownSymbol(_))));
        assert!(matches!(ManaCost::parse("{2"), Err(ManaCostParseError::Unterminated(_))));
        assert!(matches!(ManaCost::parse("2R"), Err(ManaCostParseError::Unterminated(_))));
    }

    #[test]
    fn test_empty_is_free() {
        let cost = ManaCost::parse("").unwrap();
        assert!(cost.is_free());
        assert_eq!(cost.to_string(), "{0}");
    }

    #[test]
    fn test_symbols_most_constrained_first() {
        let cost = ManaCost::generic(2).with_colored(Color::Green, 1).with_colorless(1);
        assert_eq!(
            cost.symbols(),
            vec![ManaSymbol::Colored(Color::Green), ManaSymbol::Colorless, ManaSymbol::Generic, ManaSymbol::Generic]
        );
    }

    #[test]
    fn test_colors_of_cost() {
        let cost = ManaCost::parse("{1}{B}{R}").unwrap();
        let colors = cost.colors();
        assert!(colors.contains(Color::Black));
        assert!(colors.contains(Color::Red));
        assert_eq!(colors.len(), 2);
    }

    #[test]
    fn test_symbol_accepts() {
        assert!(ManaSymbol::Generic.accepts(ManaType::Colorless));
        assert!(ManaSymbol::Colored(Color::Red).accepts(ManaType::Colored(Color::Red)));
        assert!(!ManaSymbol::Colored(Color::Red).accepts(ManaType::Colored(Color::Green)));
        assert!(!ManaSymbol::Colorless.accepts(ManaType::Colored(Color::White)));
    }

    #[test]
    fn test_color_set_ops() {
        let mut set = ColorSet::single(Color::Blue);
        set.insert(Color::Black);
        assert!(set.intersects(ColorSet::single(Color::Black)));
        assert!(!set.intersects(ColorSet::single(Color::Red)));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Color::Blue, Color::Black]);
        assert!(ColorSet::COLORLESS.is_empty());
    }
}
