use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum Rank {
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ORDERED: [Rank; 9] = [
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            14 => Some(Rank::Ace),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn from_value_maps() {
        assert_eq!(Rank::from_value(11), Some(Rank::Jack));
        assert_eq!(Rank::from_value(5), None);
        assert_eq!(Rank::from_value(2), None);
    }

    #[test]
    fn display_matches_symbols() {
        assert_eq!(Rank::Queen.to_string(), "Q");
        assert_eq!(Rank::Ten.to_string(), "10");
    }

    #[test]
    fn ordered_covers_short_deck() {
        assert_eq!(Rank::ORDERED.len(), 9);
        assert_eq!(Rank::ORDERED[0], Rank::Six);
        assert_eq!(Rank::ORDERED[8], Rank::Ace);
    }
}
