// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Poker cards definitions.
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A Poker card as seen by the camera.
///
/// A card is a rank and a suit, either of which can be [Rank::Unknown] or
/// [Suit::Unknown] when the recognizer could not match it with enough
/// confidence. Cards compare by suit first and then by rank, this order is
/// only used to display cards in a stable order.
#[derive(Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card {
    // Field order defines the derived ordering.
    suit: Suit,
    rank: Rank,
}

impl Card {
    /// A card with unknown rank and suit.
    pub const UNKNOWN: Card = Card {
        suit: Suit::Unknown,
        rank: Rank::Unknown,
    };

    /// Create a card given a rank and a suit.
    pub const fn new(rank: Rank, suit: Suit) -> Card {
        Card { suit, rank }
    }

    /// Returns the card suit.
    pub fn suit(&self) -> Suit {
        self.suit
    }

    /// Returns the card rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Checks if either the rank or the suit of this card is unknown.
    pub fn is_unknown(&self) -> bool {
        self.rank == Rank::Unknown || self.suit == Suit::Unknown
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Card({}{})", self.rank, self.suit)
    }
}

/// Error returned when parsing a card from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCardError(String);

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid card '{}'", self.0)
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parses a two characters card like `KD`, `TS` or `??`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let err = || ParseCardError(text.to_string());

        let mut chars = text.chars();
        let (Some(r), Some(s), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(err());
        };

        let rank = Rank::from_char(r).ok_or_else(err)?;
        let suit = Suit::from_char(s).ok_or_else(err)?;
        Ok(Card::new(rank, suit))
    }
}

/// Card rank.
///
/// Ranks are ordered by their poker value with [Rank::Unknown] before all the
/// known ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    /// The rank could not be recognized.
    Unknown = 0,
    /// Deuce
    Deuce = 2,
    /// Trey
    Trey,
    /// Four
    Four,
    /// Five
    Five,
    /// Six
    Six,
    /// Seven
    Seven,
    /// Eight
    Eight,
    /// Nine
    Nine,
    /// Ten
    Ten,
    /// Jack
    Jack,
    /// Queen
    Queen,
    /// King
    King,
    /// Ace
    Ace,
}

impl Rank {
    /// Returns all known ranks.
    pub fn ranks() -> impl DoubleEndedIterator<Item = Rank> {
        use Rank::*;
        [
            Deuce, Trey, Four, Five, Six, Seven, Eight, Nine, Ten, Jack, Queen, King, Ace,
        ]
        .into_iter()
    }

    /// The rank value used for straights, deuce is 2 and ace is 14.
    ///
    /// Returns `None` for an unknown rank.
    pub fn value(&self) -> Option<u8> {
        match self {
            Rank::Unknown => None,
            rank => Some(*rank as u8),
        }
    }

    /// The lowercase rank name, as used for reference images file names.
    pub fn name(&self) -> &'static str {
        match self {
            Rank::Unknown => "unknown",
            Rank::Deuce => "two",
            Rank::Trey => "three",
            Rank::Four => "four",
            Rank::Five => "five",
            Rank::Six => "six",
            Rank::Seven => "seven",
            Rank::Eight => "eight",
            Rank::Nine => "nine",
            Rank::Ten => "ten",
            Rank::Jack => "jack",
            Rank::Queen => "queen",
            Rank::King => "king",
            Rank::Ace => "ace",
        }
    }

    fn from_char(c: char) -> Option<Rank> {
        let rank = match c.to_ascii_uppercase() {
            '2' => Rank::Deuce,
            '3' => Rank::Trey,
            '4' => Rank::Four,
            '5' => Rank::Five,
            '6' => Rank::Six,
            '7' => Rank::Seven,
            '8' => Rank::Eight,
            '9' => Rank::Nine,
            'T' => Rank::Ten,
            'J' => Rank::Jack,
            'Q' => Rank::Queen,
            'K' => Rank::King,
            'A' => Rank::Ace,
            '?' => Rank::Unknown,
            _ => return None,
        };

        Some(rank)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = match self {
            Rank::Unknown => '?',
            Rank::Deuce => '2',
            Rank::Trey => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        };

        write!(f, "{rank}")
    }
}

/// Card suit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    /// The suit could not be recognized.
    Unknown,
    /// Clubs suit.
    Clubs,
    /// Diamonds suit.
    Diamonds,
    /// Hearts suit.
    Hearts,
    /// Spades suit.
    Spades,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suit = match self {
            Suit::Unknown => '?',
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
        };

        write!(f, "{suit}")
    }
}

impl Suit {
    /// Returns all known suits.
    pub fn suits() -> impl DoubleEndedIterator<Item = Suit> {
        [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades].into_iter()
    }

    /// The lowercase suit name, as used for reference images file names.
    pub fn name(&self) -> &'static str {
        match self {
            Suit::Unknown => "unknown",
            Suit::Clubs => "clubs",
            Suit::Diamonds => "diamonds",
            Suit::Hearts => "hearts",
            Suit::Spades => "spades",
        }
    }

    fn from_char(c: char) -> Option<Suit> {
        let suit = match c.to_ascii_uppercase() {
            'C' => Suit::Clubs,
            'D' => Suit::Diamonds,
            'H' => Suit::Hearts,
            'S' => Suit::Spades,
            '?' => Suit::Unknown,
            _ => return None,
        };

        Some(suit)
    }
}

/// The standard 52 cards deck.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The number of cards in the deck.
    pub const SIZE: usize = 52;

    /// Number of cards in the deck.
    pub fn count(&self) -> usize {
        self.cards.len()
    }

    /// Calls the `f` closure for each k-cards hand.
    ///
    /// Panics if k is not 1 <= k <= 7.
    pub fn for_each<F>(&self, k: usize, mut f: F)
    where
        F: FnMut(&[Card]),
    {
        assert!((1..=7).contains(&k), "1 <= k <= 7");

        if k > self.cards.len() {
            return;
        }

        let mut hand = Vec::with_capacity(k);
        self.visit(0, k, &mut hand, &mut f);
    }

    fn visit<F>(&self, start: usize, k: usize, hand: &mut Vec<Card>, f: &mut F)
    where
        F: FnMut(&[Card]),
    {
        if hand.len() == k {
            f(hand);
            return;
        }

        // Leave enough cards to complete the hand.
        let last = self.cards.len() - (k - hand.len());
        for idx in start..=last {
            hand.push(self.cards[idx]);
            self.visit(idx + 1, k, hand, f);
            hand.pop();
        }
    }
}

impl Default for Deck {
    fn default() -> Self {
        let cards = Suit::suits()
            .flat_map(|s| Rank::ranks().map(move |r| Card::new(r, s)))
            .collect::<Vec<_>>();
        Self { cards }
    }
}

impl IntoIterator for Deck {
    type Item = Card;
    type IntoIter = std::vec::IntoIter<Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::HashSet;

    #[test]
    fn card_to_string() {
        let c = Card::new(Rank::King, Suit::Diamonds);
        assert_eq!(c.to_string(), "KD");

        let c = Card::new(Rank::Five, Suit::Spades);
        assert_eq!(c.to_string(), "5S");

        let c = Card::new(Rank::Ten, Suit::Hearts);
        assert_eq!(c.to_string(), "TH");

        let c = Card::new(Rank::Ace, Suit::Unknown);
        assert_eq!(c.to_string(), "A?");

        assert_eq!(Card::UNKNOWN.to_string(), "??");
    }

    #[test]
    fn card_from_string() {
        assert_eq!("KD".parse(), Ok(Card::new(Rank::King, Suit::Diamonds)));
        assert_eq!("ts".parse(), Ok(Card::new(Rank::Ten, Suit::Spades)));
        assert_eq!("??".parse(), Ok(Card::UNKNOWN));
        assert!("1S".parse::<Card>().is_err());
        assert!("KDX".parse::<Card>().is_err());
        assert!("K".parse::<Card>().is_err());

        for card in Deck::default() {
            assert_eq!(card.to_string().parse(), Ok(card));
        }
    }

    #[test]
    fn card_unknown() {
        assert!(Card::UNKNOWN.is_unknown());
        assert!(Card::new(Rank::Unknown, Suit::Hearts).is_unknown());
        assert!(Card::new(Rank::Ace, Suit::Unknown).is_unknown());
        assert!(!Card::new(Rank::Ace, Suit::Hearts).is_unknown());
    }

    #[test]
    fn card_ordering_is_suit_then_rank() {
        let mut cards = vec![
            Card::new(Rank::Deuce, Suit::Spades),
            Card::new(Rank::Ace, Suit::Clubs),
            Card::new(Rank::Deuce, Suit::Clubs),
            Card::new(Rank::King, Suit::Hearts),
        ];
        cards.sort();

        let sorted = cards.iter().map(Card::to_string).collect::<Vec<_>>();
        assert_eq!(sorted, ["2C", "AC", "KH", "2S"]);
    }

    #[test]
    fn rank_values() {
        assert_eq!(Rank::Unknown.value(), None);
        assert_eq!(Rank::Deuce.value(), Some(2));
        assert_eq!(Rank::Ten.value(), Some(10));
        assert_eq!(Rank::Ace.value(), Some(14));

        let values = Rank::ranks().filter_map(|r| r.value()).collect::<Vec<_>>();
        assert_eq!(values, (2..=14).collect::<Vec<_>>());
    }

    #[test]
    fn deck_for_each() {
        let deck = Deck::default();
        assert_eq!(deck.count(), Deck::SIZE);

        let mut hands = HashSet::default();
        deck.for_each(2, |cards| {
            assert_eq!(cards.len(), 2);
            hands.insert(cards.to_owned());
        });
        assert_eq!(hands.len(), 1_326);

        hands.clear();
        deck.for_each(3, |cards| {
            assert_eq!(cards.len(), 3);
            hands.insert(cards.to_owned());
        });
        assert_eq!(hands.len(), 22_100);
    }
}
