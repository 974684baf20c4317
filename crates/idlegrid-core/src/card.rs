//! The card item and its deterministic content.
//!
//! Every field a card shows is a pure function of its 0-based index, so two
//! renderers with the same configuration produce identical grids.

/// Price increment per card, in yen.
pub const PRICE_STEP_YEN: u64 = 120;

/// Descriptive filler text. Long on purpose: it makes each card expensive
/// to lay out, which is what the idle scheduling is there to absorb.
pub const LONG_TEXT: &str = concat!(
    "説明文を長くしてレイアウトコストを増やしています。",
    " テキストを繰り返して DOM の計算量を増やしています。",
);

/// One rendered card, identified by its creation-order index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card {
    index: usize,
}

impl Card {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self { index }
    }

    /// 0-based creation index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// 1-based position shown to the user.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.index + 1
    }

    /// Price in yen: `(index + 1) × 120`.
    #[must_use]
    pub const fn price(&self) -> u64 {
        (self.index as u64 + 1) * PRICE_STEP_YEN
    }

    #[must_use]
    pub fn title(&self) -> String {
        format!("商品カード {}", self.ordinal())
    }

    /// Alternative text for the thumbnail image.
    #[must_use]
    pub fn thumbnail_alt(&self) -> String {
        format!("商品サムネイル {}", self.ordinal())
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        LONG_TEXT
    }

    #[must_use]
    pub fn price_label(&self) -> String {
        format!("価格: ¥{}", self.price())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_scales_with_ordinal() {
        assert_eq!(Card::new(0).price(), 120);
        assert_eq!(Card::new(1).price(), 240);
        assert_eq!(Card::new(71).price(), 8640);
    }

    #[test]
    fn labels_use_one_based_ordinal() {
        let card = Card::new(4);
        assert_eq!(card.title(), "商品カード 5");
        assert_eq!(card.thumbnail_alt(), "商品サムネイル 5");
        assert_eq!(card.price_label(), "価格: ¥600");
    }

    #[test]
    fn content_is_deterministic() {
        let a = Card::new(9);
        let b = Card::new(9);
        assert_eq!(a.title(), b.title());
        assert_eq!(a.description(), b.description());
        assert_eq!(a.price_label(), b.price_label());
    }
}
