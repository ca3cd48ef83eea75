//! Input Descriptors
//!
//! Typed, immutable configuration for one fillable parameter of a query
//! template. Two variants exist, numeric ranges and character ranges; both
//! share the same bound shape and draw policy and differ only in how the
//! produced value is rendered.

use rand::Rng;

/// Bounds used when a numeric input leaves `min`/`max` out
pub const DEFAULT_NUMBER_MIN: i64 = 0;
pub const DEFAULT_NUMBER_MAX: i64 = 9;

/// Bounds used when a character input leaves `min`/`max` out
pub const DEFAULT_CHAR_MIN: char = 'a';
pub const DEFAULT_CHAR_MAX: char = 'z';

/// Upper limit on how many times a character range repeats its bounds in
/// its label
pub const MAX_CHARACTER_COUNT: u32 = 64;

/// Inclusive bounds plus the default sub-range shown to the user.
///
/// Always normalized: `min <= max` and both defaults lie in `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeBounds {
    min: i64,
    max: i64,
    default_min: i64,
    default_max: i64,
}

impl RangeBounds {
    /// Build bounds, coercing bad authoring instead of rejecting it.
    ///
    /// Swapped bounds are put back in order, missing defaults fall back to the
    /// bounds, and defaults outside the range are clamped into it.
    pub fn new(min: i64, max: i64, default_min: Option<i64>, default_max: Option<i64>) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let default_min = default_min.unwrap_or(min).clamp(min, max);
        let default_max = default_max.unwrap_or(max).clamp(min, max);
        let (default_min, default_max) = if default_min <= default_max {
            (default_min, default_max)
        } else {
            (default_max, default_min)
        };
        Self {
            min,
            max,
            default_min,
            default_max,
        }
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn default_min(&self) -> i64 {
        self.default_min
    }

    pub fn default_max(&self) -> i64 {
        self.default_max
    }

    /// Midpoint of the default sub-range, the initial explicit value
    pub fn midpoint(&self) -> i64 {
        // i128 keeps the sum from overflowing near the ends of i64
        ((i128::from(self.default_min) + i128::from(self.default_max)) / 2) as i64
    }

    /// Inclusive sub-range a random draw uses, inside `[min, max]`.
    ///
    /// Bounds that do not parse fall back to the full range; an inverted pair
    /// is reordered.
    fn draw_range<P>(&self, state: &WidgetState, parse: P) -> (i64, i64)
    where
        P: Fn(&str) -> Option<i64>,
    {
        let low = state
            .random_min
            .as_deref()
            .and_then(&parse)
            .unwrap_or(self.min)
            .clamp(self.min, self.max);
        let high = state
            .random_max
            .as_deref()
            .and_then(&parse)
            .unwrap_or(self.max)
            .clamp(self.min, self.max);
        if low <= high {
            (low, high)
        } else {
            (high, low)
        }
    }

    /// The explicit value clamped to `[min, max]`, or `default_min`
    fn explicit_value<P>(&self, state: &WidgetState, parse: P) -> i64
    where
        P: Fn(&str) -> Option<i64>,
    {
        parse(&state.explicit)
            .map(|value| value.clamp(self.min, self.max))
            .unwrap_or(self.default_min)
    }
}

/// A range of integers, zero-padded to the width of `max` when produced
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumberRange {
    bounds: RangeBounds,
    label: Option<String>,
}

impl NumberRange {
    pub fn new(bounds: RangeBounds, label: Option<String>) -> Self {
        Self { bounds, label }
    }

    pub fn bounds(&self) -> &RangeBounds {
        &self.bounds
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn render(&self, value: i64) -> String {
        let width = self.bounds.max.to_string().len();
        format!("{:0width$}", value, width = width)
    }
}

/// A range of characters stored as their code points.
///
/// `count` only affects how the range is labelled (`aaa-zzz`), the produced
/// value is always a single character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacterRange {
    bounds: RangeBounds,
    label: Option<String>,
    count: u32,
}

impl CharacterRange {
    /// `count` is kept within `1..=MAX_CHARACTER_COUNT`
    pub fn new(bounds: RangeBounds, label: Option<String>, count: u32) -> Self {
        Self {
            bounds,
            label,
            count: count.clamp(1, MAX_CHARACTER_COUNT),
        }
    }

    pub fn bounds(&self) -> &RangeBounds {
        &self.bounds
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Uniform draw over the valid characters of `[low, high]`.
    ///
    /// Draws happen in a space with the surrogate block removed, so a range
    /// spanning it never lands on a code point that is not a character.
    fn draw<R: Rng + ?Sized>(low: i64, high: i64, rng: &mut R) -> i64 {
        index_to_code(rng.gen_range(scalar_index(low)..=scalar_index(high)))
    }

    fn render(&self, code: i64) -> String {
        code_to_char(code)
            .or_else(|| code_to_char(self.bounds.min))
            .map(String::from)
            .unwrap_or_default()
    }
}

/// Variant payload of an input descriptor.
///
/// Derived equality is the merge relation: two inputs collapse into one
/// widget iff their kinds compare equal. Different variants are never equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputKind {
    RangeNumber(NumberRange),
    RangeCharacter(CharacterRange),
}

impl InputKind {
    /// Source-document name of the variant
    pub fn type_name(&self) -> &'static str {
        match self {
            InputKind::RangeNumber(_) => "RangeNumber",
            InputKind::RangeCharacter(_) => "RangeCharacter",
        }
    }

    pub fn bounds(&self) -> &RangeBounds {
        match self {
            InputKind::RangeNumber(range) => range.bounds(),
            InputKind::RangeCharacter(range) => range.bounds(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            InputKind::RangeNumber(range) => range.label(),
            InputKind::RangeCharacter(range) => range.label(),
        }
    }
}

/// One fillable parameter of a query template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    placeholder: String,
    kind: InputKind,
}

impl InputDescriptor {
    pub fn new(placeholder: impl Into<String>, kind: InputKind) -> Self {
        Self {
            placeholder: placeholder.into(),
            kind,
        }
    }

    /// Numeric range with explicit defaults
    pub fn number(
        placeholder: impl Into<String>,
        label: Option<&str>,
        min: i64,
        max: i64,
        default_min: Option<i64>,
        default_max: Option<i64>,
    ) -> Self {
        let bounds = RangeBounds::new(min, max, default_min, default_max);
        Self::new(
            placeholder,
            InputKind::RangeNumber(NumberRange::new(bounds, label.map(String::from))),
        )
    }

    /// Character range with explicit defaults
    pub fn character(
        placeholder: impl Into<String>,
        label: Option<&str>,
        min: char,
        max: char,
        defaults: Option<(char, char)>,
        count: u32,
    ) -> Self {
        let bounds = RangeBounds::new(
            min as i64,
            max as i64,
            defaults.map(|(low, _)| low as i64),
            defaults.map(|(_, high)| high as i64),
        );
        Self::new(
            placeholder,
            InputKind::RangeCharacter(CharacterRange::new(
                bounds,
                label.map(String::from),
                count,
            )),
        )
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn kind(&self) -> &InputKind {
        &self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.kind.label()
    }

    /// Whether `other` can share this input's widget.
    ///
    /// Compares the variant and every variant parameter, label included. The
    /// placeholder is deliberately not part of it: `[X]` in one template and
    /// `[Y]` in another merge when their ranges match.
    pub fn merges_with(&self, other: &InputDescriptor) -> bool {
        self.kind == other.kind
    }

    /// Human-readable range line shown above the widget
    pub fn range_label(&self) -> String {
        let range = match &self.kind {
            InputKind::RangeNumber(range) => {
                format!("({}-{})", range.bounds.min, range.bounds.max)
            }
            InputKind::RangeCharacter(range) => {
                let repeat = |code: i64| {
                    range.render(code).repeat(range.count as usize)
                };
                format!("({}-{})", repeat(range.bounds.min), repeat(range.bounds.max))
            }
        };
        match self.label() {
            Some(label) if !label.is_empty() => format!("{label} {range}"),
            _ => range,
        }
    }

    /// State of a freshly rendered widget for this input
    pub fn initial_state(&self) -> WidgetState {
        let bounds = self.kind.bounds();
        let text = |value: i64| match &self.kind {
            InputKind::RangeNumber(_) => value.to_string(),
            InputKind::RangeCharacter(range) => range.render(value),
        };
        WidgetState {
            randomize: true,
            explicit: text(bounds.midpoint()),
            random_min: Some(text(bounds.default_min)),
            random_max: Some(text(bounds.default_max)),
        }
    }

    /// Produce the text spliced into the query pattern.
    ///
    /// Reads the widget state but never changes it. Text that does not parse
    /// falls back to the descriptor's own bounds.
    pub fn produce_value<R: Rng + ?Sized>(&self, state: &WidgetState, rng: &mut R) -> String {
        match &self.kind {
            InputKind::RangeNumber(range) => {
                let value = if state.randomize {
                    let (low, high) = range.bounds.draw_range(state, parse_number);
                    rng.gen_range(low..=high)
                } else {
                    range.bounds.explicit_value(state, parse_number)
                };
                range.render(value)
            }
            InputKind::RangeCharacter(range) => {
                let code = if state.randomize {
                    let (low, high) = range.bounds.draw_range(state, parse_char_code);
                    CharacterRange::draw(low, high, rng)
                } else {
                    range.bounds.explicit_value(state, parse_char_code)
                };
                range.render(code)
            }
        }
    }
}

/// What a rendered input widget currently holds, as raw user text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetState {
    /// Draw a random value instead of using `explicit`
    pub randomize: bool,
    /// The specific value typed by the user
    pub explicit: String,
    /// Optional lower bound of the random sub-range
    pub random_min: Option<String>,
    /// Optional upper bound of the random sub-range
    pub random_max: Option<String>,
}

impl WidgetState {
    /// A non-random state pinned to `value`
    pub fn explicit(value: impl Into<String>) -> Self {
        Self {
            randomize: false,
            explicit: value.into(),
            random_min: None,
            random_max: None,
        }
    }

    /// A random state over the descriptor's full range
    pub fn random() -> Self {
        Self {
            randomize: true,
            ..Default::default()
        }
    }
}

fn parse_number(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Accepts the character itself (`"a"`) or a code point (`"97"`).
///
/// A single character always means itself, so `"5"` is the digit five and
/// `" "` is a space. Surrounding whitespace is ignored otherwise.
fn parse_char_code(text: &str) -> Option<i64> {
    single_char(text)
        .or_else(|| single_char(text.trim()))
        .or_else(|| text.trim().parse::<i64>().ok())
}

fn single_char(text: &str) -> Option<i64> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c as i64),
        _ => None,
    }
}

const SURROGATE_START: i64 = 0xD800;
const SURROGATE_LEN: i64 = 0x800;

/// Position of `code` once the surrogate block is removed; a surrogate maps
/// to the first character after the block
fn scalar_index(code: i64) -> i64 {
    if code < SURROGATE_START {
        code
    } else if code < SURROGATE_START + SURROGATE_LEN {
        SURROGATE_START
    } else {
        code - SURROGATE_LEN
    }
}

fn index_to_code(index: i64) -> i64 {
    if index < SURROGATE_START {
        index
    } else {
        index + SURROGATE_LEN
    }
}

fn code_to_char(code: i64) -> Option<char> {
    u32::try_from(code).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_number_padding_matches_max_width() {
        let input = InputDescriptor::number("[N]", None, 0, 99, None, None);
        let value = input.produce_value(&WidgetState::explicit("7"), &mut rng());
        assert_eq!(value, "07");
    }

    #[test]
    fn test_number_no_padding_for_single_digit_max() {
        let input = InputDescriptor::number("[N]", None, 0, 9, None, None);
        let value = input.produce_value(&WidgetState::explicit("3"), &mut rng());
        assert_eq!(value, "3");
    }

    #[test]
    fn test_explicit_value_is_clamped() {
        let input = InputDescriptor::number("[N]", None, 10, 20, None, None);
        assert_eq!(input.produce_value(&WidgetState::explicit("99"), &mut rng()), "20");
        assert_eq!(input.produce_value(&WidgetState::explicit("-5"), &mut rng()), "10");
    }

    #[test]
    fn test_unparseable_explicit_uses_default_min() {
        let input = InputDescriptor::number("[N]", None, 0, 100, Some(40), Some(60));
        let value = input.produce_value(&WidgetState::explicit("abc"), &mut rng());
        assert_eq!(value, "040");
    }

    #[test]
    fn test_random_draw_stays_in_narrowed_range() {
        let input = InputDescriptor::number("[N]", None, 0, 999, None, None);
        let state = WidgetState {
            randomize: true,
            explicit: String::new(),
            random_min: Some("100".into()),
            random_max: Some("105".into()),
        };
        let mut rng = rng();
        for _ in 0..200 {
            let value: i64 = input.produce_value(&state, &mut rng).parse().unwrap();
            assert!((100..=105).contains(&value), "drew {value}");
        }
    }

    #[test]
    fn test_random_with_garbage_subrange_uses_full_range() {
        let input = InputDescriptor::number("[N]", None, 5, 6, None, None);
        let state = WidgetState {
            randomize: true,
            explicit: String::new(),
            random_min: Some("low".into()),
            random_max: None,
        };
        let mut rng = rng();
        for _ in 0..50 {
            let value = input.produce_value(&state, &mut rng);
            assert!(value == "5" || value == "6");
        }
    }

    #[test]
    fn test_inverted_subrange_is_reordered() {
        let input = InputDescriptor::number("[N]", None, 0, 9, None, None);
        let state = WidgetState {
            randomize: true,
            explicit: String::new(),
            random_min: Some("4".into()),
            random_max: Some("4".into()),
        };
        assert_eq!(input.produce_value(&state, &mut rng()), "4");

        let inverted = WidgetState {
            random_min: Some("8".into()),
            random_max: Some("7".into()),
            ..state
        };
        let value = input.produce_value(&inverted, &mut rng());
        assert!(value == "7" || value == "8");
    }

    #[test]
    fn test_character_explicit_accepts_char_or_code() {
        let input = InputDescriptor::character("[C]", None, 'a', 'z', None, 3);
        assert_eq!(input.produce_value(&WidgetState::explicit("q"), &mut rng()), "q");
        assert_eq!(input.produce_value(&WidgetState::explicit("98"), &mut rng()), "b");

        let digits = InputDescriptor::character("[D]", None, '0', '9', None, 1);
        assert_eq!(digits.produce_value(&WidgetState::explicit("5"), &mut rng()), "5");
    }

    #[test]
    fn test_character_random_single_char() {
        let input = InputDescriptor::character("[C]", None, 'x', 'z', None, 4);
        let mut rng = rng();
        for _ in 0..50 {
            let value = input.produce_value(&WidgetState::random(), &mut rng);
            assert_eq!(value.chars().count(), 1);
            assert!(matches!(value.as_str(), "x" | "y" | "z"));
        }
    }

    #[test]
    fn test_random_draw_reaches_both_ends() {
        let number = InputDescriptor::number("[N]", None, 5, 6, None, None);
        let letter = InputDescriptor::character("[C]", None, 'x', 'y', None, 1);
        let mut rng = rng();
        let numbers: HashSet<String> = (0..200)
            .map(|_| number.produce_value(&WidgetState::random(), &mut rng))
            .collect();
        let letters: HashSet<String> = (0..200)
            .map(|_| letter.produce_value(&WidgetState::random(), &mut rng))
            .collect();
        assert_eq!(numbers, HashSet::from(["5".to_string(), "6".to_string()]));
        assert_eq!(letters, HashSet::from(["x".to_string(), "y".to_string()]));
    }

    #[test]
    fn test_midpoint_near_i64_limits() {
        let top = RangeBounds::new(i64::MAX - 1, i64::MAX, None, None);
        assert_eq!(top.midpoint(), i64::MAX - 1);
        assert_eq!(RangeBounds::new(i64::MIN, i64::MAX, None, None).midpoint(), 0);

        let input = InputDescriptor::number("[N]", None, i64::MAX - 1, i64::MAX, None, None);
        assert_eq!(input.initial_state().explicit, (i64::MAX - 1).to_string());
    }

    #[test]
    fn test_space_is_a_character() {
        let input = InputDescriptor::character("[C]", None, ' ', '~', Some(('a', 'z')), 1);
        assert_eq!(input.produce_value(&WidgetState::explicit(" "), &mut rng()), " ");
        assert_eq!(input.produce_value(&WidgetState::explicit(" q "), &mut rng()), "q");

        let pinned = WidgetState {
            randomize: true,
            explicit: String::new(),
            random_min: Some(" ".into()),
            random_max: Some(" ".into()),
        };
        assert_eq!(input.produce_value(&pinned, &mut rng()), " ");
    }

    #[test]
    fn test_draw_across_surrogate_block_is_uniform() {
        let input = InputDescriptor::character("[C]", None, '\u{D7FF}', '\u{E000}', None, 1);
        let mut rng = rng();
        let mut low = 0;
        let mut high = 0;
        for _ in 0..2000 {
            match input.produce_value(&WidgetState::random(), &mut rng).as_str() {
                "\u{D7FF}" => low += 1,
                "\u{E000}" => high += 1,
                other => panic!("drew {other:?}"),
            }
        }
        assert!(low > 800 && high > 800, "low={low} high={high}");
    }

    #[test]
    fn test_character_count_is_capped() {
        let input = InputDescriptor::character("[C]", None, 'a', 'b', None, u32::MAX);
        match input.kind() {
            InputKind::RangeCharacter(range) => assert_eq!(range.count(), MAX_CHARACTER_COUNT),
            other => panic!("unexpected kind {other:?}"),
        }
        let label = input.range_label();
        assert_eq!(label.len(), "(-)".len() + 2 * MAX_CHARACTER_COUNT as usize);
    }

    #[test]
    fn test_bounds_are_coerced() {
        let bounds = RangeBounds::new(10, 1, Some(-4), Some(50));
        assert_eq!(bounds.min(), 1);
        assert_eq!(bounds.max(), 10);
        assert_eq!(bounds.default_min(), 1);
        assert_eq!(bounds.default_max(), 10);
    }

    #[test]
    fn test_merge_ignores_placeholder() {
        let a = InputDescriptor::number("[X]", Some("Digit"), 0, 9, None, None);
        let b = InputDescriptor::number("[Y]", Some("Digit"), 0, 9, None, None);
        assert!(a.merges_with(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_merge_respects_label_and_defaults() {
        let a = InputDescriptor::number("[X]", Some("Digit"), 0, 9, None, None);
        let relabelled = InputDescriptor::number("[X]", Some("Year"), 0, 9, None, None);
        let narrowed = InputDescriptor::number("[X]", Some("Digit"), 0, 9, Some(2), None);
        assert!(!a.merges_with(&relabelled));
        assert!(!a.merges_with(&narrowed));
    }

    #[test]
    fn test_merge_across_variants_is_false() {
        let number = InputDescriptor::number("[X]", None, 97, 122, None, None);
        let character = InputDescriptor::character("[X]", None, 'a', 'z', None, 1);
        assert!(!number.merges_with(&character));
        assert!(!character.merges_with(&number));
    }

    #[test]
    fn test_range_labels() {
        let number = InputDescriptor::number("[N]", Some("Year"), 1990, 2020, None, None);
        assert_eq!(number.range_label(), "Year (1990-2020)");

        let character = InputDescriptor::character("[C]", Some("Letters"), 'a', 'z', None, 3);
        assert_eq!(character.range_label(), "Letters (aaa-zzz)");

        let unlabelled = InputDescriptor::number("[N]", None, 0, 9, None, None);
        assert_eq!(unlabelled.range_label(), "(0-9)");
    }

    #[test]
    fn test_initial_state_uses_defaults() {
        let input = InputDescriptor::number("[N]", None, 0, 100, Some(10), Some(21));
        let state = input.initial_state();
        assert!(state.randomize);
        assert_eq!(state.explicit, "15");
        assert_eq!(state.random_min.as_deref(), Some("10"));
        assert_eq!(state.random_max.as_deref(), Some("21"));

        let letters = InputDescriptor::character("[C]", None, 'a', 'e', None, 1);
        let state = letters.initial_state();
        assert_eq!(state.explicit, "c");
        assert_eq!(state.random_min.as_deref(), Some("a"));
    }
}
