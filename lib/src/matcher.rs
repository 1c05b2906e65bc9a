use crate::error::{RenderError, Result};
use crate::glyph::GlyphCache;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Minimum number of characters needed to match anything
pub const MIN_CHARSET_LEN: usize = 2;

/// Normalized key given to every member when all glyphs are equally bright
pub const DEGENERATE_KEY: f64 = 0.5;

/// How a brightness between two map keys is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundingPolicy {
    /// Take the nearest key at or above the brightness
    Up,
    /// Take the nearest key at or below the brightness
    Down,
    /// Take whichever key is closer; ties go down
    #[default]
    Nearest,
}

impl FromStr for RoundingPolicy {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "abs" => Ok(Self::Nearest),
            other => Err(RenderError::UnknownRounding(other.to_string())),
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Nearest => "abs",
        })
    }
}

/// Maps cell brightness to the character whose glyph best matches it
///
/// Members keep their raw glyph brightness; the normalized map is rebuilt
/// lazily the first time a match runs after the set changed.
#[derive(Debug, Clone, Default)]
pub struct CharMatcher {
    members: BTreeMap<char, f64>,
    normalized: Vec<(f64, char)>,
    dirty: bool,
    rounding: RoundingPolicy,
}

impl CharMatcher {
    /// Digits 0-9, the default working set
    pub const DEFAULT_CHARSET: &'static str = "0123456789";

    pub fn new(chars: impl IntoIterator<Item = char>, glyphs: &mut GlyphCache) -> Self {
        let mut matcher = Self::default();
        for c in chars {
            matcher.add_char(c, glyphs);
        }
        matcher
    }

    /// Add `c` to the working set (no-op if present)
    pub fn add_char(&mut self, c: char, glyphs: &mut GlyphCache) {
        let brightness = glyphs.brightness_of(c);
        self.members.insert(c, brightness);
        self.dirty = true;
    }

    /// Remove `c` from the working set if present
    ///
    /// The glyph cache keeps its entry so re-adding `c` is free.
    pub fn remove_char(&mut self, c: char) {
        self.members.remove(&c);
        self.dirty = true;
    }

    pub fn add_range(&mut self, range: RangeInclusive<char>, glyphs: &mut GlyphCache) {
        for c in range {
            self.add_char(c, glyphs);
        }
    }

    pub fn remove_range(&mut self, range: RangeInclusive<char>) {
        for c in range {
            self.remove_char(c);
        }
    }

    pub fn set_rounding(&mut self, policy: RoundingPolicy) {
        self.rounding = policy;
    }

    pub fn rounding(&self) -> RoundingPolicy {
        self.rounding
    }

    /// Members in ascending order
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.members.keys().copied()
    }

    pub fn contains(&self, c: char) -> bool {
        self.members.contains_key(&c)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Fail unless the set can anchor both ends of the brightness range
    pub fn ensure_matchable(&self) -> Result<()> {
        if self.members.len() < MIN_CHARSET_LEN {
            return Err(RenderError::CharsetTooSmall {
                len: self.members.len(),
            });
        }
        Ok(())
    }

    /// Normalized `(brightness, char)` pairs in ascending key order
    pub fn normalized_map(&mut self) -> Result<&[(f64, char)]> {
        self.ensure_matchable()?;
        if self.dirty {
            self.rebuild();
        }
        Ok(&self.normalized)
    }

    /// Character whose normalized glyph brightness best fits `brightness`
    ///
    /// # Arguments
    /// * `brightness` - Cell brightness, expected in [0.0, 1.0]
    ///
    /// # Returns
    /// The matched character, or `CharsetTooSmall` if fewer than two
    /// characters are in the set
    pub fn match_brightness(&mut self, brightness: f64) -> Result<char> {
        let rounding = self.rounding;
        let map = self.normalized_map()?;
        let brightness = if brightness.is_nan() { 0.0 } else { brightness };

        // First entry with key >= brightness; clamp both ends to the map
        let split = map.partition_point(|&(key, _)| key < brightness);
        let ceiling = map[split.min(map.len() - 1)];
        let floor = match map.get(split) {
            Some(&entry) if entry.0 == brightness => entry,
            _ => map[split.saturating_sub(1)],
        };

        let (_, c) = match rounding {
            RoundingPolicy::Up => ceiling,
            RoundingPolicy::Down => floor,
            RoundingPolicy::Nearest => {
                if brightness - floor.0 > ceiling.0 - brightness {
                    ceiling
                } else {
                    floor
                }
            }
        };
        Ok(c)
    }

    fn rebuild(&mut self) {
        let (min, max) = self
            .members
            .values()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let span = max - min;

        // Members iterate in ascending char order and the sort is stable,
        // so the first entry of every equal-key run is the smallest char.
        let mut normalized: Vec<(f64, char)> = self
            .members
            .iter()
            .map(|(&c, &raw)| {
                let key = if span > 0.0 {
                    (raw - min) / span
                } else {
                    DEGENERATE_KEY
                };
                (key, c)
            })
            .collect();
        normalized.sort_by(|a, b| a.0.total_cmp(&b.0));
        normalized.dedup_by(|later, first| later.0 == first.0);

        log::debug!(
            "rebuilt brightness map: {} characters, {} distinct levels",
            self.members.len(),
            normalized.len()
        );
        self.normalized = normalized;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{GlyphBitmap, GlyphRasterizer};

    /// Lit-cell counts out of 8, chosen per character
    struct FixedRasterizer;

    impl GlyphRasterizer for FixedRasterizer {
        fn rasterize(&self, c: char) -> GlyphBitmap {
            let lit = match c {
                '@' => 0,
                '#' => 2,
                '+' => 4,
                '-' => 6,
                '.' => 8,
                // same density as '+'
                '*' => 4,
                'a' | 'b' => 3,
                _ => 1,
            };
            let cells = (0..8).map(|i| i < lit).collect();
            GlyphBitmap::new(8, 1, cells)
        }
    }

    fn matcher(chars: &str) -> (CharMatcher, GlyphCache) {
        let mut glyphs = GlyphCache::new(FixedRasterizer);
        let matcher = CharMatcher::new(chars.chars(), &mut glyphs);
        (matcher, glyphs)
    }

    #[test]
    fn test_rounding_policy_parse() {
        assert_eq!("up".parse::<RoundingPolicy>().unwrap(), RoundingPolicy::Up);
        assert_eq!("down".parse::<RoundingPolicy>().unwrap(), RoundingPolicy::Down);
        assert_eq!("abs".parse::<RoundingPolicy>().unwrap(), RoundingPolicy::Nearest);
        assert!(matches!(
            "sideways".parse::<RoundingPolicy>(),
            Err(RenderError::UnknownRounding(_))
        ));
        assert_eq!(RoundingPolicy::default().to_string(), "abs");
    }

    #[test]
    fn test_normalization_bounds() {
        let (mut m, _) = matcher("@#+-.");
        let map = m.normalized_map().unwrap().to_vec();

        assert_eq!(map.first(), Some(&(0.0, '@')));
        assert_eq!(map.last(), Some(&(1.0, '.')));
        for &(key, _) in &map {
            assert!((0.0..=1.0).contains(&key));
        }
        assert!(map.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_tie_break_prefers_smaller_char() {
        let (mut m, _) = matcher("@+*.");
        let map = m.normalized_map().unwrap().to_vec();

        // '*' (0x2A) < '+' (0x2B), both at 0.5
        assert_eq!(map, vec![(0.0, '@'), (0.5, '*'), (1.0, '.')]);
    }

    #[test]
    fn test_exact_key_matches_under_every_policy() {
        let (mut m, _) = matcher("@#+-.");
        let map = m.normalized_map().unwrap().to_vec();

        for policy in [RoundingPolicy::Up, RoundingPolicy::Down, RoundingPolicy::Nearest] {
            m.set_rounding(policy);
            for &(key, c) in &map {
                assert_eq!(m.match_brightness(key).unwrap(), c, "{policy} at {key}");
            }
        }
    }

    #[test]
    fn test_rounding_between_keys() {
        // keys: '@' 0.0, '+' 0.5, '.' 1.0
        let (mut m, _) = matcher("@+.");

        m.set_rounding(RoundingPolicy::Up);
        assert_eq!(m.match_brightness(0.1).unwrap(), '+');
        assert_eq!(m.match_brightness(0.6).unwrap(), '.');

        m.set_rounding(RoundingPolicy::Down);
        assert_eq!(m.match_brightness(0.4).unwrap(), '@');
        assert_eq!(m.match_brightness(0.9).unwrap(), '+');

        m.set_rounding(RoundingPolicy::Nearest);
        assert_eq!(m.match_brightness(0.2).unwrap(), '@');
        assert_eq!(m.match_brightness(0.3).unwrap(), '+');
        assert_eq!(m.match_brightness(0.8).unwrap(), '.');
    }

    #[test]
    fn test_nearest_tie_goes_to_floor() {
        let (mut m, _) = matcher("@.");
        assert_eq!(m.match_brightness(0.5).unwrap(), '@');
    }

    #[test]
    fn test_out_of_range_clamps_to_boundary() {
        let (mut m, _) = matcher("@+.");
        for policy in [RoundingPolicy::Up, RoundingPolicy::Down, RoundingPolicy::Nearest] {
            m.set_rounding(policy);
            assert_eq!(m.match_brightness(-0.5).unwrap(), '@');
            assert_eq!(m.match_brightness(1.5).unwrap(), '.');
        }
        assert_eq!(m.match_brightness(f64::NAN).unwrap(), '@');
    }

    #[test]
    fn test_too_small_charset_is_rejected() {
        let (mut m, _) = matcher("@");
        for i in 0..=10 {
            let b = f64::from(i) / 10.0;
            assert!(matches!(
                m.match_brightness(b),
                Err(RenderError::CharsetTooSmall { len: 1 })
            ));
        }

        let (mut empty, _) = matcher("");
        assert!(matches!(
            empty.match_brightness(0.5),
            Err(RenderError::CharsetTooSmall { len: 0 })
        ));
    }

    #[test]
    fn test_degenerate_set_uses_smallest_char() {
        let (mut m, _) = matcher("ba");
        assert_eq!(m.normalized_map().unwrap(), &[(DEGENERATE_KEY, 'a')]);
        for policy in [RoundingPolicy::Up, RoundingPolicy::Down, RoundingPolicy::Nearest] {
            m.set_rounding(policy);
            assert_eq!(m.match_brightness(0.0).unwrap(), 'a');
            assert_eq!(m.match_brightness(1.0).unwrap(), 'a');
        }
    }

    #[test]
    fn test_add_and_remove_rebuild_map() {
        let (mut m, mut glyphs) = matcher("@.");
        assert_eq!(m.match_brightness(0.5).unwrap(), '@');

        m.add_char('+', &mut glyphs);
        assert_eq!(m.match_brightness(0.5).unwrap(), '+');

        m.remove_char('+');
        assert!(!m.contains('+'));
        assert_eq!(m.match_brightness(0.5).unwrap(), '@');
        // glyph value survives removal
        assert_eq!(glyphs.cached('+'), Some(0.5));
    }

    #[test]
    fn test_add_existing_is_noop() {
        let (mut m, mut glyphs) = matcher("@.");
        m.add_char('@', &mut glyphs);
        assert_eq!(m.len(), 2);
        assert_eq!(m.chars().collect::<String>(), ".@");
    }

    #[test]
    fn test_ranges() {
        let mut glyphs = GlyphCache::default();
        let mut m = CharMatcher::default();
        m.add_range(' '..='~', &mut glyphs);
        assert_eq!(m.len(), 95);

        m.remove_range('a'..='z');
        assert_eq!(m.len(), 69);
        assert!(!m.contains('q'));
        assert!(m.contains('Q'));
    }

    #[test]
    fn test_default_charset_with_builtin_font() {
        let mut glyphs = GlyphCache::default();
        let mut m = CharMatcher::new(CharMatcher::DEFAULT_CHARSET.chars(), &mut glyphs);
        assert_eq!(m.len(), 10);

        let map = m.normalized_map().unwrap();
        assert_eq!(map.first().map(|e| e.0), Some(0.0));
        assert_eq!(map.last().map(|e| e.0), Some(1.0));
    }
}
