use rand::Rng;
use rand::seq::IndexedRandom;

pub const PETAL_GLYPHS: [&str; 6] = ["🌸", "🌺", "🌼", "🌻", "🌷", "🥀"];
pub const FLOAT_VARIANTS: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PetalPhase {
    Visible,
    Removing,
}

#[derive(Clone, Debug)]
pub struct Petal {
    pub glyph: &'static str,
    pub x: f64,
    pub y: f64,
    pub float_variant: u8,
    pub phase: PetalPhase,
}

impl Petal {
    pub fn float_class(&self) -> String {
        format!("petal-float-{}", self.float_variant)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Rectangle petals may be placed in: the viewport minus `padding` on every side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SafeArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SafeArea {
    pub fn new(viewport: Viewport, padding: f64) -> Self {
        SafeArea {
            left: padding,
            top: padding,
            width: (viewport.width - padding * 2.0).max(0.0),
            height: (viewport.height - padding * 2.0).max(0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Activation {
    Ignored,
    Removed { remaining: usize },
    /// The activation that took the count to zero. Returned at most once.
    Cleared,
}

#[derive(Clone, Debug, Default)]
pub struct PetalField {
    pub petals: Vec<Petal>,
    pub total: usize,
    pub remaining: usize,
}

impl PetalField {
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        total: usize,
        viewport: Viewport,
        padding: f64,
    ) -> Self {
        let area = SafeArea::new(viewport, padding);
        let petals = (0..total)
            .map(|_| {
                let glyph = PETAL_GLYPHS[rng.random_range(0..PETAL_GLYPHS.len())];
                let x = rng.random::<f64>() * area.width + area.left;
                let y = rng.random::<f64>() * area.height + area.top;
                Petal {
                    glyph,
                    x,
                    y,
                    float_variant: rng.random_range(1..=FLOAT_VARIANTS),
                    phase: PetalPhase::Visible,
                }
            })
            .collect();

        PetalField {
            petals,
            total,
            remaining: total,
        }
    }

    pub fn activate(&mut self, index: usize) -> Activation {
        let Some(petal) = self.petals.get_mut(index) else {
            return Activation::Ignored;
        };
        if petal.phase == PetalPhase::Removing || self.remaining == 0 {
            return Activation::Ignored;
        }

        petal.phase = PetalPhase::Removing;
        self.remaining -= 1;
        if self.remaining == 0 {
            Activation::Cleared
        } else {
            Activation::Removed {
                remaining: self.remaining,
            }
        }
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        self.petals
            .iter()
            .enumerate()
            .filter_map(|(idx, petal)| (petal.phase == PetalPhase::Visible).then_some(idx))
            .collect()
    }

    pub fn pick_random_visible<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        self.visible_indices().choose(rng).copied()
    }

    pub fn is_cleared(&self) -> bool {
        self.total > 0 && self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const VIEWPORT: Viewport = Viewport {
        width: 860.0,
        height: 680.0,
    };

    fn within(start: f64, extent: f64, value: f64) -> bool {
        // A collapsed extent pins every value to its start.
        value >= start && (value < start + extent || extent == 0.0 && value == start)
    }

    fn inside(area: &SafeArea, x: f64, y: f64) -> bool {
        within(area.left, area.width, x) && within(area.top, area.height, y)
    }

    fn field(seed: u64) -> PetalField {
        let mut rng = StdRng::seed_from_u64(seed);
        PetalField::generate(&mut rng, 28, VIEWPORT, 60.0)
    }

    #[test]
    fn test_generates_exact_count_within_bounds() {
        let area = SafeArea::new(VIEWPORT, 60.0);
        for seed in 0..50 {
            let field = field(seed);
            assert_eq!(field.petals.len(), 28);
            assert_eq!(field.remaining, 28);
            for petal in &field.petals {
                assert!(PETAL_GLYPHS.contains(&petal.glyph));
                assert!(inside(&area, petal.x, petal.y), "{:?}", petal);
                assert!((1..=FLOAT_VARIANTS).contains(&petal.float_variant));
                assert_eq!(petal.phase, PetalPhase::Visible);
            }
        }
    }

    #[test]
    fn test_tiny_viewport_pins_petals_to_padding() {
        let mut rng = StdRng::seed_from_u64(7);
        let tiny = Viewport {
            width: 80.0,
            height: 40.0,
        };
        let field = PetalField::generate(&mut rng, 5, tiny, 60.0);
        for petal in &field.petals {
            assert_eq!(petal.x, 60.0);
            assert_eq!(petal.y, 60.0);
        }
    }

    #[test]
    fn test_each_activation_decrements_once() {
        let mut field = field(1);
        for idx in 0..27 {
            assert_eq!(
                field.activate(idx),
                Activation::Removed {
                    remaining: 27 - idx
                }
            );
        }
        assert_eq!(field.activate(27), Activation::Cleared);
        assert_eq!(field.remaining, 0);
        assert!(field.is_cleared());
    }

    #[test]
    fn test_repeat_activation_is_noop() {
        let mut field = field(2);
        assert_eq!(field.activate(4), Activation::Removed { remaining: 27 });
        assert_eq!(field.activate(4), Activation::Ignored);
        assert_eq!(field.remaining, 27);
        assert_eq!(field.activate(99), Activation::Ignored);
        assert_eq!(field.remaining, 27);
    }

    #[test]
    fn test_cleared_fires_exactly_once() {
        let mut field = field(3);
        let mut cleared = 0;
        for _ in 0..3 {
            for idx in (0..28).rev() {
                if field.activate(idx) == Activation::Cleared {
                    cleared += 1;
                }
            }
        }
        assert_eq!(cleared, 1);
        assert_eq!(field.remaining, 0);
    }

    #[test]
    fn test_random_pick_only_returns_visible_petals() {
        let mut field = field(4);
        let mut rng = StdRng::seed_from_u64(99);
        for idx in 0..20 {
            field.activate(idx);
        }
        for _ in 0..200 {
            let pick = field.pick_random_visible(&mut rng).unwrap();
            assert!(pick >= 20);
            assert_eq!(field.petals[pick].phase, PetalPhase::Visible);
        }
        for idx in 20..28 {
            field.activate(idx);
        }
        assert_eq!(field.pick_random_visible(&mut rng), None);
    }

    #[test]
    fn test_background_taps_clear_the_field() {
        let mut field = field(5);
        let mut rng = StdRng::seed_from_u64(5);
        let mut taps = 0;
        while let Some(idx) = field.pick_random_visible(&mut rng) {
            field.activate(idx);
            taps += 1;
        }
        assert_eq!(taps, 28);
        assert!(field.is_cleared());
    }
}
