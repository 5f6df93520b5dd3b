use std::cell::Cell;
use std::time::Duration;

use gtk4 as gtk;
use gtk4::prelude::*;
use gtk4::{graphene, gsk, pango};
use rand::Rng;

pub const HEART_GLYPHS: [&str; 6] = ["❤️", "💕", "💖", "💗", "💓", "💝"];
pub const HEART_COUNT: usize = 50;
pub const HEART_STAGGER_MS: u64 = 100;
pub const HEART_LIFETIME_MS: u64 = 5000;
const HEART_START_Y: f64 = -50.0;

#[derive(Clone, Debug)]
pub struct FallingHeart {
    pub glyph: &'static str,
    pub delay_ms: u64,
    pub x: f64,
    pub font_px: f64,
    pub fall_ms: u64,
    pub lifetime_ms: u64,
}

pub fn plan_celebration<R: Rng + ?Sized>(rng: &mut R, width: f64) -> Vec<FallingHeart> {
    let width = width.max(0.0);
    (0..HEART_COUNT)
        .map(|i| FallingHeart {
            glyph: HEART_GLYPHS[rng.random_range(0..HEART_GLYPHS.len())],
            delay_ms: i as u64 * HEART_STAGGER_MS,
            x: rng.random::<f64>() * width,
            font_px: rng.random::<f64>() * 30.0 + 20.0,
            fall_ms: (rng.random::<f64>() * 3000.0 + 2000.0) as u64,
            lifetime_ms: HEART_LIFETIME_MS,
        })
        .collect()
}

fn heart_transform(x: f64, y: f64, turn: f64, w: f32, h: f32) -> gsk::Transform {
    let (cx, cy) = (w / 2.0, h / 2.0);
    gsk::Transform::new()
        .translate(&graphene::Point::new(x as f32 + cx, y as f32 + cy))
        .rotate((turn * 360.0) as f32)
        .translate(&graphene::Point::new(-cx, -cy))
}

fn spawn_heart(layer: &gtk::Fixed, heart: &FallingHeart) {
    let label = gtk::Label::builder()
        .label(heart.glyph)
        .css_classes(vec!["celebration-heart"])
        .build();
    let attrs = pango::AttrList::new();
    attrs.insert(pango::AttrSize::new_size_absolute(
        (heart.font_px * pango::SCALE as f64) as i32,
    ));
    label.set_attributes(Some(&attrs));
    label.set_can_target(false);
    layer.put(&label, heart.x, HEART_START_Y);

    let x = heart.x;
    let fall_us = (heart.fall_ms * 1000) as f64;
    let started_us = Cell::new(None::<i64>);
    let layer_weak = layer.downgrade();
    label.add_tick_callback(move |label, clock| {
        let Some(layer) = layer_weak.upgrade() else {
            return glib::ControlFlow::Break;
        };
        let now = clock.frame_time();
        let start = started_us.get().unwrap_or(now);
        started_us.set(Some(start));
        let progress = ((now - start) as f64 / fall_us).clamp(0.0, 1.0);
        let bottom = layer.height().max(0) as f64;
        let y = HEART_START_Y + (bottom - HEART_START_Y) * progress;
        let (width, height) = (label.width() as f32, label.height() as f32);
        let transform = heart_transform(x, y, progress, width, height);
        layer.set_child_transform(label, Some(&transform));
        if progress >= 1.0 {
            label.set_opacity(0.0);
            return glib::ControlFlow::Break;
        }
        glib::ControlFlow::Continue
    });

    glib::timeout_add_local_once(Duration::from_millis(heart.lifetime_ms), {
        let layer_weak = layer.downgrade();
        let label_weak = label.downgrade();
        move || {
            if let (Some(layer), Some(label)) = (layer_weak.upgrade(), label_weak.upgrade()) {
                layer.remove(&label);
            }
        }
    });
}

pub fn launch(layer: &gtk::Fixed) {
    let mut rng = rand::rng();
    let plan = plan_celebration(&mut rng, layer.width() as f64);
    log::debug!("celebration: {} hearts", plan.len());
    for heart in plan {
        let layer_weak = layer.downgrade();
        glib::timeout_add_local_once(Duration::from_millis(heart.delay_ms), move || {
            if let Some(layer) = layer_weak.upgrade() {
                spawn_heart(&layer, &heart);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_plan_has_fifty_staggered_hearts() {
        let mut rng = StdRng::seed_from_u64(11);
        let plan = plan_celebration(&mut rng, 860.0);
        assert_eq!(plan.len(), HEART_COUNT);
        for (i, heart) in plan.iter().enumerate() {
            assert_eq!(heart.delay_ms, i as u64 * HEART_STAGGER_MS);
            assert_eq!(heart.lifetime_ms, HEART_LIFETIME_MS);
        }
    }

    #[test]
    fn test_plan_randomness_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..20 {
            for heart in plan_celebration(&mut rng, 640.0) {
                assert!(HEART_GLYPHS.contains(&heart.glyph));
                assert!((0.0..640.0).contains(&heart.x));
                assert!((20.0..50.0).contains(&heart.font_px));
                assert!((2000..5000).contains(&heart.fall_ms));
                assert!(heart.fall_ms <= heart.lifetime_ms);
            }
        }
    }

    #[test]
    fn test_zero_width_layer_keeps_hearts_at_left_edge() {
        let mut rng = StdRng::seed_from_u64(13);
        assert!(plan_celebration(&mut rng, 0.0).iter().all(|h| h.x == 0.0));
    }
}
