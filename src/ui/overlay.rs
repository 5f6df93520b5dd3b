use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gettextrs::gettext;
use gtk4 as gtk;
use gtk4::pango;
use gtk4::prelude::*;

use super::petals::{Activation, PetalField, Viewport};
use super::state::{AppState, IntroWidgets};
use super::tone::play_pop;

const PETAL_REMOVE_MS: u64 = 500;
const COUNT_PULSE_MS: u64 = 200;
const REVEAL_HIDE_DELAY_MS: u64 = 1500;
const REVEAL_DETACH_MS: u64 = 800;

pub(super) fn build_intro_overlay(state: &Rc<RefCell<AppState>>) -> gtk::Overlay {
    let root = gtk::Overlay::new();
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("intro-overlay");

    let layer = gtk::Fixed::new();
    layer.set_hexpand(true);
    layer.set_vexpand(true);
    layer.add_css_class("petals-layer");

    let content = gtk::Box::new(gtk::Orientation::Vertical, 10);
    content.set_halign(gtk::Align::Center);
    content.set_valign(gtk::Align::Center);
    content.set_can_target(false);
    content.add_css_class("intro-content");

    let title = gtk::Label::new(Some(&gettext("🌸 A little surprise 🌸")));
    title.add_css_class("intro-title");
    title.add_css_class("title-1");

    let subtitle = gtk::Label::new(Some(&gettext("Tap the flowers to clear the way")));
    subtitle.add_css_class("intro-subtitle");

    let count_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    count_row.set_halign(gtk::Align::Center);
    let count_label = gtk::Label::new(Some(&state.borrow().settings.petal_count.to_string()));
    count_label.add_css_class("petal-count");
    let count_suffix = gtk::Label::new(Some(&gettext("flowers left")));
    count_suffix.add_css_class("intro-subtitle");
    count_row.append(&count_label);
    count_row.append(&count_suffix);

    content.append(&title);
    content.append(&subtitle);
    content.append(&count_row);

    root.set_child(Some(&layer));
    root.add_overlay(&content);

    // Taps that land on the bare layer clear a random flower instead.
    let background_tap = gtk::GestureClick::new();
    background_tap.connect_pressed({
        let state = state.clone();
        let layer_weak = layer.downgrade();
        move |_, _, x, y| {
            let Some(layer) = layer_weak.upgrade() else {
                return;
            };
            let layer = layer.upcast_ref::<gtk::Widget>();
            let hit_layer = layer
                .pick(x, y, gtk::PickFlags::DEFAULT)
                .is_none_or(|target| &target == layer);
            if hit_layer {
                activate_random_petal(&state);
            }
        }
    });
    layer.add_controller(background_tap);

    state.borrow_mut().intro = Some(IntroWidgets {
        root: root.clone(),
        layer,
        content,
        count_label,
        petal_widgets: Vec::new(),
    });

    root
}

fn viewport_for(state: &AppState, layer: &gtk::Fixed) -> Viewport {
    let (width, height) = (layer.width(), layer.height());
    if width > 0 && height > 0 {
        Viewport {
            width: width as f64,
            height: height as f64,
        }
    } else {
        Viewport {
            width: state.settings.window_width as f64,
            height: state.settings.window_height as f64,
        }
    }
}

fn petal_side_px(viewport: Viewport) -> i32 {
    ((viewport.width.min(viewport.height) / 12.0) as i32).clamp(40, 72)
}

fn build_petal_widget(state: &Rc<RefCell<AppState>>, index: usize) -> gtk::DrawingArea {
    let area = gtk::DrawingArea::builder()
        .css_classes(vec!["petal"])
        .build();

    let state_draw = state.clone();
    area.set_draw_func(move |_, cr, width, height| {
        let st = state_draw.borrow();
        let Some(petal) = st.petals.petals.get(index) else {
            return;
        };

        cr.set_antialias(gtk::cairo::Antialias::Best);
        let layout = pangocairo::functions::create_layout(cr);
        let mut font_desc = pango::FontDescription::new();
        font_desc.set_family("Noto Color Emoji, Apple Color Emoji, Segoe UI Emoji, sans");
        let font_size = width.min(height) as f64 * 0.62;
        font_desc.set_size((font_size * pango::SCALE as f64) as i32);
        layout.set_font_description(Some(&font_desc));
        layout.set_text(petal.glyph);

        let (text_width, text_height) = layout.pixel_size();
        cr.move_to(
            (width as f64 - text_width as f64) / 2.0,
            (height as f64 - text_height as f64) / 2.0,
        );
        pangocairo::functions::show_layout(cr, &layout);
    });

    let tap = gtk::GestureClick::new();
    tap.connect_pressed({
        let state = state.clone();
        move |gesture, _, _, _| {
            gesture.set_state(gtk::EventSequenceState::Claimed);
            activate_petal(&state, index);
        }
    });
    area.add_controller(tap);
    area
}

/// Scatters a fresh batch of petals over the intro layer.
pub(super) fn populate_petals(state: &Rc<RefCell<AppState>>) {
    let (layer, viewport, total, padding) = {
        let st = state.borrow();
        let Some(intro) = &st.intro else {
            return;
        };
        let layer = intro.layer.clone();
        let viewport = viewport_for(&st, &layer);
        (layer, viewport, st.settings.petal_count, st.settings.safe_padding)
    };

    {
        let mut st = state.borrow_mut();
        let mut rng = rand::rng();
        st.petals = PetalField::generate(&mut rng, total, viewport, padding);
        st.reveal_started = false;
        if let Some(provider) = &st.dynamic_css_provider {
            let side = petal_side_px(viewport);
            provider.load_from_data(&format!(
                ".petal {{ min-width: {side}px; min-height: {side}px; }}"
            ));
        }
        if let Some(intro) = &st.intro {
            intro.count_label.set_text(&total.to_string());
        }
    }

    let mut widgets = Vec::with_capacity(total);
    let placements: Vec<(f64, f64, String)> = state
        .borrow()
        .petals
        .petals
        .iter()
        .map(|petal| (petal.x, petal.y, petal.float_class()))
        .collect();
    for (index, (x, y, float_class)) in placements.into_iter().enumerate() {
        let widget = build_petal_widget(state, index);
        widget.add_css_class(&float_class);
        layer.put(&widget, x, y);
        widgets.push(widget);
    }

    log::debug!(
        "placed {} petals in {}x{} (padding {})",
        total,
        viewport.width,
        viewport.height,
        padding
    );
    if let Some(intro) = state.borrow_mut().intro.as_mut() {
        intro.petal_widgets = widgets;
    }
}

fn pulse_count(label: &gtk::Label, remaining: usize) {
    label.set_text(&remaining.to_string());
    label.add_css_class("pulse");
    glib::timeout_add_local_once(Duration::from_millis(COUNT_PULSE_MS), {
        let label_weak = label.downgrade();
        move || {
            if let Some(label) = label_weak.upgrade() {
                label.remove_css_class("pulse");
            }
        }
    });
}

pub(super) fn activate_petal(state: &Rc<RefCell<AppState>>, index: usize) {
    let (widget, count_label, remaining, cleared) = {
        let mut st = state.borrow_mut();
        let outcome = st.petals.activate(index);
        let (remaining, cleared) = match outcome {
            Activation::Ignored => return,
            Activation::Removed { remaining } => (remaining, false),
            Activation::Cleared => (0, true),
        };
        let Some(intro) = &st.intro else {
            return;
        };
        (
            intro.petal_widgets.get(index).cloned(),
            intro.count_label.clone(),
            remaining,
            cleared,
        )
    };

    if let Some(widget) = &widget {
        widget.add_css_class("removing");
    }
    play_pop(state);
    pulse_count(&count_label, remaining);

    let state_detach = state.clone();
    glib::timeout_add_local_once(Duration::from_millis(PETAL_REMOVE_MS), move || {
        if let Some(widget) = widget
            && let Some(layer) = widget.parent().and_downcast::<gtk::Fixed>()
        {
            layer.remove(&widget);
        }
        if cleared {
            start_reveal(&state_detach);
        }
    });
}

pub(super) fn activate_random_petal(state: &Rc<RefCell<AppState>>) {
    let pick = {
        let st = state.borrow();
        let mut rng = rand::rng();
        st.petals.pick_random_visible(&mut rng)
    };
    if let Some(index) = pick {
        activate_petal(state, index);
    }
}

fn start_reveal(state: &Rc<RefCell<AppState>>) {
    let content = {
        let mut st = state.borrow_mut();
        if st.reveal_started || !st.petals.is_cleared() {
            return;
        }
        st.reveal_started = true;
        let Some(intro) = &st.intro else {
            return;
        };
        intro.content.clone()
    };
    log::debug!("all petals cleared, revealing countdown");

    while let Some(child) = content.first_child() {
        content.remove(&child);
    }
    let title = gtk::Label::new(Some(&gettext("✨ Perfect! ✨")));
    title.add_css_class("intro-title");
    title.add_css_class("title-1");
    title.add_css_class("fade-in-scale");
    let subtitle = gtk::Label::new(Some(&gettext("Revealing our countdown...")));
    subtitle.add_css_class("intro-subtitle");
    content.append(&title);
    content.append(&subtitle);

    let state_hide = state.clone();
    glib::timeout_add_local_once(Duration::from_millis(REVEAL_HIDE_DELAY_MS), move || {
        let root = {
            let st = state_hide.borrow();
            let Some(intro) = &st.intro else {
                return;
            };
            intro.root.clone()
        };
        root.add_css_class("hidden");
        root.set_can_target(false);

        let state_detach = state_hide.clone();
        glib::timeout_add_local_once(Duration::from_millis(REVEAL_DETACH_MS), move || {
            let mut guard = state_detach.borrow_mut();
            let st = &mut *guard;
            if let (Some(intro), Some(stage)) = (st.intro.take(), &st.stage) {
                stage.remove_overlay(&intro.root);
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_petal_side_scales_with_viewport() {
        let small = Viewport {
            width: 360.0,
            height: 560.0,
        };
        let large = Viewport {
            width: 1920.0,
            height: 1080.0,
        };
        assert_eq!(petal_side_px(small), 40);
        assert_eq!(petal_side_px(large), 72);
        assert_eq!(
            petal_side_px(Viewport {
                width: 860.0,
                height: 680.0
            }),
            56
        );
    }
}
