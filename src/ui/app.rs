use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use gettextrs::gettext;
use gio::SimpleAction;
use gtk4 as gtk;
use gtk4::prelude::*;
use libadwaita as adw;

use adw::prelude::*;

use super::clock::{build_clock_view, start_countdown};
use super::dialogs::show_about_dialog;
use super::overlay::{build_intro_overlay, populate_petals};
use super::preview::build_gallery;
use super::state::AppState;
use crate::settings::Settings;

pub const APP_ID: &str = "io.basshift.Bloom";
const CONTENT_MARGIN: i32 = 24;

pub fn run(settings: Settings) -> glib::ExitCode {
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| {
        // Single window; a second activation just raises it.
        if let Some(win) = app.active_window() {
            win.present();
            return;
        }
        load_css();

        let state = Rc::new(RefCell::new(AppState::new(settings.clone())));

        let about_action = SimpleAction::new("about", None);
        about_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_about_dialog(&app);
            }
        });
        app.add_action(&about_action);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            move |_, _| app.quit()
        });
        app.add_action(&quit_action);
        app.set_accels_for_action("app.quit", &["<Control>q"]);

        let dynamic_css_provider = gtk::CssProvider::new();
        if let Some(display) = gtk::gdk::Display::default() {
            gtk::style_context_add_provider_for_display(
                &display,
                &dynamic_css_provider,
                gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
            );
        }
        state.borrow_mut().dynamic_css_provider = Some(dynamic_css_provider);

        let title = gtk::Label::new(None);
        title.set_markup("<b>Bloom</b>");
        title.set_halign(gtk::Align::Center);

        let header = adw::HeaderBar::builder().title_widget(&title).build();
        header.add_css_class("app-header");
        header.add_css_class("flat");

        let menu_model = gio::Menu::new();
        menu_model.append(Some(&gettext("About Bloom")), Some("app.about"));
        menu_model.append(Some(&gettext("Quit")), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();
        header.pack_end(&menu_button);

        let stage = gtk::Overlay::new();
        stage.set_hexpand(true);
        stage.set_vexpand(true);
        stage.set_child(Some(&build_main_view(&state)));

        let celebration_layer = gtk::Fixed::new();
        celebration_layer.set_hexpand(true);
        celebration_layer.set_vexpand(true);
        celebration_layer.set_can_target(false);
        celebration_layer.add_css_class("celebration-layer");
        stage.add_overlay(&celebration_layer);
        stage.set_clip_overlay(&celebration_layer, true);

        let intro = build_intro_overlay(&state);
        stage.add_overlay(&intro);

        let toolbar = adw::ToolbarView::new();
        toolbar.set_hexpand(true);
        toolbar.set_vexpand(true);
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&stage));

        let (default_width, default_height) = (settings.window_width, settings.window_height);
        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title("Bloom")
            .icon_name(APP_ID)
            .default_width(default_width)
            .default_height(default_height)
            .content(&toolbar)
            .build();
        win.set_size_request(360, 560);
        win.add_css_class("app-window");

        let style_manager = adw::StyleManager::default();
        if style_manager.is_dark() {
            win.add_css_class("theme-dark");
        } else {
            win.add_css_class("theme-light");
        }
        style_manager.connect_notify_local(Some("dark"), {
            let win = win.clone();
            move |manager, _| {
                if manager.is_dark() {
                    win.remove_css_class("theme-light");
                    win.add_css_class("theme-dark");
                } else {
                    win.remove_css_class("theme-dark");
                    win.add_css_class("theme-light");
                }
            }
        });

        {
            let mut st = state.borrow_mut();
            st.stage = Some(stage);
            st.celebration_layer = Some(celebration_layer);
        }

        // Petals need the allocated layer size, which only exists after mapping.
        win.connect_map({
            let state = state.clone();
            move |_| {
                let state = state.clone();
                glib::idle_add_local_once(move || {
                    if state.borrow().petals.petals.is_empty() {
                        populate_petals(&state);
                    }
                });
            }
        });

        start_countdown(&state);
        win.present();
    });

    app.run()
}

fn load_css() {
    static RESOURCES_INIT: Once = Once::new();
    RESOURCES_INIT.call_once(|| {
        if let Err(err) = gio::resources_register_include!("bloom.gresource") {
            log::warn!("failed to register embedded resources: {err}");
        }
    });

    let Some(display) = gtk::gdk::Display::default() else {
        return;
    };

    for resource_path in ["/io/basshift/Bloom/style.css", "/io/basshift/Bloom/style.dark.css"] {
        let provider = gtk::CssProvider::new();
        provider.load_from_resource(resource_path);
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}

fn build_main_view(state: &Rc<RefCell<AppState>>) -> gtk::ScrolledWindow {
    let content = gtk::Box::new(gtk::Orientation::Vertical, 28);
    content.set_halign(gtk::Align::Center);
    content.set_valign(gtk::Align::Center);
    content.set_margin_top(CONTENT_MARGIN);
    content.set_margin_bottom(CONTENT_MARGIN);
    content.set_margin_start(CONTENT_MARGIN);
    content.set_margin_end(CONTENT_MARGIN);
    content.add_css_class("main-content");

    content.append(&build_clock_view(state));
    content.append(&build_gallery());

    let scroller = gtk::ScrolledWindow::builder()
        .hscrollbar_policy(gtk::PolicyType::Never)
        .hexpand(true)
        .vexpand(true)
        .child(&content)
        .build();
    scroller.add_css_class("main-root");
    scroller
}
