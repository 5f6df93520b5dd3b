use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use gettextrs::gettext;
use gtk4 as gtk;
use gtk4::gdk;
use gtk4::prelude::*;

use crate::error::Result;

pub const UPLOAD_SLOTS: [(&str, &str); 2] = [("upload1", "image1"), ("upload2", "image2")];
const FADE_IN_MS: u64 = 500;

pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

fn declared_mime(info: &gio::FileInfo) -> Option<String> {
    let content_type = info.content_type()?;
    gio::content_type_get_mime_type(&content_type).map(|mime| mime.to_string())
}

async fn load_texture(file: &gio::File) -> Result<Option<gdk::Texture>> {
    let info = file
        .query_info_future(
            gio::FILE_ATTRIBUTE_STANDARD_CONTENT_TYPE,
            gio::FileQueryInfoFlags::NONE,
            glib::Priority::DEFAULT,
        )
        .await?;
    let mime = declared_mime(&info).unwrap_or_default();
    if !is_image_mime(&mime) {
        log::debug!("ignoring non-image selection ({mime:?})");
        return Ok(None);
    }
    let (bytes, _) = file.load_bytes_future().await?;
    Ok(Some(gdk::Texture::from_bytes(&bytes)?))
}

/// Counts fades started on one picture, so a timer from an earlier upload
/// can tell it has been superseded.
#[derive(Clone, Default)]
struct FadeGeneration(Rc<Cell<u64>>);

impl FadeGeneration {
    fn begin(&self) -> u64 {
        let next = self.0.get().wrapping_add(1);
        self.0.set(next);
        next
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.0.get() == ticket
    }
}

fn fade_in(picture: &gtk::Picture, generation: &FadeGeneration) {
    let ticket = generation.begin();
    picture.remove_css_class("fade-in");
    // Re-adding within the same frame would not restart the animation.
    let generation = generation.clone();
    picture.add_tick_callback(move |picture, _| {
        if generation.is_current(ticket) {
            picture.add_css_class("fade-in");
            glib::timeout_add_local_once(Duration::from_millis(FADE_IN_MS), {
                let picture_weak = picture.downgrade();
                let generation = generation.clone();
                move || {
                    if !generation.is_current(ticket) {
                        return;
                    }
                    if let Some(picture) = picture_weak.upgrade() {
                        picture.remove_css_class("fade-in");
                    }
                }
            });
        }
        glib::ControlFlow::Break
    });
}

fn pick_image(button: &gtk::Button, picture: &gtk::Picture, generation: &FadeGeneration) {
    let dialog = gtk::FileDialog::builder()
        .title(gettext("Choose a picture"))
        .modal(true)
        .build();
    let parent = button.root().and_downcast::<gtk::Window>();
    let picture = picture.clone();
    let generation = generation.clone();

    glib::spawn_future_local(async move {
        let file = match dialog.open_future(parent.as_ref()).await {
            Ok(file) => file,
            Err(err) => {
                log::debug!("file dialog closed without a selection: {err}");
                return;
            }
        };
        match load_texture(&file).await {
            Ok(Some(texture)) => {
                picture.set_paintable(Some(&texture));
                fade_in(&picture, &generation);
            }
            Ok(None) => {}
            Err(err) => log::warn!("{err}"),
        }
    });
}

/// One picture slot with its upload button, wired by id.
pub fn build_slot(upload_id: &str, image_id: &str) -> gtk::Box {
    let slot = gtk::Box::new(gtk::Orientation::Vertical, 8);
    slot.add_css_class("image-slot");

    let picture = gtk::Picture::builder()
        .name(image_id)
        .content_fit(gtk::ContentFit::Cover)
        .can_shrink(true)
        .width_request(180)
        .height_request(180)
        .css_classes(vec!["image-preview"])
        .build();

    let button = gtk::Button::builder()
        .name(upload_id)
        .label(gettext("Upload"))
        .css_classes(vec!["pill"])
        .halign(gtk::Align::Center)
        .build();
    button.set_tooltip_text(Some(&gettext("Choose a picture")));
    let generation = FadeGeneration::default();
    button.connect_clicked({
        let picture = picture.clone();
        move |button| pick_image(button, &picture, &generation)
    });

    slot.append(&picture);
    slot.append(&button);
    slot
}

pub fn build_gallery() -> gtk::Box {
    let gallery = gtk::Box::new(gtk::Orientation::Horizontal, 24);
    gallery.set_halign(gtk::Align::Center);
    gallery.add_css_class("gallery");
    for (upload_id, image_id) in UPLOAD_SLOTS {
        gallery.append(&build_slot(upload_id, image_id));
    }
    gallery
}
