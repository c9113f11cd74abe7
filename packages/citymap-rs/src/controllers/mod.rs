//! Headless versions of the three map screens.
//!
//! A controller owns the state a screen shows (field texts and their error
//! flags, the current image, the selection) and reports user-visible results
//! through a [`Presenter`]. Each submit awaits exactly one service call and
//! only then touches that state.

mod coordinates;
mod map_crop;
mod pixels;

pub use coordinates::CoordinatesController;
pub use map_crop::MapCropController;
pub use pixels::PixelsController;

use serde::Serialize;

use crate::field_validator::Field;
use crate::payload::MapImage;

/// Output surface of a controller: image view, dialogs, transient notices
/// and the status label.
pub trait Presenter {
    fn show_image(&mut self, image: &MapImage);
    fn show_preview(&mut self, image: &MapImage, corners: (i32, i32, i32, i32));
    fn show_error_dialog(&mut self, message: &str);
    fn notice(&mut self, message: &str);
    fn prompt(&mut self, message: &str);
}

/// How a submit or load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStatus {
    /// The submit control was inactive; nothing happened.
    Disabled,
    /// Input failed validation; no request was sent.
    Invalid,
    ServiceFailed,
    DecodeFailed,
    Shown,
}

impl SubmitStatus {
    pub fn is_shown(self) -> bool {
        self == SubmitStatus::Shown
    }
}

fn set_field_text(fields: &mut [Field], name: &str, text: &str) -> bool {
    match fields.iter_mut().find(|f| f.name == name) {
        Some(field) => {
            field.set_text(text);
            true
        }
        None => false,
    }
}

fn reset_fields(fields: &mut [Field]) {
    fields.iter_mut().for_each(Field::reset);
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use citymap_soap::{MapRequest, MapService, ServiceOutcome};

    use super::Presenter;
    use crate::payload::{encode_base64, sample_png, MapImage};

    /// Replays canned outcomes and records every request.
    pub struct FakeService {
        outcomes: Mutex<Vec<ServiceOutcome>>,
        pub requests: Mutex<Vec<MapRequest>>,
    }

    impl FakeService {
        pub fn new(outcomes: Vec<ServiceOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().rev().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<MapRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MapService for FakeService {
        async fn call(&self, request: MapRequest) -> ServiceOutcome {
            self.requests.lock().unwrap().push(request);
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| ServiceOutcome::failure("no canned outcome"))
        }
    }

    pub fn png_payload(width: u32, height: u32) -> ServiceOutcome {
        ServiceOutcome::Success(encode_base64(&sample_png(width, height)))
    }

    #[derive(Debug, Default)]
    pub struct RecordingPresenter {
        pub images: Vec<(u32, u32)>,
        pub previews: Vec<((u32, u32), (i32, i32, i32, i32))>,
        pub dialogs: Vec<String>,
        pub notices: Vec<String>,
        pub prompts: Vec<String>,
    }

    impl Presenter for RecordingPresenter {
        fn show_image(&mut self, image: &MapImage) {
            self.images.push((image.width(), image.height()));
        }

        fn show_preview(&mut self, image: &MapImage, corners: (i32, i32, i32, i32)) {
            self.previews.push(((image.width(), image.height()), corners));
        }

        fn show_error_dialog(&mut self, message: &str) {
            self.dialogs.push(message.to_string());
        }

        fn notice(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }

        fn prompt(&mut self, message: &str) {
            self.prompts.push(message.to_string());
        }
    }
}
