use std::sync::Arc;

use citymap_soap::{MapService, ServiceOutcome};
use tracing::{info, warn};

use super::{reset_fields, set_field_text, Presenter, SubmitStatus};
use crate::field_validator::{all_filled, flag_empty_fields, validate_form, Field, FieldKind, NumberLocale};
use crate::payload::{decode_image, MapImage};

/// Fragment request by two pixel corners on the source map.
///
/// Unlike the coordinate form, submit is always clickable; only its visual
/// state follows whether the fields are filled.
pub struct PixelsController {
    service: Arc<dyn MapService>,
    locale: NumberLocale,
    fields: [Field; 4],
    displayed: Option<MapImage>,
}

impl PixelsController {
    pub fn new(service: Arc<dyn MapService>, locale: NumberLocale) -> Self {
        Self {
            service,
            locale,
            fields: [
                Field::new("x1", FieldKind::Pixel),
                Field::new("y1", FieldKind::Pixel),
                Field::new("x2", FieldKind::Pixel),
                Field::new("y2", FieldKind::Pixel),
            ],
            displayed: None,
        }
    }

    pub fn set_text(&mut self, name: &str, text: &str) -> bool {
        set_field_text(&mut self.fields, name, text)
    }

    pub fn set_all(&mut self, x1: &str, y1: &str, x2: &str, y2: &str) {
        for (field, text) in self.fields.iter_mut().zip([x1, y1, x2, y2]) {
            field.set_text(text);
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn submit_active(&self) -> bool {
        all_filled(&self.fields)
    }

    pub fn displayed(&self) -> Option<&MapImage> {
        self.displayed.as_ref()
    }

    pub async fn submit<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> SubmitStatus {
        if !self.submit_active() {
            flag_empty_fields(&mut self.fields);
            presenter.notice("Fill in all fields");
            return SubmitStatus::Invalid;
        }

        let Some(values) = validate_form(&mut self.fields, &self.locale) else {
            info!("pixel form rejected; request not sent");
            return SubmitStatus::Invalid;
        };
        // format check guarantees whole numbers within 0..=1000
        debug_assert!(values.iter().all(|v| v.fract() == 0.0), "pixel values must be whole: {:?}", values);
        let [x1, y1, x2, y2] = [values[0], values[1], values[2], values[3]].map(|v| v as i32);

        info!(x1, y1, x2, y2, "requesting fragment by pixels");
        let payload = match self.service.fetch_fragment_by_pixels(x1, y1, x2, y2).await {
            ServiceOutcome::Success(payload) => payload,
            ServiceOutcome::Failure(message) => {
                presenter.show_error_dialog(&message);
                return SubmitStatus::ServiceFailed;
            }
        };

        match decode_image(&payload) {
            Ok(image) => {
                presenter.show_image(&image);
                self.displayed = Some(image);
                reset_fields(&mut self.fields);
                SubmitStatus::Shown
            }
            Err(err) => {
                warn!("pixel fragment decode failed: {}", err);
                presenter.notice("Error decoding image");
                SubmitStatus::DecodeFailed
            }
        }
    }
}
