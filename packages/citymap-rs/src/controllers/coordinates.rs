use std::sync::Arc;

use citymap_soap::{MapService, ServiceOutcome};
use tracing::{info, warn};

use super::{reset_fields, set_field_text, Presenter, SubmitStatus};
use crate::field_validator::{all_filled, validate_form, Field, FieldKind, NumberLocale};
use crate::payload::{decode_image, MapImage};

/// Fragment request by two geographic corners.
pub struct CoordinatesController {
    service: Arc<dyn MapService>,
    locale: NumberLocale,
    fields: [Field; 4],
    displayed: Option<MapImage>,
}

impl CoordinatesController {
    pub fn new(service: Arc<dyn MapService>, locale: NumberLocale) -> Self {
        Self {
            service,
            locale,
            fields: [
                Field::new("lat1", FieldKind::Latitude),
                Field::new("lon1", FieldKind::Longitude),
                Field::new("lat2", FieldKind::Latitude),
                Field::new("lon2", FieldKind::Longitude),
            ],
            displayed: None,
        }
    }

    /// Updates one field by name (`lat1`, `lon1`, `lat2`, `lon2`).
    pub fn set_text(&mut self, name: &str, text: &str) -> bool {
        set_field_text(&mut self.fields, name, text)
    }

    pub fn set_all(&mut self, lat1: &str, lon1: &str, lat2: &str, lon2: &str) {
        for (field, text) in self.fields.iter_mut().zip([lat1, lon1, lat2, lon2]) {
            field.set_text(text);
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Submit is active only while every field has text.
    pub fn submit_enabled(&self) -> bool {
        all_filled(&self.fields)
    }

    pub fn displayed(&self) -> Option<&MapImage> {
        self.displayed.as_ref()
    }

    pub async fn submit<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> SubmitStatus {
        if !self.submit_enabled() {
            return SubmitStatus::Disabled;
        }

        let Some(values) = validate_form(&mut self.fields, &self.locale) else {
            info!("coordinate form rejected; request not sent");
            return SubmitStatus::Invalid;
        };
        let (lat1, lon1, lat2, lon2) = (values[0], values[1], values[2], values[3]);

        info!(lat1, lon1, lat2, lon2, "requesting fragment by coordinates");
        let outcome = self
            .service
            .fetch_fragment_by_coordinates(lat1, lon1, lat2, lon2)
            .await;

        let payload = match outcome {
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
                warn!("coordinate fragment decode failed: {}", err);
                presenter.notice("Error decoding image");
                SubmitStatus::DecodeFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::testing::{png_payload, FakeService, RecordingPresenter};
    use crate::field_validator::FieldError;
    use citymap_soap::{CoordinatePair, MapRequest};

    fn controller(service: &Arc<FakeService>) -> CoordinatesController {
        CoordinatesController::new(service.clone(), NumberLocale::en_us())
    }

    #[tokio::test]
    async fn test_submit_disabled_until_all_filled() {
        let service = Arc::new(FakeService::new(vec![]));
        let mut c = controller(&service);
        c.set_text("lat1", "52.2297");
        c.set_text("lon1", "21.0122");
        c.set_text("lat2", "52.1000");
        assert!(!c.submit_enabled());

        let mut presenter = RecordingPresenter::default();
        assert_eq!(c.submit(&mut presenter).await, SubmitStatus::Disabled);
        assert!(service.requests().is_empty());

        assert!(c.set_text("lon2", "21.5000"));
        assert!(c.submit_enabled());
        assert!(!c.set_text("altitude", "1"));
    }

    #[tokio::test]
    async fn test_out_of_range_latitude_sends_nothing() {
        let service = Arc::new(FakeService::new(vec![]));
        let mut c = controller(&service);
        c.set_all("95.0", "21.0122", "52.1000", "21.5000");

        let mut presenter = RecordingPresenter::default();
        assert_eq!(c.submit(&mut presenter).await, SubmitStatus::Invalid);
        assert!(service.requests().is_empty());
        assert_eq!(
            c.field("lat1").unwrap().error(),
            Some(&FieldError::Range { label: "Latitude".into(), min: -90.0, max: 90.0 })
        );
        assert!(c.field("lon1").unwrap().error().is_none());
        assert!(presenter.dialogs.is_empty());
    }

    #[tokio::test]
    async fn test_valid_submit_requests_coordinates_and_clears() {
        let service = Arc::new(FakeService::new(vec![png_payload(8, 6)]));
        let mut c = controller(&service);
        c.set_all("52.2297", "21.0122", "52.1000", "21.5000");

        let mut presenter = RecordingPresenter::default();
        assert_eq!(c.submit(&mut presenter).await, SubmitStatus::Shown);
        assert_eq!(
            service.requests(),
            vec![MapRequest::FragmentByCoordinates {
                first: CoordinatePair::new(52.2297, 21.0122),
                second: CoordinatePair::new(52.1, 21.5),
            }]
        );
        assert_eq!(presenter.images, vec![(8, 6)]);
        assert!(c.fields().iter().all(|f| f.text().is_empty() && f.error().is_none()));
        assert!(!c.submit_enabled());
        assert_eq!(c.displayed().map(|i| i.width()), Some(8));
    }

    #[tokio::test]
    async fn test_service_failure_shows_dialog_and_keeps_fields() {
        let service = Arc::new(FakeService::new(vec![ServiceOutcome::Failure(
            "ERROR: tag ImageInBase64 not found".into(),
        )]));
        let mut c = controller(&service);
        c.set_all("52.2297", "21.0122", "52.1000", "21.5000");

        let mut presenter = RecordingPresenter::default();
        assert_eq!(c.submit(&mut presenter).await, SubmitStatus::ServiceFailed);
        assert_eq!(presenter.dialogs, vec!["ERROR: tag ImageInBase64 not found"]);
        assert_eq!(c.field("lat1").unwrap().text(), "52.2297");
        assert!(c.submit_enabled());
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_a_notice() {
        let service = Arc::new(FakeService::new(vec![ServiceOutcome::Success("Zm9v".into())]));
        let mut c = controller(&service);
        c.set_all("52.2297", "21.0122", "52.1000", "21.5000");

        let mut presenter = RecordingPresenter::default();
        assert_eq!(c.submit(&mut presenter).await, SubmitStatus::DecodeFailed);
        assert_eq!(presenter.notices, vec!["Error decoding image"]);
        assert!(presenter.dialogs.is_empty());
        assert!(c.displayed().is_none());
    }
}
