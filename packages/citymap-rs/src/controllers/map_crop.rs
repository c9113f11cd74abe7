use std::sync::Arc;

use citymap_soap::{MapService, ServiceOutcome};
use tracing::{debug, info, warn};

use super::{Presenter, SubmitStatus};
use crate::payload::{decode_image, DecodeError, MapImage};
use crate::selection_geometry::{
    map_display_rect_to_image_rect, ImageFrame, Point, SelectionRect, TwoTapSelection,
};

pub const PROMPT_SELECT_POINTS: &str = "Select points: upper left, down right";
pub const PROMPT_SECOND_POINT: &str = "Select another point";
pub const PROMPT_SELECTED: &str = "Selected";

/// Interactive crop: show the full map, let the user tap two corners, then
/// fetch that region as a pixel fragment.
pub struct MapCropController {
    service: Arc<dyn MapService>,
    view_size: (u32, u32),
    image: Option<MapImage>,
    frame: Option<ImageFrame>,
    selection: TwoTapSelection,
}

impl MapCropController {
    pub fn new(service: Arc<dyn MapService>, view_size: (u32, u32)) -> Self {
        Self {
            service,
            view_size,
            image: None,
            frame: None,
            selection: TwoTapSelection::Empty,
        }
    }

    pub fn image(&self) -> Option<&MapImage> {
        self.image.as_ref()
    }

    pub fn frame(&self) -> Option<&ImageFrame> {
        self.frame.as_ref()
    }

    pub fn selection(&self) -> &TwoTapSelection {
        &self.selection
    }

    /// Rectangle to draw over the map, in display coordinates.
    pub fn overlay(&self) -> Option<SelectionRect> {
        self.selection.rect()
    }

    pub fn confirm_enabled(&self) -> bool {
        self.selection.is_complete()
    }

    /// The current selection converted to image pixels.
    pub fn selection_in_image(&self) -> Option<SelectionRect> {
        self.overlay()
            .map(|rect| map_display_rect_to_image_rect(rect, self.frame.as_ref()))
    }

    pub async fn load_initial_map<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> SubmitStatus {
        info!("requesting initial map");
        let payload = match self.service.fetch_initial_map().await {
            ServiceOutcome::Success(payload) => payload,
            ServiceOutcome::Failure(message) => {
                let msg = format!("GetInitialMap error: {}", message);
                warn!("{}", msg);
                presenter.notice(&msg);
                return SubmitStatus::ServiceFailed;
            }
        };

        let image = match decode_image(&payload) {
            Ok(image) => image,
            Err(err) => {
                warn!("initial map decode failed: {}", err);
                presenter.notice(&initial_decode_message(&err));
                return SubmitStatus::DecodeFailed;
            }
        };

        let (view_w, view_h) = self.view_size;
        self.frame = ImageFrame::fit_center(image.width(), image.height(), view_w, view_h);
        debug!(width = image.width(), height = image.height(), frame = ?self.frame, "initial map decoded");

        presenter.show_image(&image);
        self.image = Some(image);
        self.selection.reset();
        presenter.prompt(PROMPT_SELECT_POINTS);
        SubmitStatus::Shown
    }

    /// Handles a tap on the map at display coordinates.
    pub fn tap<P: Presenter + ?Sized>(&mut self, point: Point, presenter: &mut P) {
        self.selection.tap(point);
        if self.selection.is_complete() {
            presenter.prompt(PROMPT_SELECTED);
        } else {
            presenter.prompt(PROMPT_SECOND_POINT);
        }
    }

    pub async fn confirm<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> SubmitStatus {
        let Some(rect) = self.selection_in_image() else {
            presenter.notice("Select two points");
            return SubmitStatus::Invalid;
        };
        let corners = rect.to_pixel_corners();
        let (x1, y1, x2, y2) = corners;

        presenter.notice("Sending selection...");
        info!(x1, y1, x2, y2, "requesting selected fragment");
        let payload = match self.service.fetch_fragment_by_pixels(x1, y1, x2, y2).await {
            ServiceOutcome::Success(payload) => payload,
            ServiceOutcome::Failure(message) => {
                let msg = format!("Service error: {}", message);
                warn!("{}", msg);
                presenter.notice(&msg);
                return SubmitStatus::ServiceFailed;
            }
        };

        match decode_image(&payload) {
            Ok(crop) => {
                presenter.show_preview(&crop, corners);
                self.selection.reset();
                SubmitStatus::Shown
            }
            Err(err) => {
                warn!("fragment decode failed: {}", err);
                let msg = match err {
                    DecodeError::Image(_) => "Cannot decode fragment image".to_string(),
                    other => format!("Decode error: {}", other),
                };
                presenter.notice(&msg);
                SubmitStatus::DecodeFailed
            }
        }
    }
}

fn initial_decode_message(err: &DecodeError) -> String {
    match err {
        DecodeError::Empty => "Decoded data empty".to_string(),
        DecodeError::Image(_) => "Cannot decode initial image".to_string(),
        DecodeError::Base64(_) => format!("Decode error: {}", err),
    }
}
