// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Camera access and image attachments for the report page.
//!
//! The browser owns the actual camera. This module models it as a
//! [`MediaDevices`] implementation handing out [`MediaStream`]s, and wraps
//! an open stream in a [`CameraSession`] that stops every track when it is
//! stopped, captured from, or dropped. A page holding a `CameraSession`
//! cannot leak the device.

use serde::Serialize;
use std::future::Future;

/// Largest image accepted from the gallery picker.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// File name given to frames captured from the camera.
pub const CAPTURED_FILE_NAME: &str = "waste-image.jpg";

/// An image ready to be uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Build an attachment from a picked file, enforcing type and size.
    pub fn from_upload(
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Self, CaptureError> {
        let content_type = content_type.unwrap_or("application/octet-stream");
        if !content_type.starts_with("image/") {
            return Err(CaptureError::NotAnImage(content_type.to_string()));
        }
        if bytes.is_empty() {
            return Err(CaptureError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(CaptureError::TooLarge(bytes.len()));
        }

        Ok(Self {
            file_name: file_name.unwrap_or("upload").to_string(),
            content_type: content_type.to_string(),
            bytes,
        })
    }

    /// Wrap a JPEG frame rasterized from the live camera view.
    pub fn from_frame(jpeg: Vec<u8>) -> Self {
        Self {
            file_name: CAPTURED_FILE_NAME.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: jpeg,
        }
    }

    /// Metadata only; the bytes never go into view models.
    pub fn summary(&self) -> AttachmentSummary {
        AttachmentSummary {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            size: self.bytes.len(),
        }
    }
}

/// What the page shows about a chosen image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentSummary {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// Camera and image errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("Camera access denied or not available")]
    Unavailable,

    #[error("Camera is not running")]
    NotRunning,

    #[error("Could not capture a frame: {0}")]
    Frame(String),

    #[error("Selected file is not an image ({0})")]
    NotAnImage(String),

    #[error("Selected file is empty")]
    Empty,

    #[error("Image is too large ({0} bytes, max 5MB)")]
    TooLarge(usize),
}

/// Camera request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    /// Prefer the rear ("environment") camera
    pub rear_facing: bool,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            rear_facing: true,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// A live media stream (one or more hardware tracks).
pub trait MediaStream {
    /// Stop every track. Must be idempotent.
    fn stop_tracks(&mut self);

    /// Number of tracks still running.
    fn live_tracks(&self) -> usize;

    /// Rasterize the current video frame as JPEG.
    fn grab_frame(&mut self) -> Result<Vec<u8>, CaptureError>;
}

/// Source of camera streams.
pub trait MediaDevices {
    type Stream: MediaStream;

    fn open_camera(
        &self,
        constraints: CameraConstraints,
    ) -> impl Future<Output = Result<Self::Stream, CaptureError>> + Send;
}

/// Devices for contexts with no camera (server-side gallery uploads).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

/// Stream type of [`NoCamera`]; never constructed.
#[derive(Debug)]
pub enum NoStream {}

impl MediaStream for NoStream {
    fn stop_tracks(&mut self) {
        match *self {}
    }

    fn live_tracks(&self) -> usize {
        match *self {}
    }

    fn grab_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
        match *self {}
    }
}

impl MediaDevices for NoCamera {
    type Stream = NoStream;

    async fn open_camera(&self, _: CameraConstraints) -> Result<NoStream, CaptureError> {
        Err(CaptureError::Unavailable)
    }
}

/// An open camera. Tracks are stopped on [`stop`](Self::stop),
/// after [`capture`](Self::capture), and on drop.
pub struct CameraSession<S: MediaStream> {
    stream: Option<S>,
}

impl<S: MediaStream> CameraSession<S> {
    pub async fn open<D>(devices: &D, constraints: CameraConstraints) -> Result<Self, CaptureError>
    where
        D: MediaDevices<Stream = S>,
    {
        let stream = devices.open_camera(constraints).await?;
        tracing::debug!(tracks = stream.live_tracks(), "Camera stream opened");
        Ok(Self {
            stream: Some(stream),
        })
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Take a still image and release the camera.
    pub fn capture(mut self) -> Result<ImageAttachment, CaptureError> {
        let stream = self.stream.as_mut().ok_or(CaptureError::NotRunning)?;
        let frame = stream.grab_frame();
        self.stop();
        frame.map(ImageAttachment::from_frame)
    }

    /// Release the camera.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
            tracing::debug!("Camera stream stopped");
        }
    }
}

impl<S: MediaStream> Drop for CameraSession<S> {
    fn drop(&mut self) {
        self.stop();
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeCamera;
    use super::*;

    #[tokio::test]
    async fn test_capture_releases_tracks() {
        let camera = FakeCamera::default();
        let session = CameraSession::open(&camera, CameraConstraints::default())
            .await
            .unwrap();
        assert_eq!(camera.live_tracks(), 1);

        let image = session.capture().unwrap();
        assert_eq!(image.file_name, CAPTURED_FILE_NAME);
        assert_eq!(image.content_type, "image/jpeg");
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_tracks() {
        let camera = FakeCamera::default();
        {
            let _session = CameraSession::open(&camera, CameraConstraints::default())
                .await
                .unwrap();
            assert_eq!(camera.live_tracks(), 1);
        }
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let camera = FakeCamera::default();
        let mut session = CameraSession::open(&camera, CameraConstraints::default())
            .await
            .unwrap();
        session.stop();
        session.stop();
        assert!(!session.is_running());
        drop(session);
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_no_camera_is_unavailable() {
        let err = CameraSession::open(&NoCamera, CameraConstraints::default())
            .await
            .err()
            .unwrap();
        assert_eq!(err, CaptureError::Unavailable);
        assert_eq!(err.to_string(), "Camera access denied or not available");
    }

    #[test]
    fn test_upload_checks() {
        assert!(ImageAttachment::from_upload(Some("a.png"), Some("image/png"), vec![1]).is_ok());
        assert_eq!(
            ImageAttachment::from_upload(Some("a.txt"), Some("text/plain"), vec![1]),
            Err(CaptureError::NotAnImage("text/plain".to_string()))
        );
        assert_eq!(
            ImageAttachment::from_upload(None, Some("image/png"), vec![]),
            Err(CaptureError::Empty)
        );
        assert!(matches!(
            ImageAttachment::from_upload(None, Some("image/jpeg"), vec![0; MAX_IMAGE_BYTES + 1]),
            Err(CaptureError::TooLarge(_))
        ));
    }
}
