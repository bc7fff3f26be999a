//! Image acquisition: still frames from a live camera stream, or images
//! loaded from local files.

pub mod camera;
pub mod file;
pub mod mime_detect;

pub use camera::{
    CameraDevice, CameraRequest, CameraSource, CaptureSession, Facing, FfmpegCamera,
    FfmpegCameraOptions, FrameStream, StillCamera, CAMERA_UNAVAILABLE_MESSAGE, select_device,
};
pub use file::load_from_file;
pub use mime_detect::{mime_from_extension, resolve_mime, sniff_mime};
