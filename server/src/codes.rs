use std::sync::Arc;

use log::Logger;

use crate::errors::BackendError;

/// The edge, in pixels, of every generated code image: 2 cm × 2 cm at
/// 300 DPI. The printed collateral and the scanners assume this size,
/// so it is not configurable.
pub const CODE_SIZE: u32 = 236;

pub trait CodeEncoder {
    fn encode(&self, logger: Arc<Logger>, text: &str) -> Result<Vec<u8>, BackendError>;

    fn new() -> Self;
}

/// Wraps the encoder in a plain function for the environment. The
/// output is a PNG, [`CODE_SIZE`] pixels square, deterministic for a
/// given input string.
pub fn make_encoder(logger: Arc<Logger>) -> impl Fn(&str) -> Result<Vec<u8>, BackendError> {
    let encoder = inner::Encoder::new();

    move |text: &str| encoder.encode(logger.clone(), text)
}

mod inner {
    use std::sync::Arc;

    use image::imageops::FilterType;
    use image::{DynamicImage, ImageOutputFormat, Luma};
    use log::{trace, Logger};
    use qrcode::{EcLevel, QrCode};

    use super::CODE_SIZE;
    use crate::errors::BackendError;

    /// Pixels per module before resizing, and modules of quiet zone
    /// around the pattern.
    const MODULE_SIZE: u32 = 10;
    const QUIET_ZONE: bool = true;

    pub struct Encoder;

    impl super::CodeEncoder for Encoder {
        fn encode(&self, logger: Arc<Logger>, text: &str) -> Result<Vec<u8>, BackendError> {
            let code = QrCode::with_error_correction_level(text, EcLevel::L)
                .map_err(|source| BackendError::CodeGeneration { source })?;

            trace!(logger, "Rendering code..."; "text" => text, "version" => ?code.version());

            let rendered = code
                .render::<Luma<u8>>()
                .module_dimensions(MODULE_SIZE, MODULE_SIZE)
                .quiet_zone(QUIET_ZONE)
                .build();

            let resized =
                image::imageops::resize(&rendered, CODE_SIZE, CODE_SIZE, FilterType::Lanczos3);

            let mut png = Vec::new();
            DynamicImage::ImageLuma8(resized)
                .write_to(&mut png, ImageOutputFormat::Png)
                .map_err(|source| BackendError::ImageEncoding { source })?;

            Ok(png)
        }

        fn new() -> Self {
            Encoder
        }
    }
}
