use crate::error::{QuoteError, QuoteResult};
use crate::layer::LayerRgba;

/// Serialize the flattened canvas to a JPEG byte buffer.
///
/// The composited card is opaque, so unpremultiplying before the RGB
/// flatten is normally a no-op; it is still done so a non-opaque input
/// cannot smuggle darkened colors into the output. No assumptions are made
/// about the codec beyond "standard viewers can decode the stream".
pub fn encode_jpeg(layer: &LayerRgba, quality: u8) -> QuoteResult<Vec<u8>> {
    let mut rgb = Vec::with_capacity((layer.width as usize) * (layer.height as usize) * 3);
    for px in layer.data.chunks_exact(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            rgb.extend_from_slice(&[0, 0, 0]);
        } else if a == 255 {
            rgb.extend_from_slice(&px[..3]);
        } else {
            for c in &px[..3] {
                rgb.push(((u16::from(*c) * 255 + a / 2) / a).min(255) as u8);
            }
        }
    }

    let mut out = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode(&rgb, layer.width, layer.height, image::ExtendedColorType::Rgb8)
        .map_err(|e| QuoteError::encode(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_a_jpeg_stream() {
        let layer = LayerRgba::solid(8, 8, [50, 60, 70, 255]);
        let bytes = encode_jpeg(&layer, 90).unwrap();
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn output_decodes_with_preserved_dimensions() {
        let layer = LayerRgba::solid(20, 10, [200, 10, 10, 255]);
        let bytes = encode_jpeg(&layer, 90).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 20);
        assert_eq!(decoded.height(), 10);

        let px = decoded.to_rgb8().get_pixel(10, 5).0;
        assert!(px[0] > 180 && px[1] < 40 && px[2] < 40);
    }

    #[test]
    fn semitransparent_input_unpremultiplies() {
        // Premultiplied half-alpha white must come back near white, not
        // half-gray.
        let layer = LayerRgba::from_premul(1, 1, vec![128, 128, 128, 128]).unwrap();
        let bytes = encode_jpeg(&layer, 100).unwrap();
        let px = image::load_from_memory(&bytes).unwrap().to_rgb8().get_pixel(0, 0).0;
        assert!(px[0] > 240);
    }
}
