use image::RgbImage;

fn clamp(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

fn to_rgb_pixel(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;

    [
        clamp((298 * c + 409 * e + 128) >> 8),
        clamp((298 * c - 100 * d - 208 * e + 128) >> 8),
        clamp((298 * c + 516 * d + 128) >> 8),
    ]
}

/// Convert a packed YUYV 4:2:2 capture buffer. `None` if the buffer is too
/// short for the given size or the width is odd.
pub fn to_rgb(frame: &[u8], width: u32, height: u32) -> Option<RgbImage> {
    let (w, h) = (width as usize, height as usize);
    if w % 2 != 0 || frame.len() < w * h * 2 {
        return None;
    }

    let mut image = RgbImage::new(width, height);
    for (src, dst) in frame.chunks_exact(4).zip(image.chunks_exact_mut(6)).take(w * h / 2) {
        let (y1, u, y2, v) = (src[0], src[1], src[2], src[3]);

        dst[0..3].copy_from_slice(&to_rgb_pixel(y1, u, v));
        dst[3..6].copy_from_slice(&to_rgb_pixel(y2, u, v));
    }

    Some(image)
}
