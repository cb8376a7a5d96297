//! Terminal preview of a rendered code
//!
//! Works from the image rather than the symbol so it covers every backend.
//! The module pitch is recovered from the top edge of the upper-left finder
//! pattern, which is always seven modules of solid ink.

use crate::error::{Error, Result};
use crate::prefs::Theme;
use image::{DynamicImage, GrayImage};

const INK_THRESHOLD: u8 = 128;
const FINDER_MODULES: u32 = 7;

/// Draw `image` with half-block characters, two module rows per line.
pub fn render_terminal(image: &DynamicImage, theme: Theme) -> Result<String> {
    let gray = image.to_luma8();
    let modules = sample_modules(&gray)?;
    let n = modules.len();

    // One module of quiet zone on each side
    let dark_at = |row: isize, col: isize| -> bool {
        if row < 0 || col < 0 || row >= n as isize || col >= n as isize {
            false
        } else {
            modules[row as usize][col as usize]
        }
    };
    // Blocks print in the foreground colour, which is the light one on dark terminals.
    let ink_at = |row: isize, col: isize| dark_at(row, col) != theme.is_dark();

    let mut out = String::new();
    let mut row = -1isize;
    while row <= n as isize {
        for col in -1..=n as isize {
            let ch = match (ink_at(row, col), ink_at(row + 1, col)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            };
            out.push(ch);
        }
        out.push('\n');
        row += 2;
    }

    Ok(out)
}

/// Recover the module matrix (`true` = dark) from a rendered image.
fn sample_modules(img: &GrayImage) -> Result<Vec<Vec<bool>>> {
    let is_ink = |x: u32, y: u32| img.get_pixel(x, y).0[0] < INK_THRESHOLD;

    let (top, left) = (0..img.height())
        .find_map(|y| (0..img.width()).find(|&x| is_ink(x, y)).map(|x| (y, x)))
        .ok_or(Error::NoQrCodeFound)?;

    let run = (left..img.width()).take_while(|&x| is_ink(x, top)).count() as u32;
    let pitch = (run + FINDER_MODULES / 2) / FINDER_MODULES;
    if pitch == 0 {
        return Err(Error::Preview("finder pattern too small".to_string()));
    }

    let right = (left..img.width())
        .rev()
        .find(|&x| is_ink(x, top))
        .unwrap_or(left);
    let count = ((right - left + 1) + pitch / 2) / pitch;
    if count < 21 || (count - 21) % 4 != 0 {
        return Err(Error::Preview(format!(
            "unrecognised symbol width of {count} modules"
        )));
    }

    let centre = |index: u32, origin: u32| origin + index * pitch + pitch / 2;
    if centre(count - 1, left) >= img.width() || centre(count - 1, top) >= img.height() {
        return Err(Error::Preview("symbol extends past image bounds".to_string()));
    }

    Ok((0..count)
        .map(|r| {
            (0..count)
                .map(|c| is_ink(centre(c, left), centre(r, top)))
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{NativeBackend, RenderOptions};

    fn rendered(text: &str) -> DynamicImage {
        NativeBackend::new()
            .render_blocking(text, &RenderOptions::default())
            .unwrap()
    }

    #[test]
    fn test_preview_dimensions() {
        // "hello" fits in a version 1 symbol: 21 modules + 2 quiet = 23 columns
        let preview = render_terminal(&rendered("hello"), Theme::Light).unwrap();
        let lines: Vec<&str> = preview.lines().collect();

        assert_eq!(lines.len(), 12);
        assert!(lines.iter().all(|l| l.chars().count() == 23));
        // Finder pattern top edge is solid ink on a light terminal
        assert!(lines[0].chars().skip(1).take(7).all(|c| c == '▄'));
    }

    #[test]
    fn test_dark_theme_inverts() {
        let image = rendered("hello");
        let light = render_terminal(&image, Theme::Light).unwrap();
        let dark = render_terminal(&image, Theme::Dark).unwrap();

        let first_light: Vec<char> = light.lines().next().unwrap().chars().collect();
        let first_dark: Vec<char> = dark.lines().next().unwrap().chars().collect();
        assert_eq!(first_light[1], '▄');
        assert_eq!(first_dark[1], '▀');
    }

    #[test]
    fn test_blank_image_rejected() {
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 50, image::Luma([255])));
        assert!(matches!(
            render_terminal(&blank, Theme::Light),
            Err(Error::NoQrCodeFound)
        ));
    }
}
