use anyhow::Result;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::io::Cursor;

/// Encode a solid `w` x `h` PNG.
#[allow(unused)]
pub fn png(w: u32, h: u32, rgba: [u8; 4]) -> Result<Vec<u8>> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// A skin directory holding `layout` and the given PNG images.
#[allow(unused)]
pub fn skin_dir(layout: &str, images: &[(&str, u32, u32)]) -> Result<TempDir> {
    let dir = TempDir::new()?;
    dir.child("layout").write_str(layout)?;
    for (name, w, h) in images {
        dir.child(name).write_binary(&png(*w, *h, [0x20, 0x40, 0x60, 0xff])?)?;
    }
    Ok(dir)
}

/// A two-part skin: the device display and a 400x600 frame with two buttons.
#[allow(unused)]
pub const TWO_PART_LAYOUT: &str = r#"
parts {
    device {
        display {
            width 320
            height 480
            x 0
            y 0
        }
    }
    portrait {
        background {
            image port_back.png
        }
        buttons {
            home {
                image key.png
                x 20
                y 540
            }
            dpad-up {
                image key.png
                x 180
                y 540
            }
        }
    }
}

layouts {
    portrait {
        width 400
        height 600
        color 0x202020
        event EV_SW:0:1

        part1 {
            name portrait
            x 0
            y 0
        }
        part2 {
            name device
            x 40
            y 60
        }
    }
}
"#;

#[allow(unused)]
pub const TWO_PART_IMAGES: &[(&str, u32, u32)] =
    &[("port_back.png", 400, 600), ("key.png", 40, 30)];
