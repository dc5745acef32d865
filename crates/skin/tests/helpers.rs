use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::io::Cursor;

/// Encode a solid `w` x `h` PNG.
pub fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([0x30, 0x30, 0x30, 0xff]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A skin directory `<root>/phone` with a display part and a framed part
/// carrying `home` and `dpad-up` buttons.
#[allow(unused)]
pub fn phone_skins() -> TempDir {
    let root = TempDir::new().unwrap();
    let phone = root.child("phone");
    phone.child("layout").write_str(PHONE_LAYOUT).unwrap();
    phone.child("back.png").write_binary(&png(400, 600)).unwrap();
    phone.child("key.png").write_binary(&png(40, 30)).unwrap();
    root
}

pub const PHONE_LAYOUT: &str = r#"parts {
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
            image back.png
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
network {
    speed edge
    delay gprs
}
"#;
