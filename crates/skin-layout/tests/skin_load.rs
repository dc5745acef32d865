mod helpers;

use anyhow::Result;
use helpers::*;
use skin_layout::*;

fn load(
    dir: &assert_fs::TempDir,
    store: &mut ImageStore,
    fb: &mut MemoryFramebufferFactory,
) -> Result<SkinFile> {
    Ok(SkinFile::load_from_dir(
        dir.path(),
        store,
        Some(fb),
        &LoadOptions::default(),
    )?)
}

/// The two-part layout with an onion overlay on its portrait layout.
fn with_onion(alpha: i32) -> String {
    TWO_PART_LAYOUT.replace(
        "event EV_SW:0:1",
        &format!(
            "event EV_SW:0:1\n        onion {{\n            image onion.png\n            \
             alpha {alpha}\n        }}"
        ),
    )
}

#[test]
fn two_part_skin_derives_three_layouts() -> Result<()> {
    let dir = skin_dir(TWO_PART_LAYOUT, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    assert_eq!(file.version(), 2);
    assert_eq!(file.layouts().len(), 4);
    assert_eq!(file.parts().len(), 2 + 2 * 3);

    let names: Vec<_> = file.layouts().iter().map(|l| l.name.as_str()).collect();
    assert_eq!(
        names,
        ["portrait", "reverse_landscape", "reverse_portrait", "landscape"]
    );
    let orientations: Vec<_> = file.layouts().iter().map(|l| l.orientation).collect();
    assert_eq!(orientations, Rotation::ALL);

    let sizes: Vec<_> = file.layouts().iter().map(|l| l.size).collect();
    assert_eq!(
        sizes,
        [
            Size::new(400, 600),
            Size::new(600, 400),
            Size::new(400, 600),
            Size::new(600, 400)
        ]
    );

    // Derived parts are new parts pointing back at the authored ones.
    for part in &file.parts()[2..] {
        let source = part.derived_from().expect("derived part");
        assert!(source.0 < 2);
        assert_eq!(part.name, file.parts()[source.0].name);
    }

    assert_eq!(file.layouts()[0].color, 0xff20_2020);
    assert_eq!(file.layouts()[3].color, 0xff20_2020);
    Ok(())
}

#[test]
fn derived_layouts_place_the_display() -> Result<()> {
    let dir = skin_dir(TWO_PART_LAYOUT, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    let placed: Vec<_> = file
        .layout_ids()
        .map(|id| {
            let d = file.placed_display(id).unwrap();
            (d.rect, d.rotation)
        })
        .collect();
    assert_eq!(
        placed,
        [
            (Rect::new(40, 60, 320, 480), Rotation::Deg0),
            (Rect::new(60, 40, 480, 320), Rotation::Deg90),
            (Rect::new(40, 60, 320, 480), Rotation::Deg180),
            (Rect::new(60, 40, 480, 320), Rotation::Deg270),
        ]
    );

    // One framebuffer, shared by every rotated display.
    assert_eq!(fb.created(), &[(320, 480, 16)]);
    for id in file.layout_ids() {
        let display = file.layout_display(id).unwrap();
        let framebuffer = file.display_framebuffer(display).unwrap();
        assert_eq!((framebuffer.width(), framebuffer.height()), (320, 480));
        assert_eq!(display.owns_framebuffer(), id == file.first_layout());
    }
    Ok(())
}

#[test]
fn display_is_found_in_location_order() -> Result<()> {
    let dir = skin_dir(TWO_PART_LAYOUT, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    // The first location holds the frame, the second the device display.
    let portrait = &file.layouts()[0];
    assert!(file.part(portrait.locations[0].part).unwrap().display().is_none());

    let display = file.layout_display(file.first_layout()).unwrap();
    assert_eq!(display.rect, Rect::new(0, 0, 320, 480));
    assert_eq!(
        file.placed_display(file.first_layout()).unwrap().part,
        portrait.locations[1].part
    );
    Ok(())
}

#[test]
fn buttons_follow_the_rotation() -> Result<()> {
    let dir = skin_dir(TWO_PART_LAYOUT, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    let portrait = file.first_layout();
    let buttons = file.placed_buttons(portrait);
    assert_eq!(buttons.len(), 2);
    assert_eq!(buttons[0].keycode, KeyCode::HOME);
    assert_eq!(buttons[0].rect, Rect::new(20, 540, 40, 30));

    let hit = file.button_at(portrait, Pos::new(185, 545)).unwrap();
    assert_eq!(hit.keycode, KeyCode::DPAD_UP);
    assert!(file.button_at(portrait, Pos::new(0, 0)).is_none());

    let landscape = file.layout_by_name("reverse_landscape");
    let rects: Vec<_> = file
        .placed_buttons(landscape)
        .into_iter()
        .map(|b| (b.name, b.rect))
        .collect();
    assert_eq!(
        rects,
        [
            ("home".to_string(), Rect::new(30, 20, 30, 40)),
            ("dpad-up".to_string(), Rect::new(30, 180, 30, 40)),
        ]
    );
    Ok(())
}

#[test]
fn dpad_rotation_per_layout() -> Result<()> {
    let dir = skin_dir(TWO_PART_LAYOUT, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    let rotations: Vec<_> = file
        .layout_ids()
        .map(|id| file.layout_dpad_rotation(id))
        .collect();
    assert_eq!(rotations, Rotation::ALL);
    Ok(())
}

#[test]
fn authored_dpad_rotation_offsets_derived_layouts() -> Result<()> {
    let layout = TWO_PART_LAYOUT.replace("color 0x202020", "dpad-rotation 1");
    let dir = skin_dir(&layout, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    // Names stay in derivation order even though the rotations shift.
    let layouts: Vec<_> = file
        .layouts()
        .iter()
        .map(|l| (l.name.as_str(), l.orientation))
        .collect();
    assert_eq!(
        layouts,
        [
            ("portrait", Rotation::Deg0),
            ("reverse_landscape", Rotation::Deg180),
            ("reverse_portrait", Rotation::Deg270),
            ("landscape", Rotation::Deg0),
        ]
    );
    assert_eq!(file.layout_by_orientation(Rotation::Deg90), None);
    assert_eq!(file.layout_by_orientation(Rotation::Deg0), Some(file.first_layout()));
    Ok(())
}

#[test]
fn empty_part_fails_the_whole_load() -> Result<()> {
    let layout = TWO_PART_LAYOUT.replacen(
        "parts {",
        "parts {\n    broken {\n        background {\n            x 3\n        }\n    }",
        1,
    );
    let dir = skin_dir(&layout, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();

    let err = load(&dir, &mut store, &mut fb).unwrap_err();
    let err = err.downcast::<SkinError>()?;
    assert!(matches!(err, SkinError::EmptyPart(ref name) if name == "broken"));
    Ok(())
}

#[test]
fn layout_without_known_parts_fails() -> Result<()> {
    let layout = TWO_PART_LAYOUT
        .replace("name portrait", "name nothing")
        .replace("name device", "name other");
    let dir = skin_dir(&layout, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();

    let err = load(&dir, &mut store, &mut fb).unwrap_err();
    assert!(matches!(err.downcast::<SkinError>()?, SkinError::EmptyLayout(_)));
    Ok(())
}

#[test]
fn non_positive_version_is_rejected() -> Result<()> {
    let layout = format!("version 0\n{TWO_PART_LAYOUT}");
    let dir = skin_dir(&layout, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();

    let err = load(&dir, &mut store, &mut fb).unwrap_err();
    assert!(matches!(err.downcast::<SkinError>()?, SkinError::InvalidVersion(0)));
    Ok(())
}

#[test]
fn display_only_skin() -> Result<()> {
    let dir = skin_dir("display {\n    width 320\n    height 480\n    bpp 16\n}\n", &[])?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    assert_eq!(file.version(), 1);
    assert_eq!(file.parts().len(), 1);

    let layouts: Vec<_> = file
        .layouts()
        .iter()
        .map(|l| (l.size, l.orientation, l.locations[0].anchor))
        .collect();
    assert_eq!(
        layouts,
        [
            (Size::new(320, 480), Rotation::Deg0, Pos::new(0, 0)),
            (Size::new(480, 320), Rotation::Deg90, Pos::new(480, 0)),
            (Size::new(320, 480), Rotation::Deg180, Pos::new(320, 480)),
            (Size::new(480, 320), Rotation::Deg270, Pos::new(0, 320)),
        ]
    );

    for layout in file.layouts() {
        assert_eq!(layout.event.value, 0);
        assert_eq!(layout.color, 0xff80_8080);
    }
    assert_eq!(fb.created(), &[(320, 480, 16)]);
    Ok(())
}

#[test]
fn onion_is_rotated_twice_in_derived_layouts() -> Result<()> {
    let layout = with_onion(50);
    let mut images = TWO_PART_IMAGES.to_vec();
    images.push(("onion.png", 320, 480));
    let dir = skin_dir(&layout, &images)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    let onion = file.layouts()[1].onion.as_ref().unwrap();
    assert_eq!(onion.rotation, Rotation::Deg90);
    assert_eq!(onion.alpha, Blend::HALF);
    assert_eq!(onion.image.rotation(), Rotation::Deg270);
    assert_eq!(onion.image.size(), Size::new(480, 320));

    let portrait = file.onion_placement(file.first_layout()).unwrap();
    assert_eq!(portrait.rect, Rect::new(40, 60, 320, 480));
    assert_eq!(portrait.rotation, Rotation::Deg0);
    assert_eq!(portrait.image.blend(), Blend::HALF);

    let turned = file.onion_placement(LayoutId(1)).unwrap();
    assert_eq!(turned.rotation, Rotation::Deg180);
    assert_eq!(turned.rect, Rect::new(60, 40, 480, 320));
    Ok(())
}

#[test]
fn onion_alpha_is_clamped_to_full() -> Result<()> {
    let layout = with_onion(9999999);
    let mut images = TWO_PART_IMAGES.to_vec();
    images.push(("onion.png", 320, 480));
    let dir = skin_dir(&layout, &images)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    for layout in file.layouts() {
        assert_eq!(layout.onion.as_ref().unwrap().alpha, Blend::FULL);
    }
    let placement = file.onion_placement(file.first_layout()).unwrap();
    assert_eq!(placement.image.blend(), Blend::FULL);
    Ok(())
}

#[test]
fn extreme_button_coordinates_load() -> Result<()> {
    let layout = TWO_PART_LAYOUT.replacen("x 20\n", "x 2147483640\n", 1);
    let dir = skin_dir(&layout, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    assert_eq!(file.layouts().len(), 4);
    let frame = file.parts().iter().find(|p| p.name == "portrait").unwrap();
    assert_eq!(frame.rect.right(), i32::MAX);
    let home = file
        .button_at(file.first_layout(), Pos::new(2147483645, 545))
        .unwrap();
    assert_eq!(home.name, "home");
    for id in 0..file.layouts().len() {
        assert_eq!(file.placed_buttons(LayoutId(id)).len(), 2);
    }
    Ok(())
}

#[test]
fn missing_layout_file_is_an_io_error() -> Result<()> {
    let dir = assert_fs::TempDir::new()?;
    let mut store = ImageStore::default();
    let err = SkinFile::load_from_dir(dir.path(), &mut store, None, &LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, SkinError::Io { .. }));
    Ok(())
}

#[test]
fn shared_images_are_decoded_once() -> Result<()> {
    let dir = skin_dir(TWO_PART_LAYOUT, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    let stats = store.stats();
    assert_eq!(stats.decodes, 2);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 2);

    // Rotated parts hold uncached clones.
    let derived = &file.parts()[2];
    let bg = derived.background.as_ref().unwrap();
    assert!(!bg.image.is_cached());
    assert_eq!(bg.image.ref_count(), 1);

    drop(file);
    assert_eq!(store.stats().entries, 2);
    Ok(())
}

#[test]
fn layout_summary() -> Result<()> {
    let dir = skin_dir(TWO_PART_LAYOUT, TWO_PART_IMAGES)?;
    let mut store = ImageStore::default();
    let mut fb = MemoryFramebufferFactory::new();
    let file = load(&dir, &mut store, &mut fb)?;

    let summary = file
        .layouts()
        .iter()
        .zip(file.layout_ids())
        .map(|(layout, id)| {
            let display = file.placed_display(id).unwrap();
            format!(
                "{} {} {} {}",
                layout.name, layout.size, display.rect, display.rotation
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(summary, @r"
    portrait 400x600 320x480+40+60 0°
    reverse_landscape 600x400 480x320+60+40 90°
    reverse_portrait 400x600 320x480+40+60 180°
    landscape 600x400 480x320+60+40 270°
    ");
    Ok(())
}
