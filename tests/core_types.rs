use isoline::lowlevel::{config_code, TemplateLibrary};
use isoline::{
    BinaryGrid, ImageView, IsolineError, PixelBuffer, ProceduralTemplates, Rgb, TemplateSource,
    CONTOUR_CONFIG_COUNT,
};

#[test]
fn pixel_buffer_rejects_invalid_dimensions() {
    let err = PixelBuffer::new(Vec::new(), 0, 4).err().unwrap();
    assert_eq!(
        err,
        IsolineError::InvalidDimensions {
            width: 0,
            height: 4,
        }
    );

    let err = PixelBuffer::filled(3, 0, Rgb::WHITE).err().unwrap();
    assert_eq!(
        err,
        IsolineError::InvalidDimensions {
            width: 3,
            height: 0,
        }
    );
}

#[test]
fn pixel_buffer_length_matches_dimensions() {
    let buf = PixelBuffer::filled(7, 5, Rgb::new(1, 2, 3)).unwrap();
    assert_eq!(buf.data().len(), 35);
    assert_eq!(buf.row(4).unwrap().len(), 7);
    assert!(buf.row(5).is_none());
}

#[test]
fn huge_allocation_fails_gracefully() {
    let err = PixelBuffer::filled(usize::MAX / 4, 2, Rgb::BLACK)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        IsolineError::Allocation { .. } | IsolineError::InvalidDimensions { .. }
    ));
}

#[test]
fn image_view_rejects_small_buffer() {
    let data = [Rgb::BLACK; 3];
    let err = ImageView::from_slice(&data, 2, 2).err().unwrap();
    assert_eq!(
        err,
        IsolineError::BufferSizeMismatch {
            expected: 4,
            got: 3
        }
    );
}

#[test]
fn view_rows_follow_the_width() {
    let data: Vec<Rgb> = (0u8..6).map(Rgb::gray).collect();
    let view = ImageView::from_slice(&data, 3, 2).unwrap();
    assert_eq!(view.row(1).unwrap(), &[Rgb::gray(3), Rgb::gray(4), Rgb::gray(5)]);
    assert_eq!(view.get(1, 1).copied(), Some(Rgb::gray(4)));
    assert_eq!(*view.get_clamped(-4, 9), Rgb::gray(3));
    assert!(view.get(3, 0).is_none());
}

#[test]
fn grid_is_sized_from_the_canonical_image() {
    let grid = BinaryGrid::for_image(2048, 2048, 8).unwrap();
    assert_eq!((grid.p(), grid.q()), (256, 256));
    assert_eq!(grid.cells().len(), 257 * 257);
    assert!(grid.cells().iter().all(|&v| v == 0));
}

#[test]
fn codes_are_four_bit_and_deterministic() {
    for tl in 0..2u8 {
        for tr in 0..2u8 {
            for br in 0..2u8 {
                for bl in 0..2u8 {
                    let code = config_code(tl, tr, br, bl);
                    assert!((code as usize) < CONTOUR_CONFIG_COUNT);
                    assert_eq!(code, 8 * tl + 4 * tr + 2 * br + bl);
                    assert_eq!(code, config_code(tl, tr, br, bl));
                }
            }
        }
    }
}

#[test]
fn procedural_library_loads_all_sixteen() {
    let lib = TemplateLibrary::load_all(&ProceduralTemplates::new(8), 8).unwrap();
    assert_eq!(lib.missing(), 0);
    let set = lib.complete().unwrap();
    for code in 0..CONTOUR_CONFIG_COUNT as u8 {
        let tpl = set.get(code).unwrap();
        assert_eq!((tpl.width(), tpl.height()), (8, 8));
    }
    let blank = set.get(0).unwrap();
    assert!(blank.data().iter().all(|&px| px == Rgb::WHITE));
    let line = set.get(3).unwrap();
    assert!(line.data().contains(&Rgb::BLACK));
}

#[test]
fn custom_colors_are_applied() {
    let src = ProceduralTemplates::new(4).with_colors(Rgb::BLACK, Rgb::new(255, 0, 0));
    let tpl = src.load(12).unwrap();
    assert!(tpl.data().contains(&Rgb::new(255, 0, 0)));
    assert_eq!(tpl.get(0, 0), Some(Rgb::BLACK));
}
