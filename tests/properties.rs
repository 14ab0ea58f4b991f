use image::{ImageBuffer, Rgba, RgbaImage};
use proptest::prelude::*;
use seamcarve::{
    calculate_energy, CarveError, CarveOptions, GridSearch, Lattice, SeamCarver, SeamFinder,
    SeamRemover, SearchPolicy,
};

// A small palette makes ties common, which is where the two storage
// strategies are most likely to disagree.
const PALETTE: [[u8; 4]; 5] = [
    [0, 0, 0, 255],
    [255, 255, 255, 255],
    [200, 30, 30, 128],
    [30, 200, 30, 255],
    [30, 30, 200, 0],
];

fn image_from(width: u32, height: u32, shades: &[usize]) -> RgbaImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgba(PALETTE[shades[(y * width + x) as usize] % PALETTE.len()])
    })
}

fn images() -> impl Strategy<Value = RgbaImage> {
    (2u32..10, 1u32..8).prop_flat_map(|(width, height)| {
        prop::collection::vec(0usize..PALETTE.len(), (width * height) as usize)
            .prop_map(move |shades| image_from(width, height, &shades))
    })
}

fn policies() -> impl Strategy<Value = SearchPolicy> {
    prop_oneof![Just(SearchPolicy::Backward), Just(SearchPolicy::Forward)]
}

fn is_subsequence(short: &[Rgba<u8>], long: &[Rgba<u8>]) -> bool {
    let mut long = long.iter();
    short.iter().all(|p| long.any(|q| q == p))
}

proptest! {
    #[test]
    fn carving_narrows_by_exactly_the_seams_removed(
        image in images(),
        policy in policies(),
        incremental in any::<bool>(),
        fraction in 0.0f64..1.0,
    ) {
        let (width, height) = image.dimensions();
        let target = ((f64::from(width - 1)) * fraction) as u32;
        let options = CarveOptions { policy, incremental };
        let mut carver = SeamCarver::new(image, options).unwrap();
        carver.carve(target).unwrap();
        prop_assert_eq!(carver.width(), width - target);
        prop_assert_eq!(carver.height(), height);
        prop_assert_eq!(carver.seams_removed(), target);
    }

    #[test]
    fn every_row_keeps_its_own_pixels_in_order(
        image in images(),
        policy in policies(),
        incremental in any::<bool>(),
    ) {
        let (width, height) = image.dimensions();
        let options = CarveOptions { policy, incremental };
        let mut carver = SeamCarver::new(image.clone(), options).unwrap();
        carver.carve(width / 2).unwrap();
        let carved = carver.image();
        for y in 0..height {
            let before: Vec<Rgba<u8>> = (0..width).map(|x| *image.get_pixel(x, y)).collect();
            let after: Vec<Rgba<u8>> =
                (0..carved.width()).map(|x| *carved.get_pixel(x, y)).collect();
            prop_assert!(is_subsequence(&after, &before));
        }
    }

    #[test]
    fn seams_are_connected_and_in_bounds(image in images(), policy in policies()) {
        let (width, height) = image.dimensions();
        let seam = GridSearch::new(&image, policy).find_vertical_seam();
        prop_assert_eq!(seam.len(), height as usize);
        prop_assert!(seam.validate(width, height).is_ok());
    }

    #[test]
    fn uniform_images_always_lose_column_zero(
        width in 2u32..12,
        height in 1u32..8,
        shade in 0usize..PALETTE.len(),
        policy in policies(),
    ) {
        let image: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba(PALETTE[shade]));
        let seam = GridSearch::new(&image, policy).find_vertical_seam();
        prop_assert!(seam.columns().iter().all(|x| *x == 0));
    }

    #[test]
    fn energy_is_finite_and_never_negative(image in images()) {
        let energy = calculate_energy(&image);
        prop_assert!(energy.as_slice().iter().all(|e| e.is_finite() && *e >= 0.0));
    }

    #[test]
    fn carving_nothing_leaves_the_energy_picture_alone(image in images(), policy in policies()) {
        let mut carver = SeamCarver::new(image, CarveOptions::default().with_policy(policy)).unwrap();
        let before = carver.energy_image();
        carver.carve(0).unwrap();
        prop_assert_eq!(carver.energy_image(), before);
    }

    #[test]
    fn cached_caches_match_a_full_recompute(image in images(), policy in policies()) {
        let mut lattice = Lattice::new(&image, policy).unwrap();
        while lattice.width() > 1 {
            let seam = lattice.find_vertical_seam();
            SeamRemover::remove_seam(&mut lattice, &seam).unwrap();
            let pixels = lattice.to_image();
            let search = GridSearch::new(&pixels, policy);
            prop_assert_eq!(lattice.energy_grid(), search.energy());
            prop_assert_eq!(lattice.cost_grid(), search.cost());
        }
    }

    #[test]
    fn both_storages_carve_the_same_pixels(image in images(), policy in policies()) {
        let width = image.width();
        let mut linked = SeamCarver::new(image.clone(), CarveOptions { policy, incremental: true }).unwrap();
        let mut contiguous = SeamCarver::new(image, CarveOptions { policy, incremental: false }).unwrap();
        linked.carve(width - 1).unwrap();
        contiguous.carve(width - 1).unwrap();
        prop_assert_eq!(linked.image(), contiguous.image());
    }

    #[test]
    fn removing_every_column_is_refused(image in images(), incremental in any::<bool>()) {
        let width = image.width();
        let options = CarveOptions::default().with_incremental(incremental);
        let mut carver = SeamCarver::new(image, options).unwrap();
        let refused = matches!(carver.carve(width), Err(CarveError::InvalidSeamCount { .. }));
        prop_assert!(refused);
        prop_assert_eq!(carver.seams_removed(), 0);
    }
}
