//! End-to-end flow: scroll offset -> progress -> scene frame -> particle
//! surfaces composited over the background.

use firstlight::{
    Director, Narrative, RegionGeometry, ScrollTracker, SparkRenderer, StarRenderer, Surface,
    Viewport, composite,
};

#[test]
fn scroll_to_pixels() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let viewport = Viewport::new(200, 150);

    let mut tracker = ScrollTracker::full_range();
    tracker.set_geometry(RegionGeometry::new(0.0, 6000.0, 1000.0));
    let progress = tracker.set_offset(2500.0);
    assert_eq!(progress, 0.5);

    let mut director = Director::new(Narrative::night_to_dawn()).unwrap();
    let scene = director.evaluate(progress).unwrap();
    assert!(scene.triggers["first-light"]);

    let mut background = Surface::new(viewport).unwrap();
    background.clear(scene.background);

    let mut stars = StarRenderer::new(60, viewport, 21).unwrap();
    stars.render_frame(scene.opacities["stars"]).unwrap();
    composite::over_in_place(background.data_mut(), stars.surface().data(), 1.0).unwrap();

    let mut sparks = SparkRenderer::new(20, viewport, 22).unwrap();
    sparks.tick(1.0 / 60.0).unwrap();
    composite::over_in_place(background.data_mut(), sparks.surface().data(), 1.0).unwrap();

    // The page stays fully opaque and mostly background-colored; stars
    // brighten scattered pixels on top.
    let expected = scene.background.to_rgba8_premul();
    let mut background_pixels = 0usize;
    let mut total = 0usize;
    for px in background.data().chunks_exact(4) {
        total += 1;
        assert_eq!(px[3], 255);
        if px == expected.as_slice() {
            background_pixels += 1;
        }
    }
    assert!(background_pixels > total / 2);
    assert!(background_pixels < total);
}

#[test]
fn sparks_mount_only_after_first_light() {
    let viewport = Viewport::new(64, 64);
    let mut director = Director::new(Narrative::night_to_dawn()).unwrap();

    let scene = director.evaluate(0.1).unwrap();
    assert!(!scene.triggers["first-light"]);

    let scene = director.evaluate(0.3).unwrap();
    assert!(scene.triggers["first-light"]);

    // Once mounted, the spark field keeps running regardless of progress
    // moving back below the threshold.
    let mut sparks = SparkRenderer::new(10, viewport, 3).unwrap();
    sparks.tick(0.5).unwrap();

    let scene = director.evaluate(0.05).unwrap();
    assert!(scene.triggers["first-light"]);
    sparks.tick(0.5).unwrap();
}
