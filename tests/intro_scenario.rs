//! End-to-end scenarios driven through `Page` on a virtual clock.

use horizon::orbit::project_field;
use horizon::prelude::*;
use horizon::render::DrawCommand;

const FRAME_MS: f64 = 16.0;

fn mount_page(width: u32, height: u32, seed: f64, reduced_motion: bool) -> Page<RecordingSurface> {
    let mut page = Page::new(VirtualHost::new(0.0));
    let options = MountOptions::new(Viewport::new(width as f32, height as f32))
        .with_seed(seed)
        .with_reduced_motion(reduced_motion);
    assert!(page
        .mount(
            IntroConfig::default(),
            options,
            Some(RecordingSurface::new(width, height)),
        )
        .unwrap());
    page
}

fn command_points(command: &DrawCommand) -> Vec<Vec2> {
    match command {
        DrawCommand::Fill { .. } => Vec::new(),
        DrawCommand::Circle { center, .. } => vec![*center],
        DrawCommand::Line { from, to, .. } => vec![*from, *to],
        DrawCommand::Polygon { points, .. } => points.clone(),
        DrawCommand::RadialGradient { center, .. } => vec![*center],
    }
}

#[test]
fn hundred_frames_then_wheel_dismissal() {
    let mut page = mount_page(1920, 1080, 42.0, false);
    let config = IntroConfig::default();

    let intro = page.intro().unwrap();
    assert_eq!(intro.field().len(), 800);

    for frame in 1..=100u64 {
        page.advance(FRAME_MS);
        let intro = page.intro().unwrap();
        assert_eq!(intro.frames_rendered(), frame);

        let list = intro.last_frame().unwrap();
        for command in list {
            for point in command_points(command) {
                assert!(point.is_finite(), "non-finite point at frame {frame}");
            }
        }

        let t = intro.clock().elapsed();
        let projected = project_field(intro.field(), t, intro.viewport().center(), &config.motion);
        assert!(projected.windows(2).all(|w| w[0].depth <= w[1].depth));
        // Background, visible particles, then the three overlay commands.
        assert_eq!(list.len(), projected.len() + 4);
    }

    page.dispatch(InputEvent::Wheel { delta_y: 120.0 });
    let intro = page.intro().unwrap();
    assert!(matches!(intro.phase(), Phase::FadingOut { .. }));
    assert_eq!(page.host().pending_frames(), 0);

    // Further input no longer reaches the intro.
    page.dispatch(InputEvent::Wheel { delta_y: 120.0 });
    page.dispatch(InputEvent::Key(KeyCode::Escape));
    assert_eq!(page.handler_invocations(), 1);

    page.advance(600.0);
    page.present();
    let opacity = page.intro().unwrap().surface().unwrap().last_opacity();
    assert!((opacity - 0.5).abs() < 1e-3, "opacity {opacity}");
    assert_eq!(page.completions(), 0);

    page.advance(600.0);
    assert_eq!(page.completions(), 1);
    assert!(!page.is_mounted());

    page.advance(5000.0);
    assert_eq!(page.completions(), 1);
}

#[test]
fn same_seed_same_frames() {
    let mut a = mount_page(1280, 720, 7.5, false);
    let mut b = mount_page(1280, 720, 7.5, false);
    a.advance(500.0);
    b.advance(500.0);
    assert_eq!(
        a.intro().unwrap().last_frame(),
        b.intro().unwrap().last_frame()
    );
}

#[test]
fn narrow_viewport_uses_low_tier() {
    let page = mount_page(767, 900, 1.0, false);
    assert_eq!(page.intro().unwrap().field().len(), 400);
    let page = mount_page(768, 900, 1.0, false);
    assert_eq!(page.intro().unwrap().field().len(), 800);
}

#[test]
fn rapid_triggers_fade_once() {
    let mut page = mount_page(1024, 768, 3.0, false);
    page.advance(100.0);

    page.dispatch(InputEvent::Key(KeyCode::Space));
    page.dispatch(InputEvent::Key(KeyCode::Enter));
    page.dispatch(InputEvent::Scroll { offset_y: 400.0 });
    page.dispatch(InputEvent::Wheel { delta_y: 30.0 });

    assert_eq!(page.host().timers_set(), 1);
    page.advance(2000.0);
    assert_eq!(page.completions(), 1);
}

#[test]
fn small_scroll_does_not_dismiss() {
    let mut page = mount_page(1024, 768, 3.0, false);
    page.dispatch(InputEvent::Scroll { offset_y: 50.0 });
    page.dispatch(InputEvent::Wheel { delta_y: -40.0 });
    page.dispatch(InputEvent::Key(KeyCode::Down));
    page.advance(3000.0);
    assert_eq!(page.completions(), 0);
    assert_eq!(page.intro().unwrap().phase(), Phase::Presenting);
}

#[test]
fn reduced_motion_skips_animation() {
    let mut page = mount_page(1920, 1080, 42.0, true);
    assert_eq!(page.host().listener_count(), 0);

    page.advance(499.0);
    assert_eq!(page.intro().unwrap().phase(), Phase::Presenting);

    page.advance(1.0);
    assert!(matches!(page.intro().unwrap().phase(), Phase::FadingOut { .. }));

    page.advance(1200.0);
    assert_eq!(page.completions(), 1);
    assert_eq!(page.host().frames_requested(), 0);
}

#[test]
fn unmount_stops_everything() {
    let mut page = mount_page(1920, 1080, 9.0, false);
    page.advance(320.0);
    let frames = page.intro().unwrap().frames_rendered();
    assert_eq!(frames, 20);

    page.unmount();
    assert_eq!(page.host().listener_count(), 0);
    assert_eq!(page.host().pending_frames(), 0);

    let before = page.handler_invocations();
    page.dispatch(InputEvent::Resize { width: 800, height: 600 });
    page.dispatch(InputEvent::Scroll { offset_y: 900.0 });
    page.dispatch(InputEvent::Wheel { delta_y: 100.0 });
    page.dispatch(InputEvent::Key(KeyCode::Escape));
    page.advance(5000.0);

    assert_eq!(page.handler_invocations(), before);
    assert_eq!(page.completions(), 0);
    assert!(!page
        .mount(
            IntroConfig::default(),
            MountOptions::new(Viewport::new(800.0, 600.0)),
            None,
        )
        .unwrap());
}

#[test]
fn resize_mid_animation_keeps_field() {
    let mut page = mount_page(1920, 1080, 5.0, false);
    page.advance(160.0);
    let before = page.intro().unwrap().field().clone();

    page.dispatch(InputEvent::Resize { width: 600, height: 900 });
    page.advance(16.0);

    let intro = page.intro().unwrap();
    assert_eq!(intro.field(), &before);
    assert_eq!(intro.surface().unwrap().size(), (600, 900));
    assert_eq!(intro.last_frame().unwrap().viewport(), Viewport::new(600.0, 900.0));
}

#[test]
fn pixel_snapshot_shows_dark_core() {
    let config = IntroConfig::default();
    let viewport = Viewport::new(320.0, 240.0);
    let field = ParticleField::generate(SessionSeed::new(42.0), viewport, &config.field);
    let frame = compose_frame(&field, 2000.0, viewport, &config);

    let mut surface = PixelSurface::new(320, 240);
    surface.draw(&frame, 1.0).unwrap();

    let core = surface.pixel(160, 120);
    assert!(core[0] < 8 && core[1] < 8 && core[2] < 8, "core {core:?}");
}
