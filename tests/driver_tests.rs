//! Integration tests for the render loop driver, using a spy backend.


use fixtures::{
    failing_factory, lose_current_context, spy_factory, spy_factory_with_limit, test_config,
    SpyLog,
};
use particle_field::{FieldConfig, FrameStatus, LifecycleState, ParticleField, PerformanceTier};

fn spy_field(width: u32, height: u32) -> (ParticleField, std::rc::Rc<std::cell::RefCell<SpyLog>>) {
    let log = SpyLog::shared();
    let field = ParticleField::with_backend_factory(test_config(), width, height, spy_factory(log.clone()));
    (field, log)
}

/// Run frames at `fps` from `start` for `secs` seconds. Returns the last status.
fn run_frames(field: &mut ParticleField, start: f64, secs: f64, fps: f64) -> FrameStatus {
    let frames = (secs * fps).round() as usize;
    let mut status = FrameStatus::Skipped;
    for i in 0..=frames {
        status = field.frame(start + i as f64 / fps);
    }
    status
}

// ==================== Lifecycle ====================

#[test]
fn test_first_frame_initializes_and_draws() {
    let (mut field, log) = spy_field(1920, 1080);
    assert_eq!(field.state(), LifecycleState::Uninitialized);

    assert_eq!(field.frame(100.0), FrameStatus::Rendered);
    assert_eq!(field.state(), LifecycleState::Running);

    let log = log.borrow();
    assert_eq!(log.created, 1);
    assert_eq!(log.uploads, 1);
    assert_eq!(log.draws, 1);
    assert_eq!(log.last_count, 80);
    let uniforms = log.last_uniforms.unwrap();
    assert_eq!(uniforms.resolution, [1920.0, 1080.0]);
    assert_eq!(uniforms.global_opacity, 0.6);
    assert_eq!(uniforms.visible, 1.0);
}

#[test]
fn test_explicit_initialize() {
    let (mut field, log) = spy_field(800, 600);
    assert_eq!(field.initialize(), LifecycleState::Running);
    assert_eq!(field.initialize(), LifecycleState::Running);
    assert_eq!(log.borrow().created, 1);
}

#[test]
fn test_no_backend_disables_quietly() {
    let mut field = ParticleField::with_backend_factory(test_config(), 800, 600, failing_factory());
    assert_eq!(field.frame(0.0), FrameStatus::Disabled);
    assert_eq!(field.state(), LifecycleState::Disabled);
    assert!(!FrameStatus::Disabled.should_continue());
    // Inputs are still accepted while disabled.
    field.pointer_moved(10.0, 10.0);
    field.set_dominant_color("#ff0000");
    field.resize(640, 480);
}

// ==================== Disposal ====================

#[test]
fn test_destroy_twice_releases_once() {
    let (mut field, log) = spy_field(800, 600);
    run_frames(&mut field, 0.0, 0.5, 60.0);

    field.destroy();
    field.destroy();
    assert_eq!(field.state(), LifecycleState::Disposed);
    assert_eq!(log.borrow().releases, 1);

    let draws = log.borrow().draws;
    assert_eq!(field.frame(10.0), FrameStatus::Stopped);
    assert_eq!(log.borrow().draws, draws);

    drop(field);
    assert_eq!(log.borrow().releases, 1);
}

#[test]
fn test_destroy_before_initialization() {
    let (mut field, log) = spy_field(800, 600);
    field.destroy();
    field.destroy();
    assert_eq!(field.frame(0.0), FrameStatus::Stopped);
    let log = log.borrow();
    assert_eq!(log.created, 0);
    assert_eq!(log.releases, 0);
}

#[test]
fn test_drop_releases_backend() {
    let (mut field, log) = spy_field(800, 600);
    field.frame(0.0);
    drop(field);
    assert_eq!(log.borrow().releases, 1);
}

// ==================== Failure handling ====================

#[test]
fn test_context_loss_reinitializes() {
    let (mut field, log) = spy_field(800, 600);
    run_frames(&mut field, 0.0, 0.2, 60.0);

    lose_current_context(&log);
    assert_eq!(field.frame(1.0), FrameStatus::Rendered);
    assert_eq!(field.state(), LifecycleState::Running);
    assert_eq!(field.reinit_count(), 1);

    let log = log.borrow();
    assert_eq!(log.created, 2);
    assert_eq!(log.releases, 1);
}

#[test]
fn test_context_loss_without_recovery_disables() {
    let log = SpyLog::shared();
    let mut field =
        ParticleField::with_backend_factory(test_config(), 800, 600, spy_factory_with_limit(log.clone(), 1));
    assert_eq!(field.frame(0.0), FrameStatus::Rendered);

    lose_current_context(&log);
    assert_eq!(field.frame(0.1), FrameStatus::Disabled);
    assert_eq!(field.state(), LifecycleState::Disabled);
    assert_eq!(log.borrow().releases, 1);

    field.destroy();
    assert_eq!(log.borrow().releases, 1);
}

#[test]
fn test_upload_failure_skips_frame_then_recovers() {
    let (mut field, log) = spy_field(800, 600);
    assert_eq!(field.frame(0.0), FrameStatus::Rendered);

    log.borrow_mut().fail_uploads = true;
    assert_eq!(field.frame(0.016), FrameStatus::Skipped);
    assert!(FrameStatus::Skipped.should_continue());
    assert_eq!(log.borrow().draws, 1);

    log.borrow_mut().fail_uploads = false;
    assert_eq!(field.frame(0.032), FrameStatus::Rendered);
    assert_eq!(log.borrow().draws, 2);
}

#[test]
fn test_non_monotonic_timestamp_skipped() {
    let (mut field, log) = spy_field(800, 600);
    field.frame(5.0);
    assert_eq!(field.frame(4.0), FrameStatus::Skipped);
    assert_eq!(log.borrow().draws, 1);
}

// ==================== Inbound events ====================

#[test]
fn test_resize_forwarded_and_zero_ignored() {
    let (mut field, log) = spy_field(1920, 1080);
    field.frame(0.0);
    field.resize(320, 480);
    field.resize(0, 480);
    assert_eq!(log.borrow().resizes, vec![(320, 480)]);
    assert_eq!(field.particle_count(), 19);

    field.frame(0.016);
    assert_eq!(log.borrow().last_count, 19);
    assert_eq!(log.borrow().last_uniforms.unwrap().resolution, [320.0, 480.0]);
}

#[test]
fn test_visibility_shrinks_field() {
    let (mut field, log) = spy_field(1920, 1080);
    field.frame(0.0);
    field.set_visible(false);
    field.frame(0.016);
    assert_eq!(field.particle_count(), 48);
    assert_eq!(log.borrow().last_uniforms.unwrap().visible, 0.0);
}

#[test]
fn test_dominant_color_sets_target() {
    let (mut field, _log) = spy_field(800, 600);
    field.set_dominant_color("#00ff88");
    let target = field.simulation().global_color().target;
    assert_eq!(target.to_array(), [0.0, 1.0, 136.0 / 255.0]);

    field.set_dominant_color("#zzzzzz");
    assert_eq!(field.simulation().global_color().target, target);
}

#[test]
fn test_wallpaper_change_before_first_frame() {
    let (mut field, _log) = spy_field(1280, 720);
    field.trigger_wallpaper_change();
    // Host clock is far from zero; the ramp still starts at the first frame.
    run_frames(&mut field, 5000.0, 0.4, 60.0);
    let amount = field.simulation().disperse_amount();
    assert!(amount > 0.0 && amount < 1.0, "amount {amount}");

    run_frames(&mut field, 5000.5, 2.0, 60.0);
    assert_eq!(field.simulation().disperse_amount(), 0.0);
    assert!(!field.simulation().is_transitioning());
}

#[test]
fn test_bookmark_hover_reaches_simulation() {
    let (mut field, _log) = spy_field(800, 600);
    field.set_bookmark_hover(120.0, 80.0, true);
    let hover = field.simulation().interaction().hover;
    assert!(hover.active);
    assert_eq!(hover.position.to_array(), [120.0, 80.0]);
}

#[test]
fn test_set_config_applies_count_and_opacity() {
    let (mut field, log) = spy_field(1920, 1080);
    field.set_config(FieldConfig {
        particle_count: 120,
        opacity: 0.3,
        ..test_config()
    });
    field.frame(0.0);
    assert_eq!(field.particle_count(), 120);
    assert_eq!(log.borrow().last_uniforms.unwrap().global_opacity, 0.3);
}

// ==================== Performance ====================

#[test]
fn test_sustained_low_frame_rate_downgrades_once() {
    let (mut field, _log) = spy_field(1920, 1080);
    // 20 fps for 4.5 s: three one-second samples below 45 drop to medium,
    // the fourth alone is not enough to reach low.
    run_frames(&mut field, 0.0, 4.5, 20.0);
    assert_eq!(field.tier(), PerformanceTier::Medium);
    assert_eq!(field.particle_count(), 64);
}

#[test]
fn test_host_fps_replaces_internal_sampling() {
    let (mut field, _log) = spy_field(1920, 1080);
    field.update_fps(60.0);
    run_frames(&mut field, 0.0, 5.0, 20.0);
    assert_eq!(field.tier(), PerformanceTier::High);

    for fps in [50.0, 50.0, 40.0, 40.0, 40.0, 40.0] {
        field.update_fps(fps);
    }
    assert_eq!(field.tier(), PerformanceTier::Medium);
}

#[test]
fn test_reset_tier_restores_high() {
    let (mut field, _log) = spy_field(1920, 1080);
    field.set_tier(PerformanceTier::Low);
    field.frame(0.0);
    assert_eq!(field.particle_count(), 40);

    field.reset_tier();
    assert_eq!(field.tier(), PerformanceTier::High);
    run_frames(&mut field, 0.1, 3.5, 60.0);
    assert_eq!(field.particle_count(), 80);
}
