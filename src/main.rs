//! Headless driver: runs the scheduling core against a simulated 60 Hz clock
//! and logs what happens. Useful for watching timer, tween and throttled
//! render behavior without a browser.
//!
//! Honors the `FRAMEKIT_*` variables read by [`Config::from_env`], plus
//! `FRAMEKIT_SIM_MS` (simulated duration, default 2000).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use framekit::component::Component;
use framekit::interpolation::{all_transforms, css_ease, parse_transform};
use framekit::render::{FrameCallback, ManualRequester, Tick};
use framekit::tween::Tween;
use framekit::{Config, Context};

const FRAME_MS: f64 = 1000.0 / 60.0;
const EASE: &str = "easeInOutCubic";

fn main() -> framekit::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let sim_ms = match std::env::var("FRAMEKIT_SIM_MS") {
        Ok(raw) => raw.trim().parse().unwrap_or(2000.0),
        Err(_) => 2000.0,
    };
    let requester = ManualRequester::new();
    let ctx = Context::new(config, requester.clone());
    let scene = Component::new(&ctx);

    let sprite: Rc<RefCell<BTreeMap<String, f64>>> =
        Rc::new(RefCell::new(BTreeMap::from([("x".to_owned(), 0.0), ("rotation".to_owned(), 0.0)])));
    scene.tween(
        &sprite,
        Tween::new([("x", 240.0), ("rotation", 90.0)], 1000.0)
            .ease(EASE)
            .delay(250.0)
            .on_complete(|| tracing::info!("tween complete")),
    )?;
    tracing::info!(ease = EASE, css = css_ease(EASE), "tween scheduled");

    let c = ctx.clone();
    scene.delayed_call(move || tracing::info!(time = c.time(), "delayed call fired"), 500.0)?;

    let s = Rc::clone(&sprite);
    let report = FrameCallback::new(move |tick: Tick| {
        if let Tick::Counted(frame) = tick {
            let transform = parse_transform(&all_transforms(&*s.borrow()));
            tracing::info!(frame, %transform, "sample");
        }
    });
    scene.start_render(&report, Some(4.0))?;

    ctx.render().arm();
    let mut now = 0.0;
    while now <= sim_ms {
        ctx.render().step(now);
        now += FRAME_MS;
    }

    scene.destroy();
    tracing::info!(frames = requester.requests(), time = ctx.time(), "simulation finished");
    Ok(())
}
