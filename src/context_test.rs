#![allow(clippy::float_cmp)]

use std::cell::Cell;
use std::collections::BTreeMap;

use serde_json::Value;

use super::*;
use crate::events::{self, callback};
use crate::interpolation::Curve;
use crate::render::ManualRequester;

fn context() -> Context {
    Context::new(Config::default(), ManualRequester::new())
}

fn frames(ctx: &Context, times: &[f64]) {
    for t in times {
        ctx.render().step(*t);
    }
}

#[test]
fn registers_timer_and_tween_callbacks() {
    let ctx = context();
    assert_eq!(ctx.render().len(), 2);
}

#[test]
fn delayed_call_fires_after_frame_time() {
    let ctx = context();
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    ctx.delayed_call(move || h.set(h.get() + 1), 100.0);

    frames(&ctx, &[0.0, 50.0]);
    assert_eq!(hits.get(), 0);
    frames(&ctx, &[100.0, 150.0]);
    assert_eq!(hits.get(), 1);
}

#[test]
fn clear_timeout_through_context() {
    let ctx = context();
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    let id = ctx.delayed_call(move || h.set(h.get() + 1), 10.0);
    assert!(ctx.clear_timeout(&id));
    frames(&ctx, &[0.0, 20.0]);
    assert_eq!(hits.get(), 0);
}

#[test]
fn tweens_advance_with_the_frame_clock() {
    let ctx = context();
    let target: Rc<RefCell<BTreeMap<String, f64>>> = Rc::new(RefCell::new(BTreeMap::from([("x".to_owned(), 0.0)])));
    frames(&ctx, &[1000.0]);
    ctx.tween(&target, Tween::new([("x", 100.0)], 1000.0).ease(Curve::LINEAR));

    frames(&ctx, &[1100.0, 1300.0, 1500.0]);
    assert!((target.borrow()["x"] - 50.0).abs() < 1e-9);

    frames(&ctx, &[1700.0, 1900.0, 2000.0]);
    assert_eq!(target.borrow()["x"], 100.0);
    assert!(ctx.tweens().is_empty());
}

#[test]
fn clear_tween_through_context() {
    let ctx = context();
    let target: Rc<RefCell<BTreeMap<String, f64>>> = Rc::new(RefCell::new(BTreeMap::from([("x".to_owned(), 0.0)])));
    ctx.tween(&target, Tween::new([("x", 100.0)], 100.0));
    ctx.clear_tween(&target);
    frames(&ctx, &[0.0, 100.0]);
    assert_eq!(target.borrow()["x"], 0.0);
}

#[test]
fn skip_limit_comes_from_config() {
    let config = Config { skip_limit_ms: 50.0, ..Config::default() };
    let ctx = Context::new(config, ManualRequester::new());
    frames(&ctx, &[0.0, 1000.0]);
    assert_eq!(ctx.delta(), 50.0);
    assert_eq!(ctx.time(), 1000.0);
}

#[test]
fn timers_see_capped_delta() {
    let ctx = context();
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    ctx.delayed_call(move || h.set(h.get() + 1), 300.0);
    // One long stall only contributes the 200ms skip limit.
    frames(&ctx, &[0.0, 5000.0]);
    assert_eq!(hits.get(), 0);
    frames(&ctx, &[5100.0]);
    assert_eq!(hits.get(), 1);
}

#[test]
fn buses_share_the_global_emitter() {
    let ctx = context();
    let a = ctx.events();
    let b = ctx.events();
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    b.subscribe_global(events::RESIZE, &callback(move |_| h.set(h.get() + 1))).unwrap();
    a.fire(events::RESIZE, &Value::Null).unwrap();
    assert_eq!(hits.get(), 1);
    assert_eq!(ctx.global_emitter().listener_count(events::RESIZE), 1);
}

#[test]
fn clones_share_state() {
    let ctx = context();
    let other = ctx.clone();
    frames(&other, &[0.0, 16.0]);
    assert_eq!(ctx.time(), 16.0);
    assert!(Rc::ptr_eq(ctx.render(), other.render()));
}
