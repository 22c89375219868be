use std::rc::Rc;

use super::*;

fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    (hits, move || h.set(h.get() + 1))
}

fn run(timer: &Timer, deltas: &[f64]) {
    let mut t = 0.0;
    for d in deltas {
        t += d;
        timer.tick(t, *d);
    }
}

#[test]
fn fires_exactly_once_at_target() {
    let timer = Timer::new(1.0);
    let (hits, cb) = counter();
    timer.create(cb, 100.0);

    run(&timer, &[25.0, 25.0, 25.0]);
    assert_eq!(hits.get(), 0, "must not fire before 100ms");

    run(&timer, &[25.0]);
    assert_eq!(hits.get(), 1);

    run(&timer, &[25.0, 25.0, 100.0]);
    assert_eq!(hits.get(), 1, "must never fire twice");
    assert!(timer.is_empty());
}

#[test]
fn fires_when_single_tick_overshoots() {
    let timer = Timer::new(1.0);
    let (hits, cb) = counter();
    timer.create(cb, 10.0);
    run(&timer, &[16.0]);
    assert_eq!(hits.get(), 1);
}

#[test]
fn clear_before_expiry_prevents_call() {
    let timer = Timer::new(1.0);
    let (hits, cb) = counter();
    let id = timer.create(cb, 100.0);
    run(&timer, &[50.0]);
    assert!(timer.clear_timeout(&id));
    run(&timer, &[50.0, 50.0, 50.0]);
    assert_eq!(hits.get(), 0);
    assert!(!timer.is_pending(&id));
}

#[test]
fn clear_unknown_id_returns_false() {
    let timer = Timer::new(1.0);
    assert!(!timer.clear_timeout(&TimerId("nope".into())));
}

#[test]
fn clear_after_fire_returns_false() {
    let timer = Timer::new(1.0);
    let (_, cb) = counter();
    let id = timer.create(cb, 10.0);
    run(&timer, &[10.0]);
    assert!(!timer.clear_timeout(&id));
    run(&timer, &[10.0]);
    assert!(!timer.clear_timeout(&id));
}

#[test]
fn clear_twice_second_is_false() {
    let timer = Timer::new(1.0);
    let (_, cb) = counter();
    let id = timer.create(cb, 10.0);
    assert!(timer.clear_timeout(&id));
    assert!(!timer.clear_timeout(&id));
}

#[test]
fn duration_is_clamped_to_minimum() {
    let timer = Timer::new(1.0);
    let (zero_hits, zero) = counter();
    let (nan_hits, nan) = counter();
    timer.create(zero, 0.0);
    timer.create(nan, f64::NAN);
    run(&timer, &[0.5]);
    assert_eq!((zero_hits.get(), nan_hits.get()), (0, 0));
    run(&timer, &[0.5]);
    assert_eq!((zero_hits.get(), nan_hits.get()), (1, 1));
}

#[test]
fn infinite_duration_never_fires() {
    let timer = Timer::new(1.0);
    let (hits, cb) = counter();
    let id = timer.create(cb, f64::INFINITY);
    run(&timer, &[16.0, 200.0, 1.0e12]);
    assert_eq!(hits.get(), 0);
    assert!(timer.is_pending(&id));
}

#[test]
fn ids_are_unique() {
    let timer = Timer::new(1.0);
    let ids: Vec<TimerId> = (0..500).map(|_| timer.create(|| {}, 10.0)).collect();
    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn ids_are_numeric_strings_seeded_by_frame_time() {
    let timer = Timer::new(1.0);
    timer.tick(5_000.0, 16.0);
    let id = timer.create(|| {}, 10.0);
    let n: u64 = id.as_str().parse().unwrap();
    assert!((5_000..=5_000 + ID_JITTER).contains(&n));
}

#[test]
fn callback_may_create_timers() {
    let timer = Rc::new(Timer::new(1.0));
    let (hits, cb) = counter();
    let t = Rc::clone(&timer);
    timer.create(
        move || {
            t.create(cb, 30.0);
        },
        10.0,
    );
    run(&timer, &[10.0]);
    assert_eq!(timer.len(), 1);
    run(&timer, &[10.0, 10.0]);
    assert_eq!(hits.get(), 1);
}

#[test]
fn callback_may_cancel_a_sibling() {
    let timer = Rc::new(Timer::new(1.0));
    let (hits, victim) = counter();
    let victim_id = timer.create(victim, 50.0);
    let t = Rc::clone(&timer);
    let id = victim_id.clone();
    timer.create(
        move || {
            t.clear_timeout(&id);
        },
        10.0,
    );
    run(&timer, &[10.0, 50.0]);
    assert_eq!(hits.get(), 0);
    assert!(timer.is_empty());
}

#[test]
fn expired_entries_are_swept_next_tick() {
    let timer = Timer::new(1.0);
    timer.create(|| {}, 10.0);
    run(&timer, &[10.0]);
    assert_eq!(timer.entries.borrow().len(), 1, "discarded entry kept until next tick");
    assert_eq!(timer.len(), 0);
    run(&timer, &[1.0]);
    assert_eq!(timer.entries.borrow().len(), 0);
}

#[test]
fn several_timers_fire_in_creation_order() {
    let timer = Timer::new(1.0);
    let order = Rc::new(RefCell::new(Vec::new()));
    for n in 0..3 {
        let o = Rc::clone(&order);
        timer.create(move || o.borrow_mut().push(n), 20.0);
    }
    run(&timer, &[20.0]);
    assert_eq!(*order.borrow(), vec![0, 1, 2]);
}
