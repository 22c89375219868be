#![allow(clippy::float_cmp)]

use crate::config::Config;
use crate::error::Error;
use crate::events::EventCallback;
use crate::render::ManualRequester;

use super::*;

/// Holds requests until the test resolves them.
#[derive(Default)]
struct FakeFetcher {
    pending: RefCell<Vec<(String, FetchDone)>>,
}

impl FakeFetcher {
    fn urls(&self) -> Vec<String> {
        self.pending.borrow().iter().map(|(u, _)| u.clone()).collect()
    }

    fn succeed(&self, url: &str) {
        self.resolve(url, |url| Ok(Asset { url: url.to_owned(), body: format!("body of {url}") }));
    }

    fn fail(&self, url: &str) {
        self.resolve(url, |url| Err(Error::Fetch { url: url.to_owned(), reason: "404".into() }));
    }

    fn resolve(&self, url: &str, result: impl FnOnce(&str) -> Result<Asset>) {
        let done = {
            let mut pending = self.pending.borrow_mut();
            let i = pending.iter().position(|(u, _)| u == url).unwrap();
            pending.remove(i).1
        };
        done(result(url));
    }
}

impl AssetFetcher for FakeFetcher {
    fn fetch(&self, url: &str, done: FetchDone) {
        self.pending.borrow_mut().push((url.to_owned(), done));
    }
}

/// Resolves every request synchronously.
struct InstantFetcher;

impl AssetFetcher for InstantFetcher {
    fn fetch(&self, url: &str, done: FetchDone) {
        done(Ok(Asset { url: url.to_owned(), body: String::new() }));
    }
}

fn context() -> Context {
    Context::new(Config::default(), ManualRequester::new())
}

type Log = Rc<RefCell<Vec<String>>>;

fn record(log: &Log, label: &'static str) -> EventCallback {
    let log = Rc::clone(log);
    callback(move |payload| {
        let entry = match payload.get("percent").and_then(Value::as_f64) {
            Some(p) => format!("{label} {p}"),
            None => label.to_owned(),
        };
        log.borrow_mut().push(entry);
    })
}

fn listen(ctx: &Context, loader: &impl Loader, log: &Log) -> Events {
    let listener = ctx.events();
    listener.subscribe_to(loader.events(), PROGRESS, &record(log, "progress")).unwrap();
    listener.subscribe_to(loader.events(), COMPLETE, &record(log, "complete")).unwrap();
    listener
}

// --- AssetLoader ---

#[test]
fn keys_by_basename_and_prefixes_cdn() {
    let config = Config { cdn: "https://cdn.test/".into(), ..Config::default() };
    let ctx = Context::new(config, ManualRequester::new());
    let loader = AssetLoader::new(&ctx, ["img/logo.png", "data/scene.json"]);
    assert_eq!(
        loader.assets(),
        &[
            ("logo".to_owned(), "https://cdn.test/img/logo.png".to_owned()),
            ("scene".to_owned(), "https://cdn.test/data/scene.json".to_owned()),
        ]
    );

    let fetcher = FakeFetcher::default();
    loader.load(&fetcher, || {});
    assert_eq!(fetcher.urls(), vec!["https://cdn.test/img/logo.png", "https://cdn.test/data/scene.json"]);
    fetcher.succeed("https://cdn.test/img/logo.png");
    assert_eq!(loader.cache().get("logo").unwrap().body, "body of https://cdn.test/img/logo.png");
    assert!(!loader.cache().contains("scene"));
}

#[test]
fn explicit_keys_last_path_wins() {
    let ctx = context();
    let loader = AssetLoader::with_keys(&ctx, [("a", "one.png"), ("b", "two.png"), ("a", "three.png")]);
    assert_eq!(loader.assets().len(), 2);
    assert_eq!(loader.assets()[0], ("a".to_owned(), "three.png".to_owned()));
}

#[test]
fn progress_then_complete_then_callback() {
    let ctx = context();
    let loader = AssetLoader::new(&ctx, ["a.png", "b.png"]);
    let log: Log = Rc::default();
    let _listener = listen(&ctx, &loader, &log);
    let fetcher = FakeFetcher::default();
    let l = Rc::clone(&log);
    loader.load(&fetcher, move || l.borrow_mut().push("callback".into()));

    fetcher.succeed("b.png");
    assert!(!loader.is_complete());
    fetcher.succeed("a.png");

    assert_eq!(*log.borrow(), vec!["progress 0.5", "progress 1", "complete", "callback"]);
    assert!(loader.is_complete());
    assert_eq!(loader.percent(), 1.0);
}

#[test]
fn failures_count_as_loaded() {
    let ctx = context();
    let loader = AssetLoader::new(&ctx, ["missing.png"]);
    let done = Rc::new(Cell::new(false));
    let d = Rc::clone(&done);
    let fetcher = FakeFetcher::default();
    loader.load(&fetcher, move || d.set(true));
    fetcher.fail("missing.png");
    assert!(done.get());
    assert!(loader.cache().is_empty());
}

#[test]
fn empty_loader_completes_on_load() {
    let ctx = context();
    let loader = AssetLoader::new(&ctx, Vec::<String>::new());
    let log: Log = Rc::default();
    let _listener = listen(&ctx, &loader, &log);
    let l = Rc::clone(&log);
    loader.load(&FakeFetcher::default(), move || l.borrow_mut().push("callback".into()));
    assert_eq!(*log.borrow(), vec!["complete", "callback"]);
    assert_eq!(loader.percent(), 1.0);
}

#[test]
fn synchronous_fetcher_completes_inside_load() {
    let ctx = context();
    let loader = AssetLoader::new(&ctx, ["a.json", "b.json", "c.json"]);
    let done = Rc::new(Cell::new(0));
    let d = Rc::clone(&done);
    loader.load(&InstantFetcher, move || d.set(d.get() + 1));
    assert_eq!(done.get(), 1);
    assert_eq!(loader.cache().len(), 3);
}

#[test]
fn second_load_is_ignored() {
    let ctx = context();
    let loader = AssetLoader::new(&ctx, ["a.png"]);
    let fetcher = FakeFetcher::default();
    loader.load(&fetcher, || {});
    loader.load(&fetcher, || {});
    assert_eq!(fetcher.urls().len(), 1);
}

#[test]
fn destroyed_loader_never_calls_back() {
    let ctx = context();
    let loader = AssetLoader::new(&ctx, ["a.png"]);
    let done = Rc::new(Cell::new(false));
    let d = Rc::clone(&done);
    let fetcher = FakeFetcher::default();
    loader.load(&fetcher, move || d.set(true));
    loader.destroy();
    fetcher.succeed("a.png");
    assert!(!done.get());
}

// --- MultiLoader ---

#[test]
fn multi_loader_averages_and_completes_once() {
    let ctx = context();
    let a = AssetLoader::new(&ctx, ["a1.png", "a2.png"]);
    let b = AssetLoader::new(&ctx, ["b1.png"]);
    let multi = MultiLoader::new(&ctx);
    multi.push(&a).unwrap();
    multi.push(&b).unwrap();
    let log: Log = Rc::default();
    let _listener = listen(&ctx, &multi, &log);

    let fetcher = FakeFetcher::default();
    a.load(&fetcher, || {});
    b.load(&fetcher, || {});
    fetcher.succeed("a1.png");
    fetcher.succeed("b1.png");
    fetcher.succeed("a2.png");

    assert_eq!(*log.borrow(), vec!["progress 0.25", "progress 0.75", "progress 1", "complete"]);
    assert_eq!(multi.percent(), 1.0);
    assert_eq!(multi.len(), 2);
}

#[test]
fn multi_loader_forced_completion() {
    let ctx = context();
    let multi = MultiLoader::new(&ctx);
    multi.push(&AssetLoader::new(&ctx, ["never.png"])).unwrap();
    let log: Log = Rc::default();
    let _listener = listen(&ctx, &multi, &log);
    multi.complete().unwrap();
    assert_eq!(*log.borrow(), vec!["progress 1", "complete"]);
}

#[test]
fn multi_loaders_nest() {
    let ctx = context();
    let inner = MultiLoader::new(&ctx);
    let outer = MultiLoader::new(&ctx);
    let leaf = AssetLoader::new(&ctx, ["x.png"]);
    inner.push(&leaf).unwrap();
    outer.push(&inner).unwrap();
    let log: Log = Rc::default();
    let _listener = listen(&ctx, &outer, &log);
    leaf.load(&InstantFetcher, || {});
    assert_eq!(*log.borrow(), vec!["progress 1", "complete"]);
}

#[test]
fn destroyed_multi_loader_rejects_operations() {
    let ctx = context();
    let multi = MultiLoader::new(&ctx);
    multi.destroy();
    assert!(matches!(multi.complete(), Err(Error::Disposed)));
    assert!(matches!(multi.push(&AssetLoader::new(&ctx, ["a.png"])), Err(Error::Disposed)));
}
