use std::{collections::HashSet, sync::Arc, thread};

use route_rules::{
    compile, match_path, register_filter, CompileError, Converter, FilterRegistry, MatchError,
    Router, Rule, Value,
};
use serde::Deserialize;

#[test]
fn static_rules_round_trip() {
    for rule in ["/", "/about", "/static/app.js", "/a+b/(c)", "/ünïcödé/path"] {
        let route = compile(rule).unwrap();

        assert!(route.is_static());
        assert_eq!(route.name(), rule);
        assert_eq!(route.pattern(), rule);
        assert!(route.filters().is_empty());

        assert!(match_path(&route, rule).unwrap().is_empty());

        let longer = format!("{}x", rule);
        assert!(match_path(&route, &longer).unwrap_err().is_not_found());
    }
}

#[test]
fn escaped_short_marker_is_literal() {
    let route = compile("a\\:b").unwrap();

    assert!(route.is_static());
    assert!(route.filters().is_empty());
    assert!(route.match_path("a:b").unwrap().is_empty());
}

#[test]
fn int_filter() {
    let route = compile("/x/<n:int>").unwrap();

    let params = route.match_path("/x/42").unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params["n"], Value::Int(42));

    let params = route.match_path("/x/-7").unwrap();
    assert_eq!(params["n"].as_int(), Some(-7));

    // the fragment already rejects non-digits
    assert!(route.match_path("/x/abc").unwrap_err().is_not_found());
    assert!(route.match_path("/x/").unwrap_err().is_not_found());
}

#[test]
fn conversion_failure_after_match() {
    let route = compile("/x/<n:int>").unwrap();

    let err = route.match_path("/x/99999999999999999999").unwrap_err();
    match err {
        MatchError::Conversion(err) => {
            assert_eq!(err.param(), "n");
            assert_eq!(err.value(), "99999999999999999999");
        }
        other => panic!("unexpected error: {}", other),
    }

    let route = compile("/f/<v:float>").unwrap();
    assert_eq!(route.match_path("/f/1.5").unwrap()["v"], Value::Float(1.5));
    assert!(route.match_path("/f/1.2.3").unwrap_err().is_conversion());
}

#[test]
fn catch_all_has_no_parameter() {
    let route = compile("/files/<:path>").unwrap();

    let params = route.match_path("/files/a/b/c").unwrap();
    assert!(params.is_empty());
    assert!(route.filters().is_empty());

    let route = compile("/files/<name:path>").unwrap();
    assert_eq!(route.match_path("/files/a/b/c").unwrap()["name"], "a/b/c");
}

#[test]
fn equivalent_rules_share_name() {
    let a = compile("/u/<id:re:(\\d+)>").unwrap();
    let b = compile("/u/<id:re:(?:\\d+)>").unwrap();
    let c = compile("/u/:id#(\\d+)#").unwrap();

    assert_ne!(a.pattern(), b.pattern());
    assert_eq!(a.name(), b.name());
    assert_eq!(b.name(), c.name());

    let routes = [a, b, c].into_iter().collect::<HashSet<_>>();
    assert_eq!(routes.len(), 1);

    let d = compile("/u/<id:int>").unwrap();
    assert!(!routes.contains(&d));
}

#[test]
fn unknown_filter() {
    match compile("/x/<n:nope>") {
        Err(CompileError::UnknownFilter(err)) => assert_eq!(err.name(), "nope"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn compile_is_idempotent() {
    let rule = "/blog/<year:int>/<month:re:\\d{2}>/:slug";

    let first = compile(rule).unwrap();
    let second = compile(rule).unwrap();

    assert_eq!(first.name(), second.name());
    assert_eq!(first.pattern(), second.pattern());
    assert_eq!(first.filters(), second.filters());

    // independent instances; matching one does not affect the other
    assert!(first.is_match("/blog/2024/05/hello"));
    assert!(second.is_match("/blog/2024/05/hello"));
}

#[test]
fn global_registration() {
    register_filter(
        "hexcolor",
        |_: Option<&str>| {
            (
                "[0-9a-fA-F]{6}".to_owned(),
                Some(Converter::new("hex", |raw: &str| {
                    i64::from_str_radix(raw, 16).ok().map(Value::Int)
                })),
            )
        },
        ["hexcolour"],
    );

    let registry = FilterRegistry::global().read().unwrap();
    assert!(registry.contains("hexcolor"));
    assert!(registry.contains("hexcolour"));
    drop(registry);

    let route = compile("/color/<c:hexcolour>").unwrap();
    assert_eq!(route.match_path("/color/ff0000").unwrap()["c"], Value::Int(0xff0000));
    assert!(!route.is_match("/color/red"));
}

#[test]
fn isolated_registry() {
    let registry = FilterRegistry::empty();
    assert!(Rule::compile_with("/<n:int>", &registry).is_err());
    assert!(Rule::compile_with("/static", &registry).is_ok());
}

#[test]
fn typed_extraction() {
    #[derive(Debug, Deserialize)]
    struct Post {
        user: u32,
        slug: String,
    }

    let route = compile("/u/<user:int>/<slug>").unwrap();
    let params = route.match_path("/u/12/first-post").unwrap();

    let post: Post = params.load().unwrap();
    assert_eq!(post.user, 12);
    assert_eq!(post.slug, "first-post");
}

#[test]
fn shared_across_threads() {
    let route = Arc::new(compile("/t/<n:int>/<name>").unwrap());

    let handles = (0..8)
        .map(|i| {
            let route = Arc::clone(&route);
            thread::spawn(move || {
                for j in 0..50 {
                    let path = format!("/t/{}/w{}", i * 100 + j, i);
                    let params = route.match_path(&path).unwrap();
                    assert_eq!(params["n"], Value::Int(i * 100 + j));
                    assert_eq!(params["name"], format!("w{}", i).as_str());
                }
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn router_first_match_wins() {
    let mut router = Router::build();
    router
        .rule("/pages/<id:int>", "page")
        .unwrap()
        .rule("/pages/<slug>", "page_by_slug")
        .unwrap()
        .rule("/<:path>", "fallback")
        .unwrap();
    let router = router.finish();

    let (val, params) = router.recognize("/pages/3").unwrap().unwrap();
    assert_eq!(*val, "page");
    assert_eq!(params["id"], 3);

    let (val, _) = router.recognize("/pages/intro").unwrap().unwrap();
    assert_eq!(*val, "page_by_slug");

    let (val, params) = router.recognize("/any/thing").unwrap().unwrap();
    assert_eq!(*val, "fallback");
    assert!(params.is_empty());
}
