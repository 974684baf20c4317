//! Browser smoke tests. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use idlegrid_core::capabilities::{CapabilityOverride, with_capability_override};
use idlegrid_web::IdleGridWeb;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn mount(id: &str) -> web_sys::Element {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .expect("browser document");
    let grid = document.create_element("section").expect("create section");
    grid.set_id(id);
    document
        .document_element()
        .expect("root element")
        .append_child(&grid)
        .expect("mount grid");
    grid
}

async fn sleep_ms(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .expect("browser window")
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .expect("setTimeout");
    });
    JsFuture::from(promise).await.expect("timer resolves");
}

#[wasm_bindgen_test]
fn missing_container_is_an_error() {
    assert!(IdleGridWeb::new("does-not-exist", None).is_err());
}

#[wasm_bindgen_test]
fn bad_options_are_an_error() {
    mount("grid-bad-options");
    assert!(IdleGridWeb::new("grid-bad-options", Some(r#"{"batch_size":0}"#.into())).is_err());
}

#[wasm_bindgen_test]
fn nothing_is_created_before_start() {
    mount("grid-idle");
    let grid = IdleGridWeb::new("grid-idle", Some(r#"{"max_cards":5}"#.into()))
        .expect("grid binds to mounted element");
    assert_eq!(grid.created_count(), 0);
    assert!(!grid.is_complete());
    assert_eq!(grid.visible_count(), 0);
}

#[wasm_bindgen_test]
async fn fallback_strategies_fill_the_grid() {
    let element = mount("grid-fallback");
    let grid = with_capability_override(CapabilityOverride::bare(), || {
        IdleGridWeb::new(
            "grid-fallback",
            Some(r#"{"max_cards":5,"batch_size":2}"#.into()),
        )
    })
    .expect("grid binds to mounted element");
    grid.start();

    for _ in 0..100 {
        if grid.is_complete() {
            break;
        }
        sleep_ms(20).await;
    }
    assert!(grid.is_complete());

    let children = element.children();
    assert_eq!(children.length(), 5);
    for i in 0..5 {
        let card = children.item(i).expect("card element");
        assert_eq!(card.class_name(), "card");
        assert_eq!(card.get_attribute("data-index"), Some(i.to_string()));
    }
    assert_eq!(grid.visible_count(), 5);
    assert_eq!(grid.visible_indices(), vec![0, 1, 2, 3, 4]);
}
