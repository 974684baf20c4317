#![forbid(unsafe_code)]

//! `wasm-bindgen` exports and DOM implementations of the core traits.
//!
//! Only compiled on `wasm32` targets.

use std::rc::Rc;
use std::time::Duration;

use idlegrid_core::capabilities::{SchedulerKind, VisibilityKind};
use idlegrid_core::{
    AlwaysVisible, Card, CardFactory, Container, Deadline, FixedDeadline, GridConfig,
    HostCapabilities, IdleBatchRenderer, IdleCallback, IdleGrid, IdleScheduler,
    IntersectionSource, ObservedVisibility, SharedVisibleSet, VisibilityChange,
    VisibilityTracker, VisibleSet,
};
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, IdleDeadline, IdleRequestOptions, IntersectionObserver,
    IntersectionObserverEntry, Window,
};

use crate::markup::{CARD_CLASS, card_inner_html, parse_card_index};

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

/// Feature-detect the two optional host capabilities on `window`.
fn detect_capabilities(window: &Window) -> HostCapabilities {
    let has = |name: &str| Reflect::has(window, &JsValue::from_str(name)).unwrap_or(false);
    HostCapabilities {
        idle_callback: has("requestIdleCallback"),
        intersection_observer: has("IntersectionObserver"),
    }
    .with_overrides()
}

fn millis_u32(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

/// Live view of the browser's `IdleDeadline`.
struct BrowserDeadline(IdleDeadline);

impl Deadline for BrowserDeadline {
    fn time_remaining(&self) -> Duration {
        let ms = self.0.time_remaining();
        if ms.is_finite() && ms > 0.0 {
            Duration::from_secs_f64(ms / 1000.0)
        } else {
            Duration::ZERO
        }
    }

    fn did_timeout(&self) -> bool {
        self.0.did_timeout()
    }
}

// ---------------------------------------------------------------------------
// Scheduling strategies
// ---------------------------------------------------------------------------

/// `requestIdleCallback` with a wait bound.
struct NativeIdleScheduler {
    window: Window,
    timeout: Duration,
}

impl IdleScheduler for NativeIdleScheduler {
    fn schedule_idle(&self, callback: IdleCallback) {
        let js_callback = Closure::once_into_js(move |deadline: IdleDeadline| {
            callback(&BrowserDeadline(deadline));
        });
        let options = IdleRequestOptions::new();
        options.set_timeout(millis_u32(self.timeout));
        if let Err(err) = self
            .window
            .request_idle_callback_with_options(js_callback.unchecked_ref(), &options)
        {
            console_error(&format!("requestIdleCallback failed: {err:?}"));
        }
    }
}

/// `setTimeout` fallback delivering a forced deadline.
struct TimerIdleScheduler {
    window: Window,
    delay: Duration,
}

impl IdleScheduler for TimerIdleScheduler {
    fn schedule_idle(&self, callback: IdleCallback) {
        let js_callback = Closure::once_into_js(move || {
            callback(&FixedDeadline::forced());
        });
        let delay = i32::try_from(self.delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                js_callback.unchecked_ref(),
                delay,
            )
        {
            console_error(&format!("setTimeout failed: {err:?}"));
        }
    }
}

fn build_scheduler(window: &Window, kind: SchedulerKind) -> Rc<dyn IdleScheduler> {
    match kind {
        SchedulerKind::Idle { timeout } => Rc::new(NativeIdleScheduler {
            window: window.clone(),
            timeout,
        }),
        SchedulerKind::Timer { delay } => Rc::new(TimerIdleScheduler {
            window: window.clone(),
            delay,
        }),
    }
}

// ---------------------------------------------------------------------------
// DOM collaborators
// ---------------------------------------------------------------------------

/// Builds `<div class="card" data-index="…">` elements by cloning one
/// prototype made at construction.
struct DomCardFactory {
    prototype: Element,
    thumbnail_src: String,
}

impl DomCardFactory {
    fn new(document: &Document, thumbnail_src: String) -> Result<Self, JsValue> {
        let prototype = document.create_element("div")?;
        prototype.set_class_name(CARD_CLASS);
        Ok(Self {
            prototype,
            thumbnail_src,
        })
    }
}

impl CardFactory for DomCardFactory {
    type Node = Element;

    fn create(&mut self, card: &Card) -> Element {
        let element = match self.prototype.clone_node() {
            Ok(node) => node.unchecked_into::<Element>(),
            Err(err) => {
                console_error(&format!("cloning card {} failed: {err:?}", card.index()));
                // The prototype stands in so the cycle stays total.
                self.prototype.clone()
            }
        };
        if let Err(err) = element.set_attribute("data-index", &card.index().to_string()) {
            console_error(&format!("tagging card {} failed: {err:?}", card.index()));
        }
        element.set_inner_html(&card_inner_html(card, &self.thumbnail_src));
        element
    }
}

/// The grid element; each batch lands through one `DocumentFragment`.
struct DomContainer {
    document: Document,
    element: Element,
}

impl Container<Element> for DomContainer {
    fn append_batch(&mut self, nodes: Vec<Element>) {
        let fragment = self.document.create_document_fragment();
        for node in &nodes {
            if let Err(err) = fragment.append_child(node) {
                console_error(&format!("staging card failed: {err:?}"));
            }
        }
        if let Err(err) = self.element.append_child(&fragment) {
            console_error(&format!("appending batch of {} failed: {err:?}", nodes.len()));
        }
    }
}

/// One `IntersectionObserver` shared by every card.
struct DomIntersectionSource {
    observer: IntersectionObserver,
    // Dropping the closure would invalidate the observer's callback.
    _on_change: Closure<dyn FnMut(Array)>,
}

impl DomIntersectionSource {
    fn new(visible: SharedVisibleSet) -> Result<Self, JsValue> {
        let on_change = Closure::<dyn FnMut(Array)>::new(move |entries: Array| {
            let changes = entries.iter().filter_map(|entry| {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                let index = entry
                    .target()
                    .get_attribute("data-index")
                    .as_deref()
                    .and_then(parse_card_index)?;
                Some(VisibilityChange {
                    index,
                    intersecting: entry.is_intersecting(),
                })
            });
            visible.borrow_mut().apply_all(changes);
        });
        let observer = IntersectionObserver::new(on_change.as_ref().unchecked_ref())?;
        Ok(Self {
            observer,
            _on_change: on_change,
        })
    }
}

impl IntersectionSource<Element> for DomIntersectionSource {
    fn observe(&mut self, node: &Element) {
        self.observer.observe(node);
    }
}

fn build_tracker(
    kind: VisibilityKind,
    visible: &SharedVisibleSet,
) -> Result<Box<dyn VisibilityTracker<Element>>, JsValue> {
    let tracker: Box<dyn VisibilityTracker<Element>> = match kind {
        VisibilityKind::Observed => Box::new(ObservedVisibility::new(
            DomIntersectionSource::new(Rc::clone(visible))?,
            Rc::clone(visible),
        )),
        VisibilityKind::AlwaysVisible => Box::new(AlwaysVisible::new(Rc::clone(visible))),
    };
    Ok(tracker)
}

type DomGrid = IdleGrid<DomCardFactory, DomContainer, Box<dyn VisibilityTracker<Element>>>;

// ---------------------------------------------------------------------------
// Exported surface
// ---------------------------------------------------------------------------

/// Card grid populated during browser idle time.
///
/// Host capabilities are detected once in the constructor; call `start()`
/// to schedule the first cycle.
#[wasm_bindgen]
pub struct IdleGridWeb {
    grid: DomGrid,
    visible: SharedVisibleSet,
    capabilities: HostCapabilities,
    scheduler_kind: SchedulerKind,
    visibility_kind: VisibilityKind,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

#[wasm_bindgen]
impl IdleGridWeb {
    /// Bind to the element with id `container_id`.
    ///
    /// `options` is an optional JSON object with any of `max_cards`,
    /// `batch_size`, `min_idle_budget_ms`, `idle_timeout_ms`,
    /// `fallback_delay_ms`, `thumbnail_src`.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, options: Option<String>) -> Result<IdleGridWeb, JsValue> {
        install_panic_hook();

        let config = match options.as_deref() {
            Some(json) => GridConfig::from_json(json)
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => GridConfig::default(),
        };

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        let element = document
            .get_element_by_id(container_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id `{container_id}`")))?;

        let capabilities = detect_capabilities(&window);
        let scheduler_kind = capabilities.scheduler_kind(&config);
        let visibility_kind = capabilities.visibility_kind();
        tracing::debug!(
            scheduler = scheduler_kind.as_str(),
            visibility = visibility_kind.as_str(),
            "host strategies selected"
        );

        let visible = VisibleSet::shared();
        let tracker = build_tracker(visibility_kind, &visible)?;
        let factory = DomCardFactory::new(&document, config.thumbnail_src.clone())?;
        let container = DomContainer { document, element };
        let renderer = IdleBatchRenderer::new(config, factory, container, tracker);
        let grid = IdleGrid::new(renderer, build_scheduler(&window, scheduler_kind));

        Ok(Self {
            grid,
            visible,
            capabilities,
            scheduler_kind,
            visibility_kind,
        })
    }

    /// Schedule the first cycle. No-op once every card exists.
    pub fn start(&self) {
        self.grid.start();
    }

    /// Cards created so far.
    #[wasm_bindgen(js_name = createdCount)]
    pub fn created_count(&self) -> usize {
        self.grid.created()
    }

    /// Renderer cycles that did work.
    #[wasm_bindgen(js_name = cyclesRun)]
    pub fn cycles_run(&self) -> f64 {
        self.grid.renderer().borrow().cycles_run() as f64
    }

    /// Whether every card exists.
    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.grid.is_complete()
    }

    /// Number of cards currently in the visible set.
    #[wasm_bindgen(js_name = visibleCount)]
    pub fn visible_count(&self) -> usize {
        self.visible.borrow().len()
    }

    /// Indices of visible cards, ascending. Returns `Uint32Array`.
    #[wasm_bindgen(js_name = visibleIndices)]
    pub fn visible_indices(&self) -> Vec<u32> {
        self.visible
            .borrow()
            .sorted_indices()
            .into_iter()
            .map(|i| u32::try_from(i).unwrap_or(u32::MAX))
            .collect()
    }

    /// Detected capabilities and selected strategies:
    /// `{ idleCallback, intersectionObserver, scheduler, visibility }`.
    pub fn capabilities(&self) -> JsValue {
        let obj = Object::new();
        let _ = Reflect::set(
            &obj,
            &"idleCallback".into(),
            &self.capabilities.idle_callback.into(),
        );
        let _ = Reflect::set(
            &obj,
            &"intersectionObserver".into(),
            &self.capabilities.intersection_observer.into(),
        );
        let _ = Reflect::set(
            &obj,
            &"scheduler".into(),
            &self.scheduler_kind.as_str().into(),
        );
        let _ = Reflect::set(
            &obj,
            &"visibility".into(),
            &self.visibility_kind.as_str().into(),
        );
        obj.into()
    }
}
