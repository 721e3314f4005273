//! Browser implementation of [`EmbedPlatform`]. Renders into a single mount
//! element that stays in the page for the whole session.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

use gamedeck_core::embed::{
    EmbedError, EmbedPlatform, FrameAttributes, FullscreenTarget, ScriptElement,
};

/// Class applied to the container that receives raw markup.
const MARKUP_CLASS: &str = "embed-markup";

/// Class applied to the sandboxed frame.
const FRAME_CLASS: &str = "embed-frame";

pub struct DomPlatform {
    document: Document,
    mount: Element,
    /// Frame or markup container currently inside `mount`.
    active: Option<Element>,
    /// Script elements found by the last `mount_markup`, in document order.
    /// Held by reference so scripts inserted while re-creating do not shift
    /// later indices.
    inert: Vec<Element>,
}

impl DomPlatform {
    /// Bind to the element with `mount_id`. Returns `None` outside a page
    /// that provides it.
    pub fn attach(mount_id: &str) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let mount = document.get_element_by_id(mount_id)?;
        let _ = mount.set_attribute("hidden", "");
        Some(Self {
            document,
            mount,
            active: None,
            inert: Vec::new(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn replace_active(&mut self, element: Element) -> Result<(), EmbedError> {
        self.mount.set_inner_html("");
        self.mount
            .append_child(&element)
            .map_err(|e| EmbedError::Mount(format!("{e:?}")))?;
        let _ = self.mount.remove_attribute("hidden");
        self.active = Some(element);
        self.inert.clear();
        Ok(())
    }

    fn create(&self, tag: &str) -> Result<Element, EmbedError> {
        self.document
            .create_element(tag)
            .map_err(|e| EmbedError::Mount(format!("create <{tag}>: {e:?}")))
    }
}

/// Invoke a promise-returning method (`requestFullscreen`, `exitFullscreen`)
/// and discard a rejection instead of leaving it unhandled.
fn call_ignoring_rejection(target: &JsValue, method: &str) -> Result<(), EmbedError> {
    let func: js_sys::Function = js_sys::Reflect::get(target, &JsValue::from_str(method))
        .ok()
        .filter(|f| f.is_function())
        .ok_or_else(|| EmbedError::Fullscreen(format!("{method} unsupported")))?
        .unchecked_into();
    let result = func
        .call0(target)
        .map_err(|e| EmbedError::Fullscreen(format!("{method}: {e:?}")))?;
    if let Ok(promise) = result.dyn_into::<js_sys::Promise>() {
        let ignore = Closure::<dyn FnMut(JsValue)>::new(|_rejection: JsValue| {});
        let _ = promise.catch(&ignore);
        ignore.forget();
    }
    Ok(())
}

fn snapshot(element: &Element) -> ScriptElement {
    let attrs = element.attributes();
    let attributes = (0..attrs.length())
        .filter_map(|i| attrs.item(i))
        .map(|attr| (attr.name(), attr.value()))
        .collect();
    ScriptElement {
        attributes,
        body: element.text_content().unwrap_or_default(),
    }
}

impl EmbedPlatform for DomPlatform {
    fn fullscreen_active(&self) -> bool {
        self.document.fullscreen_element().is_some()
    }

    fn request_fullscreen(&mut self, target: FullscreenTarget) -> Result<(), EmbedError> {
        let class = match target {
            FullscreenTarget::MarkupContainer => MARKUP_CLASS,
            FullscreenTarget::Frame => FRAME_CLASS,
        };
        let element = self
            .active
            .as_ref()
            .filter(|el| el.class_list().contains(class))
            .ok_or_else(|| EmbedError::Fullscreen(format!("no .{class} mounted")))?;
        call_ignoring_rejection(element, "requestFullscreen")
    }

    fn exit_fullscreen(&mut self) -> Result<(), EmbedError> {
        call_ignoring_rejection(&self.document, "exitFullscreen")
    }

    fn mount_markup(&mut self, markup: &str) -> Result<Vec<ScriptElement>, EmbedError> {
        let container = self.create("div")?;
        container.set_class_name(MARKUP_CLASS);
        container.set_inner_html(markup);
        let found = container
            .query_selector_all("script")
            .map_err(|e| EmbedError::Mount(format!("{e:?}")))?;
        self.replace_active(container)?;

        self.inert = (0..found.length())
            .filter_map(|i| found.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect();
        Ok(self.inert.iter().map(snapshot).collect())
    }

    fn replace_script(&mut self, index: usize, script: &ScriptElement) -> Result<(), EmbedError> {
        let old = self
            .inert
            .get(index)
            .ok_or_else(|| EmbedError::Mount(format!("no script at index {index}")))?;
        let parent = old
            .parent_node()
            .ok_or_else(|| EmbedError::Mount("detached script".to_string()))?;

        let fresh = self.create("script")?;
        for (name, value) in &script.attributes {
            fresh
                .set_attribute(name, value)
                .map_err(|e| EmbedError::Mount(format!("{e:?}")))?;
        }
        fresh.set_text_content(Some(&script.body));
        parent
            .replace_child(&fresh, old)
            .map_err(|e| EmbedError::Mount(format!("{e:?}")))?;
        Ok(())
    }

    fn mount_frame(&mut self, frame: &FrameAttributes) -> Result<(), EmbedError> {
        let iframe: web_sys::HtmlIFrameElement = self
            .create("iframe")?
            .dyn_into()
            .map_err(|_| EmbedError::Mount("iframe cast failed".to_string()))?;
        iframe.set_class_name(FRAME_CLASS);
        iframe.set_src(&frame.src);
        iframe.set_title(&frame.title);
        let attrs = [("allow", frame.allow), ("sandbox", frame.sandbox)];
        for (name, value) in attrs {
            iframe
                .set_attribute(name, value)
                .map_err(|e| EmbedError::Mount(format!("{e:?}")))?;
        }
        if frame.allow_fullscreen {
            let _ = iframe.set_attribute("allowfullscreen", "");
        }
        self.replace_active(iframe.into())
    }

    fn clear(&mut self) {
        self.mount.set_inner_html("");
        let _ = self.mount.set_attribute("hidden", "");
        self.active = None;
        self.inert.clear();
    }
}
