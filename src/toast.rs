//! Toast-style notices.
//! Creates a `#send-back-toasts` container once per page and prepends toast
//! divs that remove themselves after a few seconds. Useful on pages where a
//! blocking `alert()` is unwanted; a notice shown right before a reload or
//! navigation disappears together with the page.

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Element};

use crate::page::{NoticeKind, NoticeSink};

const ROOT_ID: &str = "send-back-toasts";
const STYLES_ID: &str = "send-back-toast-styles";
const TOAST_MS: i32 = 4000;

#[derive(Debug, Default, Clone, Copy)]
pub struct ToastNotices;

impl NoticeSink for ToastNotices {
    fn notice(&self, kind: NoticeKind, text: &str) {
        if let Err(e) = show(text, kind) {
            crate::warn_log!("Failed to show toast {:?}: {:?}", text, e);
        }
    }
}

fn class_for(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Message => "toast-info",
        NoticeKind::Warning => "toast-warning",
        NoticeKind::Error => "toast-error",
    }
}

pub fn show(message: &str, kind: NoticeKind) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no global `window` exists")?;
    let document = window.document().ok_or("window has no document")?;

    ensure_styles(&document)?;
    let root = ensure_root(&document)?;

    let toast = document.create_element("div")?;
    toast.set_class_name("toast");
    toast.class_list().add_1(class_for(kind))?;
    toast.set_text_content(Some(message));

    // Newest on top.
    root.prepend_with_node_1(&toast)?;

    let cb = Closure::once_into_js(move || {
        toast.remove();
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        cb.as_ref().unchecked_ref(),
        TOAST_MS,
    )?;
    Ok(())
}

fn ensure_root(document: &Document) -> Result<Element, JsValue> {
    if let Some(el) = document.get_element_by_id(ROOT_ID) {
        return Ok(el);
    }
    let root = document.create_element("div")?;
    root.set_id(ROOT_ID);
    root.set_class_name("toast-root");
    document
        .body()
        .ok_or("document has no body")?
        .append_child(&root)?;
    Ok(root)
}

fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id(STYLES_ID).is_some() {
        return Ok(());
    }

    let css = "
.toast-root{position:fixed;top:16px;right:16px;display:flex;flex-direction:column;gap:8px;z-index:9999;font-family:Arial,Helvetica,sans-serif}
.toast{padding:10px 16px;border-radius:4px;color:#fff;box-shadow:0 2px 4px rgba(0,0,0,.1);opacity:0;animation:toast-in .2s forwards}
.toast-info{background:#2563eb}
.toast-warning{background:#d97706}
.toast-error{background:#dc2626}
@keyframes toast-in{to{opacity:1}}
";

    let style = document.create_element("style")?;
    style.set_id(STYLES_ID);
    style.set_text_content(Some(css));
    match document.head() {
        Some(head) => head.append_child(&style)?,
        None => document
            .body()
            .ok_or("document has no body")?
            .append_child(&style)?,
    };
    Ok(())
}
