use super::*;

use inspector_core::{InfoLine, Tone};

/// An event listener that is removed from its target when dropped.
pub(super) struct Listener {
    target: web_sys::EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    pub(super) fn attach(
        target: &web_sys::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, String> {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(handler));
        target
            .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
            .map_err(|_| format!("failed to listen for {kind}"))?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// Elements of a mounted panel whose text changes after an action.
#[derive(Clone, Default)]
pub(super) struct PanelControls {
    pub(super) chip_prefix: Option<HtmlElement>,
    pub(super) clear_button: Option<HtmlElement>,
    pub(super) activate_button: Option<HtmlElement>,
}

/// One mounted surface with the listeners it owns.
pub(super) struct DomSurface {
    root: HtmlElement,
    handle: Option<HtmlElement>,
    controls: PanelControls,
    listeners: Vec<Listener>,
}

impl DomSurface {
    fn new(root: HtmlElement) -> Self {
        Self {
            root,
            handle: None,
            controls: PanelControls::default(),
            listeners: Vec::new(),
        }
    }
}

pub(super) struct DomHost {
    document: web_sys::Document,
    positions: PositionStore<BrowserStorage>,
}

impl DomHost {
    pub(super) fn new(positions: PositionStore<BrowserStorage>) -> Result<Self, String> {
        Ok(Self {
            document: document()?,
            positions,
        })
    }

    fn element(&self, tag: &str) -> Result<HtmlElement, String> {
        self.document
            .create_element(tag)
            .map_err(|_| format!("failed to create {tag}"))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| format!("{tag} is not an HtmlElement"))
    }

    fn text(&self, tag: &str, text: &str, color: &str) -> Result<HtmlElement, String> {
        let element = self.element(tag)?;
        element.set_inner_text(text);
        style(&element, &[("color", color)])?;
        Ok(element)
    }

    fn info_line(&self, icon: &str, line: &InfoLine) -> Result<HtmlElement, String> {
        self.text(
            "div",
            &format!("{icon} {}: {}", line.label, line.value),
            line.tone.color(),
        )
    }

    fn section(
        &self,
        parent: &HtmlElement,
        heading: &str,
        lines: &[InfoLine],
    ) -> Result<(), String> {
        let title = self.text("div", heading, Tone::Plain.color())?;
        style(&title, &[("margin-top", "6px"), ("font-weight", "bold")])?;
        append(parent, &title)?;
        for line in lines {
            let row = self.text(
                "div",
                &format!("{}: {}", line.label, line.value),
                line.tone.color(),
            )?;
            style(&row, &[("padding-left", "8px")])?;
            append(parent, &row)?;
        }
        Ok(())
    }

    fn button(&self, action: PanelAction, label: &str, background: &str) -> Result<HtmlElement, String> {
        let button = self.element("button")?;
        tag_action(&button, action)?;
        button.set_inner_text(label);
        style(
            &button,
            &[
                ("margin-top", "8px"),
                ("padding", "5px 10px"),
                ("border-radius", "6px"),
                ("border", "none"),
                ("background", background),
                ("color", "#fff"),
                ("cursor", "pointer"),
                ("font-size", "9px"),
                ("width", "100%"),
            ],
        )?;
        Ok(button)
    }

    fn body(&self) -> Result<HtmlElement, String> {
        self.document
            .body()
            .ok_or_else(|| "document body is unavailable".to_string())
    }

    fn surface_root(&self, id: &str) -> Result<HtmlElement, String> {
        let root = self.element("div")?;
        root.set_id(id);
        style(
            &root,
            &[
                ("position", "fixed"),
                ("z-index", SURFACE_Z_INDEX),
                ("background", "rgba(17, 17, 17, 0.92)"),
                ("color", "#fff"),
                ("font-family", SURFACE_FONT),
                ("font-size", "11px"),
                ("line-height", "1.4"),
                ("border-radius", "10px"),
                ("box-shadow", "0 4px 16px rgba(0, 0, 0, 0.4)"),
                ("box-sizing", "border-box"),
            ],
        )?;
        Ok(root)
    }
}

impl SurfaceHost for DomHost {
    type Surface = DomSurface;
    type Error = String;

    fn mount_loader(&self) -> Result<DomSurface, String> {
        let root = self.surface_root(LOADER_ID)?;
        root.set_inner_text(LOADER_TEXT);
        style(&root, &[("padding", "8px 12px")])?;
        apply_placement(&root, Placement::Anchored)?;
        append(&self.body()?, &root)?;
        Ok(DomSurface::new(root))
    }

    fn mount_panel(&self, view: &PanelView, placement: Placement) -> Result<DomSurface, String> {
        let root = self.surface_root(PANEL_ID)?;
        style(
            &root,
            &[
                ("padding", "10px 12px"),
                ("width", "260px"),
                ("user-select", "none"),
            ],
        )?;
        apply_placement(&root, placement)?;

        let handle = self.element("div")?;
        style(
            &handle,
            &[
                ("display", "flex"),
                ("justify-content", "space-between"),
                ("align-items", "center"),
                ("cursor", "move"),
                ("font-weight", "bold"),
                ("margin-bottom", "6px"),
                ("touch-action", "none"),
            ],
        )?;
        let title = self.text("span", view.title, Tone::Plain.color())?;
        let close = self.text("span", CLOSE_GLYPH, Tone::Muted.color())?;
        tag_action(&close, PanelAction::Close)?;
        style(&close, &[("cursor", "pointer"), ("padding-left", "8px")])?;
        append(&handle, &title)?;
        append(&handle, &close)?;
        append(&root, &handle)?;

        append(&root, &self.info_line("🔗", &view.utm_source)?)?;
        let url = self.info_line("🌐", &view.url)?;
        url.set_title(&view.url.value);
        style(
            &url,
            &[
                ("display", "-webkit-box"),
                ("-webkit-line-clamp", "2"),
                ("-webkit-box-orient", "vertical"),
                ("overflow", "hidden"),
                ("word-break", "break-all"),
            ],
        )?;
        append(&root, &url)?;
        append(&root, &self.info_line("👤", &view.t_user)?)?;
        append(&root, &self.info_line("📩", &view.email)?)?;

        let chip = self.element("div")?;
        let chip_prefix = self.text("span", CopyFeedback::Neutral.prefix(), Tone::Plain.color())?;
        let chip_id = self.text("span", &view.user_id, Tone::Plain.color())?;
        tag_action(&chip_id, PanelAction::CopyId)?;
        chip_id.set_title("Click to copy");
        style(
            &chip_id,
            &[("cursor", "pointer"), ("text-decoration", "underline dotted")],
        )?;
        append(&chip, &chip_prefix)?;
        append(&chip, &chip_id)?;
        append(&root, &chip)?;

        if let Some(features) = view.features.as_deref() {
            self.section(&root, "🔧 userFeatures:", features)?;
        }
        if let Some(subscription) = view.subscription.as_deref() {
            self.section(&root, "💳 Subscription:", subscription)?;
        }
        if let Some(n_enabled) = view.n_enabled.as_ref() {
            let line = self.info_line("🔞", n_enabled)?;
            style(&line, &[("margin-top", "6px")])?;
            append(&root, &line)?;
        }

        let clear_button = self.button(
            PanelAction::ClearData,
            ClearDataLabel::Idle.text(),
            ClearDataLabel::Idle.background(),
        )?;
        append(&root, &clear_button)?;

        let activate_button = if view.offers(PanelAction::ActivateSubscription) {
            let button = self.button(
                PanelAction::ActivateSubscription,
                &ActivationState::Idle.label(),
                ACTIVATE_IDLE_BACKGROUND,
            )?;
            append(&root, &button)?;
            Some(button)
        } else {
            None
        };

        append(&self.body()?, &root)?;
        Ok(DomSurface {
            root,
            handle: Some(handle),
            controls: PanelControls {
                chip_prefix: Some(chip_prefix),
                clear_button: Some(clear_button),
                activate_button,
            },
            listeners: Vec::new(),
        })
    }

    fn attach_drag(&self, surface: &mut DomSurface) -> Result<(), String> {
        let handle = surface
            .handle
            .clone()
            .ok_or_else(|| "surface has no drag handle".to_string())?;
        let drag = Rc::new(RefCell::new(DragPositionManager::new(self.positions.clone())));

        let pressed = {
            let drag = Rc::clone(&drag);
            let root = surface.root.clone();
            Listener::attach(&handle, "pointerdown", move |event| {
                if action_of(&event).is_some() {
                    return;
                }
                let Some(pointer) = pointer_of(&event) else {
                    return;
                };
                let rect = root.get_bounding_client_rect();
                drag.borrow_mut()
                    .begin(pointer, Point::new(rect.left(), rect.top()));
                event.prevent_default();
            })?
        };

        let moved = {
            let drag = Rc::clone(&drag);
            let root = surface.root.clone();
            Listener::attach(&self.document, "pointermove", move |event| {
                let Some(pointer) = pointer_of(&event) else {
                    return;
                };
                let Some(position) = drag.borrow().drag_to(pointer) else {
                    return;
                };
                if let Err(error) = apply_placement(&root, Placement::At(position)) {
                    warn!(%error, "failed to move panel");
                }
            })?
        };

        let released = {
            let root = surface.root.clone();
            Listener::attach(&self.document, "pointerup", move |_event| {
                if !drag.borrow().is_dragging() {
                    return;
                }
                let rect = root.get_bounding_client_rect();
                let final_position = rendered_position(rect.left(), rect.top());
                match drag.borrow_mut().end(final_position, viewport_height()) {
                    Ok(Some(position)) => {
                        debug!(left = position.left, top = position.top, "panel position saved");
                    }
                    Ok(None) => {}
                    Err(error) => warn!(%error, "failed to save panel position"),
                }
            })?
        };

        surface.listeners.extend([pressed, moved, released]);
        Ok(())
    }

    fn bind_actions(&self, surface: &mut DomSurface, view: &PanelView) -> Result<(), String> {
        let context = Rc::new(ActionContext::new(view, surface.controls.clone(), &config()));
        let clicked = Listener::attach(&surface.root, "click", move |event| {
            let Some(action) = action_of(&event) else {
                return;
            };
            if !context.offers(action) {
                return;
            }
            event.stop_propagation();
            dispatch(action, Rc::clone(&context));
        })?;
        surface.listeners.push(clicked);
        Ok(())
    }

    fn unmount(&self, surface: DomSurface) {
        surface.root.remove();
        drop(surface);
    }
}

pub(super) fn style(element: &HtmlElement, properties: &[(&str, &str)]) -> Result<(), String> {
    let declaration = element.style();
    for (name, value) in properties {
        declaration
            .set_property(name, value)
            .map_err(|_| format!("failed to set {name}"))?;
    }
    Ok(())
}

fn append(parent: &HtmlElement, child: &HtmlElement) -> Result<(), String> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|_| "failed to attach element".to_string())
}

fn tag_action(element: &HtmlElement, action: PanelAction) -> Result<(), String> {
    element
        .set_attribute(PanelAction::ATTRIBUTE, action.as_str())
        .map_err(|_| format!("failed to tag {action} control"))
}

fn apply_placement(root: &HtmlElement, placement: Placement) -> Result<(), String> {
    for (name, value) in placement_styles(placement) {
        style(root, &[(name, value.as_str())])?;
    }
    Ok(())
}

/// The action tagged on the clicked control or one of its ancestors.
fn action_of(event: &web_sys::Event) -> Option<PanelAction> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let control = target.closest(ACTION_SELECTOR).ok()??;
    PanelAction::parse(&control.get_attribute(PanelAction::ATTRIBUTE)?)
}

fn pointer_of(event: &web_sys::Event) -> Option<Point> {
    event
        .dyn_ref::<MouseEvent>()
        .map(|event| Point::new(f64::from(event.client_x()), f64::from(event.client_y())))
}

fn viewport_height() -> f64 {
    web_sys::window()
        .and_then(|window| window.inner_height().ok())
        .and_then(|height| height.as_f64())
        .unwrap_or(f64::NAN)
}

pub(super) fn set_text(element: &HtmlElement, text: &str) {
    element.set_inner_text(text);
}

pub(super) fn set_background(element: &HtmlElement, background: &str) {
    let _ = element.style().set_property("background", background);
}
